use super::parsing::{env_var, env_var_or, flag_or, parse_number, parse_origins};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, AuthSettings, ConfigError, CorsSettings, DatabaseSettings, Environment,
    ListenAddr, RuntimeSettings, Settings, TelemetrySettings,
};

impl Settings {
    /// Reads every setting from the process environment. Application keys
    /// carry the `EXAMINER_` prefix; `DATABASE_URL` and `POSTGRES_*` keep the
    /// names other Postgres tooling already uses.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_label(env_var("EXAMINER_ENV").as_deref());
        let strict_config =
            flag_or("EXAMINER_STRICT_CONFIG", false)? || environment.is_production();

        let listen = ListenAddr::parse(
            env_var_or("EXAMINER_HOST", "0.0.0.0"),
            env_var_or("EXAMINER_PORT", "8000"),
        )?;

        let api = ApiSettings {
            project_name: env_var_or("EXAMINER_PROJECT_NAME", "Examiner API"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_v1_str: env_var_or("EXAMINER_API_PREFIX", "/api/v1"),
        };
        if !api.api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "EXAMINER_API_PREFIX",
                value: api.api_v1_str,
            });
        }

        let signing_key = match env_var("EXAMINER_JWT_SECRET") {
            Some(key) => key,
            None if strict_config => return Err(ConfigError::MissingSecret("EXAMINER_JWT_SECRET")),
            None => load_or_create_secret_key(),
        };
        let auth = AuthSettings {
            signing_key,
            algorithm: env_var_or("EXAMINER_JWT_ALGORITHM", "HS256"),
            token_ttl_minutes: parse_number(
                "EXAMINER_TOKEN_TTL_MINUTES",
                env_var_or("EXAMINER_TOKEN_TTL_MINUTES", "10080"),
            )?,
        };

        let cors = CorsSettings { origins: parse_origins(env_var("EXAMINER_CORS_ORIGINS"))? };
        let database = load_database(strict_config)?;

        let telemetry = TelemetrySettings {
            log_level: env_var_or("EXAMINER_LOG_LEVEL", "info"),
            json: flag_or("EXAMINER_LOG_JSON", false)?,
            prometheus_enabled: flag_or("EXAMINER_METRICS", false)?,
        };

        Ok(Self {
            listen,
            runtime: RuntimeSettings { environment, strict_config },
            api,
            auth,
            cors,
            database,
            telemetry,
        })
    }

    pub(crate) fn listen(&self) -> &ListenAddr {
        &self.listen
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from `POSTGRES_*`.
fn load_database(strict_config: bool) -> Result<DatabaseSettings, ConfigError> {
    let max_connections: u32 = parse_number(
        "EXAMINER_DB_MAX_CONNECTIONS",
        env_var_or("EXAMINER_DB_MAX_CONNECTIONS", "20"),
    )?;
    if max_connections == 0 {
        return Err(ConfigError::InvalidValue {
            key: "EXAMINER_DB_MAX_CONNECTIONS",
            value: max_connections.to_string(),
        });
    }

    if let Some(url) = env_var("DATABASE_URL") {
        return Ok(DatabaseSettings { url, max_connections });
    }

    let password = env_var_or("POSTGRES_PASSWORD", "");
    if strict_config && password.is_empty() {
        return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
    }
    let port: u16 = parse_number("POSTGRES_PORT", env_var_or("POSTGRES_PORT", "5432"))?;
    let url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        env_var_or("POSTGRES_USER", "examiner"),
        password,
        env_var_or("POSTGRES_SERVER", "localhost"),
        port,
        env_var_or("POSTGRES_DB", "examiner_db"),
    );

    Ok(DatabaseSettings { url, max_connections })
}
