mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{ConfigError, Settings};

#[cfg(test)]
mod tests {
    use super::types::Environment;
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn strict_mode_requires_jwt_secret() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAMINER_STRICT_CONFIG", "1");
        std::env::remove_var("EXAMINER_JWT_SECRET");

        let err = Settings::load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("EXAMINER_JWT_SECRET")));
    }

    #[tokio::test]
    async fn production_implies_strict_database_password() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAMINER_ENV", "prod");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("POSTGRES_PASSWORD");

        let err = Settings::load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("POSTGRES_PASSWORD")));
    }

    #[tokio::test]
    async fn rejects_zero_port() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAMINER_PORT", "0");

        let err = Settings::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListenAddr { port, .. } if port == "0"));
    }

    #[tokio::test]
    async fn misspelled_switch_is_an_error() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAMINER_METRICS", "enabled");

        let err = Settings::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "EXAMINER_METRICS", .. }));
    }

    #[tokio::test]
    async fn database_url_is_assembled_from_parts() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("DATABASE_URL");
        std::env::set_var("POSTGRES_USER", "exam");
        std::env::set_var("POSTGRES_PASSWORD", "pw");
        std::env::set_var("POSTGRES_SERVER", "db.internal");
        std::env::set_var("POSTGRES_DB", "exams");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.database().url(), "postgresql://exam:pw@db.internal:5432/exams");
        assert_eq!(settings.runtime().environment, Environment::Test);
        assert_eq!(settings.listen().to_string(), "0.0.0.0:8000");
    }
}
