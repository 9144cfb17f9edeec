use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::repositories::SubmissionStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    store: Arc<dyn SubmissionStore>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, store: Arc<dyn SubmissionStore>) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, store }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Raw pool, used for liveness probes only. Domain reads and writes go
    /// through [`AppState::store`].
    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn store(&self) -> &dyn SubmissionStore {
        self.inner.store.as_ref()
    }
}
