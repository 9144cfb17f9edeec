pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::PgSubmissionStore;
use crate::services::question_ids::{backfill_ids, generate_question_id};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let store = Arc::new(PgSubmissionStore::new(db_pool.clone()));
    let state = AppState::new(settings, db_pool, store);

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().listen().to_string()).await?;

    tracing::info!(
        host = %state.settings().listen().host(),
        port = state.settings().listen().port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Examiner API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    tracing::info!("Examiner API stopped");
    Ok(())
}

/// Assigns ids to stored questions that lack one and refreshes each exam's
/// denormalized question count.
pub async fn run_backfill() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let documents = repositories::exams::list_question_documents(&db_pool).await?;
    let mut patched = 0;

    for document in documents {
        let mut questions = document.questions.0;
        let backfill = match backfill_ids(&mut questions, generate_question_id) {
            Ok(backfill) => backfill,
            Err(err) => {
                tracing::warn!(
                    exam_id = %document.id,
                    error = %err,
                    "Skipping exam with malformed questions"
                );
                continue;
            }
        };

        if backfill.assigned == 0 && backfill.total_questions == document.total_questions {
            continue;
        }

        repositories::exams::update_questions(
            &db_pool,
            &document.id,
            &questions,
            backfill.total_questions,
        )
        .await?;
        patched += 1;
        tracing::info!(
            exam_id = %document.id,
            assigned = backfill.assigned,
            total_questions = backfill.total_questions,
            "Patched exam questions"
        );
    }

    tracing::info!(patched, "Question id backfill finished");
    Ok(())
}
