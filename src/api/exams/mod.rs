mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_exams))
        .route("/:exam_id", get(handlers::get_exam))
        .route("/:exam_id/status", get(handlers::exam_status))
        .route("/:exam_id/submit", post(handlers::submit_exam))
        .route("/:exam_id/result", get(handlers::my_result))
        .route("/:exam_id/stats", get(handlers::exam_stats))
}
