use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStaff, CurrentUser};
use crate::core::state::AppState;
use crate::repositories::ResultFilter;
use crate::schemas::result::{ResultListItem, ResultsQuery};

pub(super) async fn my_results(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ResultListItem>>, ApiError> {
    let rows = state
        .store()
        .list_results_for_user(&user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list results"))?;

    Ok(Json(rows.into_iter().map(ResultListItem::from).collect()))
}

pub(super) async fn list_results(
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
    Query(params): Query<ResultsQuery>,
) -> Result<Json<Vec<ResultListItem>>, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rows = state
        .store()
        .list_results(ResultFilter { user_id: params.user_id, exam_id: params.exam_id })
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list results"))?;

    Ok(Json(rows.into_iter().map(ResultListItem::from).collect()))
}
