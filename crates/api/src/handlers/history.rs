//! Handler for the generation-history endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use genrelay_db::models::history::GenerationRecord;
use genrelay_db::repositories::GenerationHistoryRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Rows returned when the caller does not ask for a specific amount.
const DEFAULT_LIMIT: i64 = 20;
/// Upper bound on one page of history.
const MAX_LIMIT: i64 = 100;

/// Query parameters for `GET /api/v1/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/history
///
/// Most recent completed generations, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<GenerationRecord>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let records = GenerationHistoryRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: records }))
}
