use axum::{
    debug_handler,
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::UserId;
use crate::error::ApiError;
use crate::models::SpinRecord;
use crate::store::{PgSpinStore, SpinStore};
use crate::AppState;
use shared::spin_api::SpinHistoryItem;

const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// The caller's past spins, newest first. The limit is clamped
/// server-side to 1..=100 (default 100).
pub async fn list_history<S: SpinStore>(
    store: &S,
    user_id: Uuid,
    limit: Option<i64>,
) -> Result<Vec<SpinRecord>, ApiError> {
    let limit = limit.unwrap_or(MAX_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
    Ok(store.list_spins(user_id, limit).await?)
}

#[debug_handler]
pub async fn get_spin_history(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<SpinHistoryItem>>, ApiError> {
    let store = PgSpinStore::new(state.pool.clone());
    let records = list_history(&store, user_id.0, params.limit).await?;
    let items = records
        .iter()
        .map(|r| r.to_history_item())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}
