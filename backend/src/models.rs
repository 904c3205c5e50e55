use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use shared::spin_api::{SpinHistoryItem, SpinResponse};

/// One resolved spin in the ledger. Rows are immutable once written;
/// the prize label is denormalized at resolution time so later wheel
/// edits never rewrite history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SpinRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request_token: String,
    pub winning_index: i32,
    pub prize_label: String,
    pub created_at: OffsetDateTime,
    pub next_allowed_at: OffsetDateTime,
}

impl SpinRecord {
    pub fn to_response(&self) -> Result<SpinResponse, ApiError> {
        Ok(SpinResponse {
            spin_id: self.id.to_string(),
            winning_index: self.winning_index,
            prize_label: self.prize_label.clone(),
            next_allowed_at: format_instant(self.next_allowed_at)?,
        })
    }

    pub fn to_history_item(&self) -> Result<SpinHistoryItem, ApiError> {
        Ok(SpinHistoryItem {
            spin_id: self.id.to_string(),
            winning_index: self.winning_index,
            prize_label: self.prize_label.clone(),
            created_at: format_instant(self.created_at)?,
        })
    }
}

/// RFC 3339 render for API timestamps.
pub fn format_instant(at: OffsetDateTime) -> Result<String, ApiError> {
    at.format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("timestamp formatting failed: {}", e)))
}
