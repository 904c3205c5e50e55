use std::fmt;
use uuid::Uuid;

use crate::models::SpinRecord;
use shared::wheel::WheelConfig;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgSpinStore;

#[derive(Debug)]
pub enum StoreError {
    /// Another insert for the same (caller, token) pair already landed.
    Conflict,
    /// The wheel document exists but does not decode into `WheelConfig`.
    MalformedConfig(serde_json::Error),
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "duplicate spin for caller and token"),
            Self::MalformedConfig(e) => write!(f, "malformed wheel config: {}", e),
            Self::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedConfig(e) => Some(e),
            Self::Database(e) => Some(e),
            Self::Conflict => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

/// Persistence seam for the spin ledger and wheel document. The
/// services only orchestrate; uniqueness of (user_id, request_token)
/// is this layer's guarantee, not application-level check-then-act.
#[axum::async_trait]
pub trait SpinStore: Send + Sync {
    /// The wheel document at its well-known key, decoded at the
    /// storage boundary.
    async fn load_wheel_config(&self) -> Result<Option<WheelConfig>, StoreError>;

    /// Exact (caller, token) match backing idempotent replay.
    async fn find_spin_by_token(
        &self,
        user_id: Uuid,
        request_token: &str,
    ) -> Result<Option<SpinRecord>, StoreError>;

    /// The caller's most recent spin by creation instant, for
    /// cooldown evaluation.
    async fn latest_spin(&self, user_id: Uuid) -> Result<Option<SpinRecord>, StoreError>;

    /// Appends a ledger row. Returns `Err(Conflict)` when the unique
    /// (user_id, request_token) constraint rejects a concurrent
    /// duplicate; the row is either fully persisted or not at all.
    async fn insert_spin(&self, record: &SpinRecord) -> Result<(), StoreError>;

    /// The caller's spins, newest first, at most `limit` rows.
    async fn list_spins(&self, user_id: Uuid, limit: i64) -> Result<Vec<SpinRecord>, StoreError>;
}
