use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{SpinStore, StoreError};
use crate::models::SpinRecord;
use shared::wheel::WheelConfig;

/// Key of the singleton wheel document in `wheel_config`.
const WHEEL_CONFIG_KEY: &str = "default";

#[derive(Clone)]
pub struct PgSpinStore {
    pool: PgPool,
}

impl PgSpinStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[axum::async_trait]
impl SpinStore for PgSpinStore {
    async fn load_wheel_config(&self) -> Result<Option<WheelConfig>, StoreError> {
        let row = sqlx::query("SELECT data FROM wheel_config WHERE key = $1")
            .bind(WHEEL_CONFIG_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.try_get("data")?;
                let config = serde_json::from_value(data).map_err(StoreError::MalformedConfig)?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    async fn find_spin_by_token(
        &self,
        user_id: Uuid,
        request_token: &str,
    ) -> Result<Option<SpinRecord>, StoreError> {
        let record = sqlx::query_as::<_, SpinRecord>(
            r#"
            SELECT id, user_id, request_token, winning_index, prize_label, created_at, next_allowed_at
            FROM spins
            WHERE user_id = $1 AND request_token = $2
            "#,
        )
        .bind(user_id)
        .bind(request_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn latest_spin(&self, user_id: Uuid) -> Result<Option<SpinRecord>, StoreError> {
        let record = sqlx::query_as::<_, SpinRecord>(
            r#"
            SELECT id, user_id, request_token, winning_index, prize_label, created_at, next_allowed_at
            FROM spins
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_spin(&self, record: &SpinRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO spins (id, user_id, request_token, winning_index, prize_label, created_at, next_allowed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.request_token)
        .bind(record.winning_index)
        .bind(&record.prize_label)
        .bind(record.created_at)
        .bind(record.next_allowed_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return Err(StoreError::Conflict);
                    }
                }
                Err(StoreError::Database(e))
            }
        }
    }

    async fn list_spins(&self, user_id: Uuid, limit: i64) -> Result<Vec<SpinRecord>, StoreError> {
        let records = sqlx::query_as::<_, SpinRecord>(
            r#"
            SELECT id, user_id, request_token, winning_index, prize_label, created_at, next_allowed_at
            FROM spins
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
