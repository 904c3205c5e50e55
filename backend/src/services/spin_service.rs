use axum::{
    debug_handler,
    extract::{Extension, State},
    Json,
};
use rand::rngs::OsRng;
use rand::Rng;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::middleware::UserId;
use crate::error::ApiError;
use crate::models::SpinRecord;
use crate::store::{PgSpinStore, SpinStore, StoreError};
use crate::AppState;
use shared::cooldown;
use shared::spin_api::{SpinRequest, SpinResponse};
use shared::wheel::{choose_weighted_index, WHEEL_SEGMENTS};

/// Resolves one spin for `user_id` under the client-supplied
/// idempotency token.
///
/// Exactly one ledger row ever exists per (caller, token) pair. A
/// replayed request returns the stored row verbatim without
/// re-sampling or re-checking the cooldown; the stored row's
/// `next_allowed_at` is authoritative for what was already granted.
/// `now` and `draw` are injected so outcomes are reproducible under
/// test; the handler supplies the wall clock and an `OsRng` draw.
pub async fn resolve_spin<S: SpinStore>(
    store: &S,
    user_id: Uuid,
    request_token: &str,
    now: OffsetDateTime,
    draw: f64,
) -> Result<SpinRecord, ApiError> {
    let token = request_token.trim();
    if token.is_empty() {
        return Err(ApiError::InvalidArgument(
            "requestToken is required".to_string(),
        ));
    }

    let config = store
        .load_wheel_config()
        .await?
        .ok_or_else(|| ApiError::FailedPrecondition {
            message: "Wheel configuration missing".to_string(),
            next_allowed_at: None,
        })?;
    if config.segments.len() != WHEEL_SEGMENTS {
        return Err(ApiError::FailedPrecondition {
            message: format!("Wheel must have {} segments", WHEEL_SEGMENTS),
            next_allowed_at: None,
        });
    }

    if let Some(existing) = store.find_spin_by_token(user_id, token).await? {
        return Ok(existing);
    }

    let last = store.latest_spin(user_id).await?;
    let status = cooldown::evaluate(last.map(|l| l.created_at), config.cooldown_sec, now);
    if !status.allowed {
        return Err(ApiError::FailedPrecondition {
            message: "Cooldown active".to_string(),
            next_allowed_at: Some(status.next_allowed_at),
        });
    }

    let weights: Vec<f64> = config.segments.iter().map(|s| s.weight).collect();
    let winning_index = choose_weighted_index(&weights, draw);
    let record = SpinRecord {
        id: Uuid::new_v4(),
        user_id,
        request_token: token.to_string(),
        winning_index: winning_index as i32,
        prize_label: config.segments[winning_index].label.clone(),
        created_at: now,
        next_allowed_at: status.next_allowed_at,
    };

    match store.insert_spin(&record).await {
        Ok(()) => Ok(record),
        // A concurrent call with the same token won the insert race;
        // its row is the single authoritative outcome for this token.
        Err(StoreError::Conflict) => store
            .find_spin_by_token(user_id, token)
            .await?
            .ok_or_else(|| ApiError::Internal("spin missing after insert conflict".to_string())),
        Err(e) => Err(e.into()),
    }
}

#[debug_handler]
pub async fn spin_wheel(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, ApiError> {
    let store = PgSpinStore::new(state.pool.clone());
    let draw = OsRng.gen_range(0.0..1.0);
    let record = resolve_spin(
        &store,
        user_id.0,
        &request.request_token,
        OffsetDateTime::now_utc(),
        draw,
    )
    .await?;

    info!(
        "🎡 WHEEL SPIN: user {} landed on segment {} ({})",
        user_id.0, record.winning_index, record.prize_label
    );

    Ok(Json(record.to_response()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemorySpinStore;
    use shared::wheel::{WheelConfig, WheelSegment};
    use std::sync::Mutex;

    fn segment(label: &str, weight: f64) -> WheelSegment {
        WheelSegment {
            label: label.to_string(),
            weight,
            color: None,
        }
    }

    fn config_with_segments(count: usize) -> WheelConfig {
        WheelConfig {
            segments: (0..count)
                .map(|i| segment(&format!("Prize {}", i), 1.0))
                .collect(),
            cooldown_sec: 30,
        }
    }

    fn ts(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000 + secs).unwrap()
    }

    #[tokio::test]
    async fn blank_token_is_rejected() {
        let store = MemorySpinStore::with_config(config_with_segments(8));
        let user = Uuid::new_v4();
        for token in ["", "   "] {
            let err = resolve_spin(&store, user, token, ts(0), 0.5)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)));
        }
        assert_eq!(store.spin_count(), 0);
    }

    #[tokio::test]
    async fn missing_config_is_rejected() {
        let store = MemorySpinStore::default();
        let err = resolve_spin(&store, Uuid::new_v4(), "tok-1", ts(0), 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::FailedPrecondition { .. }));
        assert_eq!(store.spin_count(), 0);
    }

    #[tokio::test]
    async fn wrong_segment_count_is_rejected_before_persistence() {
        for count in [7, 9] {
            let store = MemorySpinStore::with_config(config_with_segments(count));
            let err = resolve_spin(&store, Uuid::new_v4(), "tok-1", ts(0), 0.5)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::FailedPrecondition { .. }));
            assert_eq!(store.spin_count(), 0);
        }
    }

    #[tokio::test]
    async fn replay_returns_stored_outcome() {
        let store = MemorySpinStore::with_config(config_with_segments(8));
        let user = Uuid::new_v4();

        let first = resolve_spin(&store, user, "tok-1", ts(0), 0.1).await.unwrap();
        // A retry with a different draw, a later clock, and an active
        // cooldown must replay the stored row untouched.
        let second = resolve_spin(&store, user, "tok-1", ts(5), 0.9).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.winning_index, second.winning_index);
        assert_eq!(first.prize_label, second.prize_label);
        assert_eq!(first.next_allowed_at, second.next_allowed_at);
        assert_eq!(store.spin_count(), 1);
    }

    #[tokio::test]
    async fn cooldown_blocks_distinct_token_inside_window() {
        let store = MemorySpinStore::with_config(config_with_segments(8));
        let user = Uuid::new_v4();

        resolve_spin(&store, user, "tok-1", ts(0), 0.5).await.unwrap();

        let err = resolve_spin(&store, user, "tok-2", ts(10), 0.5)
            .await
            .unwrap_err();
        match err {
            ApiError::FailedPrecondition {
                next_allowed_at, ..
            } => assert_eq!(next_allowed_at, Some(ts(30))),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.spin_count(), 1);
    }

    #[tokio::test]
    async fn spin_allowed_at_cooldown_boundary() {
        let store = MemorySpinStore::with_config(config_with_segments(8));
        let user = Uuid::new_v4();

        resolve_spin(&store, user, "tok-1", ts(0), 0.5).await.unwrap();
        let record = resolve_spin(&store, user, "tok-2", ts(30), 0.5)
            .await
            .unwrap();

        // The boundary that just elapsed is recorded as the floor for
        // the next cycle.
        assert_eq!(record.next_allowed_at, ts(30));
        assert_eq!(store.spin_count(), 2);
    }

    #[tokio::test]
    async fn first_spin_ignores_cooldown_length() {
        let mut config = config_with_segments(8);
        config.cooldown_sec = 86_400;
        let store = MemorySpinStore::with_config(config);

        let record = resolve_spin(&store, Uuid::new_v4(), "tok-1", ts(0), 0.5)
            .await
            .unwrap();
        assert_eq!(record.next_allowed_at, ts(86_400));
    }

    #[tokio::test]
    async fn winning_label_is_denormalized_from_config() {
        let store = MemorySpinStore::with_config(WheelConfig {
            segments: vec![
                segment("A", 0.0),
                segment("B", 0.0),
                segment("C", 1.0),
                segment("D", 0.0),
                segment("E", 0.0),
                segment("F", 0.0),
                segment("G", 0.0),
                segment("H", 0.0),
            ],
            cooldown_sec: 30,
        });

        let record = resolve_spin(&store, Uuid::new_v4(), "tok-1", ts(0), 0.5)
            .await
            .unwrap();
        assert_eq!(record.winning_index, 2);
        assert_eq!(record.prize_label, "C");
    }

    /// Delegates to a `MemorySpinStore` but sneaks a rival row for the
    /// same (caller, token) in just before every insert, simulating a
    /// concurrent duplicate winning the race at the storage layer.
    struct RacingStore {
        inner: MemorySpinStore,
        rival: Mutex<Option<SpinRecord>>,
    }

    #[axum::async_trait]
    impl SpinStore for RacingStore {
        async fn load_wheel_config(&self) -> Result<Option<WheelConfig>, StoreError> {
            self.inner.load_wheel_config().await
        }

        async fn find_spin_by_token(
            &self,
            user_id: Uuid,
            request_token: &str,
        ) -> Result<Option<SpinRecord>, StoreError> {
            self.inner.find_spin_by_token(user_id, request_token).await
        }

        async fn latest_spin(&self, user_id: Uuid) -> Result<Option<SpinRecord>, StoreError> {
            self.inner.latest_spin(user_id).await
        }

        async fn insert_spin(&self, record: &SpinRecord) -> Result<(), StoreError> {
            // Drop the guard before awaiting so the future stays Send.
            let rival = self.rival.lock().unwrap().take();
            if let Some(rival) = rival {
                self.inner.insert_spin(&rival).await?;
            }
            self.inner.insert_spin(record).await
        }

        async fn list_spins(
            &self,
            user_id: Uuid,
            limit: i64,
        ) -> Result<Vec<SpinRecord>, StoreError> {
            self.inner.list_spins(user_id, limit).await
        }
    }

    #[tokio::test]
    async fn insert_race_falls_back_to_winner_row() {
        let user = Uuid::new_v4();
        let rival = SpinRecord {
            id: Uuid::new_v4(),
            user_id: user,
            request_token: "tok-1".to_string(),
            winning_index: 4,
            prize_label: "Prize 4".to_string(),
            created_at: ts(0),
            next_allowed_at: ts(30),
        };
        let store = RacingStore {
            inner: MemorySpinStore::with_config(config_with_segments(8)),
            rival: Mutex::new(Some(rival.clone())),
        };

        let record = resolve_spin(&store, user, "tok-1", ts(0), 0.0).await.unwrap();

        // The loser of the race observes the winner's outcome; only
        // one row exists.
        assert_eq!(record.id, rival.id);
        assert_eq!(record.winning_index, 4);
        assert_eq!(store.inner.spin_count(), 1);
    }
}
