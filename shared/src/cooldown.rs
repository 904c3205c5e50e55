use time::{Duration, OffsetDateTime};

/// Outcome of a cooldown evaluation.
///
/// `next_allowed_at` is always populated: when the caller has never
/// spun it is informational (`now + cooldown`), and when a previous
/// spin exists it is that spin's cooldown boundary whether or not the
/// boundary has elapsed yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownStatus {
    pub allowed: bool,
    pub next_allowed_at: OffsetDateTime,
}

/// Decides whether a new spin is admissible at `now` given the
/// caller's most recent spin instant. Must be fed the single latest
/// ledger row, never an aggregate that could lag a completing spin.
pub fn evaluate(
    last_spin_at: Option<OffsetDateTime>,
    cooldown_sec: i64,
    now: OffsetDateTime,
) -> CooldownStatus {
    match last_spin_at {
        None => CooldownStatus {
            allowed: true,
            next_allowed_at: now + Duration::seconds(cooldown_sec),
        },
        Some(last) => {
            let candidate = last + Duration::seconds(cooldown_sec);
            CooldownStatus {
                allowed: now >= candidate,
                next_allowed_at: candidate,
            }
        }
    }
}
