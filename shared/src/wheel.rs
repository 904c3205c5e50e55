use serde::{Deserialize, Serialize};

/// Number of segments a wheel must have before spins can be resolved.
pub const WHEEL_SEGMENTS: usize = 8;

/// One weighted, labeled slice of the wheel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WheelSegment {
    pub label: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The singleton wheel document. Seeded and edited by ops tooling,
/// read-only to the spin services. Weights are relative and do not
/// need to sum to anything in particular.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WheelConfig {
    pub segments: Vec<WheelSegment>,
    pub cooldown_sec: i64,
}

/// Maps a single uniform draw in [0,1) onto the weight buckets and
/// returns the index of the bucket it lands in.
///
/// The comparison is strict, so a draw that lands exactly on a bucket
/// boundary resolves to the later bucket. Negative weights are treated
/// as zero. When the slice is empty, every weight is zero, or rounding
/// defeats every comparison, the last index is returned (0 for an
/// empty slice) rather than failing.
pub fn choose_weighted_index(weights: &[f64], draw: f64) -> usize {
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w.max(0.0);
        if draw * total < acc {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}
