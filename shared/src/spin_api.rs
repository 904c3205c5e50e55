use serde::{Deserialize, Serialize};

// === API Types ===
//
// Wire shapes for the spin endpoints. Field names follow the mobile
// client contract, hence the camelCase renames.

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    /// Client-generated idempotency token scoping at-most-once
    /// execution of this logical spin.
    pub request_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpinResponse {
    pub spin_id: String,
    pub winning_index: i32,
    pub prize_label: String,
    /// RFC 3339 instant before which the next spin will be refused.
    pub next_allowed_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpinHistoryItem {
    pub spin_id: String,
    pub winning_index: i32,
    pub prize_label: String,
    pub created_at: String,
}
