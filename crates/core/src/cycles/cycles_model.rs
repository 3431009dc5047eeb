use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ownership cycle of a (portfolio, symbol) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCycle {
    pub cycle: i32,
    pub opened_at: DateTime<Utc>,
    /// None while the cycle is still open.
    pub closed_at: Option<DateTime<Utc>>,
}

impl PositionCycle {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}
