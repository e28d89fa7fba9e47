//! The deployment record: one operative, one mission, one immutable outcome
//! set. Born fully formed at deploy time; after that only `status` moves, and
//! only once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mission::outcome::{MissionResult, PhaseOutcome, RiskTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Active,
    Completed,
    Abandoned,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub operative_id: String,
    pub mission_id: String,
    /// Snapshot of the mission's display name; status views must not depend
    /// on the catalog still carrying the template.
    pub mission_name: String,
    pub approach: RiskTier,
    pub compatibility: f64,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
    /// created_at + approach duration. Never changes.
    pub completes_at: DateTime<Utc>,
    /// Cumulative reveal fractions snapshotted from the template weights, so
    /// reveal stays a pure function of this record and the clock.
    pub reveal_schedule: Vec<f64>,
    pub status: DeploymentStatus,
    pub phases: Vec<PhaseOutcome>,
    pub result: MissionResult,
}

impl Deployment {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.completes_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_is_non_terminal() {
        assert!(!DeploymentStatus::Active.is_terminal());
        assert!(DeploymentStatus::Completed.is_terminal());
        assert!(DeploymentStatus::Abandoned.is_terminal());
    }
}
