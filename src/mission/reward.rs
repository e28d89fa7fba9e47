//! Reward payout: table-driven multipliers over the approach's reward
//! baseline. No randomness here; the generator already rolled everything.

use serde::{Deserialize, Serialize};

use crate::mission::outcome::RiskTier;

pub const SUCCESS_MULTIPLIER: f64 = 1.0;
pub const FAILURE_MULTIPLIER: f64 = 0.35;
/// Flat experience grant for running the mission at all.
pub const PARTICIPATION_EXPERIENCE: u32 = 25;
/// Experience earned per point of mission score.
pub const EXPERIENCE_PER_POINT: f64 = 0.6;

pub const ACHIEVEMENT_FLAWLESS: &str = "flawless";
pub const ACHIEVEMENT_UNDER_FIRE: &str = "under_fire";
pub const ACHIEVEMENT_HIGH_STAKES: &str = "high_stakes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayload {
    pub points: u32,
    pub experience: u32,
    pub lore_unlocked: bool,
    pub achievements: Vec<String>,
}

pub const fn risk_multiplier(risk: RiskTier) -> f64 {
    match risk {
        RiskTier::Low => 0.8,
        RiskTier::Medium => 1.0,
        RiskTier::High => 1.4,
    }
}

/// Bucketed multiplier on the fraction of phases that held.
pub fn performance_multiplier(successful_phases: usize, phase_count: usize) -> f64 {
    if phase_count == 0 {
        return 1.0;
    }
    let ratio = successful_phases as f64 / phase_count as f64;
    if ratio >= 1.0 {
        1.25
    } else if ratio >= 0.8 {
        1.10
    } else if ratio >= 0.6 {
        1.0
    } else if ratio >= 0.4 {
        0.85
    } else {
        0.70
    }
}

pub fn calculate_rewards(
    overall_success: bool,
    successful_phases: usize,
    phase_count: usize,
    risk: RiskTier,
    reward_baseline: u32,
) -> RewardPayload {
    let success_multiplier = if overall_success {
        SUCCESS_MULTIPLIER
    } else {
        FAILURE_MULTIPLIER
    };
    let points = (reward_baseline as f64
        * success_multiplier
        * performance_multiplier(successful_phases, phase_count)
        * risk_multiplier(risk))
    .round() as u32;
    let experience = (points as f64 * EXPERIENCE_PER_POINT).round() as u32 + PARTICIPATION_EXPERIENCE;

    let failures = phase_count.saturating_sub(successful_phases);
    let mut achievements = Vec::new();
    if overall_success && phase_count > 0 && successful_phases == phase_count {
        achievements.push(ACHIEVEMENT_FLAWLESS.to_string());
    }
    if overall_success && failures >= 2 {
        achievements.push(ACHIEVEMENT_UNDER_FIRE.to_string());
    }
    if overall_success && risk == RiskTier::High {
        achievements.push(ACHIEVEMENT_HIGH_STAKES.to_string());
    }

    RewardPayload {
        points,
        experience,
        lore_unlocked: overall_success,
        achievements,
    }
}
