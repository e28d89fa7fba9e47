//! Outcome generation: the full phase-by-phase simulation of a mission, run
//! exactly once at deploy time. Thresholds are deterministic given the inputs;
//! only the dice rolls are random, and those come from a seeded PRNG so a
//! whole deployment is reproducible from its seed.

use serde::{Deserialize, Serialize};

use crate::mission::compatibility::Specialty;
use crate::mission::reward::{calculate_rewards, RewardPayload};
use crate::mission::rng::Rng;
use crate::narrative::{DebriefPrompt, NarratorWithFallback, PhasePrompt};

pub const MAX_SUCCESS_RATE: f64 = 0.95;
/// No phase is ever certain or impossible.
pub const THRESHOLD_FLOOR: f64 = 0.10;
pub const THRESHOLD_CEIL: f64 = 0.90;
/// Failures among this many most-recent phases drag the next threshold down.
pub const CASCADE_WINDOW: usize = 2;
pub const CASCADE_PENALTY: f64 = 0.08;
/// Per-position difficulty offset, linear from first to last phase.
pub const POSITION_OFFSET_FIRST: f64 = 0.05;
pub const POSITION_OFFSET_LAST: f64 = -0.07;
pub const SPECIALTY_MATCH_BONUS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Presentation-only escalation metadata; never a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tension {
    Low,
    Medium,
    High,
    Critical,
}

impl Tension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// One phase of a mission as the generator consumes it. Catalog templates
/// convert their string tags into this typed plan.
#[derive(Debug, Clone)]
pub struct PhasePlan {
    pub id: String,
    pub name: String,
    pub tag: Specialty,
}

/// Roll-level result of one phase, before narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSim {
    pub success: bool,
    pub roll: u8,
    pub threshold_pct: u8,
}

/// Stored, immutable record of one phase. Visibility is the only thing that
/// changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub phase_id: String,
    pub name: String,
    pub tag: Specialty,
    pub success: bool,
    pub roll: u8,
    pub threshold_pct: u8,
    pub tension: Tension,
    pub narrative: String,
}

/// Overall result, computed at creation and applied exactly once at
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionResult {
    pub success: bool,
    pub successful_phases: u32,
    pub narrative: String,
    pub rewards: RewardPayload,
}

pub fn final_success_rate(base_success_rate: f64, compatibility: f64) -> f64 {
    (base_success_rate * compatibility).min(MAX_SUCCESS_RATE)
}

/// Earlier phases are easier, later phases harder.
pub fn position_offset(index: usize, phase_count: usize) -> f64 {
    if phase_count <= 1 {
        return 0.0;
    }
    let t = index as f64 / (phase_count - 1) as f64;
    POSITION_OFFSET_FIRST + (POSITION_OFFSET_LAST - POSITION_OFFSET_FIRST) * t
}

/// Risk-tier adjustment per phase tag: loud approaches pay for it on quiet
/// phases, cautious ones on direct action.
pub fn approach_adjustment(risk: RiskTier, tag: Specialty) -> f64 {
    match (risk, tag) {
        (RiskTier::High, Specialty::Infiltration) => -0.06,
        (RiskTier::High, Specialty::Social) => -0.03,
        (RiskTier::Low, Specialty::Infiltration) => 0.04,
        (RiskTier::Low, Specialty::Combat) => -0.04,
        _ => 0.0,
    }
}

/// Success threshold for one phase given the results of the phases before it.
pub fn phase_threshold(
    final_rate: f64,
    prior: &[bool],
    index: usize,
    phase_count: usize,
    operative: Specialty,
    tag: Specialty,
    risk: RiskTier,
) -> f64 {
    let recent_failures = prior
        .iter()
        .rev()
        .take(CASCADE_WINDOW)
        .filter(|success| !**success)
        .count();
    let mut threshold = final_rate;
    threshold -= CASCADE_PENALTY * recent_failures as f64;
    threshold += position_offset(index, phase_count);
    if operative == tag {
        threshold += SPECIALTY_MATCH_BONUS;
    }
    threshold += approach_adjustment(risk, tag);
    threshold.clamp(THRESHOLD_FLOOR, THRESHOLD_CEIL)
}

/// Minimum successful phases for overall success: `ceil(0.6 * n)` in integer
/// form.
pub fn required_successes(phase_count: usize) -> usize {
    (3 * phase_count + 4) / 5
}

pub fn tension_level(failures_so_far: usize, index: usize, phase_count: usize) -> Tension {
    let proximity = if index + 1 == phase_count {
        2
    } else if index + 2 >= phase_count {
        1
    } else {
        0
    };
    match failures_so_far * 2 + proximity {
        0 | 1 => Tension::Low,
        2 | 3 => Tension::Medium,
        4 | 5 => Tension::High,
        _ => Tension::Critical,
    }
}

/// Run the threshold cascade against a fixed roll sequence. Fully
/// deterministic; `simulate_phases` and `generate` both build on this.
pub fn run_phases(
    plans: &[PhasePlan],
    risk: RiskTier,
    final_rate: f64,
    operative: Specialty,
    rolls: &[u8],
) -> Vec<PhaseSim> {
    let mut results: Vec<bool> = Vec::with_capacity(plans.len());
    let mut sims = Vec::with_capacity(plans.len());
    for (index, (plan, roll)) in plans.iter().zip(rolls.iter()).enumerate() {
        let threshold = phase_threshold(
            final_rate,
            &results,
            index,
            plans.len(),
            operative,
            plan.tag,
            risk,
        );
        let threshold_pct = (threshold * 100.0).round() as u8;
        let success = *roll <= threshold_pct;
        results.push(success);
        sims.push(PhaseSim {
            success,
            roll: *roll,
            threshold_pct,
        });
    }
    sims
}

/// Roll and resolve every phase from a seed. Used by the assessment runner,
/// which needs outcomes without narration.
pub fn simulate_phases(
    plans: &[PhasePlan],
    risk: RiskTier,
    final_rate: f64,
    operative: Specialty,
    seed: u64,
) -> Vec<PhaseSim> {
    let mut rng = Rng::new(seed);
    let rolls: Vec<u8> = plans.iter().map(|_| rng.roll_d100()).collect();
    run_phases(plans, risk, final_rate, operative, &rolls)
}

/// Everything the generator needs about a deploy, already resolved to plain
/// values by the catalog layer.
#[derive(Debug, Clone)]
pub struct GenerationInput<'a> {
    pub mission_name: &'a str,
    pub phases: &'a [PhasePlan],
    pub risk: RiskTier,
    pub base_success_rate: f64,
    pub reward_baseline: u32,
    pub compatibility: f64,
    pub operative_specialty: Specialty,
    pub seed: u64,
}

/// Simulate the whole mission once: thresholds, rolls, tension, narration,
/// overall verdict, rewards. Never fails; narration is guaranteed by the
/// fallback decorator.
pub fn generate(
    input: &GenerationInput<'_>,
    narrator: &NarratorWithFallback,
) -> (Vec<PhaseOutcome>, MissionResult) {
    let final_rate = final_success_rate(input.base_success_rate, input.compatibility);
    let sims = simulate_phases(
        input.phases,
        input.risk,
        final_rate,
        input.operative_specialty,
        input.seed,
    );

    let phase_count = input.phases.len();
    let mut outcomes: Vec<PhaseOutcome> = Vec::with_capacity(phase_count);
    let mut failures = 0_usize;
    for (index, (plan, sim)) in input.phases.iter().zip(sims.iter()).enumerate() {
        if !sim.success {
            failures += 1;
        }
        let tension = tension_level(failures, index, phase_count);
        let previous = outcomes.last().map(|outcome| outcome.narrative.as_str());
        let narrative = narrator.phase_narrative(&PhasePrompt {
            mission_name: input.mission_name,
            phase_name: &plan.name,
            tag: plan.tag,
            roll: sim.roll,
            success: sim.success,
            tension,
            previous,
        });
        outcomes.push(PhaseOutcome {
            phase_id: plan.id.clone(),
            name: plan.name.clone(),
            tag: plan.tag,
            success: sim.success,
            roll: sim.roll,
            threshold_pct: sim.threshold_pct,
            tension,
            narrative,
        });
    }

    let successful_phases = outcomes.iter().filter(|outcome| outcome.success).count();
    let overall_success = successful_phases >= required_successes(phase_count);
    let narrative = narrator.debrief_narrative(&DebriefPrompt {
        mission_name: input.mission_name,
        overall_success,
        successful_phases: successful_phases as u32,
        phase_count: phase_count as u32,
        final_phase_narrative: outcomes.last().map(|outcome| outcome.narrative.as_str()),
    });
    let rewards = calculate_rewards(
        overall_success,
        successful_phases,
        phase_count,
        input.risk,
        input.reward_baseline,
    );

    let result = MissionResult {
        success: overall_success,
        successful_phases: successful_phases as u32,
        narrative,
        rewards,
    };
    (outcomes, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_successes_is_sixty_percent_ceiling() {
        let expected = [0, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6, 7, 8];
        for (count, want) in expected.iter().enumerate() {
            assert_eq!(
                required_successes(count),
                *want,
                "phase count {count} should need {want}"
            );
        }
    }

    #[test]
    fn position_offset_spans_first_to_last() {
        assert_eq!(position_offset(0, 5), POSITION_OFFSET_FIRST);
        assert!((position_offset(4, 5) - POSITION_OFFSET_LAST).abs() < 1e-12);
        assert_eq!(position_offset(0, 1), 0.0);
    }

    #[test]
    fn threshold_stays_clamped_for_extreme_inputs() {
        for prior in [&[][..], &[false, false, false][..]] {
            for rate in [0.0, 0.5, 5.0] {
                let threshold = phase_threshold(
                    rate,
                    prior,
                    4,
                    5,
                    Specialty::Combat,
                    Specialty::Infiltration,
                    RiskTier::High,
                );
                assert!((THRESHOLD_FLOOR..=THRESHOLD_CEIL).contains(&threshold));
            }
        }
    }

    #[test]
    fn cascade_counts_only_recent_failures() {
        // Three failures, but only the last two are in the window.
        let with_old = phase_threshold(
            0.6,
            &[false, false, false],
            3,
            6,
            Specialty::Recon,
            Specialty::Technical,
            RiskTier::Medium,
        );
        let with_recent = phase_threshold(
            0.6,
            &[true, false, false],
            3,
            6,
            Specialty::Recon,
            Specialty::Technical,
            RiskTier::Medium,
        );
        assert_eq!(with_old, with_recent);
    }
}
