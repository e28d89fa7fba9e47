//! Pre-deploy assessment: Monte Carlo over the phase simulation, no
//! narration, no state change. Iterations get consecutive derived seeds and
//! run across all cores; sums are order-independent, so results are
//! deterministic for a fixed request seed.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::catalog::{ApproachTemplate, MissionTemplate};
use crate::data::operative::Operative;
use crate::mission::compatibility::compatibility_score;
use crate::mission::outcome::{
    final_success_rate, required_successes, simulate_phases, RiskTier,
};
use crate::ops::service::{DeployError, DeployService};

pub const DEFAULT_ITERATIONS: u32 = 2000;
pub const MAX_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct AssessRequest {
    pub operative: String,
    pub mission: String,
    pub approach: String,
    pub iterations: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub mission_id: String,
    pub operative_id: String,
    pub approach: &'static str,
    pub iterations: u32,
    pub seed: u64,
    pub compatibility: f64,
    pub final_success_rate: f64,
    pub success_rate: f64,
    pub avg_successful_phases: f64,
    pub success_rate_95_ci: [f64; 2],
}

pub fn binomial_95_ci(wins: u32, n: u32) -> [f64; 2] {
    if n == 0 {
        return [0.0, 0.0];
    }
    let p = wins as f64 / n as f64;
    let z = 1.96;
    let se = (p * (1.0 - p) / n as f64).sqrt();
    let lo = (p - z * se).max(0.0);
    let hi = (p + z * se).min(1.0);
    [lo, hi]
}

/// Run the assessment against already-resolved catalog entries.
pub fn run_assessment(
    mission: &MissionTemplate,
    approach: &ApproachTemplate,
    operative: &Operative,
    iterations: u32,
    seed: u64,
) -> Assessment {
    let iterations = iterations.clamp(1, MAX_ITERATIONS);
    let compatibility = compatibility_score(
        operative.specialty(),
        operative.experience,
        operative.level(),
        mission.primary_specialty(),
    );
    let final_rate = final_success_rate(approach.base_success_rate, compatibility);
    let plans = mission.phase_plans();
    let required = required_successes(plans.len());

    let (wins, phase_successes) = (0..iterations)
        .into_par_iter()
        .map(|iteration| {
            let iteration_seed = seed.wrapping_add(iteration as u64);
            let sims = simulate_phases(
                &plans,
                approach.risk,
                final_rate,
                operative.specialty(),
                iteration_seed,
            );
            let successes = sims.iter().filter(|sim| sim.success).count();
            ((successes >= required) as u32, successes as u64)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    Assessment {
        mission_id: mission.id.clone(),
        operative_id: operative.id.clone(),
        approach: approach.risk.as_str(),
        iterations,
        seed,
        compatibility,
        final_success_rate: final_rate,
        success_rate: wins as f64 / iterations as f64,
        avg_successful_phases: phase_successes as f64 / iterations as f64,
        success_rate_95_ci: binomial_95_ci(wins, iterations),
    }
}

/// Resolve an assessment request through the service's catalog and store.
/// Read-only; shares the deploy error taxonomy for unknown inputs.
pub fn assess(service: &DeployService, request: &AssessRequest) -> Result<Assessment, DeployError> {
    let mission = service
        .catalog()
        .resolve(&request.mission)
        .ok_or_else(|| DeployError::MissionNotFound(request.mission.clone()))?;
    let risk = RiskTier::parse(&request.approach)
        .ok_or_else(|| DeployError::InvalidApproach(request.approach.clone()))?;
    let approach = mission
        .approach(risk)
        .ok_or_else(|| DeployError::InvalidApproach(request.approach.clone()))?;
    let operative = service
        .store()
        .operative(&request.operative)?
        .ok_or_else(|| DeployError::OperativeNotFound(request.operative.clone()))?;

    Ok(run_assessment(
        mission,
        approach,
        &operative,
        request.iterations.unwrap_or(DEFAULT_ITERATIONS),
        request.seed.unwrap_or(0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::MissionCatalog;
    use crate::data::operative::builtin_roster;

    #[test]
    fn assessment_is_deterministic_for_fixed_seed() {
        let catalog = MissionCatalog::builtin();
        let mission = catalog.get("signal-intercept").unwrap();
        let approach = mission.approach(RiskTier::Medium).unwrap();
        let operative = &builtin_roster()[0];

        let a = run_assessment(mission, approach, operative, 500, 42);
        let b = run_assessment(mission, approach, operative, 500, 42);
        assert_eq!(a.success_rate, b.success_rate);
        assert_eq!(a.avg_successful_phases, b.avg_successful_phases);
    }

    #[test]
    fn success_rate_lands_in_a_sane_band() {
        let catalog = MissionCatalog::builtin();
        let mission = catalog.get("signal-intercept").unwrap();
        let approach = mission.approach(RiskTier::Low).unwrap();
        let operative = &builtin_roster()[1];

        let assessment = run_assessment(mission, approach, operative, 4000, 7);
        assert!((0.0..=1.0).contains(&assessment.success_rate));
        assert!(assessment.success_rate_95_ci[0] <= assessment.success_rate);
        assert!(assessment.success_rate <= assessment.success_rate_95_ci[1]);
        // Low risk with a compatible operative should clear coin-flip odds.
        assert!(assessment.success_rate > 0.5, "rate {}", assessment.success_rate);
    }
}
