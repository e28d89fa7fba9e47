pub mod compatibility;
pub mod outcome;
pub mod reveal;
pub mod reward;
pub mod rng;

pub use compatibility::{compatibility_score, specialty_from_tag, Specialty, MAX_COMPATIBILITY};
pub use outcome::{
    final_success_rate, generate, required_successes, run_phases, simulate_phases,
    GenerationInput, MissionResult, PhaseOutcome, PhasePlan, PhaseSim, RiskTier, Tension,
};
pub use reveal::{elapsed_fraction, phase_views, reveal_schedule, revealed_count, PhaseView};
pub use reward::{calculate_rewards, RewardPayload};
pub use rng::Rng;
