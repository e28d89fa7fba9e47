//! Time-gated reveal of precomputed phase outcomes. Pure functions of the
//! stored deployment data and the clock, so any number of concurrent readers
//! see consistent, non-regressing visibility. Progress is an illusion built
//! entirely here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mission::outcome::{PhaseOutcome, Tension};

/// Cumulative reveal fractions derived from phase duration weights, ending at
/// 1.0. Degenerate weights fall back to even spacing.
pub fn reveal_schedule(weights: &[f64]) -> Vec<f64> {
    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    if weights.iter().any(|weight| !weight.is_finite() || *weight <= 0.0) {
        return (1..=count).map(|i| i as f64 / count as f64).collect();
    }
    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.0;
    let mut schedule: Vec<f64> = weights
        .iter()
        .map(|weight| {
            cumulative += weight / total;
            cumulative
        })
        .collect();
    // Rounding may leave the tail at 0.9999…; the last phase reveals exactly
    // at completion.
    if let Some(last) = schedule.last_mut() {
        *last = 1.0;
    }
    schedule
}

pub fn elapsed_fraction(
    created_at: DateTime<Utc>,
    completes_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let window = (completes_at - created_at).num_milliseconds();
    if window <= 0 {
        return 1.0;
    }
    let elapsed = (now - created_at).num_milliseconds();
    (elapsed as f64 / window as f64).clamp(0.0, 1.0)
}

pub fn revealed_count(schedule: &[f64], elapsed: f64) -> usize {
    schedule
        .iter()
        .take_while(|fraction| elapsed >= **fraction)
        .count()
}

/// Client-facing view of one phase. Unrevealed phases expose id and name
/// only, never the roll, outcome, or narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PhaseView {
    Pending {
        phase_id: String,
        name: String,
    },
    Revealed {
        phase_id: String,
        name: String,
        success: bool,
        roll: u8,
        threshold_pct: u8,
        tension: Tension,
        narrative: String,
    },
}

impl PhaseView {
    pub fn is_revealed(&self) -> bool {
        matches!(self, Self::Revealed { .. })
    }
}

/// Project stored outcomes through the schedule. `reveal_all` short-circuits
/// the clock for terminal deployments.
pub fn phase_views(
    phases: &[PhaseOutcome],
    schedule: &[f64],
    elapsed: f64,
    reveal_all: bool,
) -> Vec<PhaseView> {
    let visible = if reveal_all {
        phases.len()
    } else {
        revealed_count(schedule, elapsed)
    };
    phases
        .iter()
        .enumerate()
        .map(|(index, phase)| {
            if index < visible {
                PhaseView::Revealed {
                    phase_id: phase.phase_id.clone(),
                    name: phase.name.clone(),
                    success: phase.success,
                    roll: phase.roll,
                    threshold_pct: phase.threshold_pct,
                    tension: phase.tension,
                    narrative: phase.narrative.clone(),
                }
            } else {
                PhaseView::Pending {
                    phase_id: phase.phase_id.clone(),
                    name: phase.name.clone(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_schedule_matches_reference_curve() {
        let schedule = reveal_schedule(&[0.20, 0.25, 0.25, 0.20, 0.10]);
        let expected = [0.20, 0.45, 0.70, 0.90, 1.00];
        for (got, want) in schedule.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[test]
    fn degenerate_weights_fall_back_to_even_spacing() {
        let schedule = reveal_schedule(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(schedule, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(reveal_schedule(&[]).is_empty());
    }

    #[test]
    fn revealed_count_is_monotonic_in_elapsed() {
        let schedule = reveal_schedule(&[0.20, 0.25, 0.25, 0.20, 0.10]);
        let mut prior = 0;
        for step in 0..=100 {
            let count = revealed_count(&schedule, step as f64 / 100.0);
            assert!(count >= prior);
            prior = count;
        }
        assert_eq!(prior, schedule.len());
    }

    #[test]
    fn last_phase_waits_for_completion() {
        let schedule = reveal_schedule(&[1.0, 1.0, 1.0]);
        assert_eq!(revealed_count(&schedule, 0.999), 2);
        assert_eq!(revealed_count(&schedule, 1.0), 3);
    }
}
