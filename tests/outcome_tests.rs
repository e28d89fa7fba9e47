use deaddrop::mission::compatibility::{
    base_fit, compatibility_score, specialty_from_tag, Specialty, MAX_COMPATIBILITY,
};
use deaddrop::mission::outcome::{
    final_success_rate, generate, phase_threshold, required_successes, run_phases,
    simulate_phases, GenerationInput, PhasePlan, RiskTier, Tension, THRESHOLD_CEIL,
    THRESHOLD_FLOOR,
};
use deaddrop::mission::reveal::{reveal_schedule, revealed_count};
use deaddrop::narrative::NarratorWithFallback;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

const ALL_SPECIALTIES: [Specialty; 5] = [
    Specialty::Infiltration,
    Specialty::Technical,
    Specialty::Social,
    Specialty::Combat,
    Specialty::Recon,
];

fn plain_plans(count: usize) -> Vec<PhasePlan> {
    (0..count)
        .map(|index| PhasePlan {
            id: format!("phase-{index}"),
            name: format!("Phase {index}"),
            tag: Specialty::Technical,
        })
        .collect()
}

#[test]
fn compatibility_score_stays_in_bounds_across_input_grid() {
    for operative in ALL_SPECIALTIES {
        for mission in ALL_SPECIALTIES {
            for experience in [0_u32, 50, 900, 10_000, 1_000_000] {
                for level in [1_u32, 3, 10, 30] {
                    let score = compatibility_score(operative, experience, level, mission);
                    let base = base_fit(operative, mission);
                    assert!(
                        score >= base && score <= MAX_COMPATIBILITY,
                        "score {score} outside [{base}, {MAX_COMPATIBILITY}]"
                    );
                }
            }
        }
    }
}

#[test]
fn final_success_rate_is_capped() {
    approx_eq(final_success_rate(0.70, 0.90), 0.63, 1e-12);
    assert_eq!(final_success_rate(1.2, 0.95), 0.95);
}

// 5-phase reference scenario: base rate 0.70, compatibility 0.90, neutral
// tags (no specialty match, medium risk), rolls [10, 30, 50, 70, 90].
#[test]
fn reference_scenario_produces_the_expected_cascade() {
    let plans = plain_plans(5);
    let final_rate = final_success_rate(0.70, 0.90);
    let rolls = [10, 30, 50, 70, 90];
    let sims = run_phases(&plans, RiskTier::Medium, final_rate, Specialty::Recon, &rolls);

    let thresholds: Vec<u8> = sims.iter().map(|sim| sim.threshold_pct).collect();
    assert_eq!(thresholds, vec![68, 65, 62, 59, 48]);

    let successes: Vec<bool> = sims.iter().map(|sim| sim.success).collect();
    assert_eq!(successes, vec![true, true, true, false, false]);

    let successful = successes.iter().filter(|success| **success).count();
    assert_eq!(required_successes(5), 3);
    assert!(successful >= required_successes(5), "three of five passes the 60% rule");
}

#[test]
fn thresholds_are_deterministic_for_fixed_rolls() {
    let plans = plain_plans(7);
    let rolls = [50, 50, 50, 50, 50, 50, 50];
    let first = run_phases(&plans, RiskTier::High, 0.6, Specialty::Technical, &rolls);
    let second = run_phases(&plans, RiskTier::High, 0.6, Specialty::Technical, &rolls);
    assert_eq!(first, second);
}

#[test]
fn simulated_phases_reproduce_from_the_seed() {
    let plans = plain_plans(5);
    let first = simulate_phases(&plans, RiskTier::Medium, 0.63, Specialty::Recon, 1234);
    let second = simulate_phases(&plans, RiskTier::Medium, 0.63, Specialty::Recon, 1234);
    assert_eq!(first, second);
    let other_seed = simulate_phases(&plans, RiskTier::Medium, 0.63, Specialty::Recon, 1235);
    assert_ne!(
        first.iter().map(|sim| sim.roll).collect::<Vec<_>>(),
        other_seed.iter().map(|sim| sim.roll).collect::<Vec<_>>()
    );
}

#[test]
fn no_phase_is_certain_or_impossible() {
    for final_rate in [0.0, 0.2, 0.63, 0.95, 2.0] {
        for prior in [&[][..], &[false, false][..], &[true, true][..]] {
            for index in 0..6 {
                let threshold = phase_threshold(
                    final_rate,
                    prior,
                    index,
                    6,
                    Specialty::Infiltration,
                    Specialty::Infiltration,
                    RiskTier::Low,
                );
                assert!(
                    (THRESHOLD_FLOOR..=THRESHOLD_CEIL).contains(&threshold),
                    "threshold {threshold} escaped the clamp"
                );
            }
        }
    }
}

#[test]
fn specialty_match_raises_the_threshold() {
    let matched = phase_threshold(
        0.6,
        &[],
        1,
        5,
        Specialty::Technical,
        Specialty::Technical,
        RiskTier::Medium,
    );
    let unmatched = phase_threshold(
        0.6,
        &[],
        1,
        5,
        Specialty::Combat,
        Specialty::Technical,
        RiskTier::Medium,
    );
    approx_eq(matched - unmatched, 0.05, 1e-12);
}

#[test]
fn overall_success_follows_the_sixty_percent_rule() {
    for phase_count in 1..=12 {
        let plans = plain_plans(phase_count);
        // All rolls of 1 always pass (floor threshold is 10%); rolls of 100
        // always fail (ceiling is 90%).
        let all_pass = run_phases(
            &plans,
            RiskTier::Medium,
            0.6,
            Specialty::Recon,
            &vec![1; phase_count],
        );
        assert!(all_pass.iter().all(|sim| sim.success));
        assert!(all_pass.len() >= required_successes(phase_count));

        let all_fail = run_phases(
            &plans,
            RiskTier::Medium,
            0.6,
            Specialty::Recon,
            &vec![100; phase_count],
        );
        assert!(all_fail.iter().all(|sim| !sim.success));
    }
}

#[test]
fn generation_is_reproducible_for_a_fixed_seed() {
    let plans = plain_plans(5);
    let narrator = NarratorWithFallback::template_only();
    let input = GenerationInput {
        mission_name: "Reference Run",
        phases: &plans,
        risk: RiskTier::Medium,
        base_success_rate: 0.70,
        reward_baseline: 200,
        compatibility: 0.90,
        operative_specialty: Specialty::Recon,
        seed: 77,
    };
    let (phases_a, result_a) = generate(&input, &narrator);
    let (phases_b, result_b) = generate(&input, &narrator);

    assert_eq!(
        serde_json::to_string(&phases_a).unwrap(),
        serde_json::to_string(&phases_b).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&result_a).unwrap(),
        serde_json::to_string(&result_b).unwrap()
    );
    assert_eq!(phases_a.len(), 5);
    assert_eq!(
        result_a.success,
        phases_a.iter().filter(|phase| phase.success).count() >= required_successes(5)
    );
}

#[test]
fn tension_escalates_toward_critical_on_a_collapsing_run() {
    let plans = plain_plans(5);
    let narrator = NarratorWithFallback::template_only();
    // Force every phase to fail by driving the rate to the floor and using a
    // seed only for narrative; rolls of 100 never pass.
    let sims = run_phases(&plans, RiskTier::Medium, 0.0, Specialty::Recon, &[100; 5]);
    assert!(sims.iter().all(|sim| !sim.success));

    // Through the generator: seed 1 rolls [66, 20, 91, 36, 62] against
    // floor thresholds, so every phase fails and the ending is critical.
    let input = GenerationInput {
        mission_name: "Collapse",
        phases: &plans,
        risk: RiskTier::High,
        base_success_rate: 0.10,
        reward_baseline: 100,
        compatibility: 0.5,
        operative_specialty: Specialty::Recon,
        seed: 1,
    };
    let (phases, result) = generate(&input, &narrator);
    assert!(phases.iter().all(|phase| !phase.success));
    assert_eq!(phases.last().unwrap().tension, Tension::Critical);
    assert!(!result.success);
}

#[test]
fn reveal_schedule_monotonicity_holds_for_arbitrary_weights() {
    for weights in [
        vec![0.20, 0.25, 0.25, 0.20, 0.10],
        vec![1.0, 1.0, 1.0],
        vec![5.0, 1.0, 1.0, 10.0],
    ] {
        let schedule = reveal_schedule(&weights);
        assert_eq!(schedule.len(), weights.len());
        assert!(schedule.windows(2).all(|pair| pair[0] <= pair[1]));
        approx_eq(*schedule.last().unwrap(), 1.0, 1e-12);

        let mut prior = 0;
        for step in 0..=40 {
            let count = revealed_count(&schedule, step as f64 / 40.0);
            assert!(count >= prior, "revealed count regressed");
            prior = count;
        }
    }
}

#[test]
fn unknown_specialty_tags_do_not_panic_the_scorer() {
    let specialty = specialty_from_tag("librarian");
    let score = compatibility_score(specialty, 100, 2, Specialty::Combat);
    assert!(score > 0.0 && score <= MAX_COMPATIBILITY);
}
