//! Compatibility scoring: how well an operative fits a mission's primary
//! specialty. Pure math over a fixed specialty matrix plus capped experience
//! and level bonuses. Unknown tags fall back to a neutral default rather than
//! failing.

use serde::{Deserialize, Serialize};

pub const MAX_COMPATIBILITY: f64 = 0.95;
pub const EXPERIENCE_BONUS_CAP: f64 = 0.15;
pub const EXPERIENCE_HALFWAY: f64 = 900.0;
pub const LEVEL_BONUS_PER_LEVEL: f64 = 0.02;
pub const LEVEL_BONUS_CAP: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    Infiltration,
    Technical,
    Social,
    Combat,
    Recon,
}

impl Specialty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infiltration => "infiltration",
            Self::Technical => "technical",
            Self::Social => "social",
            Self::Combat => "combat",
            Self::Recon => "recon",
        }
    }
}

/// Map a catalog/roster tag to a specialty. Unknown tags resolve to recon,
/// the generalist row of the matrix.
pub fn specialty_from_tag(tag: &str) -> Specialty {
    match tag.to_lowercase().as_str() {
        "infiltration" | "stealth" => Specialty::Infiltration,
        "technical" | "tech" => Specialty::Technical,
        "social" => Specialty::Social,
        "combat" => Specialty::Combat,
        "recon" | "reconnaissance" => Specialty::Recon,
        _ => Specialty::Recon,
    }
}

/// Base fit fraction for operative specialty (row) vs mission primary
/// specialty (column). Diagonal strongest; combat specialists travel worst.
pub const fn base_fit(operative: Specialty, mission: Specialty) -> f64 {
    use Specialty::{Combat, Infiltration, Recon, Social, Technical};
    match (operative, mission) {
        (Infiltration, Infiltration) => 0.92,
        (Infiltration, Technical) => 0.68,
        (Infiltration, Social) => 0.62,
        (Infiltration, Combat) => 0.58,
        (Infiltration, Recon) => 0.78,
        (Technical, Infiltration) => 0.66,
        (Technical, Technical) => 0.92,
        (Technical, Social) => 0.60,
        (Technical, Combat) => 0.52,
        (Technical, Recon) => 0.70,
        (Social, Infiltration) => 0.64,
        (Social, Technical) => 0.58,
        (Social, Social) => 0.92,
        (Social, Combat) => 0.50,
        (Social, Recon) => 0.66,
        (Combat, Infiltration) => 0.56,
        (Combat, Technical) => 0.52,
        (Combat, Social) => 0.54,
        (Combat, Combat) => 0.92,
        (Combat, Recon) => 0.62,
        (Recon, Infiltration) => 0.80,
        (Recon, Technical) => 0.68,
        (Recon, Social) => 0.64,
        (Recon, Combat) => 0.60,
        (Recon, Recon) => 0.88,
    }
}

/// Experience bonus with diminishing returns, asymptotic to the cap.
pub fn experience_bonus(experience: u32) -> f64 {
    let xp = experience as f64;
    EXPERIENCE_BONUS_CAP * xp / (xp + EXPERIENCE_HALFWAY)
}

pub fn level_bonus(level: u32) -> f64 {
    (LEVEL_BONUS_PER_LEVEL * level.saturating_sub(1) as f64).min(LEVEL_BONUS_CAP)
}

/// Score operative-vs-mission fit. Result lies in `[base_fit, 0.95]`.
pub fn compatibility_score(
    operative: Specialty,
    experience: u32,
    level: u32,
    mission: Specialty,
) -> f64 {
    let base = base_fit(operative, mission);
    (base + experience_bonus(experience) + level_bonus(level)).min(MAX_COMPATIBILITY)
}
