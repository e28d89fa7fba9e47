//! Operative roster: the deployable units owned by handler accounts. The
//! store owns the live copies; this module defines the record shape, the
//! level curve, and roster loading with a built-in fallback.

use std::fs;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mission::compatibility::{specialty_from_tag, Specialty};

pub const DEFAULT_ROSTER_PATH: &str = "data/operatives.json";

pub const MAX_LEVEL: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operative {
    pub id: String,
    pub codename: String,
    /// Handler account that owns this operative.
    pub account: String,
    pub specialty: String,
    #[serde(default)]
    pub experience: u32,
    /// Deployment currently holding exclusivity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held_by: Option<Uuid>,
}

impl Operative {
    pub fn specialty(&self) -> Specialty {
        specialty_from_tag(&self.specialty)
    }

    pub fn level(&self) -> u32 {
        level_for_experience(self.experience)
    }

    pub fn is_held(&self) -> bool {
        self.held_by.is_some()
    }
}

/// Level curve: square root of experience, so each level costs more than the
/// last. Level 1 at zero experience, capped at [`MAX_LEVEL`].
pub fn level_for_experience(experience: u32) -> u32 {
    let level = (experience as f64 / 100.0).sqrt().floor() as u32 + 1;
    level.min(MAX_LEVEL)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFile {
    #[serde(default)]
    data_version: Option<String>,
    operatives: Vec<Operative>,
}

/// Load a roster file. Returns None if missing or malformed.
pub fn load_roster(path: &str) -> Option<Vec<Operative>> {
    let raw = fs::read_to_string(path).ok()?;
    let file: RosterFile = serde_json::from_str(&raw).ok()?;
    Some(file.operatives)
}

pub fn builtin_roster() -> Vec<Operative> {
    fn operative(id: &str, codename: &str, account: &str, specialty: &str, experience: u32) -> Operative {
        Operative {
            id: id.to_string(),
            codename: codename.to_string(),
            account: account.to_string(),
            specialty: specialty.to_string(),
            experience,
            held_by: None,
        }
    }
    vec![
        operative("op-kestrel", "KESTREL", "handler-01", "infiltration", 1400),
        operative("op-lattice", "LATTICE", "handler-01", "technical", 800),
        operative("op-moth", "MOTH", "handler-02", "social", 150),
        operative("op-bulwark", "BULWARK", "handler-02", "combat", 2600),
    ]
}
