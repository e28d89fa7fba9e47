//! Mission catalog: read-only templates describing phases, approaches, and
//! rewards. Loaded once at startup into an immutable catalog and injected
//! where needed; there is no in-place mutation path. A JSON index plus
//! per-mission record files can override the built-in set.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mission::compatibility::{specialty_from_tag, Specialty};
use crate::mission::outcome::{PhasePlan, RiskTier};

pub const DEFAULT_MISSIONS_INDEX_PATH: &str = "data/missions/index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub id: String,
    pub name: String,
    /// Relative duration weight; drives the reveal schedule.
    pub weight: f64,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachTemplate {
    pub risk: RiskTier,
    pub base_success_rate: f64,
    pub duration_secs: i64,
    pub reward_baseline: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prerequisite {
    pub mission_id: String,
    /// When set, the prerequisite deployment must also have succeeded.
    #[serde(default)]
    pub require_success: bool,
}

/// Normalized mission record. Written by catalog tooling, loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionTemplate {
    pub id: String,
    pub name: String,
    pub primary_tag: String,
    pub phases: Vec<PhaseTemplate>,
    pub approaches: Vec<ApproachTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<Prerequisite>,
}

impl MissionTemplate {
    pub fn primary_specialty(&self) -> Specialty {
        specialty_from_tag(&self.primary_tag)
    }

    pub fn approach(&self, risk: RiskTier) -> Option<&ApproachTemplate> {
        self.approaches.iter().find(|approach| approach.risk == risk)
    }

    pub fn phase_plans(&self) -> Vec<PhasePlan> {
        self.phases
            .iter()
            .map(|phase| PhasePlan {
                id: phase.id.clone(),
                name: phase.name.clone(),
                tag: specialty_from_tag(&phase.tag),
            })
            .collect()
    }

    pub fn phase_weights(&self) -> Vec<f64> {
        self.phases.iter().map(|phase| phase.weight).collect()
    }
}

/// Index of all missions for name/id resolution. Includes data_version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionIndex {
    #[serde(default)]
    pub data_version: Option<String>,
    #[serde(default)]
    pub source_note: Option<String>,
    pub missions: Vec<MissionIndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionIndexEntry {
    pub id: String,
    pub name: String,
    pub primary_tag: String,
}

/// Load the mission index. Returns None if the file is missing or malformed.
pub fn load_mission_index(path: &str) -> Option<MissionIndex> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Load a single mission record from data/missions/<id>.json.
pub fn load_mission_record(data_dir: &Path, id: &str) -> Option<MissionTemplate> {
    let path = data_dir.join(format!("{}.json", id));
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone)]
pub struct MissionCatalog {
    data_version: Option<String>,
    missions: BTreeMap<String, MissionTemplate>,
}

impl MissionCatalog {
    pub fn from_missions(missions: Vec<MissionTemplate>) -> Self {
        Self {
            data_version: None,
            missions: missions
                .into_iter()
                .map(|mission| (mission.id.clone(), mission))
                .collect(),
        }
    }

    /// Load from an index file plus per-mission records next to it.
    pub fn load(index_path: &str) -> Option<Self> {
        let index = load_mission_index(index_path)?;
        let data_dir = Path::new(index_path).parent()?;
        let mut missions = BTreeMap::new();
        for entry in &index.missions {
            if let Some(record) = load_mission_record(data_dir, &entry.id) {
                missions.insert(record.id.clone(), record);
            } else {
                eprintln!("catalog: missing or malformed record for '{}'", entry.id);
            }
        }
        if missions.is_empty() {
            return None;
        }
        Some(Self {
            data_version: index.data_version,
            missions,
        })
    }

    pub fn load_or_builtin(index_path: &str) -> Self {
        match Self::load(index_path) {
            Some(catalog) => catalog,
            None => Self::builtin(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MissionTemplate> {
        self.missions.get(id)
    }

    /// Resolve by id or display name, normalized.
    pub fn resolve(&self, name_or_id: &str) -> Option<&MissionTemplate> {
        let normalized = normalize_lookup(name_or_id);
        if let Some(mission) = self
            .missions
            .values()
            .find(|mission| normalize_lookup(&mission.id) == normalized)
        {
            return Some(mission);
        }
        self.missions
            .values()
            .find(|mission| normalize_lookup(&mission.name) == normalized)
    }

    pub fn missions(&self) -> impl Iterator<Item = &MissionTemplate> {
        self.missions.values()
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn data_version(&self) -> Option<&str> {
        self.data_version.as_deref()
    }

    /// The catalog that ships in the binary; used when no data directory is
    /// present (tests, first run).
    pub fn builtin() -> Self {
        fn phase(id: &str, name: &str, weight: f64, tag: &str) -> PhaseTemplate {
            PhaseTemplate {
                id: id.to_string(),
                name: name.to_string(),
                weight,
                tag: tag.to_string(),
            }
        }
        fn approach(
            risk: RiskTier,
            base_success_rate: f64,
            duration_secs: i64,
            reward_baseline: u32,
        ) -> ApproachTemplate {
            ApproachTemplate {
                risk,
                base_success_rate,
                duration_secs,
                reward_baseline,
            }
        }

        let signal_intercept = MissionTemplate {
            id: "signal-intercept".to_string(),
            name: "Signal Intercept".to_string(),
            primary_tag: "technical".to_string(),
            phases: vec![
                phase("perimeter-sweep", "Perimeter Sweep", 0.20, "recon"),
                phase("access-node", "Access Node", 0.25, "infiltration"),
                phase("tap-the-line", "Tap the Line", 0.25, "technical"),
                phase("cover-story", "Cover Story", 0.20, "social"),
                phase("exfiltrate", "Exfiltrate", 0.10, "infiltration"),
            ],
            approaches: vec![
                approach(RiskTier::Low, 0.78, 1800, 120),
                approach(RiskTier::Medium, 0.68, 2700, 200),
                approach(RiskTier::High, 0.45, 3600, 340),
            ],
            prerequisite: None,
        };

        let archive_heist = MissionTemplate {
            id: "archive-heist".to_string(),
            name: "Archive Heist".to_string(),
            primary_tag: "infiltration".to_string(),
            phases: vec![
                phase("casing", "Casing the Annex", 0.15, "recon"),
                phase("service-tunnels", "Service Tunnels", 0.25, "infiltration"),
                phase("vault-bypass", "Vault Bypass", 0.25, "technical"),
                phase("the-lift", "The Lift", 0.20, "infiltration"),
                phase("handoff", "Handoff", 0.15, "social"),
            ],
            approaches: vec![
                approach(RiskTier::Low, 0.75, 2400, 150),
                approach(RiskTier::Medium, 0.62, 3600, 260),
                approach(RiskTier::High, 0.40, 5400, 420),
            ],
            prerequisite: Some(Prerequisite {
                mission_id: "signal-intercept".to_string(),
                require_success: true,
            }),
        };

        let asset_extraction = MissionTemplate {
            id: "asset-extraction".to_string(),
            name: "Asset Extraction".to_string(),
            primary_tag: "combat".to_string(),
            phases: vec![
                phase("locate", "Locate the Asset", 0.30, "recon"),
                phase("breach", "Breach", 0.30, "combat"),
                phase("hold-the-corridor", "Hold the Corridor", 0.25, "combat"),
                phase("evac", "Evac", 0.15, "infiltration"),
            ],
            // Deliberately no low-risk option: there is no quiet way to do this.
            approaches: vec![
                approach(RiskTier::Medium, 0.66, 1800, 180),
                approach(RiskTier::High, 0.48, 2700, 320),
            ],
            prerequisite: None,
        };

        Self::from_missions(vec![signal_intercept, archive_heist, asset_extraction])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_id_and_name_variants() {
        let catalog = MissionCatalog::builtin();
        assert!(catalog.resolve("signal-intercept").is_some());
        assert!(catalog.resolve("Signal Intercept").is_some());
        assert!(catalog.resolve("SIGNAL_INTERCEPT").is_some());
        assert!(catalog.resolve("ghost-run").is_none());
    }

    #[test]
    fn builtin_catalog_round_trips_through_json() {
        let catalog = MissionCatalog::builtin();
        let mission = catalog.get("archive-heist").unwrap();
        let raw = serde_json::to_string(mission).unwrap();
        let back: MissionTemplate = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.phases.len(), mission.phases.len());
        assert_eq!(
            back.prerequisite.as_ref().map(|p| p.mission_id.as_str()),
            Some("signal-intercept")
        );
    }
}
