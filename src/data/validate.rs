//! Catalog validation: structural and range checks over mission templates,
//! reported per entry with severity so tooling can fail on errors while
//! letting warnings through.

use std::collections::HashSet;
use std::fmt;

use crate::data::catalog::MissionCatalog;
use crate::mission::outcome::RiskTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

const KNOWN_TAGS: &[&str] = &[
    "infiltration",
    "stealth",
    "technical",
    "tech",
    "social",
    "combat",
    "recon",
    "reconnaissance",
];

/// Expected base-success ranges per risk tier. Outside is a warning, not an
/// error: the generator clamps per-phase thresholds regardless.
fn tier_range(risk: RiskTier) -> (f64, f64) {
    match risk {
        RiskTier::Low => (0.60, 0.90),
        RiskTier::Medium => (0.45, 0.75),
        RiskTier::High => (0.25, 0.60),
    }
}

pub fn validate_catalog(catalog: &MissionCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    if catalog.is_empty() {
        report.push(ValidationSeverity::Error, "catalog", "no missions loaded");
        return report;
    }

    for mission in catalog.missions() {
        let context = format!("mission[{}]", mission.id);

        if mission.phases.is_empty() {
            report.push(ValidationSeverity::Error, &context, "no phases defined");
        }
        let mut phase_ids = HashSet::new();
        for (index, phase) in mission.phases.iter().enumerate() {
            let phase_context = format!("{context}.phases[{index}]");
            if !phase_ids.insert(phase.id.clone()) {
                report.push(
                    ValidationSeverity::Error,
                    &phase_context,
                    format!("duplicate phase id '{}'", phase.id),
                );
            }
            if !(phase.weight.is_finite() && phase.weight > 0.0) {
                report.push(
                    ValidationSeverity::Warning,
                    &phase_context,
                    format!(
                        "weight {} is not positive; reveal schedule falls back to even spacing",
                        phase.weight
                    ),
                );
            }
            if !KNOWN_TAGS.contains(&phase.tag.to_lowercase().as_str()) {
                report.push(
                    ValidationSeverity::Warning,
                    &phase_context,
                    format!("unknown tag '{}' will score as recon", phase.tag),
                );
            }
        }

        if mission.approaches.is_empty() {
            report.push(ValidationSeverity::Error, &context, "no approaches defined");
        }
        let mut tiers = HashSet::new();
        for (index, approach) in mission.approaches.iter().enumerate() {
            let approach_context = format!("{context}.approaches[{index}]");
            if !tiers.insert(approach.risk) {
                report.push(
                    ValidationSeverity::Error,
                    &approach_context,
                    format!("duplicate risk tier '{}'", approach.risk.as_str()),
                );
            }
            let (lo, hi) = tier_range(approach.risk);
            if !(lo..=hi).contains(&approach.base_success_rate) {
                report.push(
                    ValidationSeverity::Warning,
                    &approach_context,
                    format!(
                        "base success rate {} outside expected [{lo}, {hi}] for tier '{}'",
                        approach.base_success_rate,
                        approach.risk.as_str()
                    ),
                );
            }
            if approach.duration_secs <= 0 {
                report.push(
                    ValidationSeverity::Error,
                    &approach_context,
                    format!("duration_secs {} must be positive", approach.duration_secs),
                );
            }
            if approach.reward_baseline == 0 {
                report.push(
                    ValidationSeverity::Warning,
                    &approach_context,
                    "reward baseline is zero",
                );
            }
        }

        if !KNOWN_TAGS.contains(&mission.primary_tag.to_lowercase().as_str()) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("unknown primary tag '{}'", mission.primary_tag),
            );
        }

        if let Some(prerequisite) = &mission.prerequisite {
            if prerequisite.mission_id == mission.id {
                report.push(
                    ValidationSeverity::Error,
                    &context,
                    "mission is its own prerequisite",
                );
            } else if catalog.get(&prerequisite.mission_id).is_none() {
                report.push(
                    ValidationSeverity::Error,
                    &context,
                    format!(
                        "prerequisite '{}' is not in the catalog",
                        prerequisite.mission_id
                    ),
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::{MissionCatalog, MissionTemplate};

    #[test]
    fn builtin_catalog_validates_clean() {
        let report = validate_catalog(&MissionCatalog::builtin());
        assert!(
            !report.has_errors(),
            "builtin catalog should have no errors: {:?}",
            report.diagnostics
        );
    }

    #[test]
    fn broken_mission_is_reported_with_context() {
        let raw = r#"{
            "id": "hollow",
            "name": "Hollow",
            "primary_tag": "divination",
            "phases": [],
            "approaches": []
        }"#;
        let mission: MissionTemplate = serde_json::from_str(raw).unwrap();
        let report = validate_catalog(&MissionCatalog::from_missions(vec![mission]));
        assert!(report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.context == "mission[hollow]" && diag.message.contains("no phases")));
    }

    #[test]
    fn self_prerequisite_is_an_error() {
        let raw = r#"{
            "id": "loop",
            "name": "Loop",
            "primary_tag": "recon",
            "phases": [{"id": "p1", "name": "P1", "weight": 1.0, "tag": "recon"}],
            "approaches": [{"risk": "medium", "base_success_rate": 0.6, "duration_secs": 600, "reward_baseline": 100}],
            "prerequisite": {"mission_id": "loop"}
        }"#;
        let mission: MissionTemplate = serde_json::from_str(raw).unwrap();
        let report = validate_catalog(&MissionCatalog::from_missions(vec![mission]));
        assert!(report.has_errors());
    }
}
