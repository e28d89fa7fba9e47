//! Debrief export: flatten a deployment's phase ledger to CSV for analysis
//! outside the service. Exports are for terminal deployments; an active one
//! would leak unrevealed phases.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::ops::deployment::Deployment;

#[derive(Debug)]
pub enum ExportError {
    StillActive,
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillActive => write!(f, "deployment is still active; nothing to export"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

const HEADER: &[&str] = &[
    "phase_index",
    "phase_id",
    "name",
    "tag",
    "roll",
    "threshold_pct",
    "success",
    "tension",
    "narrative",
];

pub fn write_debrief<W: Write>(deployment: &Deployment, writer: W) -> Result<(), ExportError> {
    if !deployment.status.is_terminal() {
        return Err(ExportError::StillActive);
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for (index, phase) in deployment.phases.iter().enumerate() {
        csv_writer.write_record([
            index.to_string(),
            phase.phase_id.clone(),
            phase.name.clone(),
            phase.tag.as_str().to_string(),
            phase.roll.to_string(),
            phase.threshold_pct.to_string(),
            phase.success.to_string(),
            phase.tension.as_str().to_string(),
            phase.narrative.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_debrief(deployment: &Deployment, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_debrief(deployment, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::MissionCatalog;
    use crate::mission::outcome::{generate, GenerationInput, RiskTier};
    use crate::mission::reveal_schedule;
    use crate::mission::Specialty;
    use crate::narrative::NarratorWithFallback;
    use crate::ops::deployment::DeploymentStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_deployment(status: DeploymentStatus) -> Deployment {
        let catalog = MissionCatalog::builtin();
        let mission = catalog.get("signal-intercept").unwrap();
        let approach = mission.approach(RiskTier::Medium).unwrap();
        let plans = mission.phase_plans();
        let narrator = NarratorWithFallback::template_only();
        let (phases, result) = generate(
            &GenerationInput {
                mission_name: &mission.name,
                phases: &plans,
                risk: approach.risk,
                base_success_rate: approach.base_success_rate,
                reward_baseline: approach.reward_baseline,
                compatibility: 0.9,
                operative_specialty: Specialty::Technical,
                seed: 11,
            },
            &narrator,
        );
        let now = Utc::now();
        Deployment {
            id: Uuid::new_v4(),
            operative_id: "op-lattice".to_string(),
            mission_id: mission.id.clone(),
            mission_name: mission.name.clone(),
            approach: approach.risk,
            compatibility: 0.9,
            seed: 11,
            created_at: now,
            completes_at: now + chrono::Duration::seconds(approach.duration_secs),
            reveal_schedule: reveal_schedule(&mission.phase_weights()),
            status,
            phases,
            result,
        }
    }

    #[test]
    fn exports_one_row_per_phase() {
        let deployment = sample_deployment(DeploymentStatus::Completed);
        let mut out = Vec::new();
        write_debrief(&deployment, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        // Header plus one line per phase.
        assert_eq!(text.lines().count(), 1 + deployment.phases.len());
        assert!(text.starts_with("phase_index,phase_id,name"));
    }

    #[test]
    fn refuses_active_deployments() {
        let deployment = sample_deployment(DeploymentStatus::Active);
        let mut out = Vec::new();
        assert!(matches!(
            write_debrief(&deployment, &mut out),
            Err(ExportError::StillActive)
        ));
    }
}
