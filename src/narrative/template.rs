//! Deterministic fallback narration. Lines are keyed by (phase tag, success)
//! so a deployment generated without a live provider always reads the same.

use crate::mission::compatibility::Specialty;

use super::{DebriefPrompt, NarrativeError, NarrativeProvider, PhasePrompt};

pub(crate) fn pending_line() -> &'static str {
    "Report pending."
}

fn phase_line(tag: Specialty, success: bool) -> &'static str {
    match (tag, success) {
        (Specialty::Infiltration, true) => {
            "Clean entry. No alarms, no witnesses; the route stays open behind them."
        }
        (Specialty::Infiltration, false) => {
            "A patrol rotation nobody briefed. The operative goes to ground and loses the window."
        }
        (Specialty::Technical, true) => {
            "The lock gives on the third bypass. Systems roll over without complaint."
        }
        (Specialty::Technical, false) => {
            "Countermeasures bite back. The rig burns out and the intrusion trips a silent flag."
        }
        (Specialty::Social, true) => {
            "The cover story holds. A handshake, a signature, and the door opens from inside."
        }
        (Specialty::Social, false) => {
            "Wrong name, wrong floor. The contact gets nervous and the meeting dissolves."
        }
        (Specialty::Combat, true) => {
            "Short and decisive. Resistance folds before anyone reaches a radio."
        }
        (Specialty::Combat, false) => {
            "They were ready. The operative breaks contact, bleeding time and advantage."
        }
        (Specialty::Recon, true) => {
            "Position logged, pattern mapped. Nothing down there knows it was seen."
        }
        (Specialty::Recon, false) => {
            "Fog on the lens, static on the line. The picture stays incomplete."
        }
    }
}

/// Always-available narrator backed by the fixed line tables.
pub struct TemplateNarrator;

impl NarrativeProvider for TemplateNarrator {
    fn phase_narrative(&self, prompt: &PhasePrompt<'_>) -> Result<String, NarrativeError> {
        Ok(format!(
            "{}: {}",
            prompt.phase_name,
            phase_line(prompt.tag, prompt.success)
        ))
    }

    fn debrief_narrative(&self, prompt: &DebriefPrompt<'_>) -> Result<String, NarrativeError> {
        let line = if prompt.overall_success {
            "Objective secured. The handler closes the file with a green stamp."
        } else {
            "Objective lost. What came back is enough to plan the next attempt, no more."
        };
        Ok(format!(
            "{}: {}/{} phases held. {}",
            prompt.mission_name, prompt.successful_phases, prompt.phase_count, line
        ))
    }
}
