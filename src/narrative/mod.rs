//! Narrative content boundary. A live provider (LLM-backed, out of scope here)
//! implements [`NarrativeProvider`]; [`NarratorWithFallback`] composes it with
//! the deterministic [`TemplateNarrator`] so outcome generation can never fail
//! on narration. Provider implementations are expected to bound their own
//! latency and report overruns as [`NarrativeError::TimedOut`].

pub mod template;

use std::fmt;

use crate::mission::compatibility::Specialty;
use crate::mission::outcome::Tension;

pub use template::TemplateNarrator;

/// Context handed to the provider for one phase of a mission.
#[derive(Debug, Clone, Copy)]
pub struct PhasePrompt<'a> {
    pub mission_name: &'a str,
    pub phase_name: &'a str,
    pub tag: Specialty,
    pub roll: u8,
    pub success: bool,
    pub tension: Tension,
    /// Narrative of the preceding phase, for continuity.
    pub previous: Option<&'a str>,
}

/// Context for the end-of-mission debrief.
#[derive(Debug, Clone, Copy)]
pub struct DebriefPrompt<'a> {
    pub mission_name: &'a str,
    pub overall_success: bool,
    pub successful_phases: u32,
    pub phase_count: u32,
    pub final_phase_narrative: Option<&'a str>,
}

#[derive(Debug)]
pub enum NarrativeError {
    Unavailable(String),
    TimedOut,
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "narrative provider unavailable: {reason}"),
            Self::TimedOut => write!(f, "narrative provider timed out"),
        }
    }
}

impl std::error::Error for NarrativeError {}

pub trait NarrativeProvider: Send + Sync {
    fn phase_narrative(&self, prompt: &PhasePrompt<'_>) -> Result<String, NarrativeError>;
    fn debrief_narrative(&self, prompt: &DebriefPrompt<'_>) -> Result<String, NarrativeError>;
}

/// Decorator that absorbs provider failures by substituting the deterministic
/// template line keyed by (phase tag, success). Its methods are infallible,
/// which is what lets the outcome generator promise it never fails on
/// narration.
pub struct NarratorWithFallback {
    primary: Box<dyn NarrativeProvider>,
    fallback: TemplateNarrator,
}

impl NarratorWithFallback {
    pub fn new(primary: Box<dyn NarrativeProvider>) -> Self {
        Self {
            primary,
            fallback: TemplateNarrator,
        }
    }

    /// No live provider configured; every line comes from the templates.
    pub fn template_only() -> Self {
        Self::new(Box::new(TemplateNarrator))
    }

    pub fn phase_narrative(&self, prompt: &PhasePrompt<'_>) -> String {
        match self.primary.phase_narrative(prompt) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("narrative fallback ({}: {}): {err}", prompt.mission_name, prompt.phase_name);
                match self.fallback.phase_narrative(prompt) {
                    Ok(text) => text,
                    Err(_) => template::pending_line().to_string(),
                }
            }
        }
    }

    pub fn debrief_narrative(&self, prompt: &DebriefPrompt<'_>) -> String {
        match self.primary.debrief_narrative(prompt) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("narrative fallback (debrief, {}): {err}", prompt.mission_name);
                match self.fallback.debrief_narrative(prompt) {
                    Ok(text) => text,
                    Err(_) => template::pending_line().to_string(),
                }
            }
        }
    }
}
