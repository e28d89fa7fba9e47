use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ops::assess::{self, AssessRequest, MAX_ITERATIONS};
use crate::ops::service::{DeployError, DeployRequest, DeployService, StatusError};

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum DeployPayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    Deploy(DeployError),
    Serialize(serde_json::Error),
}

impl fmt::Display for DeployPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid deploy request"),
            Self::Deploy(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DeployPayloadError {}

#[derive(Debug)]
pub enum StatusPayloadError {
    InvalidId(String),
    Status(StatusError),
    Serialize(serde_json::Error),
}

impl fmt::Display for StatusPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(raw) => write!(f, "'{raw}' is not a deployment id"),
            Self::Status(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StatusPayloadError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "deaddrop-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproachListItem {
    pub risk: &'static str,
    pub base_success_rate: f64,
    pub duration_secs: i64,
    pub reward_baseline: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionListItem {
    pub id: String,
    pub name: String,
    pub primary_tag: String,
    pub phase_count: usize,
    pub approaches: Vec<ApproachListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
}

pub fn missions_payload(service: &DeployService) -> Result<String, serde_json::Error> {
    let list: Vec<MissionListItem> = service
        .catalog()
        .missions()
        .map(|mission| MissionListItem {
            id: mission.id.clone(),
            name: mission.name.clone(),
            primary_tag: mission.primary_tag.clone(),
            phase_count: mission.phases.len(),
            approaches: mission
                .approaches
                .iter()
                .map(|approach| ApproachListItem {
                    risk: approach.risk.as_str(),
                    base_success_rate: approach.base_success_rate,
                    duration_secs: approach.duration_secs,
                    reward_baseline: approach.reward_baseline,
                })
                .collect(),
            prerequisite: mission
                .prerequisite
                .as_ref()
                .map(|prerequisite| prerequisite.mission_id.clone()),
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "data_version": service.catalog().data_version(),
        "missions": list,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct OperativeListItem {
    pub id: String,
    pub codename: String,
    pub account: String,
    pub specialty: String,
    pub experience: u32,
    pub level: u32,
    pub held: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub held_by: Option<Uuid>,
}

pub fn operatives_payload(service: &DeployService) -> Result<String, DeployPayloadError> {
    let operatives = service
        .store()
        .operatives()
        .map_err(|err| DeployPayloadError::Deploy(DeployError::Store(err)))?;
    let list: Vec<OperativeListItem> = operatives
        .into_iter()
        .map(|operative| OperativeListItem {
            level: operative.level(),
            held: operative.is_held(),
            id: operative.id,
            codename: operative.codename,
            account: operative.account,
            specialty: operative.specialty,
            experience: operative.experience,
            held_by: operative.held_by,
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "operatives": list }))
        .map_err(DeployPayloadError::Serialize)
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentListItem {
    pub deployment_id: Uuid,
    pub mission_id: String,
    pub operative_id: String,
    pub status: &'static str,
    pub completes_at: chrono::DateTime<chrono::Utc>,
}

pub fn deployments_payload(service: &DeployService) -> Result<String, DeployPayloadError> {
    let mut deployments = service
        .store()
        .deployments()
        .map_err(|err| DeployPayloadError::Deploy(DeployError::Store(err)))?;
    deployments.sort_by_key(|deployment| deployment.created_at);
    let list: Vec<DeploymentListItem> = deployments
        .iter()
        .map(|deployment| DeploymentListItem {
            deployment_id: deployment.id,
            mission_id: deployment.mission_id.clone(),
            operative_id: deployment.operative_id.clone(),
            status: deployment.status.as_str(),
            completes_at: deployment.completes_at,
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "deployments": list }))
        .map_err(DeployPayloadError::Serialize)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeployBody {
    pub operative: String,
    pub mission: String,
    pub approach: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn validate_deploy_body(body: &DeployBody) -> Result<(), ValidationErrorResponse> {
    let mut errors: Vec<ValidationIssue> = Vec::new();
    if body.operative.trim().is_empty() {
        errors.push(ValidationIssue {
            field: "operative",
            messages: vec!["must not be empty".to_string()],
        });
    }
    if body.mission.trim().is_empty() {
        errors.push(ValidationIssue {
            field: "mission",
            messages: vec!["must not be empty".to_string()],
        });
    }
    if body.approach.trim().is_empty() {
        errors.push(ValidationIssue {
            field: "approach",
            messages: vec!["must not be empty".to_string()],
        });
    }
    if errors.is_empty() {
        return Ok(());
    }
    Err(ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors,
    })
}

pub fn deploy_payload(service: &DeployService, body: &str) -> Result<String, DeployPayloadError> {
    let body: DeployBody = serde_json::from_str(body).map_err(DeployPayloadError::Parse)?;
    validate_deploy_body(&body).map_err(DeployPayloadError::Validation)?;

    let receipt = service
        .deploy(&DeployRequest {
            operative: body.operative,
            mission: body.mission,
            approach: body.approach,
            seed: body.seed,
        })
        .map_err(DeployPayloadError::Deploy)?;
    serde_json::to_string_pretty(&receipt).map_err(DeployPayloadError::Serialize)
}

fn parse_deployment_id(raw: &str) -> Result<Uuid, StatusPayloadError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StatusPayloadError::InvalidId(raw.to_string()))
}

pub fn status_payload(service: &DeployService, raw_id: &str) -> Result<String, StatusPayloadError> {
    let id = parse_deployment_id(raw_id)?;
    let view = service.status(&id).map_err(StatusPayloadError::Status)?;
    serde_json::to_string_pretty(&view).map_err(StatusPayloadError::Serialize)
}

pub fn abandon_payload(service: &DeployService, raw_id: &str) -> Result<String, StatusPayloadError> {
    let id = parse_deployment_id(raw_id)?;
    let view = service.abandon(&id).map_err(StatusPayloadError::Status)?;
    serde_json::to_string_pretty(&view).map_err(StatusPayloadError::Serialize)
}

pub fn complete_payload(service: &DeployService, raw_id: &str) -> Result<String, StatusPayloadError> {
    let id = parse_deployment_id(raw_id)?;
    let view = service
        .force_complete(&id)
        .map_err(StatusPayloadError::Status)?;
    serde_json::to_string_pretty(&view).map_err(StatusPayloadError::Serialize)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessBody {
    pub operative: String,
    pub mission: String,
    pub approach: String,
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

pub fn assess_payload(service: &DeployService, body: &str) -> Result<String, DeployPayloadError> {
    let body: AssessBody = serde_json::from_str(body).map_err(DeployPayloadError::Parse)?;
    validate_deploy_body(&DeployBody {
        operative: body.operative.clone(),
        mission: body.mission.clone(),
        approach: body.approach.clone(),
        seed: None,
    })
    .map_err(DeployPayloadError::Validation)?;
    if let Some(iterations) = body.iterations {
        if !(1..=MAX_ITERATIONS).contains(&iterations) {
            return Err(DeployPayloadError::Validation(ValidationErrorResponse {
                status: "error",
                message: "Validation failed",
                errors: vec![ValidationIssue {
                    field: "iterations",
                    messages: vec![format!("must be between 1 and {MAX_ITERATIONS}")],
                }],
            }));
        }
    }

    let assessment = assess::assess(
        service,
        &AssessRequest {
            operative: body.operative,
            mission: body.mission,
            approach: body.approach,
            iterations: body.iterations,
            seed: body.seed,
        },
    )
    .map_err(DeployPayloadError::Deploy)?;
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "assessment": assessment,
    }))
    .map_err(DeployPayloadError::Serialize)
}
