//! Deployment lifecycle orchestration: deploy, status (with lazy completion),
//! abandon, force-complete. Every path out of `active` goes through the
//! store's settle primitive; this module decides *when*, never *how*.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::data::catalog::MissionCatalog;
use crate::mission::compatibility::compatibility_score;
use crate::mission::outcome::{generate, GenerationInput, RiskTier};
use crate::mission::reveal::{elapsed_fraction, phase_views, PhaseView};
use crate::mission::reward::RewardPayload;
use crate::mission::rng::seed_from_id_bytes;
use crate::mission::{reveal_schedule, MissionResult};
use crate::narrative::NarratorWithFallback;
use crate::ops::deployment::{Deployment, DeploymentStatus};
use crate::ops::store::{CreateError, SettleMode, SettleOutcome, Store, StoreError};

#[derive(Debug)]
pub enum DeployError {
    MissionNotFound(String),
    InvalidApproach(String),
    OperativeNotFound(String),
    /// Operative is exclusively held by another active deployment.
    ResourceBusy,
    /// This operative is already running this mission.
    AlreadyInProgress,
    PrerequisiteNotMet { mission_id: String },
    Store(StoreError),
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissionNotFound(id) => write!(f, "mission '{id}' not found"),
            Self::InvalidApproach(raw) => write!(f, "approach '{raw}' is not valid for this mission"),
            Self::OperativeNotFound(id) => write!(f, "operative '{id}' not found"),
            Self::ResourceBusy => write!(f, "operative is deployed elsewhere"),
            Self::AlreadyInProgress => write!(f, "mission already in progress for this operative"),
            Self::PrerequisiteNotMet { mission_id } => {
                write!(f, "prerequisite mission '{mission_id}' not completed")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl DeployError {
    /// Stable machine-readable reason, used by the HTTP layer and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissionNotFound(_) => "mission_not_found",
            Self::InvalidApproach(_) => "invalid_approach",
            Self::OperativeNotFound(_) => "operative_not_found",
            Self::ResourceBusy => "resource_busy",
            Self::AlreadyInProgress => "already_in_progress",
            Self::PrerequisiteNotMet { .. } => "prerequisite_not_met",
            Self::Store(_) => "store_failure",
        }
    }
}

impl std::error::Error for DeployError {}

impl From<StoreError> for DeployError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

#[derive(Debug)]
pub enum StatusError {
    DeploymentNotFound(Uuid),
    Store(StoreError),
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeploymentNotFound(id) => write!(f, "deployment '{id}' not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl StatusError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeploymentNotFound(_) => "deployment_not_found",
            Self::Store(_) => "store_failure",
        }
    }
}

impl std::error::Error for StatusError {}

impl From<StoreError> for StatusError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub operative: String,
    pub mission: String,
    pub approach: String,
    /// Explicit seed for reproduction; derived from the deployment id when
    /// absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployReceipt {
    pub deployment_id: Uuid,
    pub operative_id: String,
    pub mission_id: String,
    pub approach: &'static str,
    pub status: &'static str,
    pub compatibility: f64,
    pub created_at: DateTime<Utc>,
    pub completes_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub success: bool,
    pub successful_phases: u32,
    pub narrative: String,
    pub rewards: RewardPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub deployment_id: Uuid,
    pub operative_id: String,
    pub mission_id: String,
    pub mission_name: String,
    pub approach: &'static str,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub completes_at: DateTime<Utc>,
    pub elapsed_fraction: f64,
    pub phases: Vec<PhaseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
}

pub struct DeployService {
    store: Arc<dyn Store>,
    catalog: MissionCatalog,
    narrator: NarratorWithFallback,
}

impl DeployService {
    pub fn new(store: Arc<dyn Store>, catalog: MissionCatalog, narrator: NarratorWithFallback) -> Self {
        Self {
            store,
            catalog,
            narrator,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    pub fn deploy(&self, request: &DeployRequest) -> Result<DeployReceipt, DeployError> {
        self.deploy_at(request, Utc::now())
    }

    pub fn deploy_at(
        &self,
        request: &DeployRequest,
        now: DateTime<Utc>,
    ) -> Result<DeployReceipt, DeployError> {
        let mission = self
            .catalog
            .resolve(&request.mission)
            .ok_or_else(|| DeployError::MissionNotFound(request.mission.clone()))?;
        let risk = RiskTier::parse(&request.approach)
            .ok_or_else(|| DeployError::InvalidApproach(request.approach.clone()))?;
        let approach = mission
            .approach(risk)
            .ok_or_else(|| DeployError::InvalidApproach(request.approach.clone()))?;
        let operative = self
            .store
            .operative(&request.operative)?
            .ok_or_else(|| DeployError::OperativeNotFound(request.operative.clone()))?;

        if let Some(prerequisite) = &mission.prerequisite {
            let met = self.store.account_completed_mission(
                &operative.account,
                &prerequisite.mission_id,
                prerequisite.require_success,
            )?;
            if !met {
                return Err(DeployError::PrerequisiteNotMet {
                    mission_id: prerequisite.mission_id.clone(),
                });
            }
        }

        let compatibility = compatibility_score(
            operative.specialty(),
            operative.experience,
            operative.level(),
            mission.primary_specialty(),
        );

        let id = Uuid::new_v4();
        let seed = request.seed.unwrap_or_else(|| seed_from_id_bytes(id.as_bytes()));
        let plans = mission.phase_plans();
        let (phases, result) = generate(
            &GenerationInput {
                mission_name: &mission.name,
                phases: &plans,
                risk,
                base_success_rate: approach.base_success_rate,
                reward_baseline: approach.reward_baseline,
                compatibility,
                operative_specialty: operative.specialty(),
                seed,
            },
            &self.narrator,
        );

        let deployment = Deployment {
            id,
            operative_id: operative.id.clone(),
            mission_id: mission.id.clone(),
            mission_name: mission.name.clone(),
            approach: risk,
            compatibility,
            seed,
            created_at: now,
            completes_at: now + Duration::seconds(approach.duration_secs),
            reveal_schedule: reveal_schedule(&mission.phase_weights()),
            status: DeploymentStatus::Active,
            phases,
            result,
        };

        self.store
            .create_deployment(deployment.clone())
            .map_err(|err| match err {
                CreateError::OperativeNotFound => {
                    DeployError::OperativeNotFound(request.operative.clone())
                }
                CreateError::OperativeBusy { .. } => DeployError::ResourceBusy,
                CreateError::AlreadyInProgress { .. } => DeployError::AlreadyInProgress,
                CreateError::Store(err) => DeployError::Store(err),
            })?;

        Ok(DeployReceipt {
            deployment_id: deployment.id,
            operative_id: deployment.operative_id,
            mission_id: deployment.mission_id,
            approach: risk.as_str(),
            status: deployment.status.as_str(),
            compatibility,
            created_at: deployment.created_at,
            completes_at: deployment.completes_at,
        })
    }

    pub fn status(&self, id: &Uuid) -> Result<StatusView, StatusError> {
        self.status_at(id, Utc::now())
    }

    /// Status read with lazy completion: an expired active deployment is
    /// settled in this call, and losers of the race just re-read the
    /// terminal record.
    pub fn status_at(&self, id: &Uuid, now: DateTime<Utc>) -> Result<StatusView, StatusError> {
        let deployment = self
            .store
            .deployment(id)?
            .ok_or(StatusError::DeploymentNotFound(*id))?;

        let deployment = if deployment.status == DeploymentStatus::Active && deployment.is_expired(now)
        {
            match self.store.settle(id, SettleMode::Complete)? {
                SettleOutcome::Settled(settled) | SettleOutcome::AlreadyTerminal(settled) => settled,
                SettleOutcome::NotFound => return Err(StatusError::DeploymentNotFound(*id)),
            }
        } else {
            deployment
        };

        Ok(self.view(&deployment, now))
    }

    /// Administrative early termination. Releases the operative; no rewards.
    pub fn abandon(&self, id: &Uuid) -> Result<StatusView, StatusError> {
        self.abandon_at(id, Utc::now())
    }

    pub fn abandon_at(&self, id: &Uuid, now: DateTime<Utc>) -> Result<StatusView, StatusError> {
        match self.store.settle(id, SettleMode::Abandon)? {
            SettleOutcome::Settled(deployment) | SettleOutcome::AlreadyTerminal(deployment) => {
                Ok(self.view(&deployment, now))
            }
            SettleOutcome::NotFound => Err(StatusError::DeploymentNotFound(*id)),
        }
    }

    /// Administrative completion regardless of the clock. Same settle
    /// primitive as lazy completion.
    pub fn force_complete(&self, id: &Uuid) -> Result<StatusView, StatusError> {
        self.force_complete_at(id, Utc::now())
    }

    pub fn force_complete_at(&self, id: &Uuid, now: DateTime<Utc>) -> Result<StatusView, StatusError> {
        match self.store.settle(id, SettleMode::Complete)? {
            SettleOutcome::Settled(deployment) | SettleOutcome::AlreadyTerminal(deployment) => {
                Ok(self.view(&deployment, now))
            }
            SettleOutcome::NotFound => Err(StatusError::DeploymentNotFound(*id)),
        }
    }

    fn view(&self, deployment: &Deployment, now: DateTime<Utc>) -> StatusView {
        let elapsed = elapsed_fraction(deployment.created_at, deployment.completes_at, now);
        let reveal_all = deployment.status.is_terminal();
        let phases = phase_views(
            &deployment.phases,
            &deployment.reveal_schedule,
            elapsed,
            reveal_all,
        );
        let result = (deployment.status == DeploymentStatus::Completed).then(|| {
            let MissionResult {
                success,
                successful_phases,
                narrative,
                rewards,
            } = deployment.result.clone();
            ResultView {
                success,
                successful_phases,
                narrative,
                rewards,
            }
        });
        StatusView {
            deployment_id: deployment.id,
            operative_id: deployment.operative_id.clone(),
            mission_id: deployment.mission_id.clone(),
            mission_name: deployment.mission_name.clone(),
            approach: deployment.approach.as_str(),
            status: deployment.status.as_str(),
            created_at: deployment.created_at,
            completes_at: deployment.completes_at,
            elapsed_fraction: elapsed,
            phases,
            result,
        }
    }
}
