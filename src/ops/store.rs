//! Deployment store: the one place that couples a deployment's existence to
//! the operative's exclusivity hold, and the one place a deployment leaves
//! the active state. All state lives behind a single mutex; mutations are
//! staged on a copy, persisted, then committed, so a failed snapshot write
//! leaves nothing observable.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::operative::Operative;
use crate::ops::deployment::{Deployment, DeploymentStatus};

pub const DEFAULT_STORE_PATH: &str = "data/deployments/store.json";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    LockPoisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "store io error: {err}"),
            Self::Serialize(err) => write!(f, "store serialize error: {err}"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

/// Why an atomic create was refused.
#[derive(Debug)]
pub enum CreateError {
    OperativeNotFound,
    /// Held by an active deployment on a different mission.
    OperativeBusy { holding: Uuid },
    /// Held by an active deployment on the same mission.
    AlreadyInProgress { holding: Uuid },
    Store(StoreError),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperativeNotFound => write!(f, "operative not found"),
            Self::OperativeBusy { holding } => {
                write!(f, "operative held by deployment {holding}")
            }
            Self::AlreadyInProgress { holding } => {
                write!(f, "mission already in progress as deployment {holding}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CreateError {}

impl From<StoreError> for CreateError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// How a deployment leaves the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    /// Apply the precomputed result: experience grant plus release.
    Complete,
    /// Release only; the result is never applied.
    Abandon,
}

/// Outcome of the guarded transition. Only `Settled` performed side effects.
#[derive(Debug)]
pub enum SettleOutcome {
    NotFound,
    /// Lost the race or arrived late; the terminal record as stored.
    AlreadyTerminal(Deployment),
    /// Won the transition; rewards/release applied exactly once.
    Settled(Deployment),
}

pub trait Store: Send + Sync {
    fn upsert_operative(&self, operative: Operative) -> Result<(), StoreError>;
    fn operative(&self, id: &str) -> Result<Option<Operative>, StoreError>;
    fn operatives(&self) -> Result<Vec<Operative>, StoreError>;
    fn deployment(&self, id: &Uuid) -> Result<Option<Deployment>, StoreError>;
    fn deployments(&self) -> Result<Vec<Deployment>, StoreError>;
    /// Whether the account has a completed deployment of the mission,
    /// optionally requiring a successful result.
    fn account_completed_mission(
        &self,
        account: &str,
        mission_id: &str,
        require_success: bool,
    ) -> Result<bool, StoreError>;
    /// Insert an active deployment and mark its operative held, as one atomic
    /// unit. Enforces one active deployment per operative.
    fn create_deployment(&self, deployment: Deployment) -> Result<(), CreateError>;
    /// The single completion primitive: compare-and-set out of `active`,
    /// releasing the operative and (on Complete) applying rewards. Callable
    /// from lazy completion, abandon, and force-complete.
    fn settle(&self, id: &Uuid, mode: SettleMode) -> Result<SettleOutcome, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    operatives: BTreeMap<String, Operative>,
    #[serde(default)]
    deployments: BTreeMap<Uuid, Deployment>,
}

/// In-memory store with an optional JSON snapshot on disk.
pub struct MemoryStore {
    persist_path: Option<PathBuf>,
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            persist_path: None,
            inner: Mutex::new(Snapshot::default()),
        }
    }

    /// Load the snapshot at `path` if present and persist every mutation back
    /// to it.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            persist_path: Some(path),
            inner: Mutex::new(snapshot),
        }
    }

    /// Insert roster entries that are not already present. Existing records
    /// keep their experience and hold state.
    pub fn seed_roster(&self, roster: Vec<Operative>) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let mut changed = false;
        for operative in roster {
            if !staged.operatives.contains_key(&operative.id) {
                staged.operatives.insert(operative.id.clone(), operative);
                changed = true;
            }
        }
        if changed {
            self.persist(&staged)?;
            *guard = staged;
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Snapshot>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(snapshot)?;
        fs::write(path, serialized)?;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn upsert_operative(&self, operative: Operative) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        staged.operatives.insert(operative.id.clone(), operative);
        self.persist(&staged)?;
        *guard = staged;
        Ok(())
    }

    fn operative(&self, id: &str) -> Result<Option<Operative>, StoreError> {
        Ok(self.lock()?.operatives.get(id).cloned())
    }

    fn operatives(&self) -> Result<Vec<Operative>, StoreError> {
        Ok(self.lock()?.operatives.values().cloned().collect())
    }

    fn deployment(&self, id: &Uuid) -> Result<Option<Deployment>, StoreError> {
        Ok(self.lock()?.deployments.get(id).cloned())
    }

    fn deployments(&self) -> Result<Vec<Deployment>, StoreError> {
        Ok(self.lock()?.deployments.values().cloned().collect())
    }

    fn account_completed_mission(
        &self,
        account: &str,
        mission_id: &str,
        require_success: bool,
    ) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let done = guard.deployments.values().any(|deployment| {
            deployment.mission_id == mission_id
                && deployment.status == DeploymentStatus::Completed
                && (!require_success || deployment.result.success)
                && guard
                    .operatives
                    .get(&deployment.operative_id)
                    .map_or(false, |operative| operative.account == account)
        });
        Ok(done)
    }

    fn create_deployment(&self, deployment: Deployment) -> Result<(), CreateError> {
        let mut guard = self.lock().map_err(CreateError::Store)?;

        let Some(operative) = guard.operatives.get(&deployment.operative_id) else {
            return Err(CreateError::OperativeNotFound);
        };
        if let Some(holding) = operative.held_by {
            let same_mission = guard
                .deployments
                .get(&holding)
                .map_or(false, |held| held.mission_id == deployment.mission_id);
            return Err(if same_mission {
                CreateError::AlreadyInProgress { holding }
            } else {
                CreateError::OperativeBusy { holding }
            });
        }

        let mut staged = guard.clone();
        if let Some(operative) = staged.operatives.get_mut(&deployment.operative_id) {
            operative.held_by = Some(deployment.id);
        }
        staged.deployments.insert(deployment.id, deployment);
        self.persist(&staged).map_err(CreateError::Store)?;
        *guard = staged;
        Ok(())
    }

    fn settle(&self, id: &Uuid, mode: SettleMode) -> Result<SettleOutcome, StoreError> {
        let mut guard = self.lock()?;

        let Some(current) = guard.deployments.get(id) else {
            return Ok(SettleOutcome::NotFound);
        };
        if current.status.is_terminal() {
            return Ok(SettleOutcome::AlreadyTerminal(current.clone()));
        }

        let mut staged = guard.clone();
        let settled = {
            let Some(deployment) = staged.deployments.get_mut(id) else {
                return Ok(SettleOutcome::NotFound);
            };
            deployment.status = match mode {
                SettleMode::Complete => DeploymentStatus::Completed,
                SettleMode::Abandon => DeploymentStatus::Abandoned,
            };
            let experience = deployment.result.rewards.experience;
            let operative_id = deployment.operative_id.clone();
            let settled = deployment.clone();
            if let Some(operative) = staged.operatives.get_mut(&operative_id) {
                if operative.held_by == Some(*id) {
                    operative.held_by = None;
                }
                if mode == SettleMode::Complete {
                    operative.experience = operative.experience.saturating_add(experience);
                }
            }
            settled
        };
        self.persist(&staged)?;
        *guard = staged;
        Ok(SettleOutcome::Settled(settled))
    }
}
