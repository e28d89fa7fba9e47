pub mod assess;
pub mod deployment;
pub mod export_csv;
pub mod service;
pub mod store;

pub use assess::{assess, run_assessment, AssessRequest, Assessment, DEFAULT_ITERATIONS};
pub use deployment::{Deployment, DeploymentStatus};
pub use export_csv::{export_debrief, write_debrief, ExportError};
pub use service::{
    DeployError, DeployReceipt, DeployRequest, DeployService, ResultView, StatusError, StatusView,
};
pub use store::{
    CreateError, MemoryStore, SettleMode, SettleOutcome, Store, StoreError, DEFAULT_STORE_PATH,
};
