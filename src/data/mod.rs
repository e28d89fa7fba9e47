pub mod catalog;
pub mod operative;
pub mod validate;

pub use catalog::{
    load_mission_index, load_mission_record, ApproachTemplate, MissionCatalog, MissionIndex,
    MissionIndexEntry, MissionTemplate, PhaseTemplate, Prerequisite, DEFAULT_MISSIONS_INDEX_PATH,
};
pub use operative::{
    builtin_roster, level_for_experience, load_roster, Operative, DEFAULT_ROSTER_PATH,
};
pub use validate::{
    validate_catalog, ValidationDiagnostic, ValidationReport, ValidationSeverity,
};
