use std::env;
use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::data::catalog::{MissionCatalog, DEFAULT_MISSIONS_INDEX_PATH};
use crate::data::operative::{builtin_roster, load_roster, DEFAULT_ROSTER_PATH};
use crate::data::validate::validate_catalog;
use crate::narrative::NarratorWithFallback;
use crate::ops::assess::{assess, AssessRequest};
use crate::ops::export_csv::export_debrief;
use crate::ops::service::{DeployRequest, DeployService};
use crate::ops::store::{MemoryStore, DEFAULT_STORE_PATH};
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Deploy,
    Status,
    Assess,
    Validate,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("deploy") => Some(Command::Deploy),
        Some("status") => Some(Command::Status),
        Some("assess") => Some(Command::Assess),
        Some("validate") => Some(Command::Validate),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Deploy) => handle_deploy(args),
        Some(Command::Status) => handle_status(args),
        Some(Command::Assess) => handle_assess(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: deaddrop <serve|deploy|status|assess|validate|export>");
            2
        }
    }
}

/// Shared wiring: catalog from disk (or built-in), snapshot-backed store with
/// the roster seeded in, template-only narrator.
fn build_service() -> DeployService {
    let catalog = MissionCatalog::load_or_builtin(DEFAULT_MISSIONS_INDEX_PATH);
    let store = MemoryStore::with_snapshot(DEFAULT_STORE_PATH);
    let roster = load_roster(DEFAULT_ROSTER_PATH).unwrap_or_else(builtin_roster);
    if let Err(err) = store.seed_roster(roster) {
        eprintln!("roster seed failed: {err}");
    }
    DeployService::new(Arc::new(store), catalog, NarratorWithFallback::template_only())
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("DEADDROP_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let service = build_service();
    match server::run_server(&bind_addr, &service) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_deploy(args: &[String]) -> i32 {
    let (Some(operative), Some(mission), Some(approach)) = (args.get(2), args.get(3), args.get(4))
    else {
        eprintln!("usage: deaddrop deploy <operative> <mission> <approach> [seed]");
        return 2;
    };
    let seed = args.get(5).and_then(|raw| raw.parse::<u64>().ok());

    let service = build_service();
    match service.deploy(&DeployRequest {
        operative: operative.clone(),
        mission: mission.clone(),
        approach: approach.clone(),
        seed,
    }) {
        Ok(receipt) => match serde_json::to_string_pretty(&receipt) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize receipt: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("deploy failed: {err}");
            1
        }
    }
}

fn handle_status(args: &[String]) -> i32 {
    let Some(raw_id) = args.get(2) else {
        eprintln!("usage: deaddrop status <deployment-id>");
        return 2;
    };
    let Ok(id) = Uuid::parse_str(raw_id) else {
        eprintln!("'{raw_id}' is not a deployment id");
        return 2;
    };

    let service = build_service();
    match service.status(&id) {
        Ok(view) => match serde_json::to_string_pretty(&view) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize status: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("status failed: {err}");
            1
        }
    }
}

fn handle_assess(args: &[String]) -> i32 {
    let (Some(operative), Some(mission), Some(approach)) = (args.get(2), args.get(3), args.get(4))
    else {
        eprintln!("usage: deaddrop assess <operative> <mission> <approach> [iterations] [seed]");
        return 2;
    };
    let iterations = args.get(5).and_then(|raw| raw.parse::<u32>().ok());
    let seed = args.get(6).and_then(|raw| raw.parse::<u64>().ok());

    let service = build_service();
    match assess(
        &service,
        &AssessRequest {
            operative: operative.clone(),
            mission: mission.clone(),
            approach: approach.clone(),
            iterations,
            seed,
        },
    ) {
        Ok(assessment) => match serde_json::to_string_pretty(&assessment) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize assessment: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("assess failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let index_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_MISSIONS_INDEX_PATH);
    let catalog = MissionCatalog::load_or_builtin(index_path);
    let report = validate_catalog(&catalog);

    if report.diagnostics.is_empty() {
        println!("validation passed: {} mission(s)", catalog.len());
        return 0;
    }
    for diagnostic in &report.diagnostics {
        println!("- {diagnostic}");
    }
    if report.has_errors() {
        eprintln!("validation failed");
        1
    } else {
        println!("validation passed with warnings");
        0
    }
}

fn handle_export(args: &[String]) -> i32 {
    let (Some(raw_id), Some(out_path)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: deaddrop export <deployment-id> <out.csv>");
        return 2;
    };
    let Ok(id) = Uuid::parse_str(raw_id) else {
        eprintln!("'{raw_id}' is not a deployment id");
        return 2;
    };

    let service = build_service();
    let deployment = match service.store().deployment(&id) {
        Ok(Some(deployment)) => deployment,
        Ok(None) => {
            eprintln!("deployment '{id}' not found");
            return 1;
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };
    match export_debrief(&deployment, Path::new(out_path)) {
        Ok(()) => {
            println!("exported {} phase(s) to {out_path}", deployment.phases.len());
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}
