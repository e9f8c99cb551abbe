//! HR Workflow Walkthrough
//!
//! Runs one admission or demission process end to end against the in-memory
//! store: every owner submits its step in turn, an out-of-turn edit is shown
//! being refused, and the checklist is printed after each handoff.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use hr_workflow::{
    Actor, HrWorkflowConfig, InMemoryStorage, ManagerScopePolicy, Process, ProcessService,
    ProcessType, Role,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "walkthrough")]
#[command(about = "Walk an HR admission or demission process through every step")]
#[command(version = "0.1")]
struct Cli {
    /// Which flow to run
    #[arg(long, value_enum, default_value_t = Flow::Admission)]
    flow: Flow,

    /// Settings file (defaults to ./hr-workflow.toml when present)
    #[arg(long, env = "HR_WORKFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the manager scope policy
    #[arg(long, value_enum)]
    manager_scope: Option<ManagerScopePolicy>,

    /// Print why each open task is still open
    #[arg(long)]
    explain: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Flow {
    Admission,
    Demission,
}

impl From<Flow> for ProcessType {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Admission => ProcessType::Admission,
            Flow::Demission => ProcessType::Demission,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HrWorkflowConfig::load_file(path)?,
        None => HrWorkflowConfig::load()?,
    };
    if cli.verbose {
        config.log.filter = "debug".to_string();
    }
    if let Some(policy) = cli.manager_scope {
        config.access.manager_scope = policy;
    }

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .init();

    let service = ProcessService::from_config(Arc::new(InMemoryStorage::new()), &config);
    let process_type = ProcessType::from(cli.flow);
    let template = hr_workflow::template_for(process_type);

    info!(%process_type, policy = ?config.access.manager_scope, "Starting walkthrough");
    println!("{}", template.title.bold());
    println!("{}\n", template.description.dimmed());

    let process = service.create_process(process_type, "Walkthrough").await?;
    let id = process.id();
    print_checklist(&process);

    for step in &template.steps {
        let owner = actor_for(step.owner_role);
        let intruder = Actor::new(if step.owner_role == Role::It { Role::Hr } else { Role::It });

        println!(
            "\n{} {} ({})",
            format!("Step {}:", step.ordinal).bold(),
            step.title,
            step.owner_role.label().cyan()
        );

        if let Err(e) = service
            .edit_field(&id, &intruder, "itNotes", json!("out of turn"))
            .await
        {
            println!("  {} {}", "refused:".yellow(), e);
        }

        let (process, receipt) = service
            .submit_step(&id, &owner, payload_for(process_type, step.ordinal))
            .await?;

        println!("  {} {}", step.submit_label.green(), format!("→ {:?}", receipt.outcome).dimmed());
        println!("  {}", receipt.notice);
        print_checklist(&process);

        if cli.explain {
            for explanation in service.explain(&id).await?.iter().filter(|e| !e.passed) {
                println!("    {} {}: {}", "·".dimmed(), explanation.task_id, explanation.explanation.dimmed());
            }
        }
    }

    let flushed = service.flush().await?;
    info!(flushed, "Pending writes flushed");

    let process = service.open(&id).await?;
    println!("\n{}", "Stored record:".bold());
    println!("{}", serde_json::to_string_pretty(&process.to_record())?);

    Ok(())
}

fn actor_for(role: Role) -> Actor {
    match role {
        Role::Manager => Actor::new(role).with_department("Marketing").with_region("South"),
        _ => Actor::new(role),
    }
}

fn print_checklist(process: &Process) {
    let summary = process.summary();
    println!(
        "  step {}/{} ({}%), tasks {}/{}",
        process.current_step(),
        process.step_count(),
        process.progress_percent(),
        summary.completed,
        summary.total
    );

    for task in process.tasks() {
        let mark = if task.is_completed { "✓".green() } else { "○".red() };
        println!("    {} [{}] {}", mark, task.owner_role.label(), task.text);
    }
}

fn payload_for(process_type: ProcessType, step: u8) -> hr_workflow::FieldData {
    let pairs: Vec<(&str, Value)> = match (process_type, step) {
        (ProcessType::Admission, 1) => vec![
            ("fullName", json!("Ana Silva")),
            ("displayName", json!("Ana")),
            ("taxId", json!("123.456.789-00")),
            ("admissionDate", json!("2026-11-02")),
            ("startDate", json!("2026-11-03")),
            ("contractType", json!("CLT")),
            ("department", json!("Marketing")),
            ("salesRegion", json!("South")),
            ("roleTitle", json!("Analyst")),
            ("directManager", json!("Carla Souza")),
            ("managerEmail", json!("carla.souza@example.com")),
        ],
        (ProcessType::Admission, 2) => vec![
            ("buddyMentor", json!("Diego Lima")),
            ("requestedEquipment", json!(["Notebook", "Monitor"])),
            ("requestedAccess", json!(["Marketing share"])),
            ("needsPrinter", json!("No")),
        ],
        (ProcessType::Admission, 3) => vec![
            ("adAccountCreated", json!("Yes")),
            ("corporateEmailCreated", json!("Yes")),
            ("vpnConfigured", json!("NotApplicable")),
            ("sapUserCreated", json!("Yes")),
            ("salesforceProfileCreated", json!("Yes")),
            ("networkFoldersReleased", json!("Yes")),
            ("printersConfigured", json!("No")),
            ("generalTestsDone", json!("Yes")),
        ],
        (ProcessType::Admission, _) => vec![
            ("equipmentReceiptConfirmed", json!("Yes")),
            ("accessConfirmed", json!("Yes")),
            ("systemsOrientationReceived", json!("Yes")),
        ],
        (ProcessType::Demission, 1) => vec![
            ("fullName", json!("Bruno Costa")),
            ("department", json!("Marketing")),
            ("noticeDate", json!("2026-10-01")),
            ("lastWorkingDay", json!("2026-10-31")),
            ("terminationReason", json!("Resignation")),
            ("exitExamDate", json!("2026-10-28")),
        ],
        (ProcessType::Demission, 2) => vec![
            ("equipmentReturned", json!("Partial")),
            ("pendingWork", json!("Campaign handed to Diego")),
            ("backupDone", json!("Yes")),
        ],
        (ProcessType::Demission, 3) => vec![
            ("accountDisabled", json!(true)),
            ("emailDisabled", json!(true)),
            ("vpnRevoked", json!(true)),
            ("hardwareCollected", json!(true)),
            ("sapUserDeactivated", json!(true)),
            ("salesforceUserDeactivated", json!(true)),
        ],
        (ProcessType::Demission, _) => vec![
            ("severanceCalculated", json!(true)),
            ("paymentSlipsIssued", json!(true)),
            ("workCardClosed", json!(true)),
            ("dismissalFilesArchived", json!(true)),
        ],
    };

    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
