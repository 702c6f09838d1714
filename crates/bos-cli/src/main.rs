// crates/bos-cli/src/main.rs
// ============================================================================
// Module: BOS CLI Entry Point
// Description: Command dispatcher for local exploration of the pipeline.
// Purpose: Let a developer submit one command against an in-memory
//          dispatcher wired with the demo engines, or validate a `bos.toml`
//          configuration file, without standing up a transport server.
// Dependencies: clap, bos-config, bos-core, bos-dispatcher, bos-events,
//               serde_json
// ============================================================================

//! ## Overview
//! This binary is a local exploration tool, not a production entrypoint: it
//! wires the cash, inventory, and accounting demo engines into one
//! in-memory [`bos_dispatcher::Dispatcher`], accepts one command's worth of
//! arguments on the command line, and reports the resulting `Outcome` as
//! JSON. A real deployment's transport layer (`bos-http`'s context resolver,
//! a persistent `bos-store-sqlite` sink) replaces what this binary stands in
//! for rather than extending it.

mod context;
mod wiring;

use std::io::Write as _;
use std::process::ExitCode;
use std::str::FromStr;

use bos_config::BosConfig;
use bos_core::core::command::ActorRequirement;
use bos_core::core::command::Command;
use bos_core::core::command::CommandKind;
use bos_core::core::command::CommandSpec;
use bos_core::core::command::Payload;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::context::ActorContext;
use bos_core::core::context::TenantScope;
use bos_core::core::health::SystemHealth;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::CorrelationId;
use bos_core::core::identifiers::TenantId;
use bos_dispatcher::DispatcherError;
use bos_dispatcher::Outcome;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use context::CliBusinessContext;
use serde_json::json;

/// `bos`: local exploration CLI for the Command-to-Event Governance Pipeline.
#[derive(Parser, Debug)]
#[command(name = "bos", version, about)]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Dispatches a single command against the in-memory demo engines.
    Submit(SubmitArgs),
    /// Validates a `bos.toml` configuration file without dispatching anything.
    ConfigCheck {
        /// Path to the configuration file to validate.
        #[arg(long)]
        path: std::path::PathBuf,
    },
}

/// Arguments for [`Commands::Submit`].
#[derive(clap::Args, Debug)]
struct SubmitArgs {
    /// Typed intent string, e.g. `cash.session.open.request`.
    #[arg(long)]
    intent: String,
    /// Target tenant id. A fresh one is generated when omitted.
    #[arg(long)]
    tenant: Option<String>,
    /// Target branch id. Required for engines whose intents are branch-scoped.
    #[arg(long)]
    branch: Option<String>,
    /// Actor kind issuing the command.
    #[arg(long, value_enum, default_value_t = ActorKindArg::Human)]
    actor_kind: ActorKindArg,
    /// Actor identifier issuing the command.
    #[arg(long, default_value = "cli-explorer")]
    actor_id: String,
    /// Structured payload as a JSON object, e.g. `{"session_id":"S1"}`.
    #[arg(long, default_value = "{}")]
    payload: String,
}

/// `--actor-kind` values accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActorKindArg {
    /// A human operator.
    Human,
    /// The system itself.
    System,
    /// An unattended device.
    Device,
    /// An AI agent.
    Ai,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            print_line(&mut std::io::stderr(), &message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Submit(args) => submit(args),
        Commands::ConfigCheck { path } => config_check(&path),
    }
}

fn submit(args: SubmitArgs) -> Result<(), String> {
    let tenant_id = match args.tenant {
        Some(raw) => TenantId::from_str(&raw).map_err(|err| format!("invalid --tenant: {err}"))?,
        None => TenantId::new(),
    };
    let branch_id = match args.branch {
        Some(raw) => Some(BranchId::from_str(&raw).map_err(|err| format!("invalid --branch: {err}"))?),
        None => None,
    };
    let actor_id = ActorId::new(args.actor_id).map_err(|_| "actor id must not be empty".to_string())?;
    let payload: Payload = serde_json::from_str(&args.payload).map_err(|err| format!("--payload must be a JSON object: {err}"))?;

    let scope_requirement = if branch_id.is_some() { ScopeRequirement::BranchRequired } else { ScopeRequirement::BusinessAllowed };

    let command = Command::new(CommandSpec {
        intent: args.intent,
        tenant_id,
        branch_id,
        actor_kind: context::parse_actor_kind(args.actor_kind),
        actor_id: actor_id.clone(),
        payload,
        issued_at: time::OffsetDateTime::now_utc(),
        correlation_id: CorrelationId::new(),
        scope_requirement,
        actor_requirement: ActorRequirement::ActorRequired,
        kind: CommandKind::Write,
    })
    .map_err(|err| format!("invalid command: {err}"))?;

    let config = BosConfig::load_from_env().map_err(|err| format!("failed to load configuration: {err}"))?;
    let pipeline = wiring::assemble(config);

    let owned_intents = context::all_owned_intents();
    let actor = ActorContext::from_actor_id(command.actor_kind(), actor_id);
    let business_context = CliBusinessContext::new(tenant_id, branch_id, actor.actor_id(), &owned_intents);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, bos_core::core::context::BranchAllowance::All);
    let health = SystemHealth::new();

    let outcome = pipeline
        .dispatcher
        .dispatch(&command, &actor, &business_context, &tenant_scope, &health)
        .map_err(|err: DispatcherError| format!("{err}"))?;

    print_outcome(&outcome);
    Ok(())
}

fn config_check(path: &std::path::Path) -> Result<(), String> {
    let config = BosConfig::load_from(path).map_err(|err| format!("configuration is invalid: {err}"))?;
    let report = json!({
        "path": path.display().to_string(),
        "valid": true,
        "rate_limiter": {
            "human_per_minute": config.rate_limiter.human.base_per_minute,
            "system_per_minute": config.rate_limiter.system.base_per_minute,
            "device_per_minute": config.rate_limiter.device.base_per_minute,
            "ai_per_minute": config.rate_limiter.ai.base_per_minute,
        },
    });
    print_line(&mut std::io::stdout(), &report.to_string());
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    let report = match outcome {
        Outcome::Accepted { result, anomaly_warning } => json!({
            "accepted": true,
            "event_type": result.event_type,
            "event_id": result.event.event_id().to_string(),
            "persisted": result.persisted.accepted,
            "projection_applied": result.projection_applied,
            "anomaly_warning": anomaly_warning.as_ref().map(|verdict| verdict.reason.clone()),
        }),
        Outcome::Rejected { reason } => json!({
            "accepted": false,
            "code": reason.code().as_str(),
            "message": reason.message(),
            "policy_name": reason.policy_name(),
        }),
    };
    print_line(&mut std::io::stdout(), &report.to_string());
}

/// Writes `message` followed by a newline, avoiding the workspace's banned
/// `println!`/`eprintln!` macros.
fn print_line(writer: &mut impl std::io::Write, message: &str) {
    let _ = writeln!(writer, "{message}");
}
