use anyhow::{bail, Context as AnyhowContext, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use redress_engine::{
    ComposeRequest, DisputeService, EngineConfig, EscalationScheduler, JsonFileStore, LetterComposer,
    LogNotifier,
};
use redress_protocol::ItemType;
use redress_templates::{TemplateLibrary, TemplateQuery};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

mod client_data;
mod flags;

use client_data::{ClientFile, FileClientData};
use flags::{BureauFlag, CombineFlag, OutcomeFlag, RecipientFlag};

#[derive(Parser)]
#[command(name = "redress")]
#[command(about = "Credit dispute letter generation and lifecycle tooling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Template seed file (TOML); defaults to the built-in library
    #[arg(long, global = true)]
    templates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or validate the template library
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
    /// Generate dispute letters for a client
    Compose(ComposeArgs),
    /// Mark a reviewed draft as ready to mail
    Ready(TransitionArgs),
    /// Mark a dispute as sent (starts the response clock)
    Send(TransitionArgs),
    /// Mark a sent dispute as acknowledged by the bureau
    Ack(TransitionArgs),
    /// Record a bureau response
    Respond(RespondArgs),
    /// Close a responded dispute
    Resolve(TransitionArgs),
    /// Run one escalation pass over the store
    Tick(TickArgs),
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// Load the library and report its revision and fingerprint
    Validate,
    /// Resolve and print the template a query would use
    Show(ShowArgs),
}

#[derive(Args)]
struct ShowArgs {
    #[arg(long)]
    methodology: String,
    #[arg(long, value_enum, default_value = "bureau")]
    recipient: RecipientFlag,
    #[arg(long, default_value_t = 1)]
    round: u32,
    /// Item type filter (collection, charge_off, late_payment, ...)
    #[arg(long)]
    item_type: Option<String>,
    #[arg(long, value_enum)]
    bureau: Option<BureauFlag>,
    /// Print the full letter body instead of a summary
    #[arg(long)]
    body: bool,
}

#[derive(Args)]
struct ComposeArgs {
    /// Client export JSON (profile + items + evidence)
    #[arg(long)]
    client_file: PathBuf,
    /// Dispute store JSON file
    #[arg(long, default_value = "disputes.json")]
    store: PathBuf,
    #[arg(long, default_value_t = 1)]
    round: u32,
    /// Target bureaus; defaults to all three
    #[arg(long, value_enum, value_delimiter = ',')]
    bureaus: Vec<BureauFlag>,
    #[arg(long, value_enum, default_value = "combined")]
    combine: CombineFlag,
    #[arg(long, value_enum, default_value = "bureau")]
    recipient: RecipientFlag,
    /// Item ids to dispute; defaults to every item in the client file
    #[arg(long, value_delimiter = ',')]
    items: Vec<Uuid>,
    /// Additional operator-chosen reason codes
    #[arg(long, value_delimiter = ',')]
    codes: Vec<String>,
    /// Evidence document ids to attach
    #[arg(long, value_delimiter = ',')]
    evidence: Vec<Uuid>,
    /// Force generation past a failed evidence check (recorded for audit)
    #[arg(long)]
    override_evidence: bool,
    /// Ask for human review instead of automated matching
    #[arg(long)]
    manual_review: bool,
    /// Print rendered letter bodies
    #[arg(long)]
    print_letters: bool,
}

#[derive(Args)]
struct TransitionArgs {
    #[arg(long, default_value = "disputes.json")]
    store: PathBuf,
    #[arg(long)]
    id: Uuid,
    /// Timestamp (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<String>,
}

#[derive(Args)]
struct RespondArgs {
    #[arg(long, default_value = "disputes.json")]
    store: PathBuf,
    #[arg(long)]
    id: Uuid,
    #[arg(long, value_enum)]
    outcome: OutcomeFlag,
    /// Timestamp (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<String>,
}

#[derive(Args)]
struct TickArgs {
    #[arg(long, default_value = "disputes.json")]
    store: PathBuf,
    /// Clock for the pass (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<String>,
    /// Insert a draft for the next round of every escalated dispute
    #[arg(long)]
    auto_redraft: bool,
}

#[derive(Serialize)]
struct LetterSummary {
    id: Uuid,
    bureau: String,
    round: u32,
    methodology: String,
    reason_codes: Vec<String>,
    item_ids: Vec<Uuid>,
    fingerprint: String,
    evidence_override: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let templates = load_templates(cli.templates.as_deref())?;
    match cli.command {
        Commands::Templates { action } => run_templates(action, &templates),
        Commands::Compose(args) => run_compose(args, templates).await,
        Commands::Ready(args) => run_ready(args).await,
        Commands::Send(args) => run_send(args).await,
        Commands::Ack(args) => run_ack(args).await,
        Commands::Respond(args) => run_respond(args).await,
        Commands::Resolve(args) => run_resolve(args).await,
        Commands::Tick(args) => run_tick(args).await,
    }
}

fn load_templates(path: Option<&std::path::Path>) -> Result<TemplateLibrary> {
    match path {
        Some(path) => TemplateLibrary::load_file(path)
            .with_context(|| format!("loading template library from {}", path.display())),
        None => Ok(TemplateLibrary::builtin()),
    }
}

fn run_templates(action: TemplatesAction, library: &TemplateLibrary) -> Result<()> {
    match action {
        TemplatesAction::Validate => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "revision": library.revision(),
                    "templates": library.len(),
                    "fingerprint": library.fingerprint(),
                }))?
            );
            Ok(())
        }
        TemplatesAction::Show(args) => {
            let item_type: Option<ItemType> =
                args.item_type.as_deref().map(str::parse).transpose()?;
            let query = TemplateQuery {
                methodology: args.methodology.parse()?,
                recipient: args.recipient.as_domain(),
                round: args.round,
                item_type,
                bureau: args.bureau.map(BureauFlag::as_domain),
            };
            let Some(template) = library.resolve(&query) else {
                bail!("no template matches that query");
            };
            if args.body {
                println!("{}", template.body);
            } else {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "slug": template.slug,
                        "title": template.title,
                        "min_round": template.min_round,
                        "max_round": template.max_round,
                        "legal_citations": template.legal_citations,
                    }))?
                );
            }
            Ok(())
        }
    }
}

async fn run_compose(args: ComposeArgs, templates: TemplateLibrary) -> Result<()> {
    let file = ClientFile::load(&args.client_file)
        .with_context(|| format!("loading client file {}", args.client_file.display()))?;
    let item_ids = if args.items.is_empty() {
        file.items.iter().map(|item| item.id).collect()
    } else {
        args.items.clone()
    };
    let client_id = file.profile.id;
    let data = Arc::new(FileClientData::new(file));
    let store = Arc::new(JsonFileStore::open(&args.store).await?);
    let composer = LetterComposer::new(data.clone(), data, store, Arc::new(templates));

    let bureaus = if args.bureaus.is_empty() {
        redress_protocol::Bureau::ALL.to_vec()
    } else {
        args.bureaus.iter().map(|flag| flag.as_domain()).collect()
    };
    let request = ComposeRequest {
        client_id,
        item_ids,
        round: args.round,
        bureaus,
        combine: args.combine.as_domain(),
        recipient: args.recipient.as_domain(),
        operator_codes: args.codes.clone(),
        evidence_ids: args.evidence.clone(),
        override_evidence: args.override_evidence,
        manual_review: args.manual_review,
        now: Utc::now(),
    };
    let outcome = composer.compose(&request).await?;

    let letters: Vec<LetterSummary> = outcome
        .disputes
        .iter()
        .map(|d| LetterSummary {
            id: d.id,
            bureau: d.bureau.as_str().to_string(),
            round: d.round,
            methodology: d.methodology.as_str().to_string(),
            reason_codes: d.reason_codes.clone(),
            item_ids: d.item_ids.clone(),
            fingerprint: d.letter_fingerprint.clone(),
            evidence_override: d.evidence_override,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "letters": letters,
            "failures": outcome.failures,
            "warnings": outcome.validation.warnings,
        }))?
    );
    if args.print_letters {
        for dispute in &outcome.disputes {
            println!("\n===== {} ({}) =====", dispute.bureau.as_str(), dispute.id);
            println!("{}", dispute.letter_body);
        }
    }
    Ok(())
}

async fn run_ready(args: TransitionArgs) -> Result<()> {
    let service = open_service(&args.store).await?;
    let dispute = service.mark_ready(args.id, parse_at(args.at.as_deref())?).await?;
    println!("Dispute {} marked ready", dispute.id);
    Ok(())
}

async fn run_ack(args: TransitionArgs) -> Result<()> {
    let service = open_service(&args.store).await?;
    let dispute = service.acknowledge(args.id, parse_at(args.at.as_deref())?).await?;
    println!("Dispute {} marked in progress", dispute.id);
    Ok(())
}

async fn run_send(args: TransitionArgs) -> Result<()> {
    let service = open_service(&args.store).await?;
    let dispute = service.send(args.id, parse_at(args.at.as_deref())?).await?;
    println!(
        "Dispute {} sent; response deadline {}",
        dispute.id,
        dispute
            .response_deadline
            .map(|d| d.to_rfc3339())
            .unwrap_or_default()
    );
    Ok(())
}

async fn run_respond(args: RespondArgs) -> Result<()> {
    let service = open_service(&args.store).await?;
    let dispute = service
        .record_response(args.id, parse_at(args.at.as_deref())?, args.outcome.as_domain())
        .await?;
    println!(
        "Dispute {} marked responded with outcome {}",
        dispute.id,
        dispute
            .outcome
            .map(|o| o.as_str().to_string())
            .unwrap_or_default()
    );
    Ok(())
}

async fn run_resolve(args: TransitionArgs) -> Result<()> {
    let service = open_service(&args.store).await?;
    let dispute = service.resolve(args.id, parse_at(args.at.as_deref())?).await?;
    println!("Dispute {} resolved", dispute.id);
    Ok(())
}

async fn run_tick(args: TickArgs) -> Result<()> {
    let store = Arc::new(JsonFileStore::open(&args.store).await?);
    let config = EngineConfig {
        auto_redraft: args.auto_redraft,
        ..EngineConfig::default()
    };
    let scheduler = EscalationScheduler::new(store, Arc::new(LogNotifier), config);
    let report = scheduler.run(parse_at(args.now.as_deref())?).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn open_service(store: &std::path::Path) -> Result<DisputeService> {
    let store = Arc::new(JsonFileStore::open(store).await?);
    Ok(DisputeService::new(
        store,
        Arc::new(LogNotifier),
        EngineConfig::default(),
    ))
}

fn parse_at(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid timestamp '{raw}'"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
