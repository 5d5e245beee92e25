//! bizdash command-line client
//!
//! Signs in against the configured backend, loads the dashboard stores and
//! prints their projections.
//!
//! Usage:
//!   bizdash --config bizdash.json --email me@example.com --password ... summary
//!   bizdash --offline --email demo@example.com --password demo \
//!       memory add "Focus on churn" --category strategy

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bizdash_cli::{
    AppConfig, render_catalog, render_facts, render_finance, render_leads, render_pipeline,
};
use bizdash_gateway::{HttpBackend, InMemoryAuthGateway};
use bizdash_model::{Credentials, EntityId, LeadDraft, LeadPatch, LeadStage, MemoryCategory};
use bizdash_store::projections::{FinanceSummary, LeadPipeline, ToolCatalog};
use bizdash_store::{DashboardSession, GatewaySet};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bizdash")]
#[command(about = "bizdash dashboard client")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Account email
    #[arg(long, env = "BIZDASH_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "BIZDASH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Use in-process gateways instead of the REST backend
    #[arg(long)]
    offline: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pipeline, finance and tool overview
    Summary,
    /// CRM leads
    Leads {
        #[command(subcommand)]
        action: LeadAction,
    },
    /// Strategic memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Tools catalog grouped by category
    Tools,
    /// Sign out and discard local state
    Logout,
}

#[derive(Subcommand, Debug)]
enum LeadAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value = "new")]
        stage: String,
        #[arg(long, default_value_t = 0.0)]
        value: f64,
    },
    /// Move a lead to another stage
    Move { id: String, stage: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum MemoryAction {
    List,
    Add {
        content: String,
        #[arg(long)]
        category: Option<String>,
    },
    Remove { id: String },
    /// Print the assistant prompt block
    Prompt,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::load(args.config.as_deref())?.with_env(|name| std::env::var(name).ok());
    debug!(base_url = %config.gateway.base_url, offline = args.offline, "configuration loaded");

    let credentials = match (&args.email, &args.password) {
        (Some(email), Some(password)) => Some(Credentials::new(email, password)),
        _ => None,
    };

    let gateways = if args.offline {
        let mut auth = InMemoryAuthGateway::new();
        if let Some(c) = &credentials {
            auth = auth.with_account(&c.email, &c.password, None);
        }
        GatewaySet::in_memory_with_auth(auth)
    } else {
        GatewaySet::http(&HttpBackend::new(config.gateway.clone())?)
    };
    let session = DashboardSession::new(gateways, config.store.clone());

    if let Err(e) = session.auth().restore().await {
        debug!(error = %e, "no session restored");
    }
    if !session.auth().is_authenticated() {
        let Some(credentials) = &credentials else {
            bail!("not signed in; pass --email and --password");
        };
        session
            .auth()
            .sign_in(credentials)
            .await
            .context("Sign-in failed")?;
    }
    if let Some(user) = session.auth().user() {
        info!(email = %user.email, "signed in");
    }

    run(&session, args.command).await
}

async fn run(session: &DashboardSession, command: Command) -> Result<()> {
    match command {
        Command::Summary => {
            session.load_all().await?;
            print!("{}", render_pipeline(&session.leads().project(&LeadPipeline)));
            print!("{}", render_finance(&session.transactions().project(&FinanceSummary)));
            let catalog = session.tools().project(&ToolCatalog);
            println!(
                "Tools: {} in {} categories",
                session.tools().snapshot().len(),
                catalog.groups.len()
            );
            println!("{}", session.memory().memory_prompt());
        }
        Command::Leads { action } => {
            let leads = session.leads();
            match action {
                LeadAction::List => leads.fetch_all().await?,
                LeadAction::Add {
                    name,
                    company,
                    stage,
                    value,
                } => {
                    let mut draft = LeadDraft::new(name)
                        .with_stage(parse_stage(&stage)?)
                        .with_value(value);
                    if let Some(company) = company {
                        draft = draft.with_company(company);
                    }
                    leads.add(draft).await?;
                }
                LeadAction::Move { id, stage } => {
                    leads.fetch_all().await?;
                    leads.update(&parse_id(id)?, LeadPatch::stage(parse_stage(&stage)?)).await?;
                }
                LeadAction::Remove { id } => {
                    leads.fetch_all().await?;
                    leads.remove(&parse_id(id)?).await?;
                }
            }
            print!("{}", render_leads(leads.snapshot().collection()));
        }
        Command::Memory { action } => {
            let memory = session.memory();
            match action {
                MemoryAction::List => {
                    memory.fetch_all().await?;
                    print!("{}", render_facts(memory.snapshot().collection()));
                }
                MemoryAction::Add { content, category } => {
                    let category = category.as_deref().map(MemoryCategory::from);
                    memory.add_fact(content, category).await?;
                    print!("{}", render_facts(memory.snapshot().collection()));
                }
                MemoryAction::Remove { id } => {
                    memory.fetch_all().await?;
                    memory.remove(&parse_id(id)?).await?;
                    print!("{}", render_facts(memory.snapshot().collection()));
                }
                MemoryAction::Prompt => {
                    memory.fetch_all().await?;
                    println!("{}", memory.memory_prompt());
                }
            }
        }
        Command::Tools => {
            session.tools().fetch_all().await?;
            print!("{}", render_catalog(&session.tools().project(&ToolCatalog)));
        }
        Command::Logout => {
            session.logout().await?;
            info!("signed out");
        }
    }
    Ok(())
}

fn parse_stage(raw: &str) -> Result<LeadStage> {
    LeadStage::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(raw))
        .with_context(|| format!("unknown lead stage {raw:?}"))
}

fn parse_id(raw: String) -> Result<EntityId> {
    EntityId::parse(raw).context("invalid record id")
}
