use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use deepdive_application::{ContentGenerator, DeepDiveUseCase, StartOutcome};
use deepdive_core::config::{ProviderKind, RootConfig};
use deepdive_core::generation::TextGenerator;
use deepdive_core::store::KeyValueStore;
use deepdive_infrastructure::paths::DeepDivePaths;
use deepdive_infrastructure::{AtomicJsonFileStore, ConfigService, InMemoryKeyValueStore};

mod render;
mod repl;

#[derive(Parser)]
#[command(name = "deepdive")]
#[command(
    about = "Deep Dive - four personas, four rounds, four hypotheses about your big decision",
    long_about = None
)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/deepdive/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Never call a model; persona lines come from the built-in banks
    #[arg(long, global = true)]
    offline: bool,

    /// Keep sessions in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Directory for session files (overrides storage.data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new investigation
    Start {
        /// The decision you're wrestling with
        problem: Vec<String>,

        /// Throw away an unfinished session instead of stopping
        #[arg(long)]
        discard: bool,
    },
    /// Continue the unfinished session
    Resume,
    /// Show where the unfinished session stands
    Status,
    /// Delete the unfinished session
    Discard,
    /// List completed investigations
    History,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> RootConfig {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = service.get_config();
    if cli.offline {
        config.generation.provider = ProviderKind::Offline;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    config
}

fn build_usecase(cli: &Cli, config: &RootConfig) -> Result<DeepDiveUseCase> {
    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(InMemoryKeyValueStore::new())
    } else {
        let dir = DeepDivePaths::store_dir(config.storage.data_dir.as_deref())
            .context("Failed to resolve the session directory")?;
        tracing::debug!("Session store at {}", dir.display());
        Arc::new(AtomicJsonFileStore::new(dir))
    };

    let generator = deepdive_interaction::build_generator(&config.generation);
    tracing::debug!("Text generator: {}", generator.name());
    let content = Arc::new(ContentGenerator::new(generator, &config.generation));

    Ok(DeepDiveUseCase::new(store, content, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli);
    let usecase = build_usecase(&cli, &config)?;

    match cli.command {
        Commands::Start { problem, discard } => {
            let problem = match problem.join(" ").trim() {
                "" => repl::ask_problem()?,
                text => Some(text.to_string()),
            };
            let Some(problem) = problem else {
                return Ok(());
            };

            if !deepdive_core::triage::is_big_decision(&problem) {
                println!(
                    "{}",
                    "This doesn't read like a big decision, but the council will dig in anyway.".bright_black()
                );
            }

            let session = if discard {
                usecase.discard_and_start(&problem).await
            } else {
                match usecase.start(&problem).await {
                    StartOutcome::Started(session) => session,
                    StartOutcome::Unfinished(existing) => {
                        render::unfinished(&existing);
                        return Ok(());
                    }
                }
            };
            repl::run(&usecase, session).await?;
        }
        Commands::Resume => match usecase.get_active_session().await {
            Some(mut session) => {
                usecase.resume_session(&mut session).await;
                repl::run(&usecase, session).await?;
            }
            None => println!(
                "{}",
                "No unfinished session. Start one with `deepdive start`.".yellow()
            ),
        },
        Commands::Status => match usecase.get_active_session().await {
            Some(session) => render::status(&session, &usecase.calculate_thread_profile(&session)),
            None => println!("{}", "No unfinished session.".bright_black()),
        },
        Commands::Discard => {
            usecase
                .clear_active_session()
                .await
                .context("Failed to discard the session")?;
            println!("{}", "Unfinished session discarded.".green());
        }
        Commands::History => {
            let sessions = usecase.list_completed_sessions().await;
            if sessions.is_empty() {
                println!("{}", "No completed investigations yet.".bright_black());
            }
            for session in sessions.iter().rev() {
                render::history_entry(session, &usecase.calculate_thread_profile(session));
            }
        }
    }

    Ok(())
}
