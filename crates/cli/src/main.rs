//! Terminal front end for ShopSense recommendations.
//!
//! Usage:
//!     shopsense catalog --category phone
//!     shopsense recommend "phone under 500 with good battery"
//!     shopsense session

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shopsense_client::{ClientConfig, HttpRecommendationService};
use shopsense_controller::{RecommendationController, ResolutionPolicy, Settled};
use shopsense_model::{ActiveCategory, Catalog, SessionState};
use shopsense_render::{render_catalog, RecommendationPanel};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "shopsense")]
#[command(about = "Browse the catalog and ask for AI product recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Recommendation service URL
    #[arg(long, default_value = "http://127.0.0.1:4000")]
    service_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// JSON file with the product catalog (built-in catalog if omitted)
    #[arg(long)]
    catalog: Option<String>,

    /// Drop results of submissions that a newer submission has replaced
    #[arg(long)]
    discard_stale: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the catalog grid
    Catalog {
        /// Category filter (all, phone, laptop, headphone)
        #[arg(short, long, default_value = "all")]
        category: ActiveCategory,
    },

    /// Ask for recommendations once
    Recommend {
        /// Free-text preference
        preference: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Interactive session on stdin
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct RecommendOutput<'a> {
    state: &'a SessionState,
    panel: &'a RecommendationPanel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shopsense=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let catalog = load_catalog(cli.catalog.as_deref())?;
    let config = ClientConfig {
        base_url: cli.service_url,
        timeout_secs: cli.timeout_secs,
    };
    let service = HttpRecommendationService::new(config)?;
    let policy = if cli.discard_stale {
        ResolutionPolicy::LatestSubmission
    } else {
        ResolutionPolicy::LastWriteWins
    };
    let controller = RecommendationController::new(catalog, service).with_policy(policy);

    match cli.command {
        Commands::Catalog { category } => {
            controller.set_active_category(category);
            print!("{}", render_catalog(controller.catalog(), category, &[]));
        }
        Commands::Recommend { preference, format } => {
            run_recommend(&controller, &preference, format).await?;
        }
        Commands::Session => {
            run_session(&controller).await?;
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path))?;
    let catalog = Catalog::from_json(&json)
        .with_context(|| format!("Invalid catalog file {}", path))?;

    tracing::info!(path = %path, products = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

async fn run_recommend(
    controller: &RecommendationController<HttpRecommendationService>,
    preference: &str,
    format: Format,
) -> Result<()> {
    let settled = controller.submit(preference).await;
    tracing::debug!(?settled, "Submission finished");

    let state = controller.snapshot();
    let panel = RecommendationPanel::build(controller.catalog(), &state.request);

    match format {
        Format::Json => {
            let output = RecommendOutput {
                state: &state,
                panel: &panel,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => print!("{}", panel.to_text()),
    }

    Ok(())
}

/// A line typed during an interactive session.
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Edit(String),
    Submit,
    Category(ActiveCategory),
    State,
    Help,
    Quit,
    Invalid(String),
}

impl SessionCommand {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Self::Edit(line.to_string());
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((command, ""));

        match name {
            "submit" | "s" => Self::Submit,
            "category" | "c" => match arg.parse() {
                Ok(category) => Self::Category(category),
                Err(e) => Self::Invalid(format!("{}", e)),
            },
            "state" => Self::State,
            "help" | "h" => Self::Help,
            "quit" | "q" => Self::Quit,
            other => Self::Invalid(format!("Unknown command: :{}", other)),
        }
    }
}

const SESSION_HELP: &str = "\
Type a preference and press enter to edit it.
  :submit            ask for recommendations
  :category <name>   filter the catalog (all, phone, laptop, headphone)
  :state             print the session state as JSON
  :quit              leave";

async fn run_session(controller: &RecommendationController<HttpRecommendationService>) -> Result<()> {
    println!("{}", SESSION_HELP);
    print_view(controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match SessionCommand::parse(&line) {
            SessionCommand::Edit(text) => {
                controller.edit_preference(text);
            }
            SessionCommand::Submit => {
                if controller.submit_current().await == Settled::Rejected {
                    tracing::debug!("Empty preference submitted");
                }
                print_view(controller);
            }
            SessionCommand::Category(category) => {
                controller.set_active_category(category);
                print_view(controller);
            }
            SessionCommand::State => {
                println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
            }
            SessionCommand::Help => println!("{}", SESSION_HELP),
            SessionCommand::Quit => break,
            SessionCommand::Invalid(message) => println!("{}", message),
        }
    }

    Ok(())
}

fn print_view(controller: &RecommendationController<HttpRecommendationService>) {
    let state = controller.snapshot();
    let panel = RecommendationPanel::build(controller.catalog(), &state.request);

    println!("---");
    print!("{}", panel.to_text());
    println!();
    print!(
        "{}",
        render_catalog(
            controller.catalog(),
            state.active_category,
            &state.request.recommended_ids
        )
    );
}
