//! ChainScout - multi-network agent discovery CLI
//!
//! The `chainscout` command searches agents across every network listed in a
//! TOML config file, each network served from its own JSON snapshot.
//!
//! ## Commands
//!
//! - `search`: filter and page through agents
//! - `reputation`: rank agents by feedback score
//! - `networks`: list configured networks

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use chainscout_core::metrics::METRICS;
use chainscout_core::telemetry::init_tracing;
use chainscout_core::{
    AgentId, FeedbackFilters, NetworkScope, ReputationQuery, SearchOrchestrator, SearchParams,
    SearchResponse,
};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "chainscout")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-network agent discovery", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(
        short,
        long,
        global = true,
        env = "CHAINSCOUT_CONFIG",
        default_value = "chainscout.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Results per page (default: `default_page_size` from config)
    #[arg(long)]
    page_size: Option<usize>,

    /// Cursor returned as `nextCursor` by a previous call
    #[arg(long)]
    cursor: Option<String>,

    /// Sort as `<field>[:asc|desc]`, e.g. `name:asc`
    #[arg(long)]
    sort: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search agents
    Search {
        /// Chain ids to search, or `all` (default: configured default network)
        #[arg(short, long = "network", value_delimiter = ',')]
        networks: Vec<String>,

        /// Case-insensitive substring of the agent name
        #[arg(long)]
        name: Option<String>,

        /// Restrict to these local agent ids
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Required A2A skill (repeatable, all must match)
        #[arg(long = "skill")]
        skills: Vec<String>,

        /// Required MCP tool (repeatable, all must match)
        #[arg(long = "tool")]
        tools: Vec<String>,

        /// Any of these owner addresses
        #[arg(long = "owner")]
        owners: Vec<String>,

        #[arg(long)]
        active: Option<bool>,

        #[arg(long)]
        mcp: Option<bool>,

        #[arg(long)]
        a2a: Option<bool>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Rank agents by feedback reputation
    Reputation {
        /// Chain ids to search, or `all` (default: configured default network)
        #[arg(short, long = "network", value_delimiter = ',')]
        networks: Vec<String>,

        /// Restrict to agents given as `<chainId>:<localId>`
        #[arg(long = "agent")]
        agents: Vec<AgentId>,

        /// Feedback tag, matched against either tag slot
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Reviewer address
        #[arg(long = "reviewer")]
        reviewers: Vec<String>,

        #[arg(long = "capability")]
        capabilities: Vec<String>,

        #[arg(long = "skill")]
        skills: Vec<String>,

        #[arg(long = "task")]
        tasks: Vec<String>,

        /// Name recorded on the feedback
        #[arg(long = "name")]
        names: Vec<String>,

        /// Drop revoked feedback before selecting candidates
        #[arg(long)]
        exclude_revoked: bool,

        /// Minimum average score (agents without feedback are dropped)
        #[arg(long)]
        min_score: Option<f64>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List configured networks
    Networks,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = CliConfig::load(&cli.config)?;

    let result = match cli.command {
        Commands::Networks => cmd_networks(&config),
        Commands::Search {
            networks,
            name,
            ids,
            skills,
            tools,
            owners,
            active,
            mcp,
            a2a,
            page,
        } => {
            let params = SearchParams {
                networks: NetworkScope::from_args(&networks),
                name,
                ids,
                a2a_skills: skills,
                mcp_tools: tools,
                owners,
                active,
                mcp,
                a2a,
                ..SearchParams::default()
            };
            cmd_search(&config, params, page).await
        }
        Commands::Reputation {
            networks,
            agents,
            tags,
            reviewers,
            capabilities,
            skills,
            tasks,
            names,
            exclude_revoked,
            min_score,
            page,
        } => {
            let query = ReputationQuery {
                networks: NetworkScope::from_args(&networks),
                agents,
                filters: FeedbackFilters {
                    tags,
                    reviewers,
                    capabilities,
                    skills,
                    tasks,
                    names,
                    exclude_revoked,
                    ..FeedbackFilters::default()
                },
                min_average_score: min_score,
            };
            cmd_reputation(&config, query, page).await
        }
    };

    METRICS.flush();
    result
}

fn orchestrator(config: &CliConfig) -> Result<SearchOrchestrator> {
    let registry = config.build_registry()?;
    info!(networks = registry.len(), "backends ready");
    Ok(SearchOrchestrator::new(
        Arc::new(registry),
        config.discovery.clone(),
    ))
}

/// Search agents and print the response envelope
async fn cmd_search(config: &CliConfig, params: SearchParams, page: PageArgs) -> Result<()> {
    let orch = orchestrator(config)?;
    let page_size = page.page_size.unwrap_or(config.discovery.default_page_size);
    let response = orch
        .search(params, page_size, page.cursor.as_deref(), page.sort.as_deref())
        .await
        .context("Search failed")?;
    print_response(&response)
}

/// Rank agents by reputation and print the response envelope
async fn cmd_reputation(config: &CliConfig, query: ReputationQuery, page: PageArgs) -> Result<()> {
    let orch = orchestrator(config)?;
    let page_size = page.page_size.unwrap_or(config.discovery.default_page_size);
    let response = orch
        .search_by_reputation(query, page_size, page.cursor.as_deref(), page.sort.as_deref())
        .await
        .context("Reputation search failed")?;
    print_response(&response)
}

/// List configured networks
fn cmd_networks(config: &CliConfig) -> Result<()> {
    if config.networks.is_empty() {
        println!("No networks configured. Add [[networks]] entries to the config file.");
        return Ok(());
    }

    for entry in &config.networks {
        let prefix = if entry.id == config.discovery.default_network {
            "* "
        } else {
            "  "
        };
        println!(
            "{}{:<10} {:<20} {}",
            prefix,
            entry.id,
            entry.name.as_deref().unwrap_or("-"),
            entry.snapshot.display()
        );
    }

    Ok(())
}

fn print_response(response: &SearchResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}
