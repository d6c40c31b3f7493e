//! Research Agent - Main Entry Point
//!
//! Loads configuration, runs the explicit bootstrap step, builds the agent
//! binding and exposes it on the command line for inspection and manual tool
//! calls.

use clap::{Parser, Subcommand};
use research_agent::config::AgentConfig;
use research_agent::observability::init_default_logging;
use research_agent::{bootstrap, AgentBinding};
use serde_json::Value;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Research tools for a tool-calling LLM agent
#[derive(Parser)]
#[command(name = "research-agent")]
#[command(about = "Web search, page fetch and clock tools for a research agent")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "RESEARCH_AGENT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool declarations handed to the model
    Tools,
    /// Run one tool call and print its result
    Call {
        /// Tool name, e.g. search_google
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
    /// Print the agent instruction
    Instruction,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting research-agent v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<AgentConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Ok(AgentConfig::load_from_file(path)?)
        }
        None => {
            let default_paths = ["research-agent.toml", "config/research-agent.toml"];

            for path_str in default_paths {
                let path = PathBuf::from(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return Ok(AgentConfig::load_from_file(&path)?);
                }
            }

            info!("No configuration file found, using defaults");
            Ok(AgentConfig::default())
        }
    }
}

async fn run(command: Commands, config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Config { show } = command {
        if show {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        info!("Configuration validation complete");
        return Ok(());
    }

    // Bootstrap runs once, before any tool is constructed
    let runtime = bootstrap::initialize(&config.cloud)?;
    let binding = AgentBinding::new(&config, runtime);

    match command {
        Commands::Tools => {
            println!(
                "{}",
                serde_json::to_string_pretty(&binding.tool_declarations())?
            );
        }
        Commands::Call { tool, params } => {
            let arguments: Value = serde_json::from_str(&params)?;
            let result = binding.handle_tool_call(&tool, &arguments).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Instruction => println!("{}", binding.instruction()),
        Commands::Config { .. } => {}
    }

    Ok(())
}
