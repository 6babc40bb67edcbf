//! Playground news plugin - command line entry point
//!
//! Runs the GET_CURRENT_NEWS action once against a message typed on the
//! command line, using an OpenAI model for term extraction and an
//! in-process memory store.

use clap::{Parser, Subcommand};
use playground_news::actions::current_news::ActionSettings;
use playground_news::actions::GetCurrentNewsAction;
use playground_news::config::PluginConfig;
use playground_news::llm::providers::{OpenAiConfig, OpenAiProvider};
use playground_news::llm::{LlmProvider, LlmTextGenerator};
use playground_news::news::{NewsApiClient, NewsApiConfig};
use playground_news::observability::init_default_logging;
use playground_news::plugin::{playground_plugin, playground_plugin_from_config};
use playground_news::runtime::{
    AgentRuntime, Content, InMemoryMemoryManager, Memory, StdoutCallback,
};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Agent playground news action
#[derive(Parser)]
#[command(name = "playground-news")]
#[command(about = "Run the GET_CURRENT_NEWS action from the command line")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "PLAYGROUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one message and print the news response
    Run {
        /// Message text as the user would type it
        #[arg(long)]
        text: String,
        /// Pre-parsed search term, sent as `params.searchTerm`
        #[arg(long)]
        search_term: Option<String>,
        /// Source tag for the message
        #[arg(long, default_value = "cli")]
        source: String,
    },
    /// Print the plugin's action metadata as JSON
    Describe,
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

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run {
            text,
            search_term,
            source,
        } => run_action(&config, text, search_term, source).await,
        Commands::Describe => describe_plugin(&config),
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<PluginConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(PluginConfig::load_from_file(path)?);
    }

    for path_str in ["playground.toml", "config/playground.toml"] {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(PluginConfig::load_from_file(&path)?);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(PluginConfig::default())
}

/// Provider factory for creating LLM providers from configuration
fn create_llm_provider(
    config: &PluginConfig,
) -> Result<Arc<dyn LlmProvider>, Box<dyn std::error::Error>> {
    match config.llm.provider.as_str() {
        "openai" => {
            let mut openai_config = OpenAiConfig {
                api_key: config.llm_api_key()?,
                timeout: Duration::from_millis(config.action.extraction_timeout_ms),
                max_retries: config.llm.max_retries,
                ..Default::default()
            };
            if let Some(base_url) = &config.llm.base_url {
                openai_config.base_url = base_url.trim_end_matches('/').to_string();
            }
            Ok(Arc::new(OpenAiProvider::new(openai_config)?))
        }
        provider => Err(format!("Unsupported LLM provider: {provider}").into()),
    }
}

async fn run_action(
    config: &PluginConfig,
    text: String,
    search_term: Option<String>,
    source: String,
) -> Result<(), Box<dyn std::error::Error>> {
    // Both keys are resolved up front so a missing one fails before any I/O
    let plugin = playground_plugin_from_config(config)?;
    let provider = create_llm_provider(config)?;

    let memory = Arc::new(InMemoryMemoryManager::new());
    let runtime = AgentRuntime::new(
        Uuid::new_v4(),
        Arc::new(LlmTextGenerator::new(provider, &config.llm)),
        memory.clone(),
    );

    let mut content = Content::text(text).with_source(source);
    if let Some(term) = search_term {
        content = content.with_params(json!({ "searchTerm": term }));
    }
    let message = Memory::new(Uuid::new_v4(), runtime.agent_id(), Uuid::new_v4(), content);

    let action = plugin
        .action("GET_CURRENT_NEWS")
        .ok_or("GET_CURRENT_NEWS is not registered")?;

    if !action.validate(&runtime, &message).await {
        warn!("Message rejected by validation policy {:?}", config.action.validation);
        return Err("message does not apply to GET_CURRENT_NEWS".into());
    }

    action
        .handler(&runtime, &message, &StdoutCallback)
        .await
        .map_err(|e| e.sanitized_message())?;

    info!("Stored {} memory record(s)", memory.len().await);
    Ok(())
}

/// Metadata only, so no API key is required
fn describe_plugin(config: &PluginConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = NewsApiClient::new(NewsApiConfig {
        base_url: config.news.base_url.clone(),
        ..Default::default()
    })?;
    let plugin = playground_plugin(GetCurrentNewsAction::new(
        Arc::new(client),
        ActionSettings::from_config(config),
    ));
    let manifest = json!({
        "name": plugin.name(),
        "description": plugin.description(),
        "actions": plugin.describe_actions(),
    });
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

fn handle_config_command(
    config: &PluginConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if let Err(e) = config.news_api_config() {
        warn!("News API key not available: {}", e);
    }

    if show {
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
