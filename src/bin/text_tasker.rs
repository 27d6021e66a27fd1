//! # Text Tasker Runner
//!
//! Boots the in-process system, submits one text, polls its progress until
//! it settles and prints every payload as a JSON line.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use text_tasker::config::ConfigManager;
use text_tasker::logging;
use text_tasker::orchestration::TextTaskerSystem;
use text_tasker::state_machine::TaskState;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "text-tasker")]
#[command(about = "Submit text for background processing and poll its progress")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Text to process (multiple arguments are joined with spaces)
    #[arg(required = true)]
    text: Vec<String>,

    /// Run the quick analysis instead of the full step pipeline
    #[arg(short, long)]
    quick: bool,

    /// Configuration directory path (default: ./config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Environment override (default: TEXT_TASKER_ENV, APP_ENV or development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Give up polling after this many seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    };
    let config_manager = match loaded {
        Ok(manager) => manager,
        Err(e) => {
            logging::init_structured_logging();
            error!(error = %e, "❌ Configuration could not be loaded");
            return Err(e).context("Failed to load configuration");
        }
    };

    logging::init_with_config(
        &config_manager.config().logging,
        config_manager.environment(),
    );

    let poll_interval = config_manager.config().client.poll_interval();
    let system = TextTaskerSystem::bootstrap(config_manager).await?;

    let text = cli.text.join(" ");
    let task_id = if cli.quick {
        system.tasks().submit_quick_analysis(&text).await?
    } else {
        system.tasks().submit_full_processing(&text).await?
    };
    info!(task_id = %task_id, quick = cli.quick, "Task submitted");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(cli.timeout_secs);
    loop {
        let payload = system.progress().get_progress(&task_id).await;
        println!("{}", payload.to_json());

        if payload.state.is_terminal() || payload.state == TaskState::NotFound {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(task_id = %task_id, "Gave up waiting for task to finish");
            break;
        }
        tokio::time::sleep(poll_interval).await;
    }

    let result = system.progress().get_result(&task_id).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    system.shutdown().await?;
    Ok(())
}
