//! # Text Tasker Configuration Validator
//!
//! Loads and validates text-tasker configuration for an environment and
//! prints the resolved values. Exits with status 1 when validation fails.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use text_tasker::config::{ConfigManager, TaskerConfig};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate text-tasker configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production, ...)
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory path (default: ./config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Validate a single configuration file instead of a directory
    #[arg(short, long, conflicts_with = "config_dir")]
    file: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (summary, json)
    #[arg(long, default_value = "summary")]
    format: String,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match validate(&cli) {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            println!("❌ {e}");
            process::exit(1);
        }
    }
}

fn validate(cli: &Cli) -> anyhow::Result<()> {
    let manager = match (&cli.file, &cli.environment) {
        (Some(file), _) => ConfigManager::load_from_file(file)?,
        (None, Some(environment)) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)?
        }
        (None, None) => ConfigManager::load_from_directory(cli.config_dir.clone())?,
    };

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(manager.config())?),
        _ => print_summary(manager.environment(), manager.config()),
    }
    Ok(())
}

fn print_summary(environment: &str, config: &TaskerConfig) {
    println!("🔧 Text Tasker Configuration");
    println!("Environment: {environment}");
    println!();
    println!("✅ store");
    println!("   backend:            {:?}", config.store.backend);
    println!("   serializer:         {}", config.store.serializer);
    println!("   visibility timeout: {}s", config.store.visibility_timeout_seconds);
    println!("✅ worker");
    println!("   concurrency:        {}", config.worker.concurrency);
    println!("   step delay:         {}ms", config.worker.step_delay_ms);
    println!("   poll interval:      {}ms", config.worker.poll_interval_ms);
    for (pos, step) in config.worker.steps.iter().enumerate() {
        println!("   step {}:             {}", pos + 1, step);
    }
    println!("✅ client");
    println!("   poll interval:      {}ms", config.client.poll_interval_ms);
    println!("✅ logging");
    println!("   format:             {:?}", config.logging.format);
    println!(
        "   level:              {}",
        config.logging.level.as_deref().unwrap_or("(environment default)")
    );
    println!("\n🎉 All configuration validation checks passed!");
}
