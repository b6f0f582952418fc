use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloudprint_cli::config::{ConfigManager, get_config};
use cloudprint_cli::output::{OutputFormat, render};
use cloudprint_cli::session::{Session, replay};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudprint-accounts")]
#[command(author, version, about = "Replay cloud-print account sessions against the account reconciler", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted session (.toml or .json) and print the state after each step
    Replay {
        /// Session file
        file: PathBuf,

        /// Output format (defaults to output.default_format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., reconciler.reload_on_active_user_change)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., output.default_format)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("cloudprint_accounts_core", log::LevelFilter::Debug)
            .filter_module("cloudprint_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Commands::Replay {
            file,
            format,
            no_color,
        } => replay_command(file, format, no_color).await,
        Commands::Config { command } => config_command(command),
    }
}

async fn replay_command(file: PathBuf, format: Option<OutputFormat>, no_color: bool) -> Result<()> {
    let config = get_config().context("Failed to load configuration")?;
    let format = match format {
        Some(format) => format,
        None => OutputFormat::from_config(&config.output.default_format)?,
    };
    let use_color = config.output.color_enabled && !no_color;

    let session = Session::load(&file)?;
    let outcome = replay(&session, &config.reconciler).await;

    print!("{}", render(&outcome, format, use_color)?);

    if let Some(failure) = outcome.failure {
        anyhow::bail!(
            "Replay stopped at step {} ({}): {}",
            failure.step,
            failure.action,
            failure.message
        );
    }
    Ok(())
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => {
            println!("{}", manager.get(&key)?);
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value)?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            for (key, value) in manager.list()? {
                println!("{} = {}", key.cyan(), value);
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
    }
    Ok(())
}
