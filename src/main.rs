use clap::{Parser, Subcommand};
use ofguard::config;
use ofguard::controller::{Controller, LoggingActuator};
use ofguard::replay::{self, Trace};
use ofguard::telemetry::init_logging;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser)]
#[command(name = "ofguard")]
#[command(about = "Whitelist-enforcing OpenFlow controller with topology learning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Replay a trace of switch events and print the resulting state
    Replay {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Path to the trace file
        #[arg(short, long)]
        trace: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config.toml
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Print the effective configuration with all defaults filled in
    Show {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { action } => {
            // RUST_LOG env var takes priority
            init_logging(None);
            match action {
                ConfigAction::Validate {
                    config: config_path,
                } => cmd_config_validate(&config_path),
                ConfigAction::Show {
                    config: config_path,
                } => cmd_config_show(&config_path),
            }
        }
        Commands::Replay {
            config: config_path,
            trace,
        } => cmd_replay(&config_path, &trace),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_config_validate(config_path: &Path) -> Result<(), String> {
    println!("[INFO] Validating {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        Err("Validation failed".to_string())
    } else {
        println!("[INFO] Configuration is valid");
        Ok(())
    }
}

fn cmd_config_show(config_path: &Path) -> Result<(), String> {
    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;
    let text = config::to_toml(&cfg).map_err(|e| format!("Failed to render config: {}", e))?;

    println!("# Effective configuration for {}\n", config_path.display());
    print!("{}", text);
    Ok(())
}

fn cmd_replay(config_path: &Path, trace_path: &Path) -> Result<(), String> {
    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;
    init_logging(Some(&cfg.logging));

    let validation = config::validate(&cfg);
    if validation.has_errors() {
        validation.print_diagnostics();
        return Err("Validation failed".to_string());
    }

    let trace = Trace::load(trace_path).map_err(|e| format!("Failed to load trace: {}", e))?;
    info!(
        "Replaying {} events from {}",
        trace.events.len(),
        trace_path.display()
    );

    let controller = Arc::new(Controller::from_config(&cfg, Arc::new(LoggingActuator)));

    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;
    let report = rt
        .block_on(replay::replay(controller, &trace, cfg.stats_interval()))
        .map_err(|e| format!("Replay failed: {}", e))?;

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    println!("{}", json);
    Ok(())
}
