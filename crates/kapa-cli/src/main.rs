//! kapa CLI - manage Chronograf alert rules as Kapacitor tasks
//!
//! Usage:
//!   kapa init                          Write a default .kapa/config.toml
//!   kapa create --rule <file>          Deploy a rule as a new task
//!   kapa update <href> --rule <file>   Replace a task's script
//!   kapa enable|disable <href>         Start or stop a task
//!   kapa delete <href>                 Remove a task
//!   kapa get <id>                      Read a task back as a rule
//!   kapa list                          Read every task back as a rule
//!   kapa status [href]                 Status of one task or all tasks
//!
//! Rules are JSON. The TICKscript to deploy comes from the rule's
//! `tickscript` field or from `--script`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kapa_core::{AlertRule, KapaConfig, KapacitorConfig, TickScript};
use kapa_orchestrator::{AttachedScript, OpaqueScripts, TaskManager, UpdateOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "kapa")]
#[command(author, version, about = "Manage Chronograf alert rules as Kapacitor tasks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding .kapa/config.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Kapacitor URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Kapacitor username (overrides config)
    #[arg(long)]
    username: Option<String>,

    /// Kapacitor password (overrides config)
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Deploy a rule as a new, enabled task
    Create {
        /// Rule file (JSON)
        #[arg(long)]
        rule: PathBuf,

        /// TICKscript file to deploy instead of the rule's own
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Replace a task's script and bindings
    Update {
        /// Task link, e.g. /kapacitor/v1/tasks/<id>
        href: String,

        /// Rule file (JSON)
        #[arg(long)]
        rule: PathBuf,

        /// TICKscript file to deploy instead of the rule's own
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Enable a task
    Enable {
        /// Task link
        href: String,
    },

    /// Disable a task
    Disable {
        /// Task link
        href: String,
    },

    /// Delete a task
    Delete {
        /// Task link
        href: String,
    },

    /// Read a task back as a rule
    Get {
        /// Task ID
        id: String,
    },

    /// Read every task back as a rule
    List,

    /// Show task status
    Status {
        /// Task link; omit for every task
        href: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init = cli.command {
        return cmd_init(&cli.config_dir);
    }

    let config = load_config(&cli)?;
    let manager = TaskManager::connect(&config, AttachedScript, OpaqueScripts)
        .context("Failed to set up Kapacitor client")?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Create { rule, script } => {
            let rule = load_rule(&rule, script.as_deref())?;
            let task = manager.create(rule).await?;
            info!("Created task {}", task.id);
            print_json(&task)
        }
        Commands::Update { href, rule, script } => {
            let rule = load_rule(&rule, script.as_deref())?;
            match manager.update_phased(&href, rule).await {
                UpdateOutcome::Completed(task) => print_json(&task),
                UpdateOutcome::NotApplied { phase, error } => {
                    Err(error).with_context(|| format!("Update failed at {}; task unchanged", phase))
                }
                UpdateOutcome::LeftDisabled { task, error } => Err(error).with_context(|| {
                    format!(
                        "Task {} has the new script but is disabled; run `kapa enable {}`",
                        task.id, task.href
                    )
                }),
            }
        }
        Commands::Enable { href } => print_json(&manager.enable(&href).await?),
        Commands::Disable { href } => print_json(&manager.disable(&href).await?),
        Commands::Delete { href } => {
            manager.delete(&href).await?;
            info!("Deleted {}", href);
            Ok(())
        }
        Commands::Get { id } => print_json(&manager.get(&id).await?),
        Commands::List => print_json(&manager.all().await?),
        Commands::Status { href: Some(href) } => {
            println!("{}", manager.status(&href).await?);
            Ok(())
        }
        Commands::Status { href: None } => print_json(&manager.all_status().await?),
    }
}

fn cmd_init(dir: &Path) -> Result<()> {
    KapaConfig::write_default(dir).context("Failed to write config")?;
    println!("Created {}", dir.join(".kapa/config.toml").display());
    Ok(())
}

/// File config with command-line overrides applied
fn load_config(cli: &Cli) -> Result<KapacitorConfig> {
    let mut config = KapaConfig::load_or_default(&cli.config_dir)
        .context("Failed to load config")?
        .kapacitor;

    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    Ok(config)
}

fn load_rule(path: &Path, script: Option<&Path>) -> Result<AlertRule> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    let mut rule: AlertRule =
        serde_json::from_str(&content).context("Failed to parse rule JSON")?;

    if let Some(script_path) = script {
        let script = std::fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read script {}", script_path.display()))?;
        rule.tick_script = TickScript::new(script);
    }
    Ok(rule)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
