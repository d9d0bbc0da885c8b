//! Recon Sentinel CLI - Command-line interface for Recon Sentinel
//!
//! Runs investigations end to end from the terminal, or interactively through the shell.

mod shell;

use clap::{Parser, Subcommand};
use sentinel_applications::{
    ApplicationError, InvestigationEvent, InvestigationSnapshot, SentinelApplication,
};
use sentinel_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success,
    not_found_error, ErrorContext, LoggingConfig, SentinelConfig, SentinelError, SentinelResult,
    SimulatorConfig,
};
use shell::InvestigationShell;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "An OSINT investigation assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Investigate a subject: generate queries and run every search
    Investigate {
        /// Name, username or other identifier to investigate
        subject: String,

        /// Ask for follow-up queries once the searches are done, and run them
        #[arg(long)]
        suggest: bool,

        /// Summarize the findings into a profile
        #[arg(long)]
        summarize: bool,

        /// Print the final investigation state as JSON
        #[arg(long)]
        json: bool,

        /// Skip the simulated search latency
        #[arg(long)]
        instant: bool,
    },

    /// Interactive investigation shell
    Shell {
        /// Skip the simulated search latency
        #[arg(long)]
        instant: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> SentinelResult<()> {
    let cli = Cli::parse();

    let mut logging_config = LoggingConfig::default().with_level("warn");
    if cli.verbose {
        logging_config = logging_config.with_level("debug");
    }

    init_logging(&logging_config).map_err(|e| SentinelError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check the RUST_LOG environment variable"),
    })?;

    info!("Starting Recon Sentinel CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Investigate {
            subject,
            suggest,
            summarize,
            json,
            instant,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let application = build_application(config, instant).await?;
            handle_investigate(&application, &subject, suggest, summarize, json).await?;
        }
        Commands::Shell { instant } => {
            let config = load_config(cli.config.as_ref())?;
            let application = build_application(config, instant).await?;
            InvestigationShell::new(application.investigations().clone())
                .run()
                .await?;
        }
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(cli.config.as_ref(), show, init, validate).await?;
        }
    }

    Ok(())
}

fn load_config(config_path: Option<&PathBuf>) -> SentinelResult<SentinelConfig> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(not_found_error!(
                format!("configuration file {:?}", path),
                "cli"
            ));
        }
        info!("Loading configuration from {:?}", path);
        return SentinelConfig::from_file(path);
    }

    let default_paths = [
        Some(default_config_path()),
        dirs::home_dir().map(|d| d.join(".recon-sentinel").join("config.toml")),
        Some(PathBuf::from("sentinel.toml")),
    ];

    for path in default_paths.iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return SentinelConfig::from_file(path);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(SentinelConfig::default())
}

/// Default location written by `config --init`
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recon-sentinel")
        .join("config.toml")
}

async fn build_application(
    mut config: SentinelConfig,
    instant: bool,
) -> SentinelResult<SentinelApplication> {
    if instant {
        config.simulator = SimulatorConfig {
            seed: config.simulator.seed,
            ..SimulatorConfig::instant()
        };
    }

    SentinelApplication::new(config).await.map_err(|e| {
        log_operation_error!("build_application", e);
        into_sentinel_error(e, "build_application")
    })
}

/// Fold an application error into the CLI's error type
pub(crate) fn into_sentinel_error(err: ApplicationError, operation: &str) -> SentinelError {
    match err {
        ApplicationError::Core(e) => e,
        ApplicationError::Gateway(e) => SentinelError::Gateway(e),
        ApplicationError::Validation { field, message } => SentinelError::Validation {
            message,
            field: Some(field),
            context: ErrorContext::new("cli").with_operation(operation),
        },
        other => SentinelError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
            context: ErrorContext::new("cli").with_operation(operation),
        },
    }
}

async fn handle_investigate(
    application: &SentinelApplication,
    subject: &str,
    suggest: bool,
    summarize: bool,
    json: bool,
) -> SentinelResult<()> {
    log_operation_start!("investigate", subject = %subject);

    let investigations = application.investigations();
    let mut events = investigations.subscribe();
    let quiet = json;

    let started = investigations
        .start_investigation(subject)
        .await
        .map_err(|e| into_sentinel_error(e, "start_investigation"))?;
    print_notifications(&mut events, quiet);
    if !quiet {
        println!("Queries:");
        for (i, query) in started.queries.iter().enumerate() {
            println!("  {}. {}", i + 1, query);
        }
        println!();
    }

    run_searches(application, &mut events, quiet).await?;

    if suggest {
        match investigations.request_suggestions().await {
            Ok(outcome) => {
                print_notifications(&mut events, quiet);
                if !quiet {
                    for query in &outcome.added {
                        println!("  + {}", query);
                    }
                }
                run_searches(application, &mut events, quiet).await?;
            }
            Err(ApplicationError::InsufficientFindings { .. }) if !quiet => {
                println!("Not enough findings to suggest new queries.");
            }
            Err(ApplicationError::InsufficientFindings { .. }) => {}
            Err(e) => return Err(into_sentinel_error(e, "request_suggestions")),
        }
    }

    if summarize {
        match investigations.request_summary().await {
            Ok(summary) => {
                print_notifications(&mut events, quiet);
                if !quiet {
                    println!("\nProfile summary:\n{}", summary);
                }
            }
            Err(ApplicationError::InsufficientFindings { .. }) if !quiet => {
                println!("Not enough findings to summarize.");
            }
            Err(ApplicationError::InsufficientFindings { .. }) => {}
            Err(e) => return Err(into_sentinel_error(e, "request_summary")),
        }
    }

    let snapshot = investigations.snapshot().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    log_operation_success!(
        "investigate",
        subject = %subject,
        findings = snapshot.findings.len()
    );
    Ok(())
}

async fn run_searches(
    application: &SentinelApplication,
    events: &mut broadcast::Receiver<InvestigationEvent>,
    quiet: bool,
) -> SentinelResult<()> {
    let investigations = application.investigations();
    let before = investigations.snapshot().await.findings.len();

    investigations
        .run_all_pending()
        .await
        .map_err(|e| into_sentinel_error(e, "run_all_pending"))?;
    print_notifications(events, quiet);

    if !quiet {
        let snapshot = investigations.snapshot().await;
        print_new_findings(&snapshot, before);
    }
    Ok(())
}

/// Findings are newest-first; print the ones added since `before`
fn print_new_findings(snapshot: &InvestigationSnapshot, before: usize) {
    let added = snapshot.findings.len().saturating_sub(before);
    for finding in snapshot.findings.iter().take(added).rev() {
        println!("[{}] {}", finding.finding_type, finding.title);
        println!("    {}", finding.content);
    }
    if added > 0 {
        println!();
    }
}

fn print_notifications(events: &mut broadcast::Receiver<InvestigationEvent>, quiet: bool) {
    loop {
        match events.try_recv() {
            Ok(InvestigationEvent::Notification(notification)) if !quiet => {
                eprintln!("{}: {}", notification.title, notification.description);
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

async fn handle_config(
    config_path: Option<&PathBuf>,
    show: bool,
    init: bool,
    validate: bool,
) -> SentinelResult<()> {
    if init {
        let path = config_path.cloned().unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        SentinelConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at: {:?}", path);
        println!("Edit the file to choose an LLM provider and model.");
    }

    if show {
        let config = load_config(config_path)?;
        println!("{}", config.to_toml_string()?);
    }

    if validate {
        let config = load_config(config_path)?;
        match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                println!("Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
