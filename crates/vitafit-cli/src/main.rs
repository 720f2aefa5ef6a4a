mod config;
mod plan_cmd;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vitafit_core::api::{Backend, HttpBackend};
use vitafit_core::chat::ChatController;
use vitafit_core::config::BackendConfig;
use vitafit_core::metrics;
use vitafit_core::session::SessionId;
use vitafit_core::units::{LengthUnit, MassUnit};

use config::VitafitConfig;

#[derive(Parser)]
#[command(name = "vitafit", about = "Guided fitness planning: BMI, exercise and diet plans, reports, coaching chat")]
struct Cli {
    /// Backend base URL (overrides VITAFIT_BACKEND_URL env var)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a vitafit config file
    Init {
        /// Directory downloaded reports are written to
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Compute BMI locally (no backend call)
    Bmi {
        #[arg(long)]
        height: String,
        #[arg(long, default_value_t = LengthUnit::Cm)]
        height_unit: LengthUnit,
        #[arg(long)]
        weight: String,
        #[arg(long, default_value_t = MassUnit::Kg)]
        weight_unit: MassUnit,
    },
    /// Validate the form and run the planning workflow
    Plan(plan_cmd::PlanArgs),
    /// Open the chat dashboard for an existing session
    Chat {
        /// Session ID printed by `vitafit plan`
        #[arg(long)]
        session_id: String,
    },
}

impl Commands {
    /// Whether this command takes over the terminal.
    fn is_interactive(&self) -> bool {
        match self {
            Self::Chat { .. } => true,
            Self::Plan(args) => args.chat,
            Self::Init { .. } | Self::Bmi { .. } => false,
        }
    }
}

/// Execute the `vitafit init` command: write config file.
fn cmd_init(
    backend_url: Option<&str>,
    output_dir: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let url = BackendConfig::new(backend_url.unwrap_or(BackendConfig::DEFAULT_URL)).base_url;
    let cfg = config::ConfigFile {
        backend: config::BackendSection { url: url.clone() },
        report: config::ReportSection { output_dir },
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  backend.url = {url}");
    if let Some(dir) = &cfg.report.output_dir {
        println!("  report.output_dir = {}", dir.display());
    }

    Ok(())
}

/// Execute the `vitafit bmi` command.
fn cmd_bmi(height: &str, height_unit: LengthUnit, weight: &str, weight_unit: MassUnit) {
    match metrics::bmi_from_text(height, height_unit, weight, weight_unit) {
        Some(bmi) => println!("BMI: {bmi:.2}"),
        None => println!("BMI: no value (height and weight must be positive numbers)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep routine logs out of the alternate screen.
    let default_filter = if cli.command.is_interactive() { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Init { output_dir, force } => {
            cmd_init(cli.backend_url.as_deref(), output_dir, force)?;
        }
        Commands::Bmi {
            height,
            height_unit,
            weight,
            weight_unit,
        } => {
            cmd_bmi(&height, height_unit, &weight, weight_unit);
        }
        Commands::Plan(args) => {
            let resolved = VitafitConfig::resolve(cli.backend_url.as_deref(), args.output_dir.as_deref())?;
            plan_cmd::run_plan(args, &resolved).await?;
        }
        Commands::Chat { session_id } => {
            let session: SessionId = session_id
                .parse()
                .with_context(|| format!("invalid session ID: {session_id}"))?;
            let resolved = VitafitConfig::resolve(cli.backend_url.as_deref(), None)?;
            let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(resolved.backend));
            let chat = ChatController::new(session);
            tui::run_chat(backend, chat).await?;
        }
    }

    Ok(())
}
