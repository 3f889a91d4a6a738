//! appdeck - list, launch and completely uninstall macOS applications

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use appdeck::commands::{apps, uninstall_app, RemovalCoordinator};
use appdeck::models::{AppSettings, UninstallOutcome};
use appdeck::platform::icon_extractor::SystemIconResolver;
use appdeck::utils::{askpass, AppResult};
use appdeck::AppScanner;

#[derive(Parser)]
#[command(name = "appdeck", version, about = "List, launch and uninstall applications")]
struct Cli {
    /// Settings file (defaults to <config dir>/appdeck/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed applications
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show every path an uninstall would remove
    Plan {
        app: String,
        #[arg(long)]
        json: bool,
    },
    /// Move an application and its support files to the Trash
    Uninstall {
        app: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open an application
    Launch { app: String },
    /// Export an application's icon as PNG
    Icon {
        app: String,
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let settings = match cli.config.clone().or_else(AppSettings::default_path) {
        Some(path) => AppSettings::load(&path),
        None => AppSettings::default(),
    };
    askpass::init_askpass_path(settings.askpass_helper());

    match run(cli.command, &settings).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, settings: &AppSettings) -> AppResult<ExitCode> {
    let scanner = AppScanner::from_settings(settings);

    match command {
        Commands::List { json } => {
            let summaries = apps::get_all_apps(&scanner).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for app in &summaries {
                    println!(
                        "{:<40} {:<40} {}",
                        app.display_name,
                        app.bundle_id.as_deref().unwrap_or("-"),
                        app.app_path
                    );
                }
            }
        }
        Commands::Plan { app, json } => {
            let record = apps::find_app(&scanner, &app).await?;
            let coordinator = RemovalCoordinator::from_settings(settings);
            let plan = coordinator.planner().plan(&record);
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                for entry in &plan.entries {
                    println!("{:<20} {:>12}  {}", entry.kind.as_str(), entry.size_bytes, entry.path.display());
                }
                println!("total {} bytes", plan.total_size_bytes());
            }
        }
        Commands::Uninstall { app, yes } => {
            let record = apps::find_app(&scanner, &app).await?;
            let coordinator = RemovalCoordinator::from_settings(settings);

            if !yes {
                let plan = coordinator.planner().plan(&record);
                println!("{} will be moved to the Trash:", record.display_name());
                for entry in &plan.entries {
                    println!("  {}", entry.path.display());
                }
                if !confirm("Continue?")? {
                    println!("Aborted.");
                    return Ok(ExitCode::SUCCESS);
                }
            }

            let report = uninstall_app(&coordinator, settings, &record, &|p| {
                log::debug!("{:?} {}%", p.state, p.percent);
            })
            .await;

            return Ok(match report.outcome {
                UninstallOutcome::Success => {
                    println!("Uninstalled {}", record.display_name());
                    ExitCode::SUCCESS
                }
                UninstallOutcome::Cancelled => {
                    println!("Uninstall cancelled; {} items were already moved to the Trash.", report.trashed.len());
                    ExitCode::from(2)
                }
                UninstallOutcome::Failed(reason) => {
                    eprintln!("Uninstall did not complete: {reason}");
                    ExitCode::FAILURE
                }
            });
        }
        Commands::Launch { app } => {
            let record = apps::find_app(&scanner, &app).await?;
            apps::open_app(&record);
        }
        Commands::Icon { app, out } => {
            let record = apps::find_app(&scanner, &app).await?;
            let resolver = SystemIconResolver::new(settings.icon_size);
            if !apps::export_icon(&record, &resolver, &out)? {
                log::warn!("No icon found for {}; wrote placeholder", record.display_name());
            }
            println!("{}", out.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn confirm(question: &str) -> AppResult<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
