//! smellvul CLI - God Class detection and smell/vulnerability data fusion

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use smellvul_core::fusion::FusionSummary;
use smellvul_core::{config, FusionError};
use smellvul_core::{analyze_model_with_thresholds, load_model, render_json, render_text};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smellvul")]
#[command(about = "Flag God Classes and fuse smell metrics with vulnerability data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ATFD/WMC/TCC for every class of an exported code model
    Analyze {
        /// Path to the exported code model (JSON)
        model: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Also write the per-class report as CSV
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Count vulnerabilities per class for every <project>-<version>-...-overall.csv
    Combine {
        /// The output smell directory containing the -overall.csv files
        #[arg(short = 's', long = "smell-dir")]
        smell_dir: PathBuf,

        /// The directory containing one <project>.csv vulnerability file per project
        #[arg(short = 'v', long = "vul-dir")]
        vul_dir: PathBuf,
    },
    /// Merge vulnerability files listed in smellvul.config.json into the smell files
    Integrate,
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            model,
            format,
            output,
            config: config_path,
        } => {
            if !model.exists() {
                anyhow::bail!("Path does not exist: {}", model.display());
            }

            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;
            if let Some(config_path) = &resolved.config_path {
                log::info!("Using config: {}", config_path.display());
            }

            let snapshot = load_model(&model)?;
            let report = analyze_model_with_thresholds(&snapshot, &resolved.thresholds);

            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }

            if let Some(path) = output {
                report.write_csv(&path)?;
                log::info!("Smell report written to {}", path.display());
            }
        }
        Commands::Combine { smell_dir, vul_dir } => {
            if !smell_dir.is_dir() {
                anyhow::bail!("Smell directory does not exist: {}", smell_dir.display());
            }
            match smellvul_core::combine_vulnerabilities(&smell_dir, &vul_dir) {
                Ok(summary) => print_summary(&summary),
                Err(e) => {
                    if e.downcast_ref::<FusionError>().is_some() {
                        log::error!(
                            "Smell files must be named <project>-<version>-...-overall.csv"
                        );
                    }
                    return Err(e);
                }
            }
        }
        Commands::Integrate => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, None)
                .context("failed to load configuration")?;
            if resolved.config_path.is_none() {
                log::warn!(
                    "No {} found in {}; nothing to integrate",
                    config::CONFIG_FILE_NAME,
                    project_root.display()
                );
            }
            let summary =
                smellvul_core::integrate_projects(&resolved.output_root, &resolved.vulnerabilities)?;
            print_summary(&summary);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!("  Output root: {}", resolved.output_root.display());
                println!();
                println!("Thresholds:");
                println!("  atfd: > {}", resolved.thresholds.atfd_few);
                println!("  wmc: >= {}", resolved.thresholds.wmc_very_high);
                println!("  tcc: < {}", resolved.thresholds.tcc_max);
                println!();
                println!("Vulnerabilities:");
                if resolved.vulnerabilities.is_empty() {
                    println!("  none");
                }
                for source in &resolved.vulnerabilities {
                    println!("  {}: {}", source.project, display_path(&source.path));
                }
            }
        },
    }

    Ok(())
}

/// Print what a fusion run produced
fn print_summary(summary: &FusionSummary) {
    println!(
        "Written: {}  Skipped: {}  Warnings: {}",
        summary.written.len(),
        summary.skipped.len(),
        summary.warnings.len()
    );
    for path in &summary.written {
        println!("  wrote {}", path.display());
    }
    for skipped in &summary.skipped {
        println!("  skipped {}: {}", skipped.project, skipped.reason);
    }
}

fn display_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}
