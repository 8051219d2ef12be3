// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mediashare::scaffold::RenderOutcome;
use mediashare::scaffold::manifest::FileStatus;
use mediashare::{check, config, probe, scaffold, server};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "mediashare")]
#[command(author, version, about = "Deployment tooling and runtime service for the MediaShare API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the deployment tree (Ansible project + container build files)
    Init {
        /// Target directory (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite files that were edited locally
        #[arg(short, long)]
        force: bool,
    },
    /// Validate every file of a deployment tree
    Check {
        /// Tree root (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Report files that drifted from the scaffold manifest
    Verify {
        /// Tree root (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Run the MediaShare API server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = config::DEFAULT_BIND)]
        bind: String,
    },
    /// Poll a health endpoint until it answers 200
    Wait {
        /// Health endpoint URL
        #[arg(default_value = "http://127.0.0.1:8000/health")]
        url: String,
        /// Attempts before giving up
        #[arg(short, long, default_value_t = probe::DEFAULT_ATTEMPTS)]
        attempts: u32,
        /// Seconds to pause between attempts
        #[arg(short, long, default_value_t = probe::DEFAULT_DELAY_SECS)]
        delay: u64,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { dir, force }) => {
            info!("Rendering deployment tree into: {}", dir.display());
            let report = scaffold::render(&dir, force)?;

            for (path, outcome) in &report.outcomes {
                println!("  {:<9} {}", outcome.label(), path);
            }
            println!(
                "\nDeployment tree at {}: {} created, {} updated, {} unchanged, {} skipped",
                dir.display(),
                report.count(RenderOutcome::Created),
                report.count(RenderOutcome::Updated),
                report.count(RenderOutcome::Unchanged),
                report.count(RenderOutcome::Skipped),
            );
            if report.has_skips() {
                println!("Re-run with --force to overwrite locally edited files.");
            }
            if report.has_failures() {
                for failure in &report.failures {
                    println!("  error: {}", failure);
                }
                return Err(anyhow::anyhow!(
                    "failed to render {} file(s)",
                    report.failures.len()
                ));
            }
            Ok(())
        }
        Some(Commands::Check { dir }) => {
            info!("Checking deployment tree at: {}", dir.display());
            let report = check::check_tree(&dir)?;

            for finding in &report.findings {
                println!("  {}: {}: {}", finding.severity.label(), finding.path, finding.message);
            }
            println!(
                "Checked {} file(s): {} error(s), {} warning(s)",
                report.files_checked,
                report.error_count(),
                report.warning_count()
            );

            if report.is_ok() {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "validation failed with {} error(s)",
                    report.error_count()
                ))
            }
        }
        Some(Commands::Verify { dir }) => {
            info!("Verifying deployment tree at: {}", dir.display());
            let manifest = scaffold::manifest::Manifest::load(&dir)?;
            let report = manifest.verify_tree(&dir);

            for (path, status) in &report.entries {
                println!("  {:<9} {}", status.label(), path);
            }

            if report.is_clean() {
                println!("\nAll {} tracked file(s) match the manifest.", report.total());
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "{} of {} tracked file(s) drifted from the manifest ({} modified, {} missing)",
                    report.count(FileStatus::Modified) + report.count(FileStatus::Missing),
                    report.total(),
                    report.count(FileStatus::Modified),
                    report.count(FileStatus::Missing)
                ))
            }
        }
        Some(Commands::Serve { bind }) => {
            server::run(&bind, config::ServiceConfig::from_env())?;
            Ok(())
        }
        Some(Commands::Wait {
            url,
            attempts,
            delay,
        }) => {
            info!("Waiting for {} (attempts: {}, delay: {}s)", url, attempts, delay);
            let prober = probe::Prober::new(attempts, Duration::from_secs(delay))?;
            let report = prober.wait_until_healthy(&url)?;

            println!(
                "{} is healthy (attempt {} of {}, {:.1}s elapsed)",
                url,
                report.attempts_used,
                attempts,
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("MediaShare deployment toolkit v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'mediashare --help' for usage information");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_parses_dir_and_force() {
        let cli = Cli::parse_from(["mediashare", "init", "/tmp/deploy", "--force"]);
        match cli.command {
            Some(Commands::Init { dir, force }) => {
                assert_eq!(dir, PathBuf::from("/tmp/deploy"));
                assert!(force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_wait_defaults_match_the_deploy_role() {
        let cli = Cli::parse_from(["mediashare", "wait"]);
        match cli.command {
            Some(Commands::Wait {
                url,
                attempts,
                delay,
            }) => {
                assert_eq!(url, "http://127.0.0.1:8000/health");
                assert_eq!(attempts, 10);
                assert_eq!(delay, 5);
            }
            _ => panic!("expected wait"),
        }
    }

    #[test]
    fn test_serve_default_bind() {
        let cli = Cli::parse_from(["mediashare", "serve"]);
        match cli.command {
            Some(Commands::Serve { bind }) => assert_eq!(bind, config::DEFAULT_BIND),
            _ => panic!("expected serve"),
        }
    }
}
