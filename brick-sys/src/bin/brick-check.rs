// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use brick_sys::validate::report;
use brick_sys::{is_local_address, BrickConfig, BrickPathValidator};
use brick_types::{BrickSpec, Outcome, ValidationReport, VolumeId};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "brick-check")]
#[command(about = "Validate and claim brick directories for a storage volume")]
struct Args {
    /// Config file (defaults to $BRICK_CHECK_CONFIG, then /etc/brick-check/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the brick directory and check its placement
    Validate {
        /// Brick in the form host:path
        brick: BrickSpec,

        #[arg(long)]
        force: bool,
    },
    /// Validate the brick and mark it as used by a volume
    Claim {
        brick: BrickSpec,

        /// Volume id to record; a random one is generated when omitted
        #[arg(long)]
        volume_id: Option<VolumeId>,

        #[arg(long)]
        force: bool,
    },
    /// Report whether a host name resolves to this machine
    IsLocal { host: String },
}

fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("brick_check=info,brick_sys=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let report = match &args.command {
        Command::IsLocal { host } => return is_local(host),
        Command::Validate { brick, force } => {
            let validator = load_validator(args.config.as_deref())?;
            let result = validator.check(brick, *force);
            report(brick, None, *force, &result)
        }
        Command::Claim {
            brick,
            volume_id,
            force,
        } => {
            let validator = load_validator(args.config.as_deref())?;
            let volume_id = volume_id.unwrap_or_else(VolumeId::new_random);
            let result = validator.provision(brick, &volume_id, *force);
            report(brick, Some(volume_id), *force, &result)
        }
    };

    print_report(&report, args.json)?;

    Ok(if report.outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_validator(config: Option<&Path>) -> Result<BrickPathValidator> {
    let config = BrickConfig::discover(config)?;
    tracing::debug!(
        "Using claim walk {}, dir mode {:#o}, require local host {}",
        config.claim_walk,
        config.dir_mode,
        config.require_local_host
    );
    Ok(BrickPathValidator::from_config(&config))
}

fn is_local(host: &str) -> Result<ExitCode> {
    let local =
        is_local_address(host).with_context(|| format!("failed to resolve host {host}"))?;
    println!("{}", local);
    Ok(if local {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &ValidationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    let brick = format!("{}:{}", report.host, report.path.display());
    match &report.outcome {
        Outcome::Ok => match report.volume_id {
            Some(volume_id) => println!("{brick}: ok (claimed for volume {volume_id})"),
            None => println!("{brick}: ok"),
        },
        Outcome::Failed { kind, message } => {
            println!("{brick}: {kind}: {message}");
            if kind.is_forceable() && !report.force {
                println!("  (use --force to override this check)");
            }
        }
    }
    Ok(())
}
