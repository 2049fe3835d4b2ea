//! kubic-ci CLI
//!
//! Renders the templated Kubernetes manifests of a project and drives
//! docker, kubectl and gcloud to build, push and deploy it.

mod commands;
mod config;
mod workspace;

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use kubic_core::Ci3Error;
use kubic_core::cluster::{CLUSTER_NAME_ENV, NAMESPACE_ENV};
use kubic_runner::SystemRunner;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kubic")]
#[command(version, about = "kubic-ci: build, render and deploy Kubernetes projects", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory containing the `.ci3` project folder
    #[arg(short = 'C', long, default_value = ".", global = true)]
    project_dir: PathBuf,

    /// Cluster to target
    #[arg(long, env = CLUSTER_NAME_ENV, global = true)]
    cluster: Option<String>,

    /// Namespace to use instead of the one derived from the git branch
    #[arg(short, long, env = NAMESPACE_ENV, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let config = Config {
        project_dir: cli.project_dir,
        cluster: cli.cluster,
        namespace: cli.namespace,
        namespace_on_command_line: namespace_on_command_line(&matches),
        verbosity: cli.verbose,
    };

    // Logs go to stderr, stdout may be sourced by a shell
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let runner = SystemRunner::new();
    if let Err(err) = handle_command(cli.command, &config, &runner).await {
        std::process::exit(report(err)?);
    }
    Ok(())
}

/// Whether `--namespace` was typed rather than read from `CI3_NAMESPACE`
fn namespace_on_command_line(matches: &ArgMatches) -> bool {
    matches.value_source("namespace") == Some(ValueSource::CommandLine)
}

/// Prints an error kubic-ci knows how to explain and returns the exit code
///
/// Anything else is handed back so it surfaces with full detail.
fn report(err: anyhow::Error) -> Result<i32> {
    match user_message(&err) {
        Some(message) => {
            eprintln!("{}", message.red());
            Ok(1)
        }
        None => Err(err),
    }
}

/// Message of an error chain holding a [`Ci3Error`], with any added context
fn user_message(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .any(|cause| cause.is::<Ci3Error>())
        .then(|| format!("{:#}", err))
}
