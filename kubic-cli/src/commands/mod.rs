//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod access;
mod gke;
mod image;
mod init;
mod manifest;
mod status;

pub use gke::GkeCommands;

use anyhow::Result;
use clap::Subcommand;
use kubic_core::cluster::ClusterType;
use kubic_runner::ToolRunner;
use std::path::PathBuf;

use crate::config::Config;
use crate::workspace::Workspace;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Report the status of the kubic-ci project
    Status,
    /// Create the `.ci3` project folder with starter files
    Init,
    /// Render a template with the project vars and print it
    Show {
        /// Path to the template with k8s configuration
        template: PathBuf,
    },
    /// Render a template and apply it with `kubectl apply`
    Apply {
        /// Path to the template with k8s configuration
        template: PathBuf,
    },
    /// Print shell commands switching to a cluster, use as `source <(kubic access <cluster_name>)`
    Access {
        /// Name of the cluster, matching `.ci3/vars/clusters/<cluster_name>.yaml`
        cluster_name: String,

        /// Cluster type, read from the cluster vars when omitted
        #[arg(short = 't', long = "type")]
        cluster_type: Option<ClusterType>,
    },
    /// Apply `.ci3/deploy.yaml`, optionally rolling a deployment to the current commit
    Deploy {
        /// Deployment (and container) to update to the image tagged with the current commit
        #[arg(short, long)]
        deployment: Option<String>,
    },
    /// Build docker images of all configured containers
    Build,
    /// Push docker images of all configured containers
    Push,
    /// Google Kubernetes Engine helpers
    Gke {
        #[command(subcommand)]
        command: Option<GkeCommands>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
/// * `runner` - Runner for external tools
pub async fn handle_command(
    command: Commands,
    config: &Config,
    runner: &dyn ToolRunner,
) -> Result<()> {
    let ws = Workspace::new(config, runner);

    match command {
        Commands::Status => status::handle_status(&ws).await,
        Commands::Init => init::handle_init(&ws).map(|_| ()),
        Commands::Show { template } => manifest::handle_show(&ws, &template).await,
        Commands::Apply { template } => manifest::apply_template(&ws, &template).await.map(|_| ()),
        Commands::Access {
            cluster_name,
            cluster_type,
        } => access::handle_access(&ws, &cluster_name, cluster_type).await,
        Commands::Deploy { deployment } => manifest::handle_deploy(&ws, deployment.as_deref()).await,
        Commands::Build => image::handle_build(&ws).await,
        Commands::Push => image::handle_push(&ws).await,
        Commands::Gke { command } => gke::handle_gke_command(&ws, command).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the command tests

    use std::path::Path;

    use crate::config::Config;

    pub fn config(root: &Path) -> Config {
        Config {
            project_dir: root.to_path_buf(),
            cluster: Some("minikube".to_string()),
            namespace: None,
            namespace_on_command_line: false,
            verbosity: 0,
        }
    }
}
