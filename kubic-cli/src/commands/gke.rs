//! GKE command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use kubic_core::cluster::{GkeLocation, validate_name};
use kubic_runner::tools::gcloud;

use crate::commands::access::cluster_vars;
use crate::workspace::Workspace;

/// GKE subcommands
#[derive(Subcommand)]
pub enum GkeCommands {
    /// Authenticate the gcloud SDK
    Login,
    /// List clusters of the active project (default)
    Clusters,
    /// Fetch kubectl credentials for a cluster
    Credentials {
        /// GKE cluster name
        cluster: String,

        /// Compute zone, defaults to `cluster.zone` from the cluster vars
        #[arg(long)]
        zone: Option<String>,

        /// GCP project, defaults to `cluster.project` from the cluster vars
        #[arg(long)]
        project: Option<String>,
    },
}

/// Handle gke commands
pub async fn handle_gke_command(ws: &Workspace<'_>, command: Option<GkeCommands>) -> Result<()> {
    match command.unwrap_or(GkeCommands::Clusters) {
        GkeCommands::Login => gcloud::login(ws.runner()).await?,
        GkeCommands::Clusters => gcloud::list_clusters(ws.runner()).await?,
        GkeCommands::Credentials {
            cluster,
            zone,
            project,
        } => {
            validate_name("cluster", &cluster)?;
            let vars = cluster_vars(ws, &cluster)?;
            let defaults = GkeLocation::from_vars(vars.as_ref());
            let location = GkeLocation {
                zone: zone.or(defaults.zone),
                project: project.or(defaults.project),
            };

            gcloud::get_credentials(ws.runner(), &cluster, &location).await?;
            println!(
                "{} Run {} to use it",
                "Credentials fetched.".green(),
                format!("source <(kubic access {})", cluster).cyan()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::config;
    use kubic_runner::fake::ScriptedRunner;
    use std::fs;

    #[tokio::test]
    async fn test_gke_defaults_to_cluster_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let runner = ScriptedRunner::new();
        let ws = Workspace::new(&config, &runner);

        handle_gke_command(&ws, None).await.unwrap();
        assert_eq!(
            runner.invocations()[0].to_string(),
            "gcloud container clusters list"
        );
    }

    #[tokio::test]
    async fn test_gke_credentials_flags_override_vars() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let runner = ScriptedRunner::new();
        let ws = Workspace::new(&config, &runner);
        ws.project().scaffold().unwrap();
        fs::write(
            ws.project().cluster_vars_file("prod"),
            "cluster:\n  zone: europe-west1-b\n  project: acme\n",
        )
        .unwrap();

        let command = GkeCommands::Credentials {
            cluster: "prod".to_string(),
            zone: Some("us-east1-c".to_string()),
            project: None,
        };
        handle_gke_command(&ws, Some(command)).await.unwrap();
        assert_eq!(
            runner.invocations()[0].to_string(),
            "gcloud container clusters get-credentials prod --zone us-east1-c --project acme"
        );
    }
}
