//! Google Cloud SDK calls used for GKE clusters

use kubic_core::Ci3Error;
use kubic_core::cluster::GkeLocation;

use crate::runner::{Invocation, ToolRunner, run_checked};

/// Interactive `gcloud auth login`
pub async fn login(runner: &dyn ToolRunner) -> Result<(), Ci3Error> {
    let inv = Invocation::new("gcloud").args(["auth", "login"]);
    run_checked(runner, inv, "authenticate with", "gcloud").await?;
    Ok(())
}

/// Lists GKE clusters of the active project, output relayed
pub async fn list_clusters(runner: &dyn ToolRunner) -> Result<(), Ci3Error> {
    let inv = Invocation::new("gcloud").args(["container", "clusters", "list"]);
    run_checked(runner, inv, "list clusters with", "gcloud").await?;
    Ok(())
}

/// Fetches kubectl credentials for a GKE cluster
pub async fn get_credentials(
    runner: &dyn ToolRunner,
    cluster: &str,
    location: &GkeLocation,
) -> Result<(), Ci3Error> {
    let mut inv = Invocation::new("gcloud").args(["container", "clusters", "get-credentials", cluster]);
    if let Some(zone) = &location.zone {
        inv = inv.args(["--zone", zone.as_str()]);
    }
    if let Some(project) = &location.project {
        inv = inv.args(["--project", project.as_str()]);
    }
    run_checked(runner, inv, "fetch credentials for cluster", cluster).await?;
    Ok(())
}
