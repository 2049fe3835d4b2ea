//! Access command handler
//!
//! Prints shell commands instead of running them: exporting variables has to
//! happen in the user's shell, e.g. `source <(kubic access minikube)`.

use anyhow::Result;
use kubic_core::cluster::{AccessPlan, ClusterType, GkeLocation, validate_name};
use kubic_core::vars::{VarMap, load_var_file};
use tracing::{debug, warn};

use crate::workspace::Workspace;

/// Vars file of a cluster, when the project has one
pub(crate) fn cluster_vars(ws: &Workspace<'_>, cluster_name: &str) -> Result<Option<VarMap>> {
    let project = ws.project();
    if !project.exists() {
        debug!("No project folder, using defaults for cluster {}", cluster_name);
        return Ok(None);
    }

    let path = project.cluster_vars_file(cluster_name);
    if !path.is_file() {
        warn!("No vars for cluster `{}` at {}", cluster_name, path.display());
        return Ok(None);
    }
    Ok(Some(load_var_file(&path)?))
}

/// Works out the commands that switch to `cluster_name`
pub async fn access_plan(
    ws: &Workspace<'_>,
    cluster_name: &str,
    cluster_type: Option<ClusterType>,
) -> Result<AccessPlan> {
    validate_name("cluster", cluster_name)?;

    let vars = cluster_vars(ws, cluster_name)?;
    let cluster_type = match cluster_type {
        Some(cluster_type) => cluster_type,
        None => ClusterType::infer(cluster_name, vars.as_ref())?,
    };
    let location = GkeLocation::from_vars(vars.as_ref());

    // A CI3_NAMESPACE left over from an earlier access is not a choice made
    // for this cluster
    let explicit_namespace = ws.config().namespace_on_command_line;
    let namespace = if explicit_namespace {
        ws.namespace().await?
    } else {
        ws.branch_namespace().await?
    };
    debug!(
        "Access to {} cluster {} in namespace {}",
        cluster_type, cluster_name, namespace
    );

    Ok(AccessPlan::new(
        cluster_name,
        &namespace,
        explicit_namespace,
        cluster_type,
        &location,
    )?)
}

/// Prints the access snippet on stdout
pub async fn handle_access(
    ws: &Workspace<'_>,
    cluster_name: &str,
    cluster_type: Option<ClusterType>,
) -> Result<()> {
    let plan = access_plan(ws, cluster_name, cluster_type).await?;
    print!("{}", plan);
    Ok(())
}
