//! Status command handler

use anyhow::Result;
use colored::*;
use kubic_runner::tools::kubectl;
use tracing::debug;

use crate::workspace::Workspace;

/// Reports the project folder, its clusters and service templates
///
/// Fails with a hint to run `kubic init` when there is no project.
pub async fn handle_status(ws: &Workspace<'_>) -> Result<()> {
    let project = ws.project().require()?;
    println!(
        "{} ({})",
        "kubic-ci project".bold(),
        project.path().display()
    );

    let active = ws.config().cluster.as_deref();
    let clusters = project.clusters();
    if clusters.is_empty() {
        println!("  {} none configured", "Clusters:".bold());
    } else {
        println!("  {}", "Clusters:".bold());
        for cluster in clusters {
            if Some(cluster.as_str()) == active {
                println!("    {} {}", "*".green(), cluster.green());
            } else {
                println!("      {}", cluster);
            }
        }
    }
    if let Some(active) = active {
        if !project.cluster_vars_file(active).is_file() {
            println!(
                "  {} active cluster `{}` has no vars file",
                "Warning:".yellow(),
                active
            );
        }
    }

    let services = project.services();
    println!("  {} {}", "Services:".bold(), services.len());
    for service in services {
        let shown = service.strip_prefix(project.root()).unwrap_or(&service);
        println!("      {}", shown.display());
    }

    match kubectl::current_context(ws.runner()).await {
        Ok(context) if !context.is_empty() => {
            println!("  {} {}", "kubectl context:".bold(), context.cyan())
        }
        Ok(_) => {}
        Err(e) => debug!("Could not read kubectl context: {}", e),
    }

    Ok(())
}
