//! Build and push command handlers

use anyhow::Result;
use colored::*;
use kubic_core::image::{self, ContainerSpec};
use kubic_runner::tools::docker;

use crate::workspace::Workspace;

/// Containers from the vars together with their image references
async fn tagged_containers(ws: &Workspace<'_>) -> Result<Vec<(ContainerSpec, String)>> {
    let vars = ws.load_vars().await?;
    let registry = image::registry(&vars);
    let tagged = image::containers(&vars)?
        .into_iter()
        .map(|container| {
            let tag = container.reference(registry);
            (container, tag)
        })
        .collect::<Vec<_>>();

    if tagged.is_empty() {
        println!("{}", "No containers configured".yellow());
    }
    Ok(tagged)
}

/// Builds every configured container image, stopping at the first failure
pub async fn handle_build(ws: &Workspace<'_>) -> Result<()> {
    for (container, tag) in tagged_containers(ws).await? {
        println!("{} {} ({})", "Building".cyan(), container.name, tag);
        docker::build(ws.runner(), &container, &tag).await?;
    }
    Ok(())
}

/// Pushes every configured container image, stopping at the first failure
pub async fn handle_push(ws: &Workspace<'_>) -> Result<()> {
    for (container, tag) in tagged_containers(ws).await? {
        println!("{} {} ({})", "Pushing".cyan(), container.name, tag);
        docker::push(ws.runner(), &tag).await?;
    }
    Ok(())
}
