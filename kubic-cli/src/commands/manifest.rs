//! Manifest command handlers
//!
//! `show`, `apply` and `deploy`: render templates with the project vars and
//! hand them to kubectl.

use anyhow::Result;
use colored::*;
use kubic_core::image;
use kubic_core::vars::{self, VarMap};
use kubic_runner::tools::{git, kubectl};
use std::path::Path;
use tracing::warn;

use crate::workspace::Workspace;

/// Renders a template after loading vars
///
/// The template is checked first so a typo fails before anything else runs.
async fn render_template(ws: &Workspace<'_>, template: &Path) -> Result<(VarMap, String)> {
    let path = ws.template_path(template)?;
    let vars = ws.load_vars().await?;
    let rendered = ws.render(&path, &vars)?;
    Ok((vars, rendered))
}

/// Renders and prints a template
pub async fn handle_show(ws: &Workspace<'_>, template: &Path) -> Result<()> {
    let (_, rendered) = render_template(ws, template).await?;
    println!("{}", rendered);
    Ok(())
}

/// Renders a template and pipes it into `kubectl apply -f -`
///
/// # Returns
/// The vars used, or None when the template rendered to nothing and
/// kubectl was not called
pub async fn apply_template(ws: &Workspace<'_>, template: &Path) -> Result<Option<VarMap>> {
    let (vars, rendered) = render_template(ws, template).await?;
    if rendered.trim().is_empty() {
        warn!("{} rendered to nothing, skipping apply", template.display());
        return Ok(None);
    }

    kubectl::apply(ws.runner(), &rendered, &template.display().to_string()).await?;
    println!("{} {}", "Applied".green(), template.display());
    Ok(Some(vars))
}

/// Applies the deploy template, then optionally moves a deployment to the
/// image built from the current commit
pub async fn handle_deploy(ws: &Workspace<'_>, deployment: Option<&str>) -> Result<()> {
    let deploy_path = ws.project().require()?.deploy_path();
    let vars = apply_template(ws, &deploy_path).await?;

    let Some(deployment) = deployment else {
        return Ok(());
    };
    let vars = match vars {
        Some(vars) => vars,
        None => ws.load_vars().await?,
    };

    let container = image::container(&vars, deployment)?;
    let commit = git::short_commit(ws.runner()).await?;
    let reference = image::image_reference(image::registry(&vars), &container.image.name, &commit);
    let namespace = vars::require_str(&vars, "cluster.namespace", "resolved vars")?;

    kubectl::set_image(ws.runner(), deployment, &container.name, &reference, namespace).await?;
    println!(
        "{} deployment {} to {}",
        "Updated".green(),
        deployment,
        reference.cyan()
    );
    Ok(())
}
