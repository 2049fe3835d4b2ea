//! kubectl calls

use kubic_core::Ci3Error;
use tracing::info;

use crate::runner::{Invocation, ToolRunner, run_checked};

/// Applies a manifest read from stdin (`kubectl apply -f -`)
///
/// `source` names the manifest in error messages.
pub async fn apply(
    runner: &dyn ToolRunner,
    manifest: &str,
    source: &str,
) -> Result<(), Ci3Error> {
    let inv = Invocation::new("kubectl")
        .args(["apply", "-f", "-"])
        .stdin(manifest);

    info!("Applying {}..", source);
    run_checked(runner, inv, "apply k8s configuration", source).await?;
    Ok(())
}

/// Name of the current kubectl context
pub async fn current_context(runner: &dyn ToolRunner) -> Result<String, Ci3Error> {
    let inv = Invocation::new("kubectl")
        .args(["config", "current-context"])
        .capture();
    let out = run_checked(runner, inv, "read kubectl context", "current-context").await?;
    Ok(out.trim().to_string())
}

/// Points one container of a deployment at a new image
pub async fn set_image(
    runner: &dyn ToolRunner,
    deployment: &str,
    container: &str,
    image: &str,
    namespace: &str,
) -> Result<(), Ci3Error> {
    let inv = Invocation::new("kubectl")
        .args(["set", "image"])
        .arg(format!("deployment/{}", deployment))
        .arg(format!("{}={}", container, image))
        .args(["--namespace", namespace]);

    info!("Updating deployment {} to {}..", deployment, image);
    run_checked(runner, inv, "update image of deployment", deployment).await?;
    Ok(())
}
