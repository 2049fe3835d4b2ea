//! Docker image build and push

use kubic_core::Ci3Error;
use kubic_core::image::ContainerSpec;
use tracing::info;

use crate::runner::{Invocation, ToolRunner, run_checked};

/// Builds the image of `container` tagged as `tag`
///
/// Output is relayed to the terminal.
pub async fn build(
    runner: &dyn ToolRunner,
    container: &ContainerSpec,
    tag: &str,
) -> Result<(), Ci3Error> {
    let mut inv = Invocation::new("docker").args(["build", "-t", tag]);
    if let Some(dockerfile) = &container.build.dockerfile {
        inv = inv.args(["-f", dockerfile.as_str()]);
    }
    inv = inv.arg(container.build.context.as_str());

    info!("Building {}..", container.name);
    run_checked(runner, inv, "build docker image", &container.name).await?;
    info!("Done");
    Ok(())
}

/// Pushes `tag` to its registry
pub async fn push(runner: &dyn ToolRunner, tag: &str) -> Result<(), Ci3Error> {
    let inv = Invocation::new("docker").args(["push", tag]);

    info!("Pushing {}..", tag);
    run_checked(runner, inv, "push docker image", tag).await?;
    info!("Done");
    Ok(())
}
