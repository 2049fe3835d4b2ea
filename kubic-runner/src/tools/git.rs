//! Git queries

use kubic_core::Ci3Error;

use crate::runner::{Invocation, ToolRunner, run_checked};

/// Name of the checked out branch (`git rev-parse --abbrev-ref HEAD`)
pub async fn current_branch(runner: &dyn ToolRunner) -> Result<String, Ci3Error> {
    let inv = Invocation::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .capture();
    let out = run_checked(runner, inv, "get the name of the current git branch", "HEAD").await?;
    Ok(out.trim().to_string())
}

/// Abbreviated hash of the checked out commit
pub async fn short_commit(runner: &dyn ToolRunner) -> Result<String, Ci3Error> {
    let inv = Invocation::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .capture();
    let out = run_checked(runner, inv, "get the current git commit", "HEAD").await?;
    Ok(out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::ScriptedRunner;
    use crate::runner::ToolOutput;

    #[tokio::test]
    async fn test_current_branch_trims_output() {
        let runner = ScriptedRunner::new();
        runner.respond("git", ToolOutput::ok("feature/foo-bar\n"));

        assert_eq!(current_branch(&runner).await.unwrap(), "feature/foo-bar");
        assert_eq!(
            runner.invocations()[0].args,
            vec!["rev-parse", "--abbrev-ref", "HEAD"]
        );
    }

    #[tokio::test]
    async fn test_current_branch_outside_repository() {
        let runner = ScriptedRunner::new();
        runner.respond(
            "git",
            ToolOutput::failed(128, "fatal: not a git repository"),
        );

        let err = current_branch(&runner).await.unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }
}
