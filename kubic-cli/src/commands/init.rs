//! Init command handler
//!
//! Creates the `.ci3` project folder with starter vars and templates.

use anyhow::{Context, Result};
use colored::*;
use kubic_core::ScaffoldReport;

use crate::workspace::Workspace;

/// Scaffolds the project folder unless it already exists
pub fn handle_init(ws: &Workspace<'_>) -> Result<ScaffoldReport> {
    let project = ws.project();
    let report = project.scaffold().with_context(|| {
        format!(
            "Failed to create project folder at {}",
            project.path().display()
        )
    })?;

    match &report {
        ScaffoldReport::AlreadyInitialized => {
            println!("kubic-ci project has been already initialized..Skipping");
        }
        ScaffoldReport::Created(files) => {
            println!(
                "Initializing kubic-ci project configuration: {}",
                project.path().display()
            );
            for file in files {
                let shown = file.strip_prefix(project.root()).unwrap_or(file);
                println!("  {} {}", "Created".green(), shown.display());
            }
            println!();
            println!("{}", "Next steps:".bold());
            println!("  1. Describe your containers in .ci3/vars/global.yaml");
            println!(
                "  2. Run {} to point your shell at a cluster",
                "source <(kubic access minikube)".cyan()
            );
            println!("  3. Run {} to roll it out", "kubic deploy".cyan());
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::config;
    use kubic_runner::fake::ScriptedRunner;
    use std::fs;

    #[test]
    fn test_init_twice_skips_second_time() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let runner = ScriptedRunner::new();
        let ws = Workspace::new(&config, &runner);

        let first = handle_init(&ws).unwrap();
        assert!(matches!(first, ScaffoldReport::Created(ref files) if !files.is_empty()));

        let global = ws.project().global_vars_path();
        fs::write(&global, "containers: {}\n").unwrap();

        let second = handle_init(&ws).unwrap();
        assert_eq!(second, ScaffoldReport::AlreadyInitialized);
        assert_eq!(fs::read_to_string(&global).unwrap(), "containers: {}\n");
        assert!(runner.invocations().is_empty());
    }
}
