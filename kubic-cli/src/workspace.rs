//! Workspace
//!
//! Access to the project folder, the resolved cluster and the tool runner,
//! handed to every command handler.

use kubic_core::branch::{DEFAULT_NAMESPACE, namespace_from_branch};
use kubic_core::cluster::{CLUSTER_NAME_ENV, validate_name};
use kubic_core::{Ci3Error, ProjectFolder, RuntimeVars, VarMap, template, vars};
use kubic_runner::ToolRunner;
use kubic_runner::tools::git;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;

/// Project folder, configuration and tool runner of one invocation
pub struct Workspace<'a> {
    project: ProjectFolder,
    config: &'a Config,
    runner: &'a dyn ToolRunner,
}

impl<'a> Workspace<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn ToolRunner) -> Self {
        Self {
            project: ProjectFolder::new(&config.project_dir),
            config,
            runner,
        }
    }

    pub fn project(&self) -> &ProjectFolder {
        &self.project
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn runner(&self) -> &'a dyn ToolRunner {
        self.runner
    }

    /// The cluster commands act on
    pub fn cluster_name(&self) -> Result<&str, Ci3Error> {
        let name = self
            .config
            .cluster
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Ci3Error::MissingEnv {
                var: CLUSTER_NAME_ENV,
                hint: "Have you run `source <(kubic access <cluster_name>)`? \
                       Alternatively pass `--cluster <cluster_name>`."
                    .to_string(),
            })?;
        validate_name("cluster", name)?;
        Ok(name)
    }

    /// Namespace to render into
    ///
    /// An explicit override wins; otherwise the current git branch decides.
    pub async fn namespace(&self) -> Result<String, Ci3Error> {
        if let Some(namespace) = &self.config.namespace {
            validate_name("namespace", namespace)?;
            return Ok(namespace.clone());
        }
        self.branch_namespace().await
    }

    /// Namespace derived from the current git branch, `default` when git
    /// cannot tell
    pub async fn branch_namespace(&self) -> Result<String, Ci3Error> {
        match git::current_branch(self.runner).await {
            Ok(branch) => {
                let namespace = namespace_from_branch(Some(&branch));
                if namespace == DEFAULT_NAMESPACE && branch != DEFAULT_NAMESPACE {
                    warn!(
                        "Branch `{}` has no usable suffix, using namespace `{}`",
                        branch, DEFAULT_NAMESPACE
                    );
                }
                Ok(namespace)
            }
            Err(e) => {
                warn!("{}", e);
                Ok(DEFAULT_NAMESPACE.to_string())
            }
        }
    }

    /// Cluster name and namespace injected into the vars
    pub async fn runtime_vars(&self) -> Result<RuntimeVars, Ci3Error> {
        let name = self.cluster_name()?.to_string();
        let namespace = self.namespace().await?;
        debug!("Resolved cluster {} namespace {}", name, namespace);
        Ok(RuntimeVars { name, namespace })
    }

    /// Loads global and cluster vars merged with runtime values
    pub async fn load_vars(&self) -> Result<VarMap, Ci3Error> {
        self.project.require()?;
        let runtime = self.runtime_vars().await?;
        vars::load_vars(&self.project, &runtime)
    }

    /// Resolves a template path against the project directory, which must exist
    pub fn template_path(&self, template: &Path) -> Result<PathBuf, Ci3Error> {
        let path = if template.is_absolute() {
            template.to_path_buf()
        } else {
            self.project.root().join(template)
        };
        if path.is_file() {
            Ok(path)
        } else {
            Err(Ci3Error::missing_file(path))
        }
    }

    pub fn render(&self, template: &Path, vars: &VarMap) -> Result<String, Ci3Error> {
        template::render(self.project.root(), template, vars)
    }
}
