//! Project folder
//!
//! The `.ci3` folder holds everything kubic-ci knows about a project:
//!
//! ```text
//! .ci3/
//!   secrets/            (gitignored)
//!   vars/global.yaml
//!   vars/clusters/<name>.yaml
//!   namespace.yaml
//!   deploy.yaml
//!   services/*.yaml
//! ```
//!
//! It is created once by `kubic init` and only read afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Ci3Error, Result};

/// Name of the project folder inside the working directory
pub const PROJECT_DIR: &str = ".ci3";

const SECRETS_GITIGNORE: &str = "\
# Place your keys and secrets here, but never commit them.
*
!.gitignore
";

const GLOBAL_VARS: &str = "\
# Place your global template vars here, applicable across all clusters.
# Top-level keys are overridden by `.ci3/vars/clusters/<cluster.name>.yaml`.
---
containers:
  homepage:
    build:
      dockerfile: Dockerfile
      context: .
    image:
      name: homepage
      tag: latest
";

const MINIKUBE_VARS: &str = "\
# Place your local (minikube) template vars here.
---
cluster:
  type: minikube
  # image_registry_url: localhost:5000
";

const NAMESPACE_TEMPLATE: &str = "\
---
kind: Namespace
apiVersion: v1
metadata:
  name: {{ cluster.namespace }}
  labels:
    name: {{ cluster.namespace }}
";

const DEPLOY_TEMPLATE: &str = "\
# Rendered and applied by `kubic deploy` each time the cluster is updated from source.
# Keep one-off cluster setup out of this file.
{% include \".ci3/namespace.yaml\" %}
{% include \".ci3/services/web_service.yaml\" %}
";

const WEB_SERVICE_TEMPLATE: &str = "\
# This is an example web service.
---
kind: Deployment
apiVersion: apps/v1
metadata:
  name: homepage
  namespace: {{ cluster.namespace }}
spec:
  replicas: 1
  selector:
    matchLabels:
      app: homepage
  template:
    metadata:
      labels:
        app: homepage
    spec:
      containers:
      - name: homepage
        image: {{ containers.homepage.image.name }}:{{ containers.homepage.image.tag }}
        imagePullPolicy: IfNotPresent
        ports:
          - containerPort: 80
---
kind: Service
apiVersion: v1
metadata:
  name: homepage
  namespace: {{ cluster.namespace }}
  labels:
    app: homepage
spec:
  type: NodePort
  ports:
  - name: http
    port: 80
    targetPort: 80
    protocol: TCP
  selector:
    app: homepage
";

/// Outcome of [`ProjectFolder::scaffold`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldReport {
    /// The folder existed already; nothing was touched
    AlreadyInitialized,
    /// Files written, in creation order
    Created(Vec<PathBuf>),
}

/// Location of a `.ci3` project folder
#[derive(Debug, Clone)]
pub struct ProjectFolder {
    root: PathBuf,
    path: PathBuf,
}

impl ProjectFolder {
    /// Creates a handle for the project folder under `root`
    ///
    /// Nothing is checked on disk; see [`ProjectFolder::require`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(PROJECT_DIR);
        Self { root, path }
    }

    /// Directory containing the project folder
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.ci3` folder itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.path.join("secrets")
    }

    pub fn vars_path(&self) -> PathBuf {
        self.path.join("vars")
    }

    pub fn global_vars_path(&self) -> PathBuf {
        self.vars_path().join("global.yaml")
    }

    pub fn cluster_vars_path(&self) -> PathBuf {
        self.vars_path().join("clusters")
    }

    /// Vars file for the named cluster
    pub fn cluster_vars_file(&self, cluster: &str) -> PathBuf {
        self.cluster_vars_path().join(format!("{}.yaml", cluster))
    }

    pub fn services_path(&self) -> PathBuf {
        self.path.join("services")
    }

    pub fn namespace_path(&self) -> PathBuf {
        self.path.join("namespace.yaml")
    }

    /// The deploy template applied by `kubic deploy`
    pub fn deploy_path(&self) -> PathBuf {
        self.path.join("deploy.yaml")
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Returns self if the folder exists, otherwise a "run init" error
    pub fn require(&self) -> Result<&Self> {
        if self.exists() {
            Ok(self)
        } else {
            Err(Ci3Error::MissingProjectFolder {
                path: self.path.clone(),
            })
        }
    }

    /// Populates a starter project folder
    ///
    /// Does nothing when the folder is already present, so existing files are
    /// never overwritten.
    pub fn scaffold(&self) -> io::Result<ScaffoldReport> {
        if self.path.exists() {
            return Ok(ScaffoldReport::AlreadyInitialized);
        }

        let files = [
            (self.secrets_path().join(".gitignore"), SECRETS_GITIGNORE),
            (self.global_vars_path(), GLOBAL_VARS),
            (self.cluster_vars_file("minikube"), MINIKUBE_VARS),
            (self.namespace_path(), NAMESPACE_TEMPLATE),
            (self.deploy_path(), DEPLOY_TEMPLATE),
            (self.services_path().join("web_service.yaml"), WEB_SERVICE_TEMPLATE),
        ];

        let mut created = Vec::with_capacity(files.len());
        for (path, content) in files {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            debug!("Created {}", path.display());
            created.push(path);
        }

        Ok(ScaffoldReport::Created(created))
    }

    /// Names of clusters that have a vars file, sorted
    pub fn clusters(&self) -> Vec<String> {
        let mut names: Vec<String> = yaml_files(&self.cluster_vars_path(), 1)
            .into_iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Service templates under `services/`, sorted
    pub fn services(&self) -> Vec<PathBuf> {
        let mut files = yaml_files(&self.services_path(), usize::MAX);
        files.sort();
        files
    }
}

/// Checks whether a path looks like a YAML document or template
pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|x| x.to_str()),
        Some("yaml" | "yml")
    )
}

fn yaml_files(dir: &Path, max_depth: usize) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
        .map(|e| e.into_path())
        .collect()
}
