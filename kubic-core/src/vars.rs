//! Template variables
//!
//! Variables come from two YAML documents in the project folder and from a
//! few values computed at runtime:
//!
//! 1. `vars/global.yaml` - defaults shared by every cluster
//! 2. `vars/clusters/<name>.yaml` - replaces top-level keys of the globals
//! 3. runtime values (`cluster.name`, `cluster.namespace`)
//!
//! The `cluster` mapping is the one exception to the top-level replace: it is
//! merged key by key so global cluster settings survive unless overridden.

use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Ci3Error, Result};
use crate::project::ProjectFolder;

/// Variable namespace used for template substitution
pub type VarMap = serde_json::Map<String, JsonValue>;

/// Key holding cluster settings
pub const CLUSTER_KEY: &str = "cluster";

/// Values derived at runtime and injected under `cluster`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVars {
    /// Cluster the command targets
    pub name: String,
    /// Kubernetes namespace to render into
    pub namespace: String,
}

/// Loads a YAML vars file as a mapping
///
/// An empty document yields an empty mapping.
pub fn load_var_file(path: &Path) -> Result<VarMap> {
    if !path.is_file() {
        return Err(Ci3Error::missing_file(path));
    }

    let content = fs::read_to_string(path).map_err(|e| Ci3Error::InvalidVars {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if is_blank_document(&content) {
        return Ok(VarMap::new());
    }

    let value: Option<JsonValue> =
        serde_yaml::from_str(&content).map_err(|e| Ci3Error::InvalidVars {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    match value {
        None | Some(JsonValue::Null) => Ok(VarMap::new()),
        Some(JsonValue::Object(map)) => Ok(map),
        Some(_) => Err(Ci3Error::InvalidVars {
            path: path.to_path_buf(),
            message: "expected a mapping at the top level".to_string(),
        }),
    }
}

/// Merges global vars, cluster vars and runtime values
pub fn merge(global: VarMap, cluster_file: VarMap, runtime: &RuntimeVars) -> VarMap {
    let mut vars = global;

    let mut cluster = take_mapping(&mut vars, CLUSTER_KEY);
    let mut cluster_file = cluster_file;
    cluster.extend(take_mapping(&mut cluster_file, CLUSTER_KEY));

    vars.extend(cluster_file);

    cluster.insert("name".to_string(), JsonValue::String(runtime.name.clone()));
    cluster.insert(
        "namespace".to_string(),
        JsonValue::String(runtime.namespace.clone()),
    );
    vars.insert(CLUSTER_KEY.to_string(), JsonValue::Object(cluster));

    vars
}

/// Loads and merges all vars for the cluster named in `runtime`
pub fn load_vars(project: &ProjectFolder, runtime: &RuntimeVars) -> Result<VarMap> {
    project.require()?;

    let global_path = project.global_vars_path();
    let global = load_var_file(&global_path)?;
    debug!("Loaded {} global var(s) from {}", global.len(), global_path.display());

    let cluster_path = project.cluster_vars_file(&runtime.name);
    let cluster = load_var_file(&cluster_path)?;
    debug!("Loaded {} cluster var(s) from {}", cluster.len(), cluster_path.display());

    Ok(merge(global, cluster, runtime))
}

/// Looks up a dotted path such as `cluster.image_registry_url`
pub fn lookup<'a>(vars: &'a VarMap, path: &str) -> Option<&'a JsonValue> {
    let mut parts = path.split('.');
    let mut current = vars.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Looks up a dotted path holding a string
pub fn lookup_str<'a>(vars: &'a VarMap, path: &str) -> Option<&'a str> {
    lookup(vars, path).and_then(JsonValue::as_str)
}

/// Like [`lookup_str`], but a missing value is an error
pub fn require_str<'a>(vars: &'a VarMap, path: &str, context: &str) -> Result<&'a str> {
    lookup_str(vars, path).ok_or_else(|| Ci3Error::MissingVar {
        key: path.to_string(),
        context: context.to_string(),
    })
}

fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn take_mapping(vars: &mut VarMap, key: &str) -> VarMap {
    match vars.remove(key) {
        Some(JsonValue::Object(map)) => map,
        _ => VarMap::new(),
    }
}
