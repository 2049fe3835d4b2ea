//! Container images declared under `containers`
//!
//! ```yaml
//! containers:
//!   homepage:
//!     build:
//!       dockerfile: Dockerfile
//!       context: .
//!     image:
//!       name: homepage
//!       tag: latest
//! ```

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Ci3Error, Result};
use crate::vars::{VarMap, lookup_str};

/// Key holding the container declarations
pub const CONTAINERS_KEY: &str = "containers";

/// Key holding the registry images are pushed to
pub const REGISTRY_KEY: &str = "cluster.image_registry_url";

fn default_tag() -> String {
    "latest".to_string()
}

fn default_context() -> String {
    ".".to_string()
}

/// Image name and tag of a container
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageSpec {
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag: String,
}

/// How to build a container image
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildSpec {
    /// Dockerfile path, docker's default when absent
    #[serde(default)]
    pub dockerfile: Option<String>,
    /// Build context directory
    #[serde(default = "default_context")]
    pub context: String,
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            dockerfile: None,
            context: default_context(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContainerVars {
    image: ImageSpec,
    #[serde(default)]
    build: BuildSpec,
}

/// A container entry from the vars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Key under `containers`, also the Kubernetes container name
    pub name: String,
    pub image: ImageSpec,
    pub build: BuildSpec,
}

impl ContainerSpec {
    /// Full image reference using the configured tag
    pub fn reference(&self, registry: Option<&str>) -> String {
        image_reference(registry, &self.image.name, &self.image.tag)
    }
}

/// Reads all containers, keeping the order of the vars file
pub fn containers(vars: &VarMap) -> Result<Vec<ContainerSpec>> {
    let entries = match vars.get(CONTAINERS_KEY) {
        Some(JsonValue::Object(entries)) => entries,
        Some(JsonValue::Null) | None => {
            return Err(Ci3Error::MissingVar {
                key: CONTAINERS_KEY.to_string(),
                context: "vars".to_string(),
            });
        }
        Some(_) => {
            return Err(Ci3Error::InvalidValue {
                key: CONTAINERS_KEY.to_string(),
                message: "expected a mapping of container names".to_string(),
            });
        }
    };

    entries
        .iter()
        .map(|(name, value)| {
            let parsed: ContainerVars =
                serde_json::from_value(value.clone()).map_err(|e| Ci3Error::InvalidValue {
                    key: format!("{}.{}", CONTAINERS_KEY, name),
                    message: e.to_string(),
                })?;
            Ok(ContainerSpec {
                name: name.clone(),
                image: parsed.image,
                build: parsed.build,
            })
        })
        .collect()
}

/// Looks up a single container by name
pub fn container(vars: &VarMap, name: &str) -> Result<ContainerSpec> {
    containers(vars)?
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| Ci3Error::MissingVar {
            key: format!("{}.{}", CONTAINERS_KEY, name),
            context: "vars".to_string(),
        })
}

/// Registry configured for the cluster, if any
pub fn registry(vars: &VarMap) -> Option<&str> {
    lookup_str(vars, REGISTRY_KEY).filter(|r| !r.is_empty())
}

/// Formats `registry/name:tag`, or `name:tag` without a registry
pub fn image_reference(registry: Option<&str>, name: &str, tag: &str) -> String {
    match registry {
        Some(registry) => format!("{}/{}:{}", registry.trim_end_matches('/'), name, tag),
        None => format!("{}:{}", name, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: JsonValue) -> VarMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_containers_keep_file_order() {
        let vars = vars(json!({
            "containers": {
                "web": {"image": {"name": "web", "tag": "v1"}},
                "api": {"image": {"name": "api"}, "build": {"dockerfile": "api/Dockerfile"}},
            }
        }));

        let specs = containers(&vars).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "web");
        assert_eq!(specs[0].image.tag, "v1");
        assert_eq!(specs[0].build, BuildSpec::default());
        assert_eq!(specs[1].name, "api");
        assert_eq!(specs[1].image.tag, "latest");
        assert_eq!(specs[1].build.dockerfile.as_deref(), Some("api/Dockerfile"));
    }

    #[test]
    fn test_containers_missing() {
        let err = containers(&VarMap::new()).unwrap_err();
        assert!(matches!(err, Ci3Error::MissingVar { .. }));
    }

    #[test]
    fn test_container_without_image_is_invalid() {
        let vars = vars(json!({"containers": {"web": {"build": {}}}}));
        match containers(&vars).unwrap_err() {
            Ci3Error::InvalidValue { key, .. } => assert_eq!(key, "containers.web"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_image_reference() {
        assert_eq!(
            image_reference(Some("eu.gcr.io/acme/"), "web", "abc123"),
            "eu.gcr.io/acme/web:abc123"
        );
        assert_eq!(image_reference(None, "web", "latest"), "web:latest");
    }

    #[test]
    fn test_registry_from_cluster_vars() {
        let vars = vars(json!({"cluster": {"image_registry_url": "localhost:5000"}}));
        assert_eq!(registry(&vars), Some("localhost:5000"));
        assert_eq!(registry(&VarMap::new()), None);
    }
}
