//! Cluster identity and access
//!
//! A cluster is selected by name (`CI3_CLUSTER_NAME`) and has a type that
//! decides how kubectl is pointed at it. [`AccessPlan`] is the shell snippet
//! `kubic access` prints for the user to source.

use std::fmt;
use std::str::FromStr;

use crate::error::{Ci3Error, Result};
use crate::vars::{VarMap, lookup_str};

/// Environment variable naming the active cluster
pub const CLUSTER_NAME_ENV: &str = "CI3_CLUSTER_NAME";

/// Environment variable overriding the branch-derived namespace
pub const NAMESPACE_ENV: &str = "CI3_NAMESPACE";

/// Name of the local development cluster
pub const MINIKUBE: &str = "minikube";

/// Kind of cluster, decides which credentials commands are needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterType {
    /// Local minikube cluster
    Minikube,
    /// Google Kubernetes Engine
    Gke,
}

impl ClusterType {
    /// Works out the type from cluster vars, then from the name
    pub fn infer(name: &str, cluster_vars: Option<&VarMap>) -> Result<Self> {
        if let Some(declared) = cluster_vars.and_then(|vars| lookup_str(vars, "cluster.type")) {
            return declared.parse().map_err(|message| Ci3Error::InvalidValue {
                key: "cluster.type".to_string(),
                message,
            });
        }

        Ok(if name == MINIKUBE {
            Self::Minikube
        } else {
            Self::Gke
        })
    }
}

impl FromStr for ClusterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minikube" | "local" => Ok(Self::Minikube),
            "gke" => Ok(Self::Gke),
            other => Err(format!(
                "unknown cluster type `{}` (expected minikube or gke)",
                other
            )),
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minikube => write!(f, "minikube"),
            Self::Gke => write!(f, "gke"),
        }
    }
}

/// Rejects names that are unsafe to paste into a shell or kubectl call
pub fn validate_name(kind: &'static str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Ci3Error::InvalidName {
            kind,
            value: value.to_string(),
        })
    }
}

/// GKE location of a cluster, from `cluster.zone` and `cluster.project`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GkeLocation {
    pub zone: Option<String>,
    pub project: Option<String>,
}

impl GkeLocation {
    /// Reads the location from cluster vars, if any
    pub fn from_vars(cluster_vars: Option<&VarMap>) -> Self {
        let get = |key: &str| {
            cluster_vars
                .and_then(|vars| lookup_str(vars, key))
                .map(str::to_string)
        };
        Self {
            zone: get("cluster.zone"),
            project: get("cluster.project"),
        }
    }
}

/// Shell commands that switch the current shell to a cluster
#[derive(Debug, Clone)]
pub struct AccessPlan {
    lines: Vec<String>,
}

impl AccessPlan {
    /// Builds the snippet for a cluster
    ///
    /// # Arguments
    /// * `name` - Cluster name, exported as `CI3_CLUSTER_NAME`
    /// * `namespace` - Namespace to select in the kubectl context
    /// * `explicit_namespace` - Whether the namespace was chosen by the user
    ///   (exported as `CI3_NAMESPACE`) or derived from the branch
    /// * `cluster_type` - Decides which credentials commands are emitted
    /// * `location` - GKE zone/project
    pub fn new(
        name: &str,
        namespace: &str,
        explicit_namespace: bool,
        cluster_type: ClusterType,
        location: &GkeLocation,
    ) -> Result<Self> {
        validate_name("cluster", name)?;
        validate_name("namespace", namespace)?;

        let mut lines = vec![format!("export {}={}", CLUSTER_NAME_ENV, name)];
        if explicit_namespace {
            lines.push(format!("export {}={}", NAMESPACE_ENV, namespace));
        } else {
            lines.push(format!("unset {}", NAMESPACE_ENV));
        }

        match cluster_type {
            // minikube names the kubectl context after the profile
            ClusterType::Minikube => {
                lines.push(format!("kubectl config use-context {}", name));
                if name == MINIKUBE {
                    lines.push("eval $(minikube docker-env)".to_string());
                } else {
                    lines.push(format!("eval $(minikube -p {} docker-env)", name));
                }
            }
            ClusterType::Gke => {
                let mut credentials = format!("gcloud container clusters get-credentials {}", name);
                if let Some(zone) = &location.zone {
                    validate_name("zone", zone)?;
                    credentials.push_str(&format!(" --zone {}", zone));
                }
                if let Some(project) = &location.project {
                    validate_name("project", project)?;
                    credentials.push_str(&format!(" --project {}", project));
                }
                lines.push(credentials);
            }
        }

        lines.push(format!(
            "kubectl config set-context --current --namespace={}",
            namespace
        ));

        Ok(Self { lines })
    }

    /// Individual shell lines, in execution order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for AccessPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: serde_json::Value) -> VarMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_cluster_type_parse() {
        assert_eq!("minikube".parse::<ClusterType>(), Ok(ClusterType::Minikube));
        assert_eq!("GKE".parse::<ClusterType>(), Ok(ClusterType::Gke));
        assert!("eks".parse::<ClusterType>().is_err());
    }

    #[test]
    fn test_cluster_type_infer() {
        assert_eq!(ClusterType::infer("minikube", None).unwrap(), ClusterType::Minikube);
        assert_eq!(ClusterType::infer("prod", None).unwrap(), ClusterType::Gke);

        let declared = vars(json!({"cluster": {"type": "minikube"}}));
        assert_eq!(
            ClusterType::infer("laptop", Some(&declared)).unwrap(),
            ClusterType::Minikube
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("cluster", "gke-prod_1.eu").is_ok());
        assert!(validate_name("cluster", "").is_err());
        assert!(validate_name("cluster", "prod; rm -rf /").is_err());
    }

    #[test]
    fn test_minikube_access_plan() {
        let plan = AccessPlan::new(
            "minikube",
            "foo-bar",
            false,
            ClusterType::Minikube,
            &GkeLocation::default(),
        )
        .unwrap();

        assert_eq!(
            plan.lines(),
            &[
                "export CI3_CLUSTER_NAME=minikube",
                "unset CI3_NAMESPACE",
                "kubectl config use-context minikube",
                "eval $(minikube docker-env)",
                "kubectl config set-context --current --namespace=foo-bar",
            ]
        );
    }

    #[test]
    fn test_minikube_profile_access_plan() {
        let plan = AccessPlan::new(
            "laptop",
            "main",
            false,
            ClusterType::Minikube,
            &GkeLocation::default(),
        )
        .unwrap();

        assert!(plan.lines().contains(&"kubectl config use-context laptop".to_string()));
        assert!(plan.lines().contains(&"eval $(minikube -p laptop docker-env)".to_string()));
        assert!(!plan.to_string().contains("use-context minikube"));
    }

    #[test]
    fn test_gke_access_plan_with_location() {
        let location = GkeLocation::from_vars(Some(&vars(json!({
            "cluster": {"zone": "europe-west1-b", "project": "acme"}
        }))));
        let plan = AccessPlan::new("prod", "staging", true, ClusterType::Gke, &location).unwrap();

        let text = plan.to_string();
        assert!(text.contains("export CI3_NAMESPACE=staging\n"));
        assert!(text.contains(
            "gcloud container clusters get-credentials prod --zone europe-west1-b --project acme\n"
        ));
        assert!(!text.contains("minikube"));
    }
}
