//! Configuration module
//!
//! Everything the command line and environment decide about a run, collected
//! once in `main` and passed down explicitly.

use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the `.ci3` project folder
    pub project_dir: PathBuf,

    /// Target cluster (`--cluster` or `CI3_CLUSTER_NAME`)
    pub cluster: Option<String>,

    /// Namespace override (`--namespace` or `CI3_NAMESPACE`)
    pub namespace: Option<String>,

    /// Whether `namespace` was typed on this command line rather than
    /// inherited from `CI3_NAMESPACE`
    pub namespace_on_command_line: bool,

    /// Number of `-v` flags
    pub verbosity: u8,
}

impl Config {
    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_follows_verbosity() {
        let mut config = Config {
            project_dir: PathBuf::from("."),
            cluster: None,
            namespace: None,
            namespace_on_command_line: false,
            verbosity: 0,
        };
        assert_eq!(config.log_filter(), "warn");
        config.verbosity = 2;
        assert_eq!(config.log_filter(), "debug");
        config.verbosity = 7;
        assert_eq!(config.log_filter(), "trace");
    }
}
