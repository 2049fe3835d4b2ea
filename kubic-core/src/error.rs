//! Error types for kubic-ci
//!
//! Every failure a user can act on is a [`Ci3Error`]. The CLI prints these as
//! plain messages; anything else is treated as a bug and reported in full.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kubic-ci operations
pub type Result<T> = std::result::Result<T, Ci3Error>;

/// Errors that can be reported to the user without a backtrace
#[derive(Debug, Error)]
pub enum Ci3Error {
    /// Project has not been initialized
    #[error("Missing `.ci3` folder at {}. Have you tried `kubic init`?", path.display())]
    MissingProjectFolder {
        /// Expected location of the project folder
        path: PathBuf,
    },

    /// Template or vars file is absent
    #[error("Path does not exist: {}", path.display())]
    MissingFile {
        /// The path that was looked up
        path: PathBuf,
    },

    /// External tool could not be started or exited unsuccessfully
    #[error("Failed to {action} `{target}`: {message}")]
    ToolFailed {
        /// What was attempted (e.g. "build docker image")
        action: String,
        /// What it was attempted on (container, tag, template...)
        target: String,
        /// Message reported by the tool
        message: String,
    },

    /// Required environment value is not set
    #[error("Missing variable {var} in environment. {hint}")]
    MissingEnv {
        /// Name of the environment variable
        var: &'static str,
        /// How to fix it
        hint: String,
    },

    /// Required configuration key is not set
    #[error("Missing configuration value `{key}` in {context}")]
    MissingVar {
        /// Dotted key path
        key: String,
        /// Where the key was expected
        context: String,
    },

    /// Configuration key holds an unusable value
    #[error("Invalid configuration value `{key}`: {message}")]
    InvalidValue {
        /// Dotted key path
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// Vars file could not be understood
    #[error("Invalid vars in {}: {message}", path.display())]
    InvalidVars {
        /// Offending file
        path: PathBuf,
        /// Parser or shape error
        message: String,
    },

    /// Template engine failure
    #[error("Failed to render {}: {message}", path.display())]
    Render {
        /// Template being rendered
        path: PathBuf,
        /// Engine error chain
        message: String,
    },

    /// Cluster or namespace name unusable in a shell snippet or kubectl call
    #[error("Invalid {kind} name `{value}`: only letters, digits, `_`, `-` and `.` are allowed")]
    InvalidName {
        /// "cluster" or "namespace"
        kind: &'static str,
        /// Rejected value
        value: String,
    },
}

impl Ci3Error {
    /// Create a tool failure error
    pub fn tool_failed(
        action: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ToolFailed {
            action: action.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a missing file error
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_project_folder_hints_init() {
        let err = Ci3Error::MissingProjectFolder {
            path: PathBuf::from("/work/.ci3"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/work/.ci3"));
        assert!(msg.contains("kubic init"));
    }

    #[test]
    fn test_tool_failed_names_target() {
        let err = Ci3Error::tool_failed("build docker image", "homepage", "exit status 1");
        assert_eq!(
            err.to_string(),
            "Failed to build docker image `homepage`: exit status 1"
        );
        assert!(matches!(err, Ci3Error::ToolFailed { .. }));
    }
}
