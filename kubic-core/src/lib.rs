//! kubic-ci core
//!
//! Domain logic shared by the `kubic` command line tool:
//! - `project`: the `.ci3` folder layout and its starter content
//! - `vars`: loading and merging template variables
//! - `branch`: namespace derivation from git branch names
//! - `cluster`: cluster identity, types and the `access` shell snippet
//! - `image`: container image declarations
//! - `template`: manifest rendering
//!
//! Nothing here spawns processes; see `kubic-runner` for that.

pub mod branch;
pub mod cluster;
pub mod error;
pub mod image;
pub mod project;
pub mod template;
pub mod vars;

pub use error::{Ci3Error, Result};
pub use project::{ProjectFolder, ScaffoldReport};
pub use vars::{RuntimeVars, VarMap};
