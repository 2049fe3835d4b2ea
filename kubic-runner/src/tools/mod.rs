//! Typed wrappers around the external tools kubic-ci drives

pub mod docker;
pub mod gcloud;
pub mod git;
pub mod kubectl;
