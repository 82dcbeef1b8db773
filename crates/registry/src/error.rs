use derive_more::{Display, Error};
use miette::Diagnostic;
use modup_executor::ExecutorError;
use std::process::ExitStatus;

/// Failure to find the latest version of a single dependency.
///
/// Callers are expected to recover from it by keeping the current version.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LookupError {
    #[display("Unable to query the version of {name}")]
    #[diagnostic(code(modup_registry::spawn_error))]
    Spawn {
        name: String,
        #[error(source)]
        error: ExecutorError,
    },

    #[display("Version query for {name} exited with {status}: {stderr}")]
    #[diagnostic(code(modup_registry::status_error))]
    Status { name: String, status: ExitStatus, stderr: String },

    #[display("Version query for {name} printed nothing")]
    #[diagnostic(code(modup_registry::empty_output))]
    EmptyOutput {
        #[error(not(source))]
        name: String,
    },

    #[display("Network error while fetching {name}")]
    #[diagnostic(code(modup_registry::network_error))]
    Network {
        name: String,
        #[error(source)]
        error: reqwest::Error,
    },

    #[display("Missing latest tag on {name}")]
    #[diagnostic(code(modup_registry::missing_latest_tag))]
    MissingLatestTag {
        #[error(not(source))]
        name: String,
    },
}

impl LookupError {
    /// Name of the dependency whose lookup failed.
    pub fn name(&self) -> &'_ str {
        match self {
            LookupError::Spawn { name, .. }
            | LookupError::Status { name, .. }
            | LookupError::EmptyOutput { name }
            | LookupError::Network { name, .. }
            | LookupError::MissingLatestTag { name } => name,
        }
    }
}
