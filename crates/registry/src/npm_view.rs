use crate::{LookupError, RegistryClient};
use modup_executor::Program;

/// Looks versions up with `npm view <name> version`.
#[derive(Debug, Clone)]
pub struct NpmViewClient {
    npm: Program,
}

impl NpmViewClient {
    pub fn new(npm: Program) -> Self {
        NpmViewClient { npm }
    }
}

impl RegistryClient for NpmViewClient {
    async fn lookup_latest_version(&self, name: &str) -> Result<String, LookupError> {
        let output = self
            .npm
            .capture(["view", name, "version"])
            .await
            .map_err(|error| LookupError::Spawn { name: name.to_string(), error })?;

        if !output.success() {
            return Err(LookupError::Status {
                name: name.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        output
            .trimmed_stdout()
            .map(str::to_string)
            .ok_or_else(|| LookupError::EmptyOutput { name: name.to_string() })
    }
}
