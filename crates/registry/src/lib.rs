mod error;
mod http_client;
mod npm_view;
mod package;

pub use error::LookupError;
pub use http_client::{package_url, HttpRegistryClient};
pub use npm_view::NpmViewClient;
pub use package::PackageDistTags;

use std::future::Future;

/// Source of "latest version" answers for dependency names.
pub trait RegistryClient {
    /// Ask the registry for the latest published version of `name`.
    ///
    /// Issues exactly one query. Never retries.
    fn lookup_latest_version(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<String, LookupError>>;
}

/// Registry client selected at runtime.
#[derive(Debug)]
pub enum Registry {
    NpmView(NpmViewClient),
    Http(HttpRegistryClient),
}

impl RegistryClient for Registry {
    async fn lookup_latest_version(&self, name: &str) -> Result<String, LookupError> {
        match self {
            Registry::NpmView(client) => client.lookup_latest_version(name).await,
            Registry::Http(client) => client.lookup_latest_version(name).await,
        }
    }
}
