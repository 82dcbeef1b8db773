use crate::{LookupError, PackageDistTags, RegistryClient};
use modup_network::ThrottledClient;

/// Looks versions up by fetching the package document from an npm-compatible registry.
#[derive(Debug)]
pub struct HttpRegistryClient {
    client: ThrottledClient,
    registry: String,
}

impl HttpRegistryClient {
    /// `registry` is the base URL, trailing slash included.
    pub fn new(client: ThrottledClient, registry: String) -> Self {
        HttpRegistryClient { client, registry }
    }

    pub fn registry(&self) -> &'_ str {
        &self.registry
    }
}

/// URL of the package document of `name`. Scoped names keep their `@` but escape the `/`.
pub fn package_url(registry: &str, name: &str) -> String {
    format!("{registry}{}", name.replace('/', "%2f"))
}

impl RegistryClient for HttpRegistryClient {
    async fn lookup_latest_version(&self, name: &str) -> Result<String, LookupError> {
        let network_error = |error| LookupError::Network { name: name.to_string(), error };
        let url = package_url(&self.registry, name);

        let tags = self
            .client
            .run_with_permit(|client| {
                let request =
                    client.get(url).header("accept", "application/vnd.npm.install-v1+json");
                async move {
                    request.send().await?.error_for_status()?.json::<PackageDistTags>().await
                }
            })
            .await
            .map_err(network_error)?;

        tags.latest()
            .map(str::to_string)
            .ok_or_else(|| LookupError::MissingLatestTag { name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(registry: String) -> HttpRegistryClient {
        HttpRegistryClient::new(ThrottledClient::new_with_permits(4), registry)
    }

    #[test]
    fn build_package_url() {
        assert_eq!(
            package_url("https://registry.npmjs.org/", "lodash"),
            "https://registry.npmjs.org/lodash",
        );
        assert_eq!(
            package_url("https://registry.npmjs.org/", "@types/node"),
            "https://registry.npmjs.org/@types%2fnode",
        );
    }

    #[tokio::test]
    async fn lookup_latest_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/lodash")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "name": "lodash", "dist-tags": { "latest": "4.17.21" } }"#)
            .create_async()
            .await;

        let client = client(format!("{}/", server.url()));
        assert_eq!(client.lookup_latest_version("lodash").await.unwrap(), "4.17.21");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_is_lookup_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/missing").with_status(404).create_async().await;

        let client = client(format!("{}/", server.url()));
        let error = client.lookup_latest_version("missing").await.expect_err("404");
        assert!(matches!(error, LookupError::Network { .. }));
        assert_eq!(error.name(), "missing");
    }

    #[tokio::test]
    async fn missing_latest_tag_is_lookup_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/untagged")
            .with_status(200)
            .with_body(r#"{ "name": "untagged", "dist-tags": {} }"#)
            .create_async()
            .await;

        let client = client(format!("{}/", server.url()));
        let error = client.lookup_latest_version("untagged").await.expect_err("no latest tag");
        assert!(matches!(error, LookupError::MissingLatestTag { .. }));
    }
}
