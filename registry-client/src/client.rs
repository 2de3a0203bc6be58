//! The registry API client.

use api_client::uri::UriExtension as _;
use api_client::{ApiClient, Backoff, Response};
use http::{StatusCode, Uri};
use semver::Version;

use crate::manifest::{PackageBrief, PackageMetadata};
use crate::name::PackageName;

const USER_AGENT: &str = "registry-client/0.1.0";

/// Errors returned by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The requested package does not exist in the registry.
    #[error("package {0} not found")]
    NotFound(PackageName),

    /// The registry returned an error response.
    #[error("Response error: {status} {message}")]
    Response {
        /// The HTTP status code
        status: StatusCode,
        /// The HTTP body returned with the status code.
        message: String,
    },

    /// An API request encountered an error.
    #[error(transparent)]
    Request(#[from] api_client::Error),

    /// The response body could not be deserialized.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
}

/// A client for the public API of a wally-style package registry.
///
/// The registry exposes three read-only endpoints: package search,
/// package metadata, and package contents archives. Content archives are
/// served at well-known locations, so downloading them never requires a
/// round trip through this client.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    inner: ApiClient,
}

impl RegistryClient {
    /// Create a new registry client for the API served at `base`.
    pub fn new(base: Uri) -> Self {
        Self {
            inner: ApiClient::new(base, USER_AGENT),
        }
    }

    /// Create a registry client which retries transient upstream failures
    /// with exponential backoff.
    pub fn with_retries(base: Uri) -> Self {
        Self {
            inner: ApiClient::new(base, USER_AGENT).with_retries(Backoff::default()),
        }
    }

    /// Create a registry client over a custom transport, useful for tests.
    pub fn new_with_inner_service<S>(base: Uri, inner: S) -> Self
    where
        S: tower::Service<
                hyperdriver::body::Request,
                Response = hyperdriver::body::Response,
                Error = hyperdriver::client::Error,
            > + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            inner: ApiClient::new_with_inner_service(base, inner),
        }
    }

    /// Search the registry for packages matching `query`.
    ///
    /// The query is matched against the scope, name and description of
    /// every published package. Prefixing it with a field name restricts
    /// the match to that field, for example `description: ui`. The prefix
    /// is interpreted by the registry, not by this client.
    ///
    /// Queries of one character or less return no results without
    /// contacting the registry.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<PackageBrief>, RegistryError> {
        if query.chars().count() <= 1 {
            return Ok(Vec::new());
        }

        let response = self
            .inner
            .get("v1/package-search")
            .query(&[("query", query)])?
            .send()
            .await?;

        let body = self.collect(response).await?;
        let briefs: Vec<PackageBrief> = serde_json::from_str(&body)?;

        tracing::trace!("Found {} packages", briefs.len());
        Ok(briefs)
    }

    /// Fetch every published manifest for a package.
    #[tracing::instrument(skip(self))]
    pub async fn metadata(&self, name: &PackageName) -> Result<PackageMetadata, RegistryError> {
        let endpoint = format!("v1/package-metadata/{}/{}", name.scope(), name.name());
        let response = self.inner.get(&endpoint).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(name.clone()));
        }

        let body = self.collect(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The URL of the contents archive for a package version.
    ///
    /// This is pure construction: the archive lives at a well-known
    /// location under the registry base, and following the link is left
    /// to the caller.
    pub fn contents_url(&self, name: &PackageName, version: &Version) -> Uri {
        self.inner.base().clone().join(format!(
            "v1/package-contents/{}/{}/{}",
            name.scope(),
            name.name(),
            version
        ))
    }

    async fn collect(&self, response: Response) -> Result<String, RegistryError> {
        let status = response.status();

        if !status.is_success() {
            tracing::error!("Error response from the registry: {:?}", status);

            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "No message".into());
            return Err(RegistryError::Response { status, message });
        }

        response
            .text()
            .await
            .map_err(|err| RegistryError::Request(api_client::Error::ResponseBody(err)))
    }
}
