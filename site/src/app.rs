//! Assembling the site service.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde_json::json;
use tower_http::trace::TraceLayer;

use registry_client::RegistryClient;

use crate::config::SiteBrand;
use crate::pages;

/// State shared by every page handler.
#[derive(Debug, Clone)]
pub(crate) struct SiteState {
    brand: SiteBrand,
    client: RegistryClient,
}

impl SiteState {
    pub(crate) fn brand(&self) -> &SiteBrand {
        &self.brand
    }

    pub(crate) fn client(&self) -> &RegistryClient {
        &self.client
    }
}

/// Builder for configuring and creating the site service.
#[derive(Debug)]
pub struct SiteBuilder {
    brand: Option<SiteBrand>,
    client: Option<RegistryClient>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    /// Create a new builder with no brand or client configured.
    pub fn new() -> Self {
        Self {
            brand: None,
            client: None,
        }
    }

    /// Set the brand to serve. Defaults to [`SiteBrand::gooey`].
    pub fn brand(mut self, brand: SiteBrand) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Set the registry client used to reach the upstream API.
    ///
    /// When no client is provided, one is built from the brand's API
    /// URL with the default retry policy.
    pub fn client(mut self, client: RegistryClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the site service.
    pub fn build(self) -> Router {
        let brand = self.brand.unwrap_or_else(SiteBrand::gooey);
        let client = self
            .client
            .unwrap_or_else(|| RegistryClient::with_retries(brand.api_url.clone()));

        let state = Arc::new(SiteState { brand, client });

        Router::new()
            .route("/", get(pages::home))
            .route("/search", get(pages::search))
            .route("/package/{scope}/{name}", get(pages::package))
            .route("/install", get(pages::install))
            .route("/policies", get(pages::policies))
            .route("/health", get(health))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Liveness probe for deployment health checks.
async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
