//! Error handling for page handlers.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use registry_client::{PackageNameError, RegistryError};

/// Errors which can occur while rendering a page.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The requested package or version does not exist.
    #[error("package {0} not found")]
    PackageNotFound(String),

    /// The package name in the request path was invalid.
    #[error("invalid package name: {0}")]
    InvalidPackageName(#[from] PackageNameError),

    /// The requested version was not valid semver.
    #[error("invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),

    /// The registry API could not be reached or returned an error.
    #[error("registry unavailable: {0}")]
    Upstream(#[source] RegistryError),

    /// A template failed to render.
    #[error("template error: {0}")]
    Render(#[from] askama::Error),
}

impl SiteError {
    /// The response status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteError::PackageNotFound(_) => StatusCode::NOT_FOUND,
            SiteError::InvalidPackageName(_) => StatusCode::BAD_REQUEST,
            SiteError::InvalidVersion(_) => StatusCode::BAD_REQUEST,
            SiteError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SiteError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    reason: &'static str,
    message: String,
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error serving page: {}", self);
        }

        let template = ErrorTemplate {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message: self.to_string(),
        };

        match template.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(error) => {
                tracing::error!("Failed to render the error page: {}", error);
                (status, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            SiteError::PackageNotFound("hello/world".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SiteError::Upstream(RegistryError::Response {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".into(),
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
