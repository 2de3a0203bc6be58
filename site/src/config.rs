//! Brand presets and runtime configuration for the site server.

use std::net::SocketAddr;

use api_client::uri::{IntoUri as _, ParseUriError};
use http::Uri;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when resolving the site configuration.
#[derive(Debug, Error)]
pub enum SiteConfigError {
    /// The configured brand does not match any preset.
    #[error("unknown brand: {0}")]
    UnknownBrand(String),

    /// The configured API base URL could not be parsed.
    #[error("invalid API URL: {0}")]
    ApiUrl(#[from] ParseUriError),
}

/// The identity and wording of one registry front-end instance.
///
/// The two production instances are near-identical deployments of the
/// same server pointed at different registries, so everything that
/// differs between them lives here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteBrand {
    /// Short name of the registry, used in page titles and the header.
    pub name: String,

    /// One-line description shown on the home page.
    pub tagline: String,

    /// Public origin of the site, used to build canonical links.
    pub site_base: String,

    /// Base URL of the registry API.
    #[serde(with = "api_client::uri::serde")]
    pub api_url: Uri,

    /// Name of the command line tool users install packages with.
    pub cli_name: String,

    /// Where the registry tooling is developed.
    pub repository: String,
}

impl SiteBrand {
    /// The gooey registry front-end.
    pub fn gooey() -> Self {
        Self {
            name: "gooey".to_owned(),
            tagline: "Manage and share packages for your Roblox projects".to_owned(),
            site_base: "https://gooey.run".to_owned(),
            api_url: Uri::from_static("https://api.gooey.run"),
            cli_name: "gooey".to_owned(),
            repository: "https://github.com/gooey-rbx/gooey".to_owned(),
        }
    }

    /// The rbxpm registry front-end.
    pub fn rbxpm() -> Self {
        Self {
            name: "rbxpm".to_owned(),
            tagline: "The package manager for the Roblox ecosystem".to_owned(),
            site_base: "https://rbxpm.run".to_owned(),
            api_url: Uri::from_static("https://api.rbxpm.run"),
            cli_name: "rbxpm".to_owned(),
            repository: "https://github.com/rbxpm/rbxpm".to_owned(),
        }
    }

    /// Look up a brand preset by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "gooey" => Some(Self::gooey()),
            "rbxpm" => Some(Self::rbxpm()),
            _ => None,
        }
    }
}

fn default_brand() -> String {
    "gooey".to_owned()
}

fn default_listen() -> SocketAddr {
    ([0, 0, 0, 0], 8080).into()
}

/// Runtime configuration for the site server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// The brand preset to serve, `gooey` or `rbxpm`.
    #[serde(default = "default_brand")]
    pub brand: String,

    /// The socket address the server listens on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Base URL of the registry API, overriding the brand default.
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand: default_brand(),
            listen: default_listen(),
            api_url: None,
        }
    }
}

impl SiteConfig {
    /// The environment variable consulted for the API base URL of the
    /// configured brand.
    pub fn api_url_env(&self) -> String {
        format!("{}_API_URL", self.brand.to_ascii_uppercase())
    }

    /// Resolve this configuration into a concrete brand, applying the
    /// configured API URL on top of the preset default.
    pub fn resolve(&self) -> Result<SiteBrand, SiteConfigError> {
        let mut brand = SiteBrand::named(&self.brand)
            .ok_or_else(|| SiteConfigError::UnknownBrand(self.brand.clone()))?;

        if let Some(api_url) = self.api_url.as_deref() {
            brand.api_url = api_url.into_uri()?;
        }

        Ok(brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve() {
        let config = SiteConfig::default();
        let brand = config.resolve().unwrap();
        assert_eq!(brand.name, "gooey");
        assert_eq!(brand.api_url.to_string(), "https://api.gooey.run/");

        let config = SiteConfig {
            brand: "rbxpm".to_owned(),
            ..SiteConfig::default()
        };
        let brand = config.resolve().unwrap();
        assert_eq!(brand.site_base, "https://rbxpm.run");
    }

    #[test]
    fn unknown_brands_are_rejected() {
        let config = SiteConfig {
            brand: "sushi".to_owned(),
            ..SiteConfig::default()
        };

        let err = config.resolve().unwrap_err();
        assert!(matches!(err, SiteConfigError::UnknownBrand(name) if name == "sushi"));
    }

    #[test]
    fn api_url_override() {
        let config = SiteConfig {
            api_url: Some("http://localhost:8000".to_owned()),
            ..SiteConfig::default()
        };

        let brand = config.resolve().unwrap();
        assert_eq!(brand.api_url.to_string(), "http://localhost:8000/");

        let config = SiteConfig {
            api_url: Some("not a url".to_owned()),
            ..SiteConfig::default()
        };
        config.resolve().unwrap_err();
    }

    #[test]
    fn api_url_env_follows_the_brand() {
        let config = SiteConfig::default();
        assert_eq!(config.api_url_env(), "GOOEY_API_URL");

        let config = SiteConfig {
            brand: "rbxpm".to_owned(),
            ..SiteConfig::default()
        };
        assert_eq!(config.api_url_env(), "RBXPM_API_URL");
    }

    #[test]
    fn config_files_use_kebab_case_keys() {
        let config: SiteConfig = toml_edit::de::from_str(indoc::indoc! {r#"
            brand = "rbxpm"
            listen = "127.0.0.1:9000"
            api-url = "http://localhost:8000"
        "#})
        .unwrap();

        assert_eq!(config.brand, "rbxpm");
        assert_eq!(config.listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn config_files_may_be_empty() {
        let config: SiteConfig = toml_edit::de::from_str("").unwrap();
        assert_eq!(config.brand, "gooey");
        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.api_url.is_none());
    }

    #[test]
    fn brands_deserialize_from_config_tables() {
        let brand: SiteBrand = toml_edit::de::from_str(indoc::indoc! {r#"
            name = "internal"
            tagline = "Packages for internal projects"
            site-base = "https://registry.corp.example"
            api-url = "https://api.registry.corp.example"
            cli-name = "gooey"
            repository = "https://github.com/example/registry"
        "#})
        .unwrap();

        assert_eq!(brand.name, "internal");
        assert_eq!(
            brand.api_url,
            Uri::from_static("https://api.registry.corp.example")
        );
    }
}
