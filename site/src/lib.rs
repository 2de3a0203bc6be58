//! A server-rendered front-end for a wally-style package registry.
//!
//! One binary serves either branded instance of the site. Pages are
//! rendered from the registry's public API on each request, so the
//! server keeps no state of its own and any number of replicas can
//! serve the same registry.
//!
//! # Example
//!
//! ```no_run
//! use site::{SiteBrand, SiteBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = SiteBuilder::new().brand(SiteBrand::rbxpm()).build();
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
mod pages;

pub use self::app::SiteBuilder;
pub use self::config::{SiteBrand, SiteConfig, SiteConfigError};
pub use self::error::SiteError;
pub use self::pages::canonical_url;
