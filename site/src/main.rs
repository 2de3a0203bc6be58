//! Serve a branded registry front-end.

use std::net::SocketAddr;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use site::{SiteBuilder, SiteConfig};

#[derive(Debug, Parser)]
#[command(name = "registry-site", version, about = "Serve a package registry front-end")]
struct Args {
    /// The brand preset to serve, `gooey` or `rbxpm`.
    #[arg(long)]
    brand: Option<String>,

    /// The socket address to listen on.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Base URL of the registry API, overriding the brand default.
    #[arg(long)]
    api_url: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            toml_edit::de::from_str::<SiteConfig>(&text)?
        }
        None => SiteConfig::default(),
    };

    if let Some(brand) = args.brand {
        config.brand = brand;
    }
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    // Flags beat the environment, which beats the configuration file.
    if let Some(api_url) = args
        .api_url
        .or_else(|| std::env::var(config.api_url_env()).ok())
    {
        config.api_url = Some(api_url);
    }

    let brand = config.resolve()?;
    tracing::info!("Serving the {} front-end against {}", brand.name, brand.api_url);

    let app = SiteBuilder::new().brand(brand).build();

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
