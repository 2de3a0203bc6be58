//! Page handlers and their templates.
//!
//! Every page is rendered from the registry's public API on request.
//! Handlers flatten the API types into plain strings before rendering,
//! so the templates stay free of formatting logic.

use std::sync::Arc;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::Html;
use semver::Version;
use serde::Deserialize;
use tracing::warn;

use registry_client::{PackageManifest, PackageName, RegistryError};

use crate::app::SiteState;
use crate::config::SiteBrand;
use crate::error::SiteError;

/// Build the absolute canonical URL for a request path.
pub fn canonical_url(site_base: &str, path: &str) -> String {
    format!("{}{}", site_base.trim_end_matches('/'), path)
}

/// Fields shared by every page template.
#[derive(Debug, Clone)]
struct PageContext {
    site_name: String,
    tagline: String,
    cli_name: String,
    repository: String,
    canonical: String,
}

impl PageContext {
    fn new(brand: &SiteBrand, path: &str) -> Self {
        Self {
            site_name: brand.name.clone(),
            tagline: brand.tagline.clone(),
            cli_name: brand.cli_name.clone(),
            repository: brand.repository.clone(),
            canonical: canonical_url(&brand.site_base, path),
        }
    }
}

#[derive(Debug, Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    ctx: PageContext,
}

/// The front page.
pub(crate) async fn home(
    State(state): State<Arc<SiteState>>,
    uri: Uri,
) -> Result<Html<String>, SiteError> {
    let template = HomeTemplate {
        ctx: PageContext::new(state.brand(), uri.path()),
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    ctx: PageContext,
    query: String,
    /// Whether the query was too short to send to the registry.
    short: bool,
    results: Vec<SearchRow>,
}

#[derive(Debug, Clone)]
struct SearchRow {
    scope: String,
    name: String,
    latest: String,
    description: String,
}

/// Search the registry and list matching packages.
///
/// A registry outage renders as an empty result list rather than an
/// error page, so the rest of the site stays browsable.
pub(crate) async fn search(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<SearchParams>,
    uri: Uri,
) -> Result<Html<String>, SiteError> {
    let query = params.q.unwrap_or_default();

    let briefs = match state.client().search(&query).await {
        Ok(briefs) => briefs,
        Err(error) => {
            warn!("Package search failed: {}", error);
            Vec::new()
        }
    };

    let results = briefs
        .into_iter()
        .map(|brief| SearchRow {
            latest: brief
                .latest()
                .map(ToString::to_string)
                .unwrap_or_default(),
            description: brief.description.unwrap_or_default(),
            scope: brief.scope,
            name: brief.name,
        })
        .collect();

    let template = SearchTemplate {
        ctx: PageContext::new(state.brand(), uri.path()),
        short: query.chars().count() < 2,
        query,
        results,
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackageParams {
    version: Option<String>,
}

#[derive(Debug, Template)]
#[template(path = "package.html")]
struct PackageTemplate {
    ctx: PageContext,
    package_id: String,
    version: String,
    realm: String,
    description: String,
    license: String,
    authors: Vec<String>,
    install_snippet: String,
    download_url: String,
    versions: Vec<VersionRow>,
    dependencies: Vec<DependencyTable>,
}

#[derive(Debug, Clone)]
struct VersionRow {
    version: String,
    href: String,
    current: bool,
}

#[derive(Debug, Clone)]
struct DependencyTable {
    title: &'static str,
    rows: Vec<DependencyRow>,
}

#[derive(Debug, Clone)]
struct DependencyRow {
    alias: String,
    req: String,
    href: String,
}

/// Show one package, at the requested or the latest version.
pub(crate) async fn package(
    State(state): State<Arc<SiteState>>,
    Path((scope, name)): Path<(String, String)>,
    Query(params): Query<PackageParams>,
    uri: Uri,
) -> Result<Html<String>, SiteError> {
    let name = PackageName::new(scope, name)?;

    let requested = params.version.as_deref().map(Version::parse).transpose()?;

    let metadata = match state.client().metadata(&name).await {
        Ok(metadata) => metadata,
        Err(RegistryError::NotFound(name)) => {
            return Err(SiteError::PackageNotFound(name.to_string()));
        }
        Err(error) => return Err(SiteError::Upstream(error)),
    };

    let manifest = match &requested {
        Some(version) => metadata.version(version),
        None => metadata.latest(),
    }
    .ok_or_else(|| match &requested {
        Some(version) => SiteError::PackageNotFound(format!("{name}@{version}")),
        None => SiteError::PackageNotFound(name.to_string()),
    })?;

    let version = &manifest.package.version;

    let mut published: Vec<&PackageManifest> = metadata.versions.iter().collect();
    published.sort_by(|a, b| b.package.version.cmp(&a.package.version));

    let versions = published
        .iter()
        .map(|m| VersionRow {
            version: m.package.version.to_string(),
            href: format!("/package/{}?version={}", name, m.package.version),
            current: m.package.version == *version,
        })
        .collect();

    let dependencies = [
        ("Dependencies", &manifest.dependencies),
        ("Server dependencies", &manifest.server_dependencies),
        ("Dev dependencies", &manifest.dev_dependencies),
    ]
    .into_iter()
    .filter(|(_, table)| !table.is_empty())
    .map(|(title, table)| DependencyTable {
        title,
        rows: table
            .iter()
            .map(|(alias, req)| DependencyRow {
                alias: alias.clone(),
                req: req.version_req().to_string(),
                href: format!("/package/{}", req.name()),
            })
            .collect(),
    })
    .collect();

    let template = PackageTemplate {
        ctx: PageContext::new(state.brand(), uri.path()),
        package_id: name.to_string(),
        version: version.to_string(),
        realm: manifest.package.realm.to_string(),
        description: manifest.package.description.clone().unwrap_or_default(),
        license: manifest.package.license.clone().unwrap_or_default(),
        authors: manifest.package.authors.clone(),
        install_snippet: format!("{} = \"{}@{}\"", name.name(), name, version),
        download_url: state.client().contents_url(&name, version).to_string(),
        versions,
        dependencies,
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Template)]
#[template(path = "install.html")]
struct InstallTemplate {
    ctx: PageContext,
}

/// Installation instructions for the registry's command line tool.
pub(crate) async fn install(
    State(state): State<Arc<SiteState>>,
    uri: Uri,
) -> Result<Html<String>, SiteError> {
    let template = InstallTemplate {
        ctx: PageContext::new(state.brand(), uri.path()),
    };

    Ok(Html(template.render()?))
}

#[derive(Debug, Template)]
#[template(path = "policies.html")]
struct PoliciesTemplate {
    ctx: PageContext,
}

/// The registry usage policies.
pub(crate) async fn policies(
    State(state): State<Arc<SiteState>>,
    uri: Uri,
) -> Result<Html<String>, SiteError> {
    let template = PoliciesTemplate {
        ctx: PageContext::new(state.brand(), uri.path()),
    };

    Ok(Html(template.render()?))
}
