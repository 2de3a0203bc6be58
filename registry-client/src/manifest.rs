//! Wire types returned by the registry API.

use std::collections::BTreeMap;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::name::PackageName;
use crate::req::PackageReq;

/// Which runtime context a package is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    /// Code shared between the server and clients.
    Shared,

    /// Code that only runs on the server.
    Server,

    /// Tooling that is only used during development.
    Dev,
}

impl Realm {
    /// The lowercase name of the realm, as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Shared => "shared",
            Realm::Server => "server",
            Realm::Dev => "dev",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row in package search results.
///
/// The search endpoint returns a trimmed down view of each matching
/// package rather than its full manifests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageBrief {
    /// The owning author or organization of the package.
    pub scope: String,

    /// The name of the package within its scope.
    pub name: String,

    /// Every published version of the package.
    #[serde(default)]
    pub versions: Vec<Version>,

    /// The package description, if one was published.
    #[serde(default)]
    pub description: Option<String>,
}

impl PackageBrief {
    /// The highest published version of the package.
    pub fn latest(&self) -> Option<&Version> {
        self.versions.iter().max()
    }
}

/// The `[package]` table of a published manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// The `scope/name` pair identifying the package.
    pub name: PackageName,

    /// The version of the package this manifest describes.
    pub version: Version,

    /// The registry the package was published to.
    #[serde(default)]
    pub registry: Option<String>,

    /// The realm the package is loaded into.
    pub realm: Realm,

    /// The package description, if one was published.
    #[serde(default)]
    pub description: Option<String>,

    /// The SPDX license expression of the package.
    #[serde(default)]
    pub license: Option<String>,

    /// The people and organizations credited with the package.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Paths included in the package contents archive.
    #[serde(default)]
    pub include: Vec<String>,

    /// Paths excluded from the package contents archive.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether the package was marked as unpublishable.
    #[serde(default)]
    pub private: bool,
}

/// One published manifest, as rendered into the registry index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Details about the package itself.
    pub package: PackageInfo,

    /// Packages required at runtime in the package's own realm.
    #[serde(default)]
    pub dependencies: BTreeMap<String, PackageReq>,

    /// Packages required at runtime on the server.
    #[serde(default, rename = "server-dependencies")]
    pub server_dependencies: BTreeMap<String, PackageReq>,

    /// Packages required only during development.
    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: BTreeMap<String, PackageReq>,
}

/// Every published manifest for a package, as returned by the metadata
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// The published manifests, one per version.
    pub versions: Vec<PackageManifest>,
}

impl PackageMetadata {
    /// The manifest with the highest published version.
    pub fn latest(&self) -> Option<&PackageManifest> {
        self.versions
            .iter()
            .max_by(|a, b| a.package.version.cmp(&b.package.version))
    }

    /// The manifest for a specific published version.
    pub fn version(&self, version: &Version) -> Option<&PackageManifest> {
        self.versions.iter().find(|m| &m.package.version == version)
    }
}
