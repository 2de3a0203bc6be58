//! Package requirements, naming a package and an acceptable version range.

use std::fmt;
use std::str::FromStr;

use semver::VersionReq;
use serde::{Deserialize as _, Deserializer, Serializer};
use thiserror::Error;

use crate::name::{PackageName, PackageNameError};

/// Errors that can occur when parsing a package requirement.
#[derive(Debug, Error)]
pub enum PackageReqError {
    /// The requirement was not of the form `SCOPE/NAME@VERSION_REQ`.
    #[error("a package requirement is of the form SCOPE/NAME@VERSION_REQ")]
    Format,

    /// The name half of the requirement was invalid.
    #[error(transparent)]
    Name(#[from] PackageNameError),

    /// The version requirement could not be parsed.
    #[error("could not parse version requirement: {0}")]
    VersionReq(#[from] semver::Error),
}

/// A requirement on a package, as found in the dependency tables of a
/// package manifest.
///
/// Examples:
/// * `roblox/roact@1.4.2`
/// * `lpghatguy/asink@0.2.0-alpha.3`
/// * `hello/world@>=0.2.0, <0.2.7`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageReq {
    name: PackageName,
    version_req: VersionReq,
}

impl PackageReq {
    /// Create a package requirement from a name and version requirement.
    pub fn new(name: PackageName, version_req: VersionReq) -> Self {
        Self { name, version_req }
    }

    /// The name of the required package.
    pub fn name(&self) -> &PackageName {
        &self.name
    }

    /// The acceptable version range of the required package.
    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }
}

impl fmt::Display for PackageReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version_req)
    }
}

impl FromStr for PackageReq {
    type Err = PackageReqError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, version_req_source) = value.split_once('@').ok_or(PackageReqError::Format)?;

        // VersionReq parses an empty or all-whitespace string as a
        // wildcard, which the registry does not accept.
        if version_req_source.trim().is_empty() {
            return Err(PackageReqError::Format);
        }

        let name: PackageName = name.parse()?;
        let version_req = version_req_source.parse()?;

        Ok(PackageReq::new(name, version_req))
    }
}

impl serde::Serialize for PackageReq {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PackageReq {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        // A bare semver version defaults to the ^ operator, matching what
        // Cargo does.
        let compat: PackageReq = "hello/world@1.2.3".parse().unwrap();
        assert_eq!(compat.name().scope(), "hello");
        assert_eq!(compat.name().name(), "world");
        assert_eq!(compat.version_req(), &VersionReq::parse("^1.2.3").unwrap());

        let with_ops: PackageReq = "hello/world@>=0.2.0, <0.2.7".parse().unwrap();
        assert_eq!(
            with_ops.version_req(),
            &VersionReq::parse(">=0.2.0, <0.2.7").unwrap()
        );
    }

    #[test]
    fn parse_invalid() {
        let no_version: Result<PackageReq, _> = "hello/world".parse();
        no_version.unwrap_err();

        let no_version_at: Result<PackageReq, _> = "hello/world@".parse();
        no_version_at.unwrap_err();

        let whitespace_version: Result<PackageReq, _> = "hello/world@   ".parse();
        whitespace_version.unwrap_err();

        let bad_name: Result<PackageReq, _> = "Hello/world@1.0.0".parse();
        bad_name.unwrap_err();
    }

    #[test]
    fn serialization() {
        let req = PackageReq::new(
            PackageName::new("lpghatguy", "asink").unwrap(),
            VersionReq::parse("2.3.1").unwrap(),
        );

        // Bare versions are stored with an explicit ^ operator.
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(serialized, "\"lpghatguy/asink@^2.3.1\"");

        let deserialized: PackageReq = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, req);
    }
}
