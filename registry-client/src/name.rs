//! Validated package names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize as _, Deserializer, Serializer};
use thiserror::Error;

const MAX_LABEL_LENGTH: usize = 64;

/// Errors that can occur when validating a package name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageNameError {
    /// The name did not contain a `/` between scope and name.
    #[error("a package name is of the form SCOPE/NAME")]
    MissingSeparator,

    /// The scope or name half was empty.
    #[error("package {0} cannot be empty")]
    Empty(&'static str),

    /// The scope or name half was longer than the registry allows.
    #[error("package {0} cannot be longer than {MAX_LABEL_LENGTH} characters")]
    TooLong(&'static str),

    /// The scope or name half contained a forbidden character.
    #[error("package {0} may only contain lowercase letters, digits and dashes")]
    InvalidCharacter(&'static str),
}

/// The `scope/name` pair identifying a package in the registry.
///
/// Both halves are restricted to lowercase ASCII letters, digits and
/// dashes, and to at most 64 characters. The registry enforces the same
/// rules at publish time, so every name it hands back parses cleanly.
///
/// Examples:
/// * `roblox/roact`
/// * `miss-frizz/magic-school-bus`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName {
    scope: String,
    name: String,
}

impl PackageName {
    /// Create a package name from its scope and name halves.
    pub fn new<S, N>(scope: S, name: N) -> Result<Self, PackageNameError>
    where
        S: Into<String>,
        N: Into<String>,
    {
        let scope = scope.into();
        let name = name.into();

        validate_label(&scope, "scope")?;
        validate_label(&name, "name")?;

        Ok(Self { scope, name })
    }

    /// The owning author or organization of the package.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The name of the package within its scope.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_label(label: &str, part: &'static str) -> Result<(), PackageNameError> {
    if label.is_empty() {
        return Err(PackageNameError::Empty(part));
    }

    if label.len() > MAX_LABEL_LENGTH {
        return Err(PackageNameError::TooLong(part));
    }

    if !label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(PackageNameError::InvalidCharacter(part));
    }

    Ok(())
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

impl FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (scope, name) = value
            .split_once('/')
            .ok_or(PackageNameError::MissingSeparator)?;
        PackageName::new(scope, name)
    }
}

impl serde::Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        let name = PackageName::new("hello", "world").unwrap();
        assert_eq!(name.scope(), "hello");
        assert_eq!(name.name(), "world");
        assert_eq!(name.to_string(), "hello/world");
    }

    #[test]
    fn parse() {
        let name: PackageName = "miss-frizz/magic-school-bus".parse().unwrap();
        assert_eq!(name.scope(), "miss-frizz");
        assert_eq!(name.name(), "magic-school-bus");

        let digits: PackageName = "team-7/rank-2-sensor".parse().unwrap();
        assert_eq!(digits.scope(), "team-7");
        assert_eq!(digits.name(), "rank-2-sensor");
    }

    #[test]
    fn parse_invalid() {
        let missing_separator: Result<PackageName, _> = "hello".parse();
        assert_eq!(
            missing_separator.unwrap_err(),
            PackageNameError::MissingSeparator
        );

        let empty_scope: Result<PackageName, _> = "/world".parse();
        assert_eq!(empty_scope.unwrap_err(), PackageNameError::Empty("scope"));

        let empty_name: Result<PackageName, _> = "hello/".parse();
        assert_eq!(empty_name.unwrap_err(), PackageNameError::Empty("name"));

        let uppercase: Result<PackageName, _> = "Hello/world".parse();
        assert_eq!(
            uppercase.unwrap_err(),
            PackageNameError::InvalidCharacter("scope")
        );

        let underscore: Result<PackageName, _> = "hello/big_world".parse();
        assert_eq!(
            underscore.unwrap_err(),
            PackageNameError::InvalidCharacter("name")
        );

        let too_long: Result<PackageName, _> = format!("hello/{}", "a".repeat(65)).parse();
        assert_eq!(too_long.unwrap_err(), PackageNameError::TooLong("name"));
    }

    #[test]
    fn serialization() {
        let name = PackageName::new("lpghatguy", "asink").unwrap();

        let serialized = serde_json::to_string(&name).unwrap();
        assert_eq!(serialized, "\"lpghatguy/asink\"");

        let deserialized: PackageName = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, name);
    }
}
