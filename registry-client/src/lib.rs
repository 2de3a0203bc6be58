//! A typed client for the public API of a wally-style package registry.
//!
//! The registry exposes three read-only endpoints: package search,
//! package metadata and package contents. [`RegistryClient`] wraps the
//! first two and constructs download links for the third.

mod client;
mod manifest;
mod name;
mod req;

pub use self::client::{RegistryClient, RegistryError};
pub use self::manifest::{PackageBrief, PackageInfo, PackageManifest, PackageMetadata, Realm};
pub use self::name::{PackageName, PackageNameError};
pub use self::req::{PackageReq, PackageReqError};
