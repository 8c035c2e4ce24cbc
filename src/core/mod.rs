//! Core data structures for drydock.
//!
//! - Packages and their registry details, staged through builders
//! - The `package.json` manifest that seeds those builders

pub mod manifest;
pub mod package;

pub use manifest::{PackageManifest, MANIFEST_NAME};
pub use package::{
    FailedPackage, Package, PackageBuilder, PackageDetails, PackageDetailsBuilder,
    PackageDetailsPartial, PackagePartial, SuccessfulPackage,
};
