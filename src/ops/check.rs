//! Load and validate a package from its manifest.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::{Package, PackageManifest};
use crate::staged::Assemble;

/// Read `manifest_path` and assemble the package it describes.
///
/// A missing required field surfaces as a
/// [`MissingFieldError`](crate::staged::MissingFieldError) behind the
/// returned error's context, so callers can downcast to it.
pub fn load_package(manifest_path: &Path) -> Result<Package> {
    if !manifest_path.exists() {
        bail!("could not find `{}`", manifest_path.display());
    }

    let manifest = PackageManifest::load(manifest_path)?;
    let package = manifest
        .to_builder()
        .assemble()
        .with_context(|| format!("invalid manifest `{}`", manifest_path.display()))?;

    tracing::debug!("Loaded {} from {}", package, manifest_path.display());
    Ok(package)
}
