//! Command implementations

pub mod check;
pub mod completions;
pub mod deploy;

use std::path::Path;

use drydock::core::Package;
use drydock::ops::load_package;
use drydock::staged::MissingFieldError;
use drydock::util::diagnostic::{emit, suggestions};

/// Load the package, exiting with a diagnostic when the manifest is invalid.
pub fn load_package_or_exit(manifest_path: &Path, color: bool) -> anyhow::Result<Package> {
    match load_package(manifest_path) {
        Ok(package) => Ok(package),
        Err(e) => {
            if let Some(missing) = e.downcast_ref::<MissingFieldError>() {
                emit(&missing.to_diagnostic().with_location(manifest_path), color);
                std::process::exit(1);
            }
            if !manifest_path.exists() {
                emit(
                    &drydock::util::Diagnostic::error(format!("{:#}", e))
                        .with_suggestion(suggestions::NO_MANIFEST),
                    color,
                );
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
