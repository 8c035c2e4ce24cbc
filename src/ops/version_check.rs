//! Check that a package's local version is ahead of the registry.

use miette::Diagnostic as MietteDiagnostic;
use semver::Version;
use thiserror::Error;

use crate::core::Package;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Outcome of a successful version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// The registry has no release yet.
    FirstPublish { local: Version },
    /// The local version is strictly greater than the registry's.
    Bumped { local: Version, registry: Version },
}

/// Version check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum VersionCheckError {
    #[error("invalid version `{version}` for `{package}`")]
    #[diagnostic(code(drydock::version::invalid))]
    InvalidVersion { package: String, version: String },

    #[error("local version of `{package}` ({local}) is not greater than registry version {registry}")]
    #[diagnostic(
        code(drydock::version::not_greater),
        help("increase `version` in package.json before deploying")
    )]
    NotGreater {
        package: String,
        local: Version,
        registry: Version,
    },
}

impl VersionCheckError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            VersionCheckError::InvalidVersion { package, version } => Diagnostic::error(format!(
                "`{}` is not a valid version for `{}`",
                version, package
            ))
            .with_suggestion("Use a semantic version such as `1.2.3`"),

            VersionCheckError::NotGreater {
                package,
                local,
                registry,
            } => Diagnostic::error(format!("version of `{}` was not bumped", package))
                .with_context(format!("local version: {}", local))
                .with_context(format!("registry version: {}", registry))
                .with_suggestion(suggestions::BUMP_VERSION),
        }
    }
}

fn parse(package: &str, version: &str) -> Result<Version, VersionCheckError> {
    Version::parse(version.trim()).map_err(|_| VersionCheckError::InvalidVersion {
        package: package.to_string(),
        version: version.to_string(),
    })
}

/// Compare a package's version against the latest registry version.
///
/// `registry_version` is `None` when the registry has never seen the
/// package, which always passes.
pub fn check_version_bump(
    package: &Package,
    registry_version: Option<&str>,
) -> Result<VersionCheck, VersionCheckError> {
    let local = parse(package.name(), package.version())?;

    let Some(registry_version) = registry_version else {
        tracing::info!(
            "Package `{}` not found on registry, presumably this is the first publish",
            package.name()
        );
        return Ok(VersionCheck::FirstPublish { local });
    };

    let registry = parse(package.name(), registry_version)?;
    if local > registry {
        tracing::info!(
            "Local version `{}` is greater than registry version {}",
            package.specifier(),
            registry
        );
        Ok(VersionCheck::Bumped { local, registry })
    } else {
        Err(VersionCheckError::NotGreater {
            package: package.name().to_string(),
            local,
            registry,
        })
    }
}
