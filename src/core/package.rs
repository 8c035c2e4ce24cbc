//! Package - a published (or failed-to-publish) package and its details.
//!
//! Packages are staged through [`PackagePartial`] and assembled with
//! [`Buildable`]. `name` and `version` are always required; `details` is
//! required unless the package is marked as having an error.

use std::fmt;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::Serialize;

use crate::staged::{AssembleResult, Buildable, Builder};

/// Registry metadata for a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub publish_date: Option<DateTime<Utc>>,
    pub publish_author: Option<String>,
    pub version: String,
    /// Set when the registry had no data for this exact version.
    pub is_version_data_missing: bool,
    pub name: String,
    pub repository_url: String,
    pub homepage: String,
    pub license: String,
}

crate::partial! {
    /// Partially-filled [`PackageDetails`].
    #[derive(Debug)]
    pub struct PackageDetailsPartial {
        pub publish_date: DateTime<Utc>,
        pub publish_author: String,
        pub version: String,
        pub is_version_data_missing: bool,
        pub name: String,
        pub repository_url: String,
        pub homepage: String,
        pub license: String,
    }
}

impl Buildable for PackageDetails {
    type Partial = PackageDetailsPartial;

    fn assemble_from(src: &PackageDetailsPartial) -> AssembleResult<Self> {
        Ok(PackageDetails {
            publish_date: crate::optional!(src, publish_date)?,
            publish_author: crate::optional!(src, publish_author)?,
            version: crate::required!(src, version)?,
            is_version_data_missing: crate::optional!(src, is_version_data_missing, false)?,
            name: crate::required!(src, name)?,
            repository_url: crate::required!(src, repository_url)?,
            homepage: crate::required!(src, homepage)?,
            license: crate::required!(src, license)?,
        })
    }
}

/// A package, as seen by the deploy pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    name: String,
    version: String,
    has_error: bool,
    error: Option<String>,
    details: Option<PackageDetails>,
}

crate::partial! {
    /// Partially-filled [`Package`].
    #[derive(Debug)]
    pub struct PackagePartial {
        pub name: String,
        pub version: String,
        pub has_error: bool,
        pub error: String,
        pub details: PackageDetails,
    }
}

/// Builder for [`Package`].
pub type PackageBuilder = Builder<Package, PackagePartial>;

/// Builder for [`PackageDetails`].
pub type PackageDetailsBuilder = Builder<PackageDetails, PackageDetailsPartial>;

impl Buildable for Package {
    type Partial = PackagePartial;

    fn assemble_from(src: &PackagePartial) -> AssembleResult<Self> {
        let name = crate::required!(src, name)?;
        let version = crate::required!(src, version)?;
        let has_error = crate::optional!(src, has_error, false)?;
        let error = crate::optional!(src, error)?;
        // Only a package that failed may come without details.
        let details = crate::required_if!(src, details, || !has_error)?;

        Ok(Package {
            name,
            version,
            has_error,
            error,
            details,
        })
    }
}

impl Package {
    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the version string as declared.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parse the version as semver.
    pub fn semver(&self) -> Result<Version, semver::Error> {
        Version::parse(&self.version)
    }

    /// Get the recorded error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Get the registry details, if any.
    pub fn details(&self) -> Option<&PackageDetails> {
        self.details.as_ref()
    }

    /// Whether the package was marked as failed.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// `name@version`, as accepted by `npm install`.
    pub fn specifier(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    pub fn did_succeed(&self) -> bool {
        !self.has_error
    }

    pub fn did_fail(&self) -> bool {
        self.has_error
    }

    /// View a successful package, whose details are guaranteed present.
    pub fn as_successful(&self) -> Option<SuccessfulPackage<'_>> {
        if self.has_error {
            return None;
        }
        self.details.as_ref().map(|details| SuccessfulPackage {
            name: &self.name,
            version: &self.version,
            details,
        })
    }

    /// View a failed package.
    pub fn as_failed(&self) -> Option<FailedPackage<'_>> {
        self.has_error.then(|| FailedPackage {
            name: &self.name,
            version: &self.version,
            error: self.error.as_deref(),
        })
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A package that assembled without error.
#[derive(Debug, Clone, Copy)]
pub struct SuccessfulPackage<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub details: &'a PackageDetails,
}

/// A package that was marked as failed.
#[derive(Debug, Clone, Copy)]
pub struct FailedPackage<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub error: Option<&'a str>,
}
