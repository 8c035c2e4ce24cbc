//! Test fixtures for common test scenarios.
//!
//! Mock package data mirrors a small, successfully published package so
//! tests only need to override the fields they care about.

use chrono::{TimeZone, Utc};

use crate::core::{Package, PackageBuilder, PackageDetails, PackageDetailsPartial, PackagePartial};
use crate::staged::Buildable;

/// Fully-populated details for `mock-package@0.1.0`.
pub fn mock_details_partial() -> PackageDetailsPartial {
    PackageDetailsPartial::default()
        .with_homepage("https://github.com/peabnuts123/mock-package")
        .with_is_version_data_missing(false)
        .with_license("UNLICENSED")
        .with_name("mock-package")
        .with_publish_author("peabnuts123")
        .with_publish_date(Utc.with_ymd_and_hms(2018, 4, 18, 0, 0, 0).unwrap())
        .with_repository_url("https://github.com/peabnuts123/mock-package.git")
        .with_version("0.1.0")
}

/// A package builder whose `details` is a nested details builder.
pub fn mock_package_builder() -> PackageBuilder {
    let mut partial = PackagePartial::default()
        .with_has_error(false)
        .with_name("mock-package")
        .with_version("0.1.0");
    partial.nest_details(PackageDetails::builder_with(mock_details_partial()));

    Package::builder_with(partial)
}

/// `package.json` contents matching [`mock_package_builder`].
pub fn mock_manifest_json() -> &'static str {
    r#"{
  // comments are allowed
  "name": "mock-package",
  "version": "0.1.0",
  "homepage": "https://github.com/peabnuts123/mock-package",
  "license": "UNLICENSED",
  "repository": "https://github.com/peabnuts123/mock-package.git",
  "author": { "name": "peabnuts123" }
}
"#
}
