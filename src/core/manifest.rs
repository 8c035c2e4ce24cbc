//! Manifest parsing - the subset of `package.json` drydock reads.
//!
//! A manifest only seeds builders. Fields absent from the file stay absent in
//! the builder, so assembling it reports exactly which required field the
//! manifest is missing.

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::core::package::{
    Package, PackageBuilder, PackageDetails, PackageDetailsPartial, PackagePartial,
};
use crate::staged::Buildable;
use crate::util::json::read_json;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// `package.json`, as far as publishing is concerned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub repository: Option<Repository>,
    pub author: Option<Person>,
}

/// `repository` is either a URL or `{ "type": ..., "url": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    Url(String),
    Detailed {
        #[serde(rename = "type")]
        kind: Option<String>,
        url: String,
    },
}

impl Repository {
    pub fn url(&self) -> &str {
        match self {
            Repository::Url(url) => url,
            Repository::Detailed { url, .. } => url,
        }
    }
}

/// `author` is either `"Name <email> (url)"` or `{ "name": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Short(String),
    Detailed {
        name: String,
        email: Option<String>,
        url: Option<String>,
    },
}

impl Person {
    /// The person's name, without email or url.
    pub fn name(&self) -> &str {
        match self {
            Person::Short(s) => s
                .split(['<', '('])
                .next()
                .map(str::trim)
                .unwrap_or(s.as_str()),
            Person::Detailed { name, .. } => name,
        }
    }
}

impl PackageManifest {
    /// Load a manifest, tolerating comments.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Parse a manifest from a string, tolerating comments.
    pub fn parse(contents: &str) -> Result<Self> {
        crate::util::json::from_str(contents)
    }

    /// Stage a details builder from the manifest fields.
    pub fn details_partial(&self) -> PackageDetailsPartial {
        let mut details = PackageDetailsPartial::default();
        if let Some(name) = &self.name {
            details.set_name(name.as_str());
        }
        if let Some(version) = &self.version {
            details.set_version(version.as_str());
        }
        if let Some(homepage) = &self.homepage {
            details.set_homepage(homepage.as_str());
        }
        if let Some(license) = &self.license {
            details.set_license(license.as_str());
        }
        if let Some(repository) = &self.repository {
            details.set_repository_url(repository.url());
        }
        if let Some(author) = &self.author {
            details.set_publish_author(author.name());
        }
        details
    }

    /// Stage a package builder whose `details` is a nested builder.
    pub fn to_builder(&self) -> PackageBuilder {
        let mut partial = PackagePartial::default();
        if let Some(name) = &self.name {
            partial.set_name(name.as_str());
        }
        if let Some(version) = &self.version {
            partial.set_version(version.as_str());
        }
        partial.nest_details(PackageDetails::builder_with(self.details_partial()));

        Package::builder_with(partial)
    }
}
