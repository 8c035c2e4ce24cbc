//! drydock - staged builders and a publish pipeline for npm packages
//!
//! The [`staged`] module provides builders that accumulate fields over
//! several steps and validate them once, on assembly. The rest of the crate
//! uses them to model packages read from `package.json` and the options of
//! the deploy pipeline.

pub mod core;
pub mod ops;
pub mod staged;
pub mod util;

/// Test utilities and mocks for drydock unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

#[doc(hidden)]
pub use paste::paste as __paste;

pub use core::{Package, PackageDetails, PackageManifest};
pub use staged::{Assemble, Buildable, Builder, Field, MissingFieldError};
