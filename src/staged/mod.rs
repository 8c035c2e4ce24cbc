//! Staged construction of validated values.
//!
//! A value is staged in a partial (every field optional, any field may hold a
//! nested builder), then assembled in one step that resolves nested builders
//! depth-first and enforces which fields must be present:
//!
//! - [`builder`]: the [`Builder`] handle and the [`Assemble`] / [`Buildable`] traits
//! - [`field`]: the plain-or-nested [`Field`] tag
//! - [`validate`]: presence policies used inside assembly functions
//! - [`partial`]: the `partial!` macro generating partial structs
//!
//! Nothing here performs I/O; everything is synchronous and in memory.

pub mod builder;
pub mod error;
pub mod field;
pub mod partial;
pub mod validate;

pub use builder::{assemble, Assemble, AssembleFn, Buildable, Builder};
pub use error::{AssembleResult, MissingFieldError};
pub use field::{is_builder, Field};
pub use validate::{optional, optional_or, required, required_on_condition};
