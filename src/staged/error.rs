//! Assembly error types.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// A required field was absent when a builder was assembled.
///
/// This is the only way assembly can fail. The error names the field of the
/// innermost builder that was missing it, so a failure inside a nested
/// builder reports the nested field rather than the outer one.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("field `{field}` is undefined, but marked as required")]
#[diagnostic(
    code(drydock::build::missing_field),
    help("set `{field}` on the builder before assembling it")
)]
pub struct MissingFieldError {
    field: &'static str,
}

impl MissingFieldError {
    /// Create an error for the named field.
    pub fn new(field: &'static str) -> Self {
        MissingFieldError { field }
    }

    /// Name of the missing field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!("missing required field `{}`", self.field))
            .with_context("the value could not be assembled until this field is set")
            .with_suggestion(format!("Provide a value for `{}`", self.field))
    }
}

/// Result of assembling a builder or resolving one of its fields.
pub type AssembleResult<T> = std::result::Result<T, MissingFieldError>;
