//! Field resolution with presence policies.
//!
//! These helpers are called from assembly functions, once per field, in
//! whatever order the assembly function chooses. Each one resolves the field
//! (assembling it first when it holds a nested builder) and applies a
//! presence policy:
//!
//! - [`required`]: absent is an error.
//! - [`optional`] / [`optional_or`]: absent yields `None` or a default.
//! - [`required_on_condition`]: required only while a predicate holds.
//!
//! A field set to `None` after having a value is indistinguishable from one
//! that was never set.
//!
//! The [`required!`](crate::required), [`optional!`](crate::optional) and
//! [`required_if!`](crate::required_if) macros take the field by name so the
//! reported field name always matches the struct field.

use crate::staged::error::{AssembleResult, MissingFieldError};
use crate::staged::field::Field;

/// Resolve a field that must be present.
pub fn required<T: Clone>(name: &'static str, value: &Option<Field<T>>) -> AssembleResult<T> {
    match value {
        Some(field) => field.resolve(),
        None => {
            tracing::debug!("required field `{}` is missing", name);
            Err(MissingFieldError::new(name))
        }
    }
}

/// Resolve a field that may be absent.
///
/// Absence never fails, but a present nested builder can still fail to
/// assemble.
pub fn optional<T: Clone>(value: &Option<Field<T>>) -> AssembleResult<Option<T>> {
    value.as_ref().map(Field::resolve).transpose()
}

/// Resolve a field that may be absent, falling back to `default`.
pub fn optional_or<T: Clone>(value: &Option<Field<T>>, default: T) -> AssembleResult<T> {
    Ok(optional(value)?.unwrap_or(default))
}

/// Resolve a field that is required only when `is_required` returns true.
///
/// The predicate runs once, at the call. It should only look at values the
/// assembly function has already resolved.
pub fn required_on_condition<T, F>(
    name: &'static str,
    value: &Option<Field<T>>,
    is_required: F,
) -> AssembleResult<Option<T>>
where
    T: Clone,
    F: FnOnce() -> bool,
{
    if is_required() {
        required(name, value).map(Some)
    } else {
        optional(value)
    }
}

/// Resolve `$src.$field` as required, naming the error after the field.
#[macro_export]
macro_rules! required {
    ($src:expr, $field:ident) => {
        $crate::staged::validate::required(stringify!($field), &$src.$field)
    };
}

/// Resolve `$src.$field` as optional, with an optional default.
#[macro_export]
macro_rules! optional {
    ($src:expr, $field:ident) => {
        $crate::staged::validate::optional(&$src.$field)
    };
    ($src:expr, $field:ident, $default:expr) => {
        $crate::staged::validate::optional_or(&$src.$field, $default)
    };
}

/// Resolve `$src.$field` as required while `$cond` holds.
#[macro_export]
macro_rules! required_if {
    ($src:expr, $field:ident, $cond:expr) => {
        $crate::staged::validate::required_on_condition(stringify!($field), &$src.$field, $cond)
    };
}
