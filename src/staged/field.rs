//! Field values held by a partial.
//!
//! A field of a partial is either absent (`None`), a plain value, or a
//! nested builder that produces a value of the field's type. The tag on
//! [`Field`] is what tells the resolver whether it must assemble the value
//! before handing it out.

use std::fmt;

use crate::staged::builder::Assemble;
use crate::staged::error::AssembleResult;

/// A present field value: plain, or still to be assembled.
pub enum Field<T> {
    /// A finished value, returned as-is on resolution.
    Plain(T),
    /// A builder for the value, assembled on resolution.
    Nested(Box<dyn Assemble<Output = T>>),
}

impl<T> Field<T> {
    /// Wrap a finished value.
    pub fn plain(value: impl Into<T>) -> Self {
        Field::Plain(value.into())
    }

    /// Wrap a builder so it is assembled when the field is read.
    pub fn nested<B>(builder: B) -> Self
    where
        B: Assemble<Output = T> + 'static,
    {
        Field::Nested(Box::new(builder))
    }

    /// Whether this value is a builder that needs assembling.
    pub fn is_builder(&self) -> bool {
        matches!(self, Field::Nested(_))
    }

    /// Borrow the plain value, if this is not a builder.
    pub fn as_plain(&self) -> Option<&T> {
        match self {
            Field::Plain(value) => Some(value),
            Field::Nested(_) => None,
        }
    }
}

impl<T: Clone> Field<T> {
    /// Produce the finished value.
    ///
    /// Plain values are cloned out; nested builders are assembled, which
    /// recursively resolves whatever they nest in turn.
    pub fn resolve(&self) -> AssembleResult<T> {
        match self {
            Field::Plain(value) => Ok(value.clone()),
            Field::Nested(builder) => builder.assemble(),
        }
    }
}

/// Test whether a (possibly absent) field value is a builder.
///
/// Absent values and plain values are never builders.
pub fn is_builder<T>(value: Option<&Field<T>>) -> bool {
    value.is_some_and(Field::is_builder)
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            Field::Nested(_) => f.write_str("Nested(..)"),
        }
    }
}

impl<T: PartialEq> PartialEq<T> for Field<T> {
    fn eq(&self, other: &T) -> bool {
        self.as_plain() == Some(other)
    }
}
