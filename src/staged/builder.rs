//! Builder - a partial value paired with the function that assembles it.
//!
//! A [`Builder`] owns a partial `P` (usually a struct generated by
//! [`partial!`](crate::partial)) whose fields are all optional, and the
//! assembly function that turns that partial into a finished `T`. The
//! partial is reachable through `Deref`/`DerefMut`, so fields are set
//! directly on the builder:
//!
//! ```rust,ignore
//! let mut builder = Package::builder();
//! builder.set_name("left-pad");
//! builder.set_version("1.3.0");
//! let pkg = builder.assemble()?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::staged::error::AssembleResult;

/// Something that can be assembled into a finished value.
///
/// Assembly only reads from `self`, so it may be repeated; each call resolves
/// nested builders again.
pub trait Assemble {
    /// The finished type.
    type Output;

    /// Produce the finished value, or fail on the first missing required field.
    fn assemble(&self) -> AssembleResult<Self::Output>;
}

/// Assembly function stored in a builder.
pub type AssembleFn<T, P> = Box<dyn Fn(&P) -> AssembleResult<T>>;

/// A partially-populated `T`, staged in a partial of type `P`.
pub struct Builder<T, P> {
    partial: P,
    assemble_fn: AssembleFn<T, P>,
    _target: PhantomData<fn() -> T>,
}

impl<T, P> Builder<T, P> {
    /// Create a builder with an empty partial.
    pub fn new<F>(assemble_fn: F) -> Self
    where
        P: Default,
        F: Fn(&P) -> AssembleResult<T> + 'static,
    {
        Self::with_defaults(assemble_fn, P::default())
    }

    /// Create a builder pre-populated with `defaults`.
    ///
    /// Nothing is validated here; later assignments replace default fields
    /// wholesale.
    pub fn with_defaults<F>(assemble_fn: F, defaults: P) -> Self
    where
        F: Fn(&P) -> AssembleResult<T> + 'static,
    {
        Builder {
            partial: defaults,
            assemble_fn: Box::new(assemble_fn),
            _target: PhantomData,
        }
    }

    /// Borrow the staged partial.
    pub fn partial(&self) -> &P {
        &self.partial
    }

    /// Take the staged partial, dropping the assembly function.
    pub fn into_partial(self) -> P {
        self.partial
    }
}

impl<T, P> Assemble for Builder<T, P> {
    type Output = T;

    fn assemble(&self) -> AssembleResult<T> {
        tracing::trace!("assembling {}", std::any::type_name::<T>());
        (self.assemble_fn)(&self.partial)
    }
}

impl<T, P> Deref for Builder<T, P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.partial
    }
}

impl<T, P> DerefMut for Builder<T, P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.partial
    }
}

impl<T, P: fmt::Debug> fmt::Debug for Builder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("target", &std::any::type_name::<T>())
            .field("partial", &self.partial)
            .finish_non_exhaustive()
    }
}

/// A type with a canonical partial and assembly function.
///
/// Implementing this lets callers write `T::builder()` instead of passing the
/// assembly function around.
pub trait Buildable: Sized + 'static {
    /// The partial staged by this type's builder.
    type Partial: Default + 'static;

    /// Assemble a finished value from a partial.
    fn assemble_from(partial: &Self::Partial) -> AssembleResult<Self>;

    /// An empty builder for this type.
    fn builder() -> Builder<Self, Self::Partial> {
        Builder::new(Self::assemble_from)
    }

    /// A builder seeded with `defaults`.
    fn builder_with(defaults: Self::Partial) -> Builder<Self, Self::Partial> {
        Builder::with_defaults(Self::assemble_from, defaults)
    }
}

/// Assemble any builder. Equivalent to calling [`Assemble::assemble`].
pub fn assemble<B: Assemble + ?Sized>(builder: &B) -> AssembleResult<B::Output> {
    builder.assemble()
}
