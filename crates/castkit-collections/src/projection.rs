//! Runtime-checked element projections
//!
//! A [`Projection`] describes how a backing element of type `From` is read
//! as a `To` and how a `To` is written back as a `From`. Either direction
//! may fail with a [`CastError`]; the check happens per access, never
//! eagerly for a whole collection.
//!
//! Three projections ship with the crate:
//! - [`Identity`]: same type in both directions
//! - [`Downcast`]: `Arc<dyn Any + Send + Sync>` read as `Arc<T>`
//! - [`Upcast`]: `Arc<T>` read as `Arc<dyn Any + Send + Sync>`
//!
//! Element hierarchies built on their own traits implement [`Projection`]
//! on a marker type of their choosing.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased shared element
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Element is not an instance of the projected type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot cast {} to {expected}", subject(.index))]
pub struct CastError {
    /// Name of the type the element was expected to be
    pub expected: &'static str,
    /// Position of the offending element, when the access was indexed
    pub index: Option<usize>,
}

fn subject(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("element at index {index}"),
        None => "value".to_string(),
    }
}

impl CastError {
    /// Create cast error for expected type name
    #[inline]
    #[must_use]
    pub fn new(expected: &'static str) -> Self {
        Self {
            expected,
            index: None,
        }
    }

    /// Cast error for type `T`
    #[inline]
    #[must_use]
    pub fn expected<T: ?Sized>() -> Self {
        Self::new(type_name::<T>())
    }

    /// Attach the position of the offending element
    #[inline]
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Conversion between a backing element and its projected form
///
/// `project` runs on every read, `unproject` on every write. Both are
/// expected to preserve reference identity where the element type has one
/// (e.g. cloning an `Arc`, never its contents).
pub trait Projection {
    /// Element type stored in the backing collection
    type From;

    /// Element type exposed by the view
    type To;

    /// Read a backing element as the projected type
    ///
    /// # Errors
    /// `CastError` if the element is not an instance of `To`
    fn project(value: &Self::From) -> Result<Self::To, CastError>;

    /// Convert a projected value into a backing element
    ///
    /// # Errors
    /// `CastError` if the value is not an instance of `From`
    fn unproject(value: Self::To) -> Result<Self::From, CastError>;
}

/// Same element type on both sides
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity<T>(PhantomData<fn() -> T>);

impl<T: Clone> Projection for Identity<T> {
    type From = T;
    type To = T;

    #[inline]
    fn project(value: &T) -> Result<T, CastError> {
        Ok(value.clone())
    }

    #[inline]
    fn unproject(value: T) -> Result<T, CastError> {
        Ok(value)
    }
}

/// Narrowing projection: type-erased elements read as `Arc<T>`
///
/// Reads fail for elements that are not a `T`; writes always succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Downcast<T>(PhantomData<fn() -> T>);

impl<T: Any + Send + Sync> Projection for Downcast<T> {
    type From = AnyArc;
    type To = Arc<T>;

    fn project(value: &AnyArc) -> Result<Arc<T>, CastError> {
        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| CastError::expected::<T>())
    }

    fn unproject(value: Arc<T>) -> Result<AnyArc, CastError> {
        let erased: AnyArc = value;
        Ok(erased)
    }
}

/// Widening projection: `Arc<T>` elements read as type-erased values
///
/// Reads always succeed; writes fail for values that are not a `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Upcast<T>(PhantomData<fn() -> T>);

impl<T: Any + Send + Sync> Projection for Upcast<T> {
    type From = Arc<T>;
    type To = AnyArc;

    fn project(value: &Arc<T>) -> Result<AnyArc, CastError> {
        let erased: AnyArc = value.clone();
        Ok(erased)
    }

    fn unproject(value: AnyArc) -> Result<Arc<T>, CastError> {
        value.downcast::<T>().map_err(|_| CastError::expected::<T>())
    }
}
