//! Cursors over backing collections and projected views
//!
//! [`Cursor`] is the explicit advance/current/reset protocol. [`IndexCursor`]
//! walks a [`Shared`] collection by position; [`ProjectedCursor`] wraps any
//! backing cursor and converts each element on access.

use crate::collection::{OrderedCollection, Shared};
use crate::error::CollectionError;
use crate::projection::Projection;
use std::marker::PhantomData;

/// Cursor protocol errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// Cursor cannot rewind
    #[error("cursor does not support reset")]
    NotSupported,

    /// `current` read before the first `advance` or past the end
    #[error("cursor is not positioned on an element")]
    NotPositioned,

    /// Cursor used after disposal
    #[error("cursor has been disposed")]
    Disposed,

    /// Backing collection was written to since the pass started
    #[error("collection was modified during iteration")]
    Modified,
}

/// Forward cursor over a sequence of elements
pub trait Cursor {
    /// Element type
    type Item;

    /// Move to the next element
    ///
    /// Returns `Ok(false)` once the sequence is exhausted.
    ///
    /// # Errors
    /// `CursorError::Modified` if the sequence changed since the pass started
    fn advance(&mut self) -> Result<bool, CursorError>;

    /// Element at the current position
    ///
    /// # Errors
    /// - `CursorError::NotPositioned` before the first `advance` or after
    ///   exhaustion
    /// - `CursorError::Disposed` after `dispose`
    /// - `CursorError::Modified` if the sequence changed since the pass started
    fn current(&self) -> Result<Self::Item, CursorError>;

    /// Rewind to before the first element
    ///
    /// # Errors
    /// `CursorError::NotSupported` unless the cursor overrides this
    fn reset(&mut self) -> Result<(), CursorError> {
        Err(CursorError::NotSupported)
    }

    /// Release underlying resources
    fn dispose(&mut self);

    /// Position of the current element, when the cursor tracks one
    fn position(&self) -> Option<usize> {
        None
    }
}

/// Positional cursor over a shared collection
///
/// Takes a short read lock per step and holds no lock between calls, so the
/// collection stays writable while the cursor is alive. The pass is pinned
/// to the collection's version when the cursor opens (or resets); any write
/// after that fails the next step with `CursorError::Modified`.
#[derive(Debug)]
pub struct IndexCursor<L> {
    source: Option<Shared<L>>,
    version: u64,
    next: usize,
    current: Option<usize>,
}

impl<L> IndexCursor<L> {
    /// Open cursor positioned before the first element
    #[must_use]
    pub fn new(source: Shared<L>) -> Self {
        Self {
            version: source.version(),
            source: Some(source),
            next: 0,
            current: None,
        }
    }

    fn check_version(&self, source: &Shared<L>) -> Result<(), CursorError> {
        if source.version() == self.version {
            Ok(())
        } else {
            Err(CursorError::Modified)
        }
    }
}

impl<L> Cursor for IndexCursor<L>
where
    L: OrderedCollection,
    L::Item: Clone,
{
    type Item = L::Item;

    fn advance(&mut self) -> Result<bool, CursorError> {
        let Some(source) = &self.source else {
            return Ok(false);
        };
        if let Err(err) = self.check_version(source) {
            self.current = None;
            return Err(err);
        }

        if self.next < source.read().len() {
            self.current = Some(self.next);
            self.next += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }

    fn current(&self) -> Result<L::Item, CursorError> {
        let source = self.source.as_ref().ok_or(CursorError::Disposed)?;
        self.check_version(source)?;
        let index = self.current.ok_or(CursorError::NotPositioned)?;
        source
            .read()
            .get(index)
            .cloned()
            .ok_or(CursorError::NotPositioned)
    }

    fn reset(&mut self) -> Result<(), CursorError> {
        let source = self.source.as_ref().ok_or(CursorError::Disposed)?;
        self.version = source.version();
        self.next = 0;
        self.current = None;
        Ok(())
    }

    fn dispose(&mut self) {
        self.source = None;
        self.current = None;
    }

    fn position(&self) -> Option<usize> {
        self.current
    }
}

/// Cursor yielding projected elements
///
/// Each `current` converts the backing cursor's element with `P::project`,
/// so a mismatched element fails only when it is reached. Disposal releases
/// the backing cursor once; later calls are no-ops. Dropping the cursor
/// disposes it.
pub struct ProjectedCursor<C: Cursor, P> {
    inner: C,
    disposed: bool,
    _projection: PhantomData<fn() -> P>,
}

impl<C, P> ProjectedCursor<C, P>
where
    C: Cursor,
    P: Projection<From = C::Item>,
{
    /// Wrap a backing cursor
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            disposed: false,
            _projection: PhantomData,
        }
    }

    /// Move to the next element
    ///
    /// Returns `Ok(false)` once exhausted or disposed.
    ///
    /// # Errors
    /// Whatever the backing cursor reports, e.g. `CursorError::Modified`
    pub fn advance(&mut self) -> Result<bool, CursorError> {
        if self.disposed {
            return Ok(false);
        }
        self.inner.advance()
    }

    /// Projected element at the current position
    ///
    /// # Errors
    /// - `CollectionError::InvalidCast` if the element is not a `P::To`
    /// - `CollectionError::Cursor` if not positioned or disposed
    pub fn current(&self) -> Result<P::To, CollectionError> {
        if self.disposed {
            return Err(CursorError::Disposed.into());
        }
        let value = self.inner.current()?;
        P::project(&value).map_err(|err| match self.inner.position() {
            Some(index) => err.at(index).into(),
            None => err.into(),
        })
    }

    /// Rewind the backing cursor
    ///
    /// # Errors
    /// Whatever the backing cursor reports, `CursorError::Disposed` after
    /// disposal
    pub fn reset(&mut self) -> Result<(), CursorError> {
        if self.disposed {
            return Err(CursorError::Disposed);
        }
        self.inner.reset()
    }

    /// Release the backing cursor
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.inner.dispose();
        }
    }

    /// Check if the cursor has been disposed
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<C: Cursor, P> Drop for ProjectedCursor<C, P> {
    fn drop(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.inner.dispose();
        }
    }
}

impl<C, P> Iterator for ProjectedCursor<C, P>
where
    C: Cursor,
    P: Projection<From = C::Item>,
{
    type Item = Result<P::To, CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => Some(self.current()),
            Ok(false) => {
                // Exhaustion releases the backing cursor.
                self.dispose();
                None
            }
            Err(err) => {
                // Reported once; the pass ends here.
                self.dispose();
                Some(Err(err.into()))
            }
        }
    }
}

impl<C, P> std::fmt::Debug for ProjectedCursor<C, P>
where
    C: Cursor + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectedCursor")
            .field("inner", &self.inner)
            .field("disposed", &self.disposed)
            .finish()
    }
}
