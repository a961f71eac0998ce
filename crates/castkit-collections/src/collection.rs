//! Backing collection abstraction
//!
//! Provides [`OrderedCollection`] (ordered, mutable, indexable storage),
//! [`ElementEq`] (element identity used by searches) and [`Shared`], the
//! handle through which an owner and any number of views reach the same
//! storage.

use crate::error::CollectionError;
use crate::observable::ChangeNotifier;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Element identity used by `contains`, `index_of` and `remove`
///
/// Shared handles compare by reference identity; plain values compare by
/// value.
pub trait ElementEq {
    /// Check whether two elements are the same element
    fn element_eq(&self, other: &Self) -> bool;
}

impl<T: ?Sized> ElementEq for Arc<T> {
    #[inline]
    fn element_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

macro_rules! value_element_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ElementEq for $ty {
                #[inline]
                fn element_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_element_eq!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

/// Ordered, mutable, indexable collection
///
/// The storage a [`ProjectedList`](crate::ProjectedList) writes through to.
/// Implemented for `Vec<T>` and [`ObservableList<T>`](crate::ObservableList).
pub trait OrderedCollection {
    /// Element type
    type Item;

    /// Number of elements
    fn len(&self) -> usize;

    /// Check if collection has no elements
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the collection rejects mutation
    #[inline]
    fn is_read_only(&self) -> bool {
        false
    }

    /// Element at `index`
    fn get(&self, index: usize) -> Option<&Self::Item>;

    /// Replace element at `index`, returning the previous element
    ///
    /// # Errors
    /// - `CollectionError::IndexOutOfRange` if `index >= len`
    fn set(&mut self, index: usize, item: Self::Item) -> Result<Self::Item, CollectionError>;

    /// Insert element at `index`, shifting later elements up
    ///
    /// # Errors
    /// - `CollectionError::IndexOutOfRange` if `index > len`
    fn insert(&mut self, index: usize, item: Self::Item) -> Result<(), CollectionError>;

    /// Append element
    fn push(&mut self, item: Self::Item);

    /// Remove and return element at `index`
    ///
    /// # Errors
    /// - `CollectionError::IndexOutOfRange` if `index >= len`
    fn remove_at(&mut self, index: usize) -> Result<Self::Item, CollectionError>;

    /// Remove every element
    fn clear(&mut self);

    /// Change notifier, for collections that raise change events
    #[inline]
    fn notifier(&self) -> Option<&ChangeNotifier<Self::Item>> {
        None
    }

    /// Position of the first element identical to `item`
    fn index_of(&self, item: &Self::Item) -> Option<usize>
    where
        Self::Item: ElementEq,
    {
        (0..self.len()).find(|&i| self.get(i).is_some_and(|e| e.element_eq(item)))
    }

    /// Check whether an element identical to `item` is present
    #[inline]
    fn contains(&self, item: &Self::Item) -> bool
    where
        Self::Item: ElementEq,
    {
        self.index_of(item).is_some()
    }

    /// Remove the first element identical to `item`
    ///
    /// Returns whether an element was removed.
    fn remove(&mut self, item: &Self::Item) -> bool
    where
        Self::Item: ElementEq,
    {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Append every element of `items`
    fn extend_from<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Self::Item>,
        Self: Sized,
    {
        for item in items {
            self.push(item);
        }
    }
}

impl<T> OrderedCollection for Vec<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn set(&mut self, index: usize, item: T) -> Result<T, CollectionError> {
        let len = Vec::len(self);
        let slot = self
            .get_mut(index)
            .ok_or(CollectionError::index_out_of_range(index, len))?;
        Ok(std::mem::replace(slot, item))
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        if index > Vec::len(self) {
            return Err(CollectionError::index_out_of_range(index, Vec::len(self)));
        }
        Vec::insert(self, index, item);
        Ok(())
    }

    #[inline]
    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }

    fn remove_at(&mut self, index: usize) -> Result<T, CollectionError> {
        if index >= Vec::len(self) {
            return Err(CollectionError::index_out_of_range(index, Vec::len(self)));
        }
        Ok(Vec::remove(self, index))
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Shared handle to a backing collection
///
/// Cloning the handle never copies elements: every clone, and every view
/// built from one, reaches the same storage. Each access takes a short
/// lock for the duration of one call; sequences of calls that must be
/// atomic still need external coordination.
///
/// Every [`write`](Self::write) bumps a version stamp shared by all clones.
/// Cursors compare it between steps to detect modification mid-pass.
#[derive(Debug, Default)]
pub struct Shared<L> {
    inner: Arc<SharedInner<L>>,
}

#[derive(Debug, Default)]
struct SharedInner<L> {
    lock: RwLock<L>,
    version: AtomicU64,
}

impl<L> Clone for Shared<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L> Shared<L> {
    /// Wrap a collection for sharing
    #[inline]
    #[must_use]
    pub fn new(list: L) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                lock: RwLock::new(list),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Lock for reading
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, L> {
        self.inner.lock.read()
    }

    /// Lock for writing
    ///
    /// Counts as a modification whether or not the guard is used to mutate.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, L> {
        let guard = self.inner.lock.write();
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        guard
    }

    /// Current version stamp
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Check whether two handles reach the same storage
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Recover the collection if this is the last handle
    ///
    /// # Errors
    /// Returns the handle unchanged while other handles or views exist
    pub fn try_into_inner(self) -> Result<L, Self> {
        Arc::try_unwrap(self.inner)
            .map(|inner| inner.lock.into_inner())
            .map_err(|inner| Self { inner })
    }
}

impl<L> From<L> for Shared<L> {
    fn from(list: L) -> Self {
        Self::new(list)
    }
}
