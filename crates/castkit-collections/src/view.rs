//! Projected collection view
//!
//! [`ProjectedList`] presents a shared collection of `P::From` as a
//! collection of `P::To`. It owns no elements: every read converts the
//! backing element on access and every write converts the argument and
//! writes through, so the backing collection, the view and any other view
//! over the same handle always agree.

use crate::collection::{ElementEq, OrderedCollection, Shared};
use crate::cursor::{IndexCursor, ProjectedCursor};
use crate::error::CollectionError;
use crate::observable::{ChangeEvent, ChangeNotifier, SubscriptionId};
use crate::projection::Projection;
use castkit_guard::{check_not_null, check_range, RangeBound};
use std::fmt;
use std::marker::PhantomData;

/// Relay from the backing notifier to the view's own subscribers
struct Forwarding<T> {
    local: ChangeNotifier<T>,
    upstream: ChangeNotifier<T>,
    id: SubscriptionId,
}

/// Live, type-projected view over a shared ordered collection
///
/// # Example
///
/// ```rust
/// use castkit_collections::{Identity, ProjectedList, Shared};
///
/// let backing = Shared::new(vec![1, 2]);
/// let view = ProjectedList::<Identity<i32>, _>::new(backing.clone());
///
/// view.push(3).unwrap();
/// assert_eq!(backing.read().as_slice(), &[1, 2, 3]);
/// assert_eq!(view.len(), 3);
/// ```
pub struct ProjectedList<P: Projection, L> {
    backing: Shared<L>,
    forwarding: Option<Forwarding<P::From>>,
    _projection: PhantomData<fn() -> P>,
}

impl<P, L> ProjectedList<P, L>
where
    P: Projection,
    P::From: 'static,
    L: OrderedCollection<Item = P::From>,
{
    /// Create view over `backing`
    ///
    /// When the backing collection raises change events, the view
    /// subscribes once here and re-raises them until it is dropped.
    #[must_use]
    pub fn new(backing: Shared<L>) -> Self {
        let upstream = backing.read().notifier().cloned();
        let forwarding = upstream.map(|upstream| {
            let local = ChangeNotifier::new();
            let relay = local.clone();
            let id = upstream.subscribe(move |event| relay.emit(event));
            tracing::trace!(subscription = ?id, "view subscribed to backing notifier");
            Forwarding {
                local,
                upstream,
                id,
            }
        });

        Self {
            backing,
            forwarding,
            _projection: PhantomData,
        }
    }

    /// Create view over a backing collection that may be absent
    ///
    /// # Errors
    /// `CollectionError::InvalidArgument` if `backing` is `None`
    pub fn from_optional(backing: Option<Shared<L>>) -> Result<Self, CollectionError> {
        let backing = check_not_null(backing, "backing")?;
        Ok(Self::new(backing))
    }

    /// The shared backing collection
    #[inline]
    #[must_use]
    pub fn backing(&self) -> &Shared<L> {
        &self.backing
    }

    /// Number of elements in the backing collection
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.backing.read().len()
    }

    /// Check if the backing collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backing.read().is_empty()
    }

    /// Check if the backing collection rejects mutation
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.backing.read().is_read_only()
    }

    /// Projected element at `index`
    ///
    /// # Errors
    /// - `CollectionError::IndexOutOfRange` if `index >= len`
    /// - `CollectionError::InvalidCast` if the element is not a `P::To`
    pub fn get(&self, index: usize) -> Result<P::To, CollectionError> {
        let backing = self.backing.read();
        let item = backing
            .get(index)
            .ok_or_else(|| CollectionError::index_out_of_range(index, backing.len()))?;
        P::project(item).map_err(|err| err.at(index).into())
    }

    /// Replace the element at `index`
    ///
    /// # Errors
    /// - `CollectionError::InvalidCast` if `value` cannot be stored
    /// - `CollectionError::IndexOutOfRange` if `index >= len`
    pub fn set(&self, index: usize, value: P::To) -> Result<(), CollectionError> {
        let item = P::unproject(value)?;
        self.backing.write().set(index, item)?;
        Ok(())
    }

    /// Append an element
    ///
    /// # Errors
    /// `CollectionError::InvalidCast` if `value` cannot be stored
    pub fn push(&self, value: P::To) -> Result<(), CollectionError> {
        let item = P::unproject(value)?;
        self.backing.write().push(item);
        Ok(())
    }

    /// Insert an element at `index`
    ///
    /// # Errors
    /// - `CollectionError::InvalidCast` if `value` cannot be stored
    /// - `CollectionError::IndexOutOfRange` if `index > len`
    pub fn insert(&self, index: usize, value: P::To) -> Result<(), CollectionError> {
        let item = P::unproject(value)?;
        self.backing.write().insert(index, item)
    }

    /// Remove and return the element at `index`
    ///
    /// The element is converted before removal; a cast failure leaves the
    /// backing collection unchanged.
    ///
    /// # Errors
    /// - `CollectionError::IndexOutOfRange` if `index >= len`
    /// - `CollectionError::InvalidCast` if the element is not a `P::To`
    pub fn remove_at(&self, index: usize) -> Result<P::To, CollectionError> {
        let mut backing = self.backing.write();
        let item = backing
            .get(index)
            .ok_or_else(|| CollectionError::index_out_of_range(index, backing.len()))?;
        let projected = P::project(item).map_err(|err| err.at(index))?;
        backing.remove_at(index)?;
        Ok(projected)
    }

    /// Remove every element
    pub fn clear(&self) {
        self.backing.write().clear();
    }

    /// Append every element of `items`
    ///
    /// Stops at the first value that cannot be stored; values before it
    /// stay appended.
    ///
    /// # Errors
    /// `CollectionError::InvalidCast` if a value cannot be stored
    pub fn extend_from<I>(&self, items: I) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = P::To>,
    {
        for value in items {
            self.push(value)?;
        }
        Ok(())
    }

    /// Copy every projected element into `buffer` starting at `offset`
    ///
    /// Elements are converted in ascending order; slots before a failing
    /// element are already written.
    ///
    /// # Errors
    /// - `CollectionError::InvalidArgument` if `buffer` has fewer than `len`
    ///   slots from `offset`
    /// - `CollectionError::InvalidCast` at the first element that is not a
    ///   `P::To`
    pub fn copy_to(&self, buffer: &mut [Option<P::To>], offset: usize) -> Result<(), CollectionError> {
        let backing = self.backing.read();
        let len = backing.len();

        check_range(offset, "offset", RangeBound::at_most(buffer.len()))?;
        check_range(len, "buffer", RangeBound::at_most(buffer.len() - offset))?;

        for (index, slot) in buffer[offset..offset + len].iter_mut().enumerate() {
            let item = backing
                .get(index)
                .ok_or_else(|| CollectionError::index_out_of_range(index, len))?;
            *slot = Some(P::project(item).map_err(|err| err.at(index))?);
        }
        Ok(())
    }

    /// Subscribe to change events re-raised from the backing collection
    ///
    /// Returns `None` when the backing collection does not raise events.
    pub fn subscribe<F>(&self, handler: F) -> Option<SubscriptionId>
    where
        F: Fn(&ChangeEvent<P::From>) + Send + Sync + 'static,
    {
        self.forwarding
            .as_ref()
            .map(|forwarding| forwarding.local.subscribe(handler))
    }

    /// Remove a view subscription
    ///
    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.forwarding
            .as_ref()
            .is_some_and(|forwarding| forwarding.local.unsubscribe(id))
    }

    /// Check if the view re-raises backing change events
    #[inline]
    #[must_use]
    pub fn is_observable(&self) -> bool {
        self.forwarding.is_some()
    }
}

impl<P, L> ProjectedList<P, L>
where
    P: Projection,
    P::From: Clone + 'static,
    L: OrderedCollection<Item = P::From>,
{
    /// Open a fresh cursor over the backing collection
    ///
    /// Each call starts a new pass; elements are converted as they are
    /// reached, so a mismatched element fails only its own step.
    /// Writing to the backing collection during a pass ends it with a
    /// single `CursorError::Modified` item.
    #[must_use]
    pub fn iter(&self) -> ProjectedCursor<IndexCursor<L>, P> {
        ProjectedCursor::new(IndexCursor::new(self.backing.clone()))
    }
}

impl<P, L> ProjectedList<P, L>
where
    P: Projection,
    P::From: ElementEq + 'static,
    P::To: Clone,
    L: OrderedCollection<Item = P::From>,
{
    /// Position of the first element identical to `value`
    ///
    /// # Errors
    /// `CollectionError::InvalidCast` if `value` cannot be stored
    pub fn index_of(&self, value: &P::To) -> Result<Option<usize>, CollectionError> {
        let item = P::unproject(value.clone())?;
        Ok(self.backing.read().index_of(&item))
    }

    /// Check whether an element identical to `value` is present
    ///
    /// # Errors
    /// `CollectionError::InvalidCast` if `value` cannot be stored
    pub fn contains(&self, value: &P::To) -> Result<bool, CollectionError> {
        Ok(self.index_of(value)?.is_some())
    }

    /// Remove the first element identical to `value`
    ///
    /// # Errors
    /// `CollectionError::InvalidCast` if `value` cannot be stored
    pub fn remove(&self, value: &P::To) -> Result<bool, CollectionError> {
        let item = P::unproject(value.clone())?;
        Ok(self.backing.write().remove(&item))
    }
}

impl<P: Projection, L> Drop for ProjectedList<P, L> {
    fn drop(&mut self) {
        if let Some(forwarding) = self.forwarding.take() {
            forwarding.upstream.unsubscribe(forwarding.id);
            tracing::trace!(subscription = ?forwarding.id, "view unsubscribed from backing notifier");
        }
    }
}

impl<P: Projection, L> fmt::Debug for ProjectedList<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedList")
            .field("projection", &std::any::type_name::<P>())
            .field("observable", &self.forwarding.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: OrderedCollection> Shared<L>
where
    L::Item: 'static,
{
    /// Create a projected view over this collection
    ///
    /// # Example
    ///
    /// ```rust
    /// use castkit_collections::{AnyArc, Downcast, Shared};
    /// use std::sync::Arc;
    ///
    /// let items: Vec<AnyArc> = vec![Arc::new(7i64)];
    /// let view = Shared::new(items).cast_list::<Downcast<i64>>();
    /// assert_eq!(*view.get(0).unwrap(), 7);
    /// ```
    #[must_use]
    pub fn cast_list<P>(&self) -> ProjectedList<P, L>
    where
        P: Projection<From = L::Item>,
    {
        ProjectedList::new(self.clone())
    }
}
