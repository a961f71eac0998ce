//! Change notification
//!
//! [`ChangeNotifier`] is an explicit subscription registry. [`ObservableList`]
//! raises property and collection changes through one, and projected views
//! subscribe to it to re-raise the same events to their own subscribers.

use crate::collection::OrderedCollection;
use crate::error::CollectionError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Property name raised when the element count changes
pub const COUNT_PROPERTY: &str = "Count";

/// Property name raised when any indexed element changes
pub const INDEXER_PROPERTY: &str = "Item[]";

/// Structural change to a collection
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// Element inserted at `index`
    Added { index: usize, item: T },
    /// Element removed from `index`
    Removed { index: usize, item: T },
    /// Element at `index` replaced
    Replaced { index: usize, old: T, new: T },
    /// Collection contents changed wholesale (cleared)
    Reset,
}

/// Named property change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChange {
    pub property: &'static str,
}

/// Event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    /// A property of the collection changed
    Property(PropertyChange),
    /// The collection's contents changed
    Collection(CollectionChange<T>),
}

impl<T> ChangeEvent<T> {
    /// Check if event is a collection change
    #[inline]
    #[must_use]
    pub fn is_collection_change(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

/// Subscription handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Arc<dyn Fn(&ChangeEvent<T>) + Send + Sync>;

struct Registry<T> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, Handler<T>)>>,
}

/// Subscription registry for change events
///
/// Clones share the same registry. Handlers are invoked synchronously, in
/// subscription order, on the thread that raised the event.
pub struct ChangeNotifier<T> {
    registry: Arc<Registry<T>>,
}

impl<T> ChangeNotifier<T> {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler
    ///
    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.registry.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Deliver event to every current handler
    pub fn emit(&self, event: &ChangeEvent<T>) {
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<Handler<T>> = self
            .registry
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered handlers
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.handlers.lock().len()
    }
}

impl<T> Clone for ChangeNotifier<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Ordered collection that raises change events
///
/// Every mutation raises, in order: `Count` (when the length changes),
/// `Item[]`, then the collection change itself.
///
/// Handlers run while the owning [`Shared`](crate::Shared) handle is locked
/// for writing and must not call back into the same collection.
#[derive(Debug)]
pub struct ObservableList<T> {
    items: Vec<T>,
    notifier: ChangeNotifier<T>,
}

impl<T: Clone> ObservableList<T> {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create list holding `items`
    #[inline]
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Elements as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The list's own change notifier
    #[inline]
    #[must_use]
    pub fn changes(&self) -> &ChangeNotifier<T> {
        &self.notifier
    }

    fn raise(&self, change: CollectionChange<T>, count_changed: bool) {
        if count_changed {
            self.notifier.emit(&ChangeEvent::Property(PropertyChange {
                property: COUNT_PROPERTY,
            }));
        }
        self.notifier.emit(&ChangeEvent::Property(PropertyChange {
            property: INDEXER_PROPERTY,
        }));
        self.notifier.emit(&ChangeEvent::Collection(change));
    }
}

impl<T: Clone> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone> OrderedCollection for ObservableList<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    fn set(&mut self, index: usize, item: T) -> Result<T, CollectionError> {
        let old = OrderedCollection::set(&mut self.items, index, item.clone())?;
        self.raise(
            CollectionChange::Replaced {
                index,
                old: old.clone(),
                new: item,
            },
            false,
        );
        Ok(old)
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        OrderedCollection::insert(&mut self.items, index, item.clone())?;
        self.raise(CollectionChange::Added { index, item }, true);
        Ok(())
    }

    fn push(&mut self, item: T) {
        let index = self.items.len();
        self.items.push(item.clone());
        self.raise(CollectionChange::Added { index, item }, true);
    }

    fn remove_at(&mut self, index: usize) -> Result<T, CollectionError> {
        let item = self.items.remove_at(index)?;
        self.raise(
            CollectionChange::Removed {
                index,
                item: item.clone(),
            },
            true,
        );
        Ok(item)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.raise(CollectionChange::Reset, true);
    }

    #[inline]
    fn notifier(&self) -> Option<&ChangeNotifier<T>> {
        Some(&self.notifier)
    }
}
