//! castkit Collections
//!
//! Live, type-projected views over a shared ordered collection.
//!
//! # Core Concepts
//!
//! - [`OrderedCollection`]: ordered, mutable, indexable backing storage
//! - [`Shared`]: cloneable handle through which owners and views reach the
//!   same backing collection
//! - [`Projection`]: runtime-checked conversion between the backing element
//!   type and the projected type
//! - [`ProjectedList`]: the view; reads and writes through to the backing
//!   collection using the projected type
//! - [`ProjectedCursor`]: lazy per-pass iteration with per-element casts
//! - [`ObservableList`]: backing collection that raises change events, which
//!   views forward to their own subscribers
//!
//! # Example
//!
//! ```rust
//! use castkit_collections::{AnyArc, Downcast, Shared};
//! use std::sync::Arc;
//!
//! let items: Vec<AnyArc> = vec![Arc::new(1u32), Arc::new("two")];
//! let backing = Shared::new(items);
//! let numbers = backing.cast_list::<Downcast<u32>>();
//!
//! assert_eq!(*numbers.get(0).unwrap(), 1);
//! assert!(numbers.get(1).unwrap_err().is_invalid_cast());
//!
//! numbers.push(Arc::new(3)).unwrap();
//! assert_eq!(backing.read().len(), 3);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod collection;
mod cursor;
mod error;
mod observable;
mod projection;
mod view;

// Re-exports
pub use collection::{ElementEq, OrderedCollection, Shared};
pub use cursor::{Cursor, CursorError, IndexCursor, ProjectedCursor};
pub use error::CollectionError;
pub use observable::{
    ChangeEvent, ChangeNotifier, CollectionChange, ObservableList, PropertyChange, SubscriptionId,
    COUNT_PROPERTY, INDEXER_PROPERTY,
};
pub use projection::{AnyArc, CastError, Downcast, Identity, Projection, Upcast};
pub use view::ProjectedList;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with projected views
    pub use crate::{
        ChangeEvent, CollectionError, ObservableList, OrderedCollection, ProjectedList,
        Projection, Shared,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
