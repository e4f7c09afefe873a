//! Observable, thread-safe item storage.
//!
//! [`ItemStore<T>`] is an ordered list of items that reports every structural
//! mutation as exactly one [`ListChange`] on its change signal. It is the
//! list the application mutates (from any thread) and the adapter reads from
//! the rendering thread.
//!
//! # Locking
//!
//! One coarse, re-entrant lock guards both the items and the delivery of
//! change events:
//!
//! - a mutation is fully applied before its event is emitted,
//! - the lock is held until every subscriber has returned, so two mutations
//!   from different threads never interleave their deliveries,
//! - subscribers run on the mutating thread and may read the store (the lock
//!   is re-entrant), which is how a host re-queries positions while handling
//!   an invalidation.
//!
//! # Example
//!
//! ```
//! use horizon_recycler::{ItemStore, ListChange};
//!
//! let store = ItemStore::new();
//! store.subscribe(|change| println!("{:?}", change));
//!
//! store.push("A");                  // Inserted { start: 0, count: 1 }
//! store.extend(["B", "C"]);         // Inserted { start: 1, count: 2 }
//! store.remove(1).unwrap();         // Removed { start: 1, count: 1 }
//! assert_eq!(store.snapshot(), vec!["A", "C"]);
//! ```

use std::cell::RefCell;
use std::ops::Range;

use horizon_recycler_core::logging::targets;
use horizon_recycler_core::{ConnectionId, Signal};
use parking_lot::ReentrantMutex;

use crate::error::{AdapterError, Result};

/// One structural mutation of an [`ItemStore`].
///
/// Positions are those of the list right after the mutation, except for the
/// start of a removal and the source of a move, which refer to the list
/// right before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// `count` items were inserted, the first now at `start`.
    Inserted { start: usize, count: usize },
    /// `count` items starting at `start` were removed.
    Removed { start: usize, count: usize },
    /// `count` items starting at `start` were replaced in place.
    Changed { start: usize, count: usize },
    /// `count` contiguous items were moved from `from` so that the first now sits at `to`.
    Moved { from: usize, to: usize, count: usize },
    /// The whole list was replaced.
    Reset,
}

impl ListChange {
    /// Number of items the change touches, or `None` for a reset.
    pub fn count(&self) -> Option<usize> {
        match *self {
            Self::Inserted { count, .. }
            | Self::Removed { count, .. }
            | Self::Changed { count, .. }
            | Self::Moved { count, .. } => Some(count),
            Self::Reset => None,
        }
    }

    /// Returns `true` if the change touches exactly one item.
    pub fn is_single(&self) -> bool {
        self.count() == Some(1)
    }
}

/// An observable, ordered, thread-safe list of items.
pub struct ItemStore<T> {
    items: ReentrantMutex<RefCell<Vec<T>>>,
    changes: Signal<ListChange>,
}

impl<T> ItemStore<T> {
    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ConnectionId) -> bool {
        self.changes.disconnect(id)
    }
}

impl<T: Send + 'static> Default for ItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> ItemStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Creates a store holding `items`. No change is emitted.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: ReentrantMutex::new(RefCell::new(items)),
            changes: Signal::new(),
        }
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.lock().borrow().len()
    }

    /// Returns `true` if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribes `f` to change events. Returns an id for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, f: F) -> ConnectionId
    where
        F: Fn(&ListChange) + Send + Sync + 'static,
    {
        self.changes.connect(f)
    }

    /// Calls `f` with the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this store.
    pub fn with_item<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Result<R> {
        let guard = self.items.lock();
        let items = guard.borrow();
        items
            .get(index)
            .map(f)
            .ok_or_else(|| AdapterError::out_of_range(index, items.len()))
    }

    /// Calls `f` with all items.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this store.
    pub fn read_all<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.items.lock();
        let items = guard.borrow();
        f(&items)
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        self.apply(|items| {
            items.push(item);
            Ok(((), Some(ListChange::Inserted { start: items.len() - 1, count: 1 })))
        })
        .unwrap_or(());
    }

    /// Appends all `items`. Appending nothing emits nothing.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let batch: Vec<T> = items.into_iter().collect();
        self.apply(|items| {
            let start = items.len();
            let count = batch.len();
            items.extend(batch);
            Ok(((), inserted(start, count)))
        })
        .unwrap_or(());
    }

    /// Inserts `item` at `index`, shifting later items.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.apply(|items| {
            check_insert(index, items.len())?;
            items.insert(index, item);
            Ok(((), Some(ListChange::Inserted { start: index, count: 1 })))
        })
    }

    /// Inserts all `batch` items starting at `index`.
    pub fn insert_all(&self, index: usize, batch: impl IntoIterator<Item = T>) -> Result<()> {
        let batch: Vec<T> = batch.into_iter().collect();
        self.apply(|items| {
            check_insert(index, items.len())?;
            let count = batch.len();
            items.splice(index..index, batch);
            Ok(((), inserted(index, count)))
        })
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Result<T> {
        self.apply(|items| {
            check_index(index, items.len())?;
            let removed = items.remove(index);
            Ok((removed, Some(ListChange::Removed { start: index, count: 1 })))
        })
    }

    /// Removes and returns the items in `range`.
    pub fn remove_range(&self, range: Range<usize>) -> Result<Vec<T>> {
        self.apply(|items| {
            check_range(&range, items.len())?;
            let start = range.start;
            let removed: Vec<T> = items.drain(range).collect();
            let change = (!removed.is_empty()).then_some(ListChange::Removed {
                start,
                count: removed.len(),
            });
            Ok((removed, change))
        })
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        self.apply(|items| {
            check_index(index, items.len())?;
            let previous = std::mem::replace(&mut items[index], item);
            Ok((previous, Some(ListChange::Changed { start: index, count: 1 })))
        })
    }

    /// Replaces the items starting at `start` with `batch`, returning the previous ones.
    pub fn set_range(&self, start: usize, batch: impl IntoIterator<Item = T>) -> Result<Vec<T>> {
        let batch: Vec<T> = batch.into_iter().collect();
        self.apply(|items| {
            let end = checked_end(start, batch.len(), items.len())?;
            let range = start..end;
            check_range(&range, items.len())?;
            let count = batch.len();
            let previous: Vec<T> = items.splice(range, batch).collect();
            let change = (count > 0).then_some(ListChange::Changed { start, count });
            Ok((previous, change))
        })
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.move_range(from, to, 1)
    }

    /// Moves `count` contiguous items starting at `from` so that the first ends up at `to`.
    ///
    /// Moving zero items, or moving items onto themselves, emits nothing.
    pub fn move_range(&self, from: usize, to: usize, count: usize) -> Result<()> {
        self.apply(|items| {
            let len = items.len();
            check_range(&(from..checked_end(from, count, len)?), len)?;
            check_range(&(to..checked_end(to, count, len)?), len)?;
            if count == 0 || from == to {
                return Ok(((), None));
            }
            let block: Vec<T> = items.drain(from..from + count).collect();
            items.splice(to..to, block);
            Ok(((), Some(ListChange::Moved { from, to, count })))
        })
    }

    /// Removes all items. Clearing an empty store emits nothing.
    pub fn clear(&self) {
        self.apply(|items| {
            let count = items.len();
            items.clear();
            let change = (count > 0).then_some(ListChange::Removed { start: 0, count });
            Ok(((), change))
        })
        .unwrap_or(());
    }

    /// Replaces every item, emitting [`ListChange::Reset`].
    pub fn replace_all(&self, batch: impl IntoIterator<Item = T>) -> Vec<T> {
        let batch: Vec<T> = batch.into_iter().collect();
        self.apply(|items| Ok((std::mem::replace(items, batch), Some(ListChange::Reset))))
            .unwrap_or_default()
    }

    /// Applies `mutate` and emits its change while still holding the lock.
    fn apply<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<T>) -> Result<(R, Option<ListChange>)>,
    ) -> Result<R> {
        let guard = self.items.lock();
        let (result, change) = {
            let mut items = guard.borrow_mut();
            mutate(&mut items)?
        };
        if let Some(change) = change {
            tracing::trace!(target: targets::STORE, ?change, "item store changed");
            self.changes.emit(change);
        }
        drop(guard);
        Ok(result)
    }
}

impl<T: Clone + Send + 'static> ItemStore<T> {
    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.with_item(index, T::clone)
    }

    /// Returns a clone of all items.
    pub fn snapshot(&self) -> Vec<T> {
        self.read_all(<[T]>::to_vec)
    }
}

impl<T> std::fmt::Debug for ItemStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.items.try_lock().map(|guard| {
            let items = guard.borrow();
            items.len()
        });
        f.debug_struct("ItemStore")
            .field("len", &len)
            .field("changes", &self.changes)
            .finish()
    }
}

static_assertions::assert_impl_all!(ItemStore<String>: Send, Sync);

fn inserted(start: usize, count: usize) -> Option<ListChange> {
    (count > 0).then_some(ListChange::Inserted { start, count })
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(AdapterError::out_of_range(index, len))
    }
}

fn check_insert(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(AdapterError::out_of_range(index, len))
    }
}

fn checked_end(start: usize, count: usize, len: usize) -> Result<usize> {
    start
        .checked_add(count)
        .ok_or_else(|| AdapterError::out_of_range(start, len))
}

fn check_range(range: &Range<usize>, len: usize) -> Result<()> {
    if range.start <= range.end && range.end <= len {
        Ok(())
    } else {
        Err(AdapterError::out_of_range(range.end, len))
    }
}
