//! A view holder that finds sub-views by id and remembers them.

use std::collections::HashMap;

use crate::view::{View, ViewHolder, ViewId, ViewRef, downcast_view, find_view_by_id};

/// A generic view holder over one inflated subtree.
///
/// [`find_view`](Self::find_view) searches the subtree the first time an id
/// is requested and fills the cache once; every later call for the same id
/// returns the cached result, including a cached "not found". The cache is
/// never invalidated, so views added to or removed from the subtree after the
/// first lookup are not observed.
pub struct AutoViewHolder {
    root: ViewRef,
    cache: HashMap<ViewId, Option<ViewRef>>,
}

impl AutoViewHolder {
    /// Creates a holder for the subtree rooted at `root`.
    pub fn new(root: ViewRef) -> Self {
        Self {
            root,
            cache: HashMap::new(),
        }
    }

    /// Returns the view with `id` in the held subtree, searching at most once per id.
    pub fn find_view(&mut self, id: ViewId) -> Option<ViewRef> {
        let root = &self.root;
        self.cache
            .entry(id)
            .or_insert_with(|| find_view_by_id(root, id))
            .clone()
    }

    /// Like [`find_view`](Self::find_view), handing the view to `f` as a `V`.
    ///
    /// Returns `false` without calling `f` when there is no such view or it
    /// is not a `V`.
    pub fn find_view_as<V: View>(&mut self, id: ViewId, f: impl FnOnce(&V)) -> bool {
        match self.find_view(id) {
            Some(view) => match downcast_view::<V>(&view) {
                Some(concrete) => {
                    f(concrete);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// The held subtree root.
    pub fn root_view(&self) -> &ViewRef {
        &self.root
    }

    /// Number of ids looked up so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl ViewHolder for AutoViewHolder {
    fn item_view(&self) -> &ViewRef {
        &self.root
    }
}

impl std::fmt::Debug for AutoViewHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoViewHolder")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
