//! View-side abstractions the adapter works against.
//!
//! The actual view system (inflation, measuring, drawing) belongs to the
//! host. The adapter only needs to:
//!
//! - hand a parent [`ViewGroup`] to factories so they can inflate views,
//! - search a view subtree by [`ViewId`] (for [`AutoViewHolder`](crate::AutoViewHolder)),
//! - carry type-erased [`ViewHolder`]s between create and bind calls.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Tag routing an item position to a factory/binder pair.
///
/// View types are computed per position by the item type resolver and are
/// never stored alongside items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewType(i32);

impl ViewType {
    /// The type every position resolves to unless a resolver says otherwise.
    pub const DEFAULT: Self = Self(0);

    /// Creates a view type from its raw tag.
    pub const fn new(tag: i32) -> Self {
        Self(tag)
    }

    /// Returns the raw tag.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for ViewType {
    fn from(tag: i32) -> Self {
        Self(tag)
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view type {}", self.0)
    }
}

/// Identifier of a sub-view inside an inflated subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u32);

/// Identifier of a layout the host knows how to inflate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutId(pub u32);

/// A node of a host view tree.
pub trait View: Any + Send + Sync {
    /// The identifier of this view, if it has one.
    fn id(&self) -> Option<ViewId> {
        None
    }

    /// The current direct children of this view.
    fn children(&self) -> Vec<ViewRef> {
        Vec::new()
    }
}

/// Shared handle to a host view.
pub type ViewRef = Arc<dyn View>;

/// Searches `root` and its descendants, depth first, for a view with `id`.
pub fn find_view_by_id(root: &ViewRef, id: ViewId) -> Option<ViewRef> {
    let mut stack = vec![root.clone()];
    while let Some(view) = stack.pop() {
        if view.id() == Some(id) {
            return Some(view);
        }
        let mut children = view.children();
        children.reverse();
        stack.extend(children);
    }
    None
}

/// Downcasts a view handle to its concrete type.
pub fn downcast_view<V: View>(view: &ViewRef) -> Option<&V> {
    let any: &dyn Any = &**view;
    any.downcast_ref::<V>()
}

/// The parent container passed to view holder factories.
///
/// The host owns the inflation mechanism; the adapter only asks for a layout
/// to be turned into a view subtree.
pub trait ViewGroup: Send + Sync {
    /// Inflates `layout` into a new view subtree, not yet attached to `self`.
    fn inflate(&self, layout: LayoutId) -> ViewRef;
}

/// Holds the view subtree for one visible item slot.
pub trait ViewHolder: Any + Send {
    /// The root of the held subtree.
    fn item_view(&self) -> &ViewRef;
}

/// A type-erased view holder tagged with the view type that created it.
pub struct AnyViewHolder {
    view_type: ViewType,
    inner: Box<dyn ViewHolder>,
}

impl AnyViewHolder {
    /// Wraps `holder`, recording the `view_type` it was created for.
    pub fn new<H: ViewHolder>(view_type: ViewType, holder: H) -> Self {
        Self {
            view_type,
            inner: Box::new(holder),
        }
    }

    pub(crate) fn from_boxed(view_type: ViewType, inner: Box<dyn ViewHolder>) -> Self {
        Self { view_type, inner }
    }

    /// The view type whose factory created this holder.
    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    /// The root of the held subtree.
    pub fn item_view(&self) -> &ViewRef {
        self.inner.item_view()
    }

    /// Returns `true` if the wrapped holder is an `H`.
    pub fn is<H: ViewHolder>(&self) -> bool {
        let any: &dyn Any = &*self.inner;
        any.is::<H>()
    }

    /// Borrows the wrapped holder as an `H`.
    pub fn downcast_ref<H: ViewHolder>(&self) -> Option<&H> {
        let any: &dyn Any = &*self.inner;
        any.downcast_ref::<H>()
    }

    /// Mutably borrows the wrapped holder as an `H`.
    pub fn downcast_mut<H: ViewHolder>(&mut self) -> Option<&mut H> {
        let any: &mut dyn Any = &mut *self.inner;
        any.downcast_mut::<H>()
    }
}

impl fmt::Debug for AnyViewHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyViewHolder")
            .field("view_type", &self.view_type)
            .finish_non_exhaustive()
    }
}
