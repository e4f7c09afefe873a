//! Per-type view holder factories and binders.
//!
//! Every position resolves to a [`ViewType`] through the item type resolver.
//! The registry maps each type to at most one factory (creates holders) and
//! at most one binder (fills a holder with an item). Registering again for
//! the same type replaces the previous entry.
//!
//! - A missing factory is a configuration error: [`AdapterError::NoFactory`].
//! - A missing binder is not an error: binding is skipped, which suits types
//!   that only render static content.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ViewTypeRegistry::<Task>::new();
//!
//! // One layout per type: the factory is derived from the layout.
//! registry.register_auto(ViewType::DEFAULT, LayoutId(R_CARD), |holder, task| {
//!     let Some(task) = task else { return };
//!     holder.find_view_as::<TextView>(ViewId(R_TITLE), |title| title.set_text(&task.title));
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use horizon_recycler_core::logging::targets;

use crate::auto_holder::AutoViewHolder;
use crate::error::{AdapterError, Result};
use crate::view::{AnyViewHolder, LayoutId, ViewGroup, ViewHolder, ViewType};

/// Computes the view type of `position` given the current item `count`.
pub type ItemTypeResolver = Arc<dyn Fn(usize, usize) -> ViewType + Send + Sync>;

pub(crate) type Factory = Arc<dyn Fn(&dyn ViewGroup) -> Box<dyn ViewHolder> + Send + Sync>;

pub(crate) type Binder<T> = Arc<dyn Fn(&mut AnyViewHolder, Option<&T>) -> Result<()> + Send + Sync>;

/// Type-keyed registry of view holder factories and binders.
pub struct ViewTypeRegistry<T> {
    factories: HashMap<ViewType, Factory>,
    binders: HashMap<ViewType, Binder<T>>,
    resolver: ItemTypeResolver,
}

impl<T: 'static> Default for ViewTypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ViewTypeRegistry<T> {
    /// Creates an empty registry whose resolver maps every position to [`ViewType::DEFAULT`].
    pub fn new() -> Self {
        Self::with_default_type(ViewType::DEFAULT)
    }

    /// Creates an empty registry whose resolver maps every position to `default_type`.
    pub fn with_default_type(default_type: ViewType) -> Self {
        Self {
            factories: HashMap::new(),
            binders: HashMap::new(),
            resolver: Arc::new(move |_, _| default_type),
        }
    }

    /// Replaces the item type resolver.
    pub fn set_item_type_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(usize, usize) -> ViewType + Send + Sync + 'static,
    {
        self.resolver = Arc::new(resolver);
    }

    /// Resolves the view type of `position` when the list holds `count` items.
    pub fn resolve_type(&self, count: usize, position: usize) -> ViewType {
        (self.resolver)(count, position)
    }

    /// Registers the factory for `view_type`, replacing any previous one.
    pub fn register_factory<H, F>(&mut self, view_type: ViewType, factory: F)
    where
        H: ViewHolder,
        F: Fn(&dyn ViewGroup) -> H + Send + Sync + 'static,
    {
        tracing::debug!(target: targets::REGISTRY, %view_type, "registering factory");
        let factory: Factory = Arc::new(move |parent: &dyn ViewGroup| -> Box<dyn ViewHolder> {
            Box::new(factory(parent))
        });
        self.factories.insert(view_type, factory);
    }

    /// Registers the factory for [`ViewType::DEFAULT`].
    pub fn register_factory_default<H, F>(&mut self, factory: F)
    where
        H: ViewHolder,
        F: Fn(&dyn ViewGroup) -> H + Send + Sync + 'static,
    {
        self.register_factory(ViewType::DEFAULT, factory);
    }

    /// Registers the binder for `view_type`, replacing any previous one.
    ///
    /// The binder receives the holder created by this type's factory, which
    /// must be an `H`; otherwise binding fails with
    /// [`AdapterError::HolderMismatch`]. The item is `None` when it
    /// disappeared between the position query and the bind.
    pub fn register_binder<H, F>(&mut self, view_type: ViewType, binder: F)
    where
        H: ViewHolder,
        F: Fn(&mut H, Option<&T>) + Send + Sync + 'static,
    {
        tracing::debug!(target: targets::REGISTRY, %view_type, "registering binder");
        let binder: Binder<T> = Arc::new(
            move |holder: &mut AnyViewHolder, item: Option<&T>| -> Result<()> {
                match holder.downcast_mut::<H>() {
                    Some(holder) => {
                        binder(holder, item);
                        Ok(())
                    }
                    None => {
                        tracing::warn!(
                            target: targets::REGISTRY,
                            %view_type,
                            expected = std::any::type_name::<H>(),
                            "binder does not accept this view holder"
                        );
                        Err(AdapterError::HolderMismatch { view_type })
                    }
                }
            },
        );
        self.binders.insert(view_type, binder);
    }

    /// Registers the binder for [`ViewType::DEFAULT`].
    pub fn register_binder_default<H, F>(&mut self, binder: F)
    where
        H: ViewHolder,
        F: Fn(&mut H, Option<&T>) + Send + Sync + 'static,
    {
        self.register_binder(ViewType::DEFAULT, binder);
    }

    /// Registers both a factory inflating `layout` into an [`AutoViewHolder`]
    /// and `binder`, so no separate factory is needed for the common case of
    /// one layout per type.
    pub fn register_auto<F>(&mut self, view_type: ViewType, layout: LayoutId, binder: F)
    where
        F: Fn(&mut AutoViewHolder, Option<&T>) + Send + Sync + 'static,
    {
        self.register_factory(view_type, move |parent: &dyn ViewGroup| {
            AutoViewHolder::new(parent.inflate(layout))
        });
        self.register_binder::<AutoViewHolder, F>(view_type, binder);
    }

    /// [`register_auto`](Self::register_auto) for [`ViewType::DEFAULT`].
    pub fn register_auto_default<F>(&mut self, layout: LayoutId, binder: F)
    where
        F: Fn(&mut AutoViewHolder, Option<&T>) + Send + Sync + 'static,
    {
        self.register_auto(ViewType::DEFAULT, layout, binder);
    }

    /// Returns `true` if a factory is registered for `view_type`.
    pub fn has_factory(&self, view_type: ViewType) -> bool {
        self.factories.contains_key(&view_type)
    }

    /// Returns `true` if a binder is registered for `view_type`.
    pub fn has_binder(&self, view_type: ViewType) -> bool {
        self.binders.contains_key(&view_type)
    }

    /// Creates a holder for `view_type` inside `parent`.
    pub fn create(&self, view_type: ViewType, parent: &dyn ViewGroup) -> Result<AnyViewHolder> {
        let factory = self.factory(view_type)?;
        Ok(AnyViewHolder::from_boxed(view_type, factory(parent)))
    }

    /// Binds `item` into `holder` with the binder for `view_type`.
    ///
    /// Does nothing and succeeds when no binder is registered.
    pub fn bind(
        &self,
        view_type: ViewType,
        holder: &mut AnyViewHolder,
        item: Option<&T>,
    ) -> Result<()> {
        match self.binder(view_type) {
            Some(binder) => binder(holder, item),
            None => Ok(()),
        }
    }

    pub(crate) fn resolver(&self) -> ItemTypeResolver {
        self.resolver.clone()
    }

    pub(crate) fn factory(&self, view_type: ViewType) -> Result<Factory> {
        self.factories.get(&view_type).cloned().ok_or_else(|| {
            tracing::error!(target: targets::REGISTRY, %view_type, "no factory registered");
            AdapterError::NoFactory { view_type }
        })
    }

    pub(crate) fn binder(&self, view_type: ViewType) -> Option<Binder<T>> {
        let binder = self.binders.get(&view_type).cloned();
        if binder.is_none() {
            tracing::trace!(
                target: targets::REGISTRY,
                %view_type,
                "no binder registered, skipping bind"
            );
        }
        binder
    }
}

impl<T> std::fmt::Debug for ViewTypeRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut factories: Vec<_> = self.factories.keys().copied().collect();
        let mut binders: Vec<_> = self.binders.keys().copied().collect();
        factories.sort();
        binders.sort();
        f.debug_struct("ViewTypeRegistry")
            .field("factories", &factories)
            .field("binders", &binders)
            .finish_non_exhaustive()
    }
}
