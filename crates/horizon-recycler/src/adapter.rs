//! The recycler adapter: items, per-type holders, host wiring.
//!
//! A [`RecyclerAdapter`] owns an [`ItemStore`] and a [`ViewTypeRegistry`] and
//! sits between them and a [`RecyclerHost`]:
//!
//! ```text
//!   app threads ──mutate──► ItemStore ──ListChange──► adapter ──notify_*──► host
//!   host (UI thread) ──item_count / view_type / create / bind──► adapter
//!   host ──scrolled──► ScrollAggregator ──ScrollState──► listeners
//! ```
//!
//! # State machine
//!
//! The adapter starts [`Detached`](AdapterState::Detached). Attaching stores a
//! weak reference to the host and connects to its scroll signal; detaching
//! disconnects and forgets the host. The two states cycle freely. Store
//! changes made while detached are not forwarded anywhere.
//!
//! # Example
//!
//! ```ignore
//! let adapter = RecyclerAdapter::<Task>::builder()
//!     .item_type_resolver(|_count, position| ViewType::new((position % 2) as i32))
//!     .build();
//! adapter.register_auto(ViewType::new(0), LayoutId(R_ROW), bind_row);
//! adapter.register_auto(ViewType::new(1), LayoutId(R_ROW_ALT), bind_row);
//!
//! host.set_adapter(adapter.clone());
//! adapter.items().extend(load_tasks());
//! ```

use std::sync::{Arc, Weak};

use horizon_recycler_core::ConnectionId;
use horizon_recycler_core::logging::{PerfSpan, span_names, targets};
use parking_lot::{Mutex, RwLock};

use crate::auto_holder::AutoViewHolder;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::host::{RecyclerHost, forward_change};
use crate::registry::{ItemTypeResolver, ViewTypeRegistry};
use crate::scroll::{ScrollAggregator, ScrollDelta, ScrollListener};
use crate::store::ItemStore;
use crate::view::{AnyViewHolder, LayoutId, ViewGroup, ViewHolder, ViewType};

/// Whether an adapter is currently bound to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Not bound to any host. The initial state.
    Detached,
    /// Bound to a host: store changes are forwarded and scrolls aggregated.
    Attached,
}

/// The non-owning back-reference to the attached host.
struct HostLink {
    host: Weak<dyn RecyclerHost>,
    scroll_connection: ConnectionId,
}

impl HostLink {
    fn upgrade(&self) -> Option<Arc<dyn RecyclerHost>> {
        self.host.upgrade()
    }

    fn is_host(&self, host: &Arc<dyn RecyclerHost>) -> bool {
        std::ptr::addr_eq(self.host.as_ptr(), Arc::as_ptr(host))
    }

    /// Disconnects from the host's scroll signal, if the host is still alive.
    fn release(self) {
        if let Some(host) = self.host.upgrade() {
            host.scrolled().disconnect(self.scroll_connection);
        }
    }
}

/// Adapter between an observable item list and a recycling host engine.
pub struct RecyclerAdapter<T> {
    config: AdapterConfig,
    store: Arc<ItemStore<T>>,
    registry: RwLock<ViewTypeRegistry<T>>,
    scroll: Arc<ScrollAggregator>,
    link: Arc<Mutex<Option<HostLink>>>,
    store_connection: ConnectionId,
}

impl<T: Clone + Send + 'static> Default for RecyclerAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> RecyclerAdapter<T> {
    /// Creates an empty adapter with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates an adapter holding `items`.
    pub fn with_items(items: Vec<T>) -> Self {
        Self::builder().items(items).build()
    }

    /// Starts building an adapter.
    pub fn builder() -> RecyclerAdapterBuilder<T> {
        RecyclerAdapterBuilder::new()
    }

    fn from_parts(config: AdapterConfig, registry: ViewTypeRegistry<T>, items: Vec<T>) -> Self {
        let store = Arc::new(ItemStore::with_items(items));
        let link: Arc<Mutex<Option<HostLink>>> = Arc::new(Mutex::new(None));

        let forward_link = link.clone();
        let store_connection = store.subscribe(move |change| {
            let host = forward_link.lock().as_ref().and_then(HostLink::upgrade);
            match host {
                Some(host) => forward_change(&*host, change),
                None => {
                    tracing::trace!(
                        target: targets::ADAPTER,
                        ?change,
                        "no host attached, dropping change"
                    );
                }
            }
        });

        Self {
            config,
            store,
            registry: RwLock::new(registry),
            scroll: Arc::new(ScrollAggregator::new()),
            link,
            store_connection,
        }
    }

    /// The mutable item store. Safe to mutate from any thread.
    pub fn items(&self) -> &Arc<ItemStore<T>> {
        &self.store
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.store.len()
    }

    /// Resolves the view type of `position`.
    ///
    /// Fails with [`AdapterError::InvalidPosition`] for a negative position
    /// and [`AdapterError::OutOfRange`] for one past the end.
    pub fn view_type(&self, position: isize) -> Result<ViewType> {
        let (position, count) = self.checked_position(position)?;
        let resolver = self.registry.read().resolver();
        Ok(resolver(count, position))
    }

    /// Creates a view holder of `view_type` inside `parent`.
    ///
    /// Fails with [`AdapterError::NoFactory`] when no factory is registered
    /// for `view_type`.
    pub fn create_view_holder(
        &self,
        parent: &dyn ViewGroup,
        view_type: ViewType,
    ) -> Result<AnyViewHolder> {
        let _span = PerfSpan::new(span_names::CREATE_HOLDER);
        let factory = self.registry.read().factory(view_type)?;
        Ok(AnyViewHolder::from_boxed(view_type, factory(parent)))
    }

    /// Binds the item at `position` into `holder`.
    ///
    /// Does nothing when no binder is registered for the position's type. If
    /// the item vanished after the bounds check, the binder gets `None`.
    pub fn bind_view_holder(&self, holder: &mut AnyViewHolder, position: isize) -> Result<()> {
        let _span = PerfSpan::new(span_names::BIND_HOLDER);
        let (position, count) = self.checked_position(position)?;

        // Registry callbacks run without the registry lock held.
        let resolver = self.registry.read().resolver();
        let view_type = resolver(count, position);
        let Some(binder) = self.registry.read().binder(view_type) else {
            return Ok(());
        };
        let item = self.store.get(position).ok();
        binder(holder, item.as_ref())
    }

    /// Installs a new item type resolver.
    pub fn set_item_type_resolver<F>(&self, resolver: F)
    where
        F: Fn(usize, usize) -> ViewType + Send + Sync + 'static,
    {
        self.registry.write().set_item_type_resolver(resolver);
    }

    /// See [`ViewTypeRegistry::register_factory`].
    pub fn register_factory<H, F>(&self, view_type: ViewType, factory: F)
    where
        H: ViewHolder,
        F: Fn(&dyn ViewGroup) -> H + Send + Sync + 'static,
    {
        self.registry.write().register_factory(view_type, factory);
    }

    /// See [`ViewTypeRegistry::register_factory_default`].
    pub fn register_factory_default<H, F>(&self, factory: F)
    where
        H: ViewHolder,
        F: Fn(&dyn ViewGroup) -> H + Send + Sync + 'static,
    {
        self.registry.write().register_factory_default(factory);
    }

    /// See [`ViewTypeRegistry::register_binder`].
    pub fn register_binder<H, F>(&self, view_type: ViewType, binder: F)
    where
        H: ViewHolder,
        F: Fn(&mut H, Option<&T>) + Send + Sync + 'static,
    {
        self.registry.write().register_binder(view_type, binder);
    }

    /// See [`ViewTypeRegistry::register_binder_default`].
    pub fn register_binder_default<H, F>(&self, binder: F)
    where
        H: ViewHolder,
        F: Fn(&mut H, Option<&T>) + Send + Sync + 'static,
    {
        self.registry.write().register_binder_default(binder);
    }

    /// See [`ViewTypeRegistry::register_auto`].
    pub fn register_auto<F>(&self, view_type: ViewType, layout: LayoutId, binder: F)
    where
        F: Fn(&mut AutoViewHolder, Option<&T>) + Send + Sync + 'static,
    {
        self.registry.write().register_auto(view_type, layout, binder);
    }

    /// See [`ViewTypeRegistry::register_auto_default`].
    pub fn register_auto_default<F>(&self, layout: LayoutId, binder: F)
    where
        F: Fn(&mut AutoViewHolder, Option<&T>) + Send + Sync + 'static,
    {
        self.registry.write().register_auto_default(layout, binder);
    }

    /// Returns `true` if a factory is registered for `view_type`.
    pub fn has_factory(&self, view_type: ViewType) -> bool {
        self.registry.read().has_factory(view_type)
    }

    /// Returns `true` if a binder is registered for `view_type`.
    pub fn has_binder(&self, view_type: ViewType) -> bool {
        self.registry.read().has_binder(view_type)
    }

    fn checked_position(&self, position: isize) -> Result<(usize, usize)> {
        let index =
            usize::try_from(position).map_err(|_| AdapterError::InvalidPosition { position })?;
        let count = self.store.len();
        if index >= count {
            return Err(AdapterError::out_of_range(index, count));
        }
        Ok((index, count))
    }
}

impl<T> RecyclerAdapter<T> {
    /// The configuration this adapter was built with.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        if self.link.lock().is_some() {
            AdapterState::Attached
        } else {
            AdapterState::Detached
        }
    }

    /// Returns `true` while attached to a host.
    pub fn is_attached(&self) -> bool {
        self.state() == AdapterState::Attached
    }

    /// Binds this adapter to `host`.
    ///
    /// Connects to the host's scroll signal and starts forwarding store
    /// changes to it. Attaching to the host already attached is a no-op;
    /// attaching to another host detaches from the current one first.
    pub fn on_attached_to_host(&self, host: &Arc<dyn RecyclerHost>) {
        let mut link = self.link.lock();
        if let Some(current) = link.as_ref() {
            if current.is_host(host) {
                tracing::debug!(target: targets::ADAPTER, "already attached to this host");
                return;
            }
        }
        if let Some(previous) = link.take() {
            tracing::debug!(target: targets::ADAPTER, "detaching from previous host");
            previous.release();
        }

        let weak = Arc::downgrade(host);
        let scroll = self.scroll.clone();
        let slot_host = weak.clone();
        let scroll_connection = host.scrolled().connect(move |delta: &ScrollDelta| {
            if let Some(host) = slot_host.upgrade() {
                scroll.on_scrolled(*delta, host.linear_layout());
            }
        });

        *link = Some(HostLink {
            host: weak,
            scroll_connection,
        });
        tracing::debug!(target: targets::ADAPTER, "attached to host");
    }

    /// Unbinds this adapter from `host`.
    ///
    /// A no-op when not attached, or attached to a different host.
    pub fn on_detached_from_host(&self, host: &Arc<dyn RecyclerHost>) {
        let mut link = self.link.lock();
        match link.as_ref() {
            Some(current) if current.is_host(host) => {}
            Some(_) => {
                tracing::debug!(
                    target: targets::ADAPTER,
                    "detach requested by a host that is not attached"
                );
                return;
            }
            None => {
                tracing::trace!(target: targets::ADAPTER, "detach while already detached");
                return;
            }
        }
        if let Some(current) = link.take() {
            current.release();
        }
        tracing::debug!(target: targets::ADAPTER, "detached from host");
    }

    /// Handles a scroll reported by calling the adapter directly.
    ///
    /// Hosts that emit [`RecyclerHost::scrolled`] do not need to call this;
    /// the adapter is already connected to that signal while attached. Does
    /// nothing while detached.
    pub fn on_scrolled(&self, dx: i32, dy: i32) {
        let host = self.link.lock().as_ref().and_then(HostLink::upgrade);
        let layout = host.as_deref().and_then(|host| host.linear_layout());
        self.scroll.on_scrolled(ScrollDelta::new(dx, dy), layout);
    }

    /// Adds a scroll listener. Returns `false` if it was already added.
    pub fn add_scroll_listener(&self, listener: Arc<dyn ScrollListener>) -> bool {
        self.scroll.add_listener(listener)
    }

    /// Removes a scroll listener. Returns `false` if it was not added.
    pub fn remove_scroll_listener(&self, listener: &Arc<dyn ScrollListener>) -> bool {
        self.scroll.remove_listener(listener)
    }

    /// Number of registered scroll listeners.
    pub fn scroll_listener_count(&self) -> usize {
        self.scroll.listener_count()
    }
}

impl<T> Drop for RecyclerAdapter<T> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.store_connection);
        if let Some(link) = self.link.lock().take() {
            link.release();
        }
    }
}

impl<T> std::fmt::Debug for RecyclerAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecyclerAdapter")
            .field("state", &self.state())
            .field("store", &self.store)
            .field("registry", &self.registry.try_read())
            .field("scroll", &self.scroll)
            .finish()
    }
}

static_assertions::assert_impl_all!(RecyclerAdapter<String>: Send, Sync);

/// Builder for a [`RecyclerAdapter`].
pub struct RecyclerAdapterBuilder<T> {
    config: AdapterConfig,
    resolver: Option<ItemTypeResolver>,
    items: Vec<T>,
}

impl<T> Default for RecyclerAdapterBuilder<T> {
    fn default() -> Self {
        Self {
            config: AdapterConfig::default(),
            resolver: None,
            items: Vec::new(),
        }
    }
}

impl<T: Clone + Send + 'static> RecyclerAdapterBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` as the base configuration.
    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the type the default resolver returns for every position.
    pub fn default_view_type(mut self, view_type: ViewType) -> Self {
        self.config.default_view_type = view_type.get();
        self
    }

    /// Set the item type resolver. Overrides the default view type.
    pub fn item_type_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(usize, usize) -> ViewType + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the initial items. No change event is emitted for them.
    pub fn items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    /// Build the adapter, initially detached.
    pub fn build(self) -> RecyclerAdapter<T> {
        let mut registry = ViewTypeRegistry::with_default_type(self.config.default_view_type());
        if let Some(resolver) = self.resolver {
            registry.set_item_type_resolver(move |count, position| resolver(count, position));
        }
        RecyclerAdapter::from_parts(self.config, registry, self.items)
    }
}

impl<T> std::fmt::Debug for RecyclerAdapterBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecyclerAdapterBuilder")
            .field("config", &self.config)
            .field("resolver", &self.resolver.is_some())
            .field("items", &self.items.len())
            .finish()
    }
}
