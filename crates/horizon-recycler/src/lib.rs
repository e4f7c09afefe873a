//! Adapter core for recycling list views.
//!
//! This crate connects an observable list of items to a host engine that
//! renders only the visible slice of a long list and recycles view holders:
//!
//! - **Item Store**: thread-safe observable list emitting one [`ListChange`] per mutation
//! - **View Type Registry**: per-type view holder factories and binders
//! - **Auto View Holder**: generic holder with fill-once sub-view lookup
//! - **Scroll Aggregation**: visible-range reporting to scroll listeners
//! - **Adapter**: the attach/detach state machine and host invalidation
//!
//! The host engine itself (layout, recycling pool, drawing) is not part of
//! this crate; it is reached through the [`RecyclerHost`] and [`ViewGroup`]
//! traits.
//!
//! # Example
//!
//! ```
//! use horizon_recycler::{RecyclerAdapter, ViewType};
//!
//! let adapter = RecyclerAdapter::<String>::new();
//! adapter.items().push("first".to_string());
//! adapter.items().extend(["second".to_string(), "third".to_string()]);
//!
//! assert_eq!(adapter.item_count(), 3);
//! assert_eq!(adapter.view_type(2).unwrap(), ViewType::DEFAULT);
//! assert!(adapter.view_type(-1).is_err());
//! ```

pub mod adapter;
pub mod auto_holder;
pub mod config;
pub mod error;
pub mod host;
pub mod load_more;
pub mod registry;
pub mod scroll;
pub mod store;
pub mod view;

pub use adapter::{AdapterState, RecyclerAdapter, RecyclerAdapterBuilder};
pub use auto_holder::AutoViewHolder;
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use host::{LinearLayout, RecyclerHost, forward_change};
pub use load_more::LoadMoreTrigger;
pub use registry::{ItemTypeResolver, ViewTypeRegistry};
pub use scroll::{ScrollAggregator, ScrollDelta, ScrollListener, ScrollState};
pub use store::{ItemStore, ListChange};
pub use view::{
    AnyViewHolder, LayoutId, View, ViewGroup, ViewHolder, ViewId, ViewRef, ViewType, downcast_view,
    find_view_by_id,
};

pub use horizon_recycler_core::{ConnectionId, Signal};
