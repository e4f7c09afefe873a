//! Scroll aggregation and listener fan-out.
//!
//! The host reports raw scroll deltas. For each one, the aggregator asks the
//! host's linear layout for `(count, first visible, last visible)` and hands
//! that [`ScrollState`] to every registered [`ScrollListener`]. When the host
//! layout is not linear the event is dropped.

use std::sync::Arc;

use horizon_recycler_core::logging::targets;
use parking_lot::Mutex;

use crate::host::LinearLayout;

/// A raw scroll delta reported by the host, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollDelta {
    /// Horizontal scroll amount.
    pub dx: i32,
    /// Vertical scroll amount.
    pub dy: i32,
}

impl ScrollDelta {
    /// Creates a delta.
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// What a scroll listener is told after each scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    /// Number of items the layout knows about.
    pub count: usize,
    /// First (partially) visible position, `None` when nothing is visible.
    pub first_visible: Option<usize>,
    /// Last (partially) visible position, `None` when nothing is visible.
    pub last_visible: Option<usize>,
}

impl ScrollState {
    /// Reads the current state from a linear layout.
    pub fn from_layout(layout: &dyn LinearLayout) -> Self {
        Self {
            count: layout.item_count(),
            first_visible: layout.first_visible_position(),
            last_visible: layout.last_visible_position(),
        }
    }
}

/// Receives a [`ScrollState`] after every scroll of a linear layout.
///
/// Implemented for any `Fn(ScrollState) + Send + Sync` closure.
pub trait ScrollListener: Send + Sync {
    /// Called after the host scrolled.
    fn on_scroll(&self, state: ScrollState);
}

impl<F> ScrollListener for F
where
    F: Fn(ScrollState) + Send + Sync,
{
    fn on_scroll(&self, state: ScrollState) {
        self(state)
    }
}

/// A set of scroll listeners, keyed by the identity of their `Arc`.
#[derive(Default)]
pub struct ScrollAggregator {
    listeners: Mutex<Vec<Arc<dyn ScrollListener>>>,
}

impl ScrollAggregator {
    /// Creates an aggregator with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener`. Returns `false` if this same `Arc` was already registered.
    pub fn add_listener(&self, listener: Arc<dyn ScrollListener>) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|existing| same_listener(existing, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Removes `listener`. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn ScrollListener>) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|existing| !same_listener(existing, listener));
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Handles one scroll delta.
    ///
    /// Returns the state delivered to listeners, or `None` when `layout` is
    /// `None` (the host layout is not linear) and nothing was delivered.
    pub fn on_scrolled(
        &self,
        delta: ScrollDelta,
        layout: Option<&dyn LinearLayout>,
    ) -> Option<ScrollState> {
        let Some(layout) = layout else {
            tracing::trace!(
                target: targets::SCROLL,
                ?delta,
                "layout is not linear, skipping scroll"
            );
            return None;
        };
        let state = ScrollState::from_layout(layout);

        // Listeners may add or remove listeners while being notified.
        let listeners: Vec<Arc<dyn ScrollListener>> = self.listeners.lock().clone();
        tracing::trace!(
            target: targets::SCROLL,
            ?delta,
            ?state,
            listener_count = listeners.len(),
            "dispatching scroll"
        );
        for listener in &listeners {
            listener.on_scroll(state);
        }
        Some(state)
    }
}

impl std::fmt::Debug for ScrollAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollAggregator")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn same_listener(a: &Arc<dyn ScrollListener>, b: &Arc<dyn ScrollListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
