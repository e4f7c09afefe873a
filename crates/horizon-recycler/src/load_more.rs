//! Infinite-list support: ask for more items near the end.

use horizon_recycler_core::logging::targets;
use parking_lot::Mutex;

use crate::config::AdapterConfig;
use crate::scroll::{ScrollListener, ScrollState};

/// A scroll listener that fires once when the list nears its end.
///
/// The callback runs when the last visible position is within `threshold`
/// positions of the last item. It then stays quiet until the item count
/// changes (more items arrived) or [`reset`](Self::reset) is called, so a
/// user scrolling around the bottom does not request the same page twice.
///
/// ```ignore
/// let store = adapter.items().clone();
/// let trigger = LoadMoreTrigger::from_config(adapter.config(), move |state| {
///     request_page(state.count, store.clone());
/// });
/// adapter.add_scroll_listener(Arc::new(trigger));
/// ```
pub struct LoadMoreTrigger {
    threshold: usize,
    fired_at: Mutex<Option<usize>>,
    callback: Box<dyn Fn(ScrollState) + Send + Sync>,
}

impl LoadMoreTrigger {
    /// Creates a trigger firing `callback` within `threshold` positions of the end.
    pub fn new<F>(threshold: usize, callback: F) -> Self
    where
        F: Fn(ScrollState) + Send + Sync + 'static,
    {
        Self {
            threshold,
            fired_at: Mutex::new(None),
            callback: Box::new(callback),
        }
    }

    /// Creates a trigger using the configured `load_more_threshold`.
    pub fn from_config<F>(config: &AdapterConfig, callback: F) -> Self
    where
        F: Fn(ScrollState) + Send + Sync + 'static,
    {
        Self::new(config.load_more_threshold, callback)
    }

    /// The configured threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Re-arms the trigger, e.g. after a failed load.
    pub fn reset(&self) {
        *self.fired_at.lock() = None;
    }

    fn near_end(&self, state: &ScrollState) -> bool {
        match state.last_visible {
            Some(last) => last.saturating_add(self.threshold).saturating_add(1) >= state.count,
            None => false,
        }
    }
}

impl ScrollListener for LoadMoreTrigger {
    fn on_scroll(&self, state: ScrollState) {
        if state.count == 0 || !self.near_end(&state) {
            return;
        }
        {
            let mut fired_at = self.fired_at.lock();
            if *fired_at == Some(state.count) {
                return;
            }
            *fired_at = Some(state.count);
        }
        tracing::debug!(target: targets::SCROLL, count = state.count, "requesting more items");
        (self.callback)(state);
    }
}

impl std::fmt::Debug for LoadMoreTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadMoreTrigger")
            .field("threshold", &self.threshold)
            .field("fired_at", &*self.fired_at.lock())
            .finish_non_exhaustive()
    }
}
