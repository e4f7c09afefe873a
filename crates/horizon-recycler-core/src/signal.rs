//! Multi-subscriber change notification.
//!
//! A [`Signal<Args>`] holds a set of slots and calls each of them, in the
//! order they were connected, whenever a value is emitted. The item store
//! publishes its structural changes through one, and hosts publish scroll
//! deltas through another.
//!
//! Slots run synchronously on the emitting thread. The slot set is copied
//! before delivery, so a slot may connect or disconnect slots of the same
//! signal; the change applies from the next emission.
//!
//! ```
//! use horizon_recycler_core::Signal;
//!
//! let resized = Signal::<(u32, u32)>::new();
//! let id = resized.connect(|&(w, h)| println!("{w}x{h}"));
//! resized.emit((640, 480));
//! assert!(resized.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, returned by [`Signal::connect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A thread-safe list of callbacks invoked with each emitted value.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Creates a signal with no slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Adds `slot`. It is called for every later emission until disconnected.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Removes the slot behind `id`. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Calls every connected slot with `args` on the current thread.
    #[tracing::instrument(skip_all, target = "horizon_recycler_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slot_count = slots.len(), "emitting");
        for slot in &slots {
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<usize>: Send, Sync);
