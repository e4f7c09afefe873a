//! The host engine as seen by the adapter.
//!
//! The host owns the on-screen list: it lays out items, recycles holders and
//! animates changes. The adapter talks to it in two directions:
//!
//! - **Outbound** invalidation calls (`notify_*`) whenever the item store
//!   changes. Single-item changes use the single-position call so the host
//!   can run its cheap per-item animation; everything else uses the range
//!   call, and moves of more than one item fall back to a full invalidate.
//! - **Inbound** scroll deltas, via the host's [`scrolled`](RecyclerHost::scrolled) signal.

use horizon_recycler_core::Signal;
use horizon_recycler_core::logging::targets;

use crate::scroll::ScrollDelta;
use crate::store::ListChange;

/// Introspection of a single-axis (linear) host layout.
pub trait LinearLayout {
    /// Number of items the layout knows about.
    fn item_count(&self) -> usize;

    /// First (partially) visible position, or `None` when nothing is visible.
    fn first_visible_position(&self) -> Option<usize>;

    /// Last (partially) visible position, or `None` when nothing is visible.
    fn last_visible_position(&self) -> Option<usize>;
}

/// A host engine an adapter can be attached to.
///
/// The adapter keeps only a weak reference to its host, so a host may be
/// dropped while an adapter still considers itself attached; invalidation
/// calls are then silently dropped.
pub trait RecyclerHost: Send + Sync {
    /// Signal emitted by the host after each scroll.
    fn scrolled(&self) -> &Signal<ScrollDelta>;

    /// The current layout, if it is linear. Scroll listeners are only
    /// notified while this returns `Some`.
    fn linear_layout(&self) -> Option<&dyn LinearLayout>;

    /// One item was inserted at `position`.
    fn notify_item_inserted(&self, position: usize);

    /// `count` items were inserted starting at `start`.
    fn notify_item_range_inserted(&self, start: usize, count: usize);

    /// The item at `position` was removed.
    fn notify_item_removed(&self, position: usize);

    /// `count` items starting at `start` were removed.
    fn notify_item_range_removed(&self, start: usize, count: usize);

    /// The item at `position` changed in place.
    fn notify_item_changed(&self, position: usize);

    /// `count` items starting at `start` changed in place.
    fn notify_item_range_changed(&self, start: usize, count: usize);

    /// The item at `from` moved to `to`.
    fn notify_item_moved(&self, from: usize, to: usize);

    /// Everything may have changed.
    fn notify_data_set_changed(&self);
}

/// Translates one store change into the matching host invalidation call.
pub fn forward_change(host: &dyn RecyclerHost, change: &ListChange) {
    tracing::trace!(target: targets::ADAPTER, ?change, "forwarding change to host");
    match *change {
        ListChange::Inserted { start, count: 1 } => host.notify_item_inserted(start),
        ListChange::Inserted { start, count } => host.notify_item_range_inserted(start, count),
        ListChange::Removed { start, count: 1 } => host.notify_item_removed(start),
        ListChange::Removed { start, count } => host.notify_item_range_removed(start, count),
        ListChange::Changed { start, count: 1 } => host.notify_item_changed(start),
        ListChange::Changed { start, count } => host.notify_item_range_changed(start, count),
        ListChange::Moved { from, to, count: 1 } => host.notify_item_moved(from, to),
        ListChange::Moved { .. } | ListChange::Reset => host.notify_data_set_changed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        scrolled: Signal<ScrollDelta>,
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.lock().push(call);
        }
    }

    impl RecyclerHost for Recorder {
        fn scrolled(&self) -> &Signal<ScrollDelta> {
            &self.scrolled
        }

        fn linear_layout(&self) -> Option<&dyn LinearLayout> {
            None
        }

        fn notify_item_inserted(&self, position: usize) {
            self.record(format!("inserted({position})"));
        }

        fn notify_item_range_inserted(&self, start: usize, count: usize) {
            self.record(format!("range_inserted({start}, {count})"));
        }

        fn notify_item_removed(&self, position: usize) {
            self.record(format!("removed({position})"));
        }

        fn notify_item_range_removed(&self, start: usize, count: usize) {
            self.record(format!("range_removed({start}, {count})"));
        }

        fn notify_item_changed(&self, position: usize) {
            self.record(format!("changed({position})"));
        }

        fn notify_item_range_changed(&self, start: usize, count: usize) {
            self.record(format!("range_changed({start}, {count})"));
        }

        fn notify_item_moved(&self, from: usize, to: usize) {
            self.record(format!("moved({from}, {to})"));
        }

        fn notify_data_set_changed(&self) {
            self.record("data_set_changed".into());
        }
    }

    #[test]
    fn test_single_vs_range() {
        let host = Recorder::default();
        let changes = [
            ListChange::Inserted { start: 0, count: 1 },
            ListChange::Inserted { start: 1, count: 2 },
            ListChange::Removed { start: 1, count: 1 },
            ListChange::Removed { start: 0, count: 3 },
            ListChange::Changed { start: 2, count: 1 },
            ListChange::Changed { start: 2, count: 4 },
        ];
        for change in &changes {
            forward_change(&host, change);
        }
        assert_eq!(
            *host.calls.lock(),
            vec![
                "inserted(0)",
                "range_inserted(1, 2)",
                "removed(1)",
                "range_removed(0, 3)",
                "changed(2)",
                "range_changed(2, 4)",
            ]
        );
    }

    #[test]
    fn test_batch_move_invalidates_everything() {
        let host = Recorder::default();
        forward_change(&host, &ListChange::Moved { from: 0, to: 3, count: 1 });
        forward_change(&host, &ListChange::Moved { from: 0, to: 3, count: 2 });
        forward_change(&host, &ListChange::Reset);
        assert_eq!(
            *host.calls.lock(),
            vec!["moved(0, 3)", "data_set_changed", "data_set_changed"]
        );
    }
}
