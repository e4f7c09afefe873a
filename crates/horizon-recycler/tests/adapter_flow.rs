//! End-to-end behavior of `RecyclerAdapter` against a recording host.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_recycler::{
    AdapterError, AnyViewHolder, AutoViewHolder, LayoutId, LinearLayout, LoadMoreTrigger,
    RecyclerAdapter, RecyclerHost, ScrollDelta, ScrollListener, ScrollState, Signal, View,
    ViewGroup, ViewHolder, ViewId, ViewRef, ViewType,
};
use parking_lot::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Inserted(usize),
    RangeInserted(usize, usize),
    Removed(usize),
    RangeRemoved(usize, usize),
    Changed(usize),
    RangeChanged(usize, usize),
    Moved(usize, usize),
    DataSetChanged,
}

struct TestLayout {
    visible: Mutex<(usize, Option<usize>, Option<usize>)>,
}

impl LinearLayout for TestLayout {
    fn item_count(&self) -> usize {
        self.visible.lock().0
    }

    fn first_visible_position(&self) -> Option<usize> {
        self.visible.lock().1
    }

    fn last_visible_position(&self) -> Option<usize> {
        self.visible.lock().2
    }
}

struct RecordingHost {
    scrolled: Signal<ScrollDelta>,
    layout: Option<TestLayout>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingHost {
    fn linear() -> Arc<Self> {
        Arc::new(Self {
            scrolled: Signal::new(),
            layout: Some(TestLayout {
                visible: Mutex::new((0, None, None)),
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn grid() -> Arc<Self> {
        Arc::new(Self {
            scrolled: Signal::new(),
            layout: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn show(&self, count: usize, first: usize, last: usize) {
        if let Some(layout) = &self.layout {
            *layout.visible.lock() = (count, Some(first), Some(last));
        }
    }

    fn scroll(&self, dy: i32) {
        self.scrolled.emit(ScrollDelta::new(0, dy));
    }

    fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl RecyclerHost for RecordingHost {
    fn scrolled(&self) -> &Signal<ScrollDelta> {
        &self.scrolled
    }

    fn linear_layout(&self) -> Option<&dyn LinearLayout> {
        self.layout.as_ref().map(|layout| layout as &dyn LinearLayout)
    }

    fn notify_item_inserted(&self, position: usize) {
        self.record(Call::Inserted(position));
    }

    fn notify_item_range_inserted(&self, start: usize, count: usize) {
        self.record(Call::RangeInserted(start, count));
    }

    fn notify_item_removed(&self, position: usize) {
        self.record(Call::Removed(position));
    }

    fn notify_item_range_removed(&self, start: usize, count: usize) {
        self.record(Call::RangeRemoved(start, count));
    }

    fn notify_item_changed(&self, position: usize) {
        self.record(Call::Changed(position));
    }

    fn notify_item_range_changed(&self, start: usize, count: usize) {
        self.record(Call::RangeChanged(start, count));
    }

    fn notify_item_moved(&self, from: usize, to: usize) {
        self.record(Call::Moved(from, to));
    }

    fn notify_data_set_changed(&self) {
        self.record(Call::DataSetChanged);
    }
}

fn attached<T>(adapter: &RecyclerAdapter<T>, host: &Arc<RecordingHost>) -> Arc<dyn RecyclerHost>
where
    T: Clone + Send + 'static,
{
    let host: Arc<dyn RecyclerHost> = host.clone();
    adapter.on_attached_to_host(&host);
    host
}

const ROW: LayoutId = LayoutId(1);
const TITLE: ViewId = ViewId(10);

struct Label {
    id: ViewId,
    text: Mutex<String>,
}

impl View for Label {
    fn id(&self) -> Option<ViewId> {
        Some(self.id)
    }
}

struct Row {
    children: Vec<ViewRef>,
}

impl View for Row {
    fn children(&self) -> Vec<ViewRef> {
        self.children.clone()
    }
}

#[derive(Default)]
struct Inflater {
    inflated: AtomicUsize,
}

impl ViewGroup for Inflater {
    fn inflate(&self, _layout: LayoutId) -> ViewRef {
        self.inflated.fetch_add(1, Ordering::SeqCst);
        let title: ViewRef = Arc::new(Label {
            id: TITLE,
            text: Mutex::new(String::new()),
        });
        Arc::new(Row {
            children: vec![title],
        })
    }
}

struct PlainHolder {
    view: ViewRef,
    bound: usize,
}

impl ViewHolder for PlainHolder {
    fn item_view(&self) -> &ViewRef {
        &self.view
    }
}

fn plain_holder(parent: &dyn ViewGroup) -> PlainHolder {
    PlainHolder {
        view: parent.inflate(ROW),
        bound: 0,
    }
}

fn title_of(holder: &mut AnyViewHolder) -> String {
    let auto = holder.downcast_mut::<AutoViewHolder>().unwrap();
    let mut text = String::new();
    auto.find_view_as::<Label>(TITLE, |label| text = label.text.lock().clone());
    text
}

#[test]
fn test_single_and_range_notifications() {
    init_tracing();
    let adapter = RecyclerAdapter::<&'static str>::new();
    let host = RecordingHost::linear();
    let _host = attached(&adapter, &host);

    adapter.items().push("A");
    assert_eq!(host.take_calls(), vec![Call::Inserted(0)]);
    assert_eq!(adapter.item_count(), 1);

    adapter.items().extend(["B", "C"]);
    assert_eq!(host.take_calls(), vec![Call::RangeInserted(1, 2)]);
    assert_eq!(adapter.item_count(), 3);

    adapter.items().remove(1).unwrap();
    assert_eq!(host.take_calls(), vec![Call::Removed(1)]);
    assert_eq!(adapter.item_count(), 2);
    assert_eq!(adapter.items().snapshot(), vec!["A", "C"]);
}

#[test]
fn test_every_mutation_maps_to_one_host_call() {
    let adapter = RecyclerAdapter::with_items(vec![0, 1, 2, 3, 4, 5]);
    let host = RecordingHost::linear();
    let _host = attached(&adapter, &host);
    let items = adapter.items();

    items.set(0, 10).unwrap();
    items.set_range(1, [11, 12]).unwrap();
    items.insert(2, 20).unwrap();
    items.insert_all(0, [30, 31, 32]).unwrap();
    items.remove_range(0..3).unwrap();
    items.move_item(0, 4).unwrap();
    items.move_range(0, 3, 2).unwrap();
    items.replace_all(vec![7, 8]);
    items.clear();

    assert_eq!(
        host.take_calls(),
        vec![
            Call::Changed(0),
            Call::RangeChanged(1, 2),
            Call::Inserted(2),
            Call::RangeInserted(0, 3),
            Call::RangeRemoved(0, 3),
            Call::Moved(0, 4),
            Call::DataSetChanged,
            Call::DataSetChanged,
            Call::RangeRemoved(0, 2),
        ]
    );
    assert_eq!(adapter.item_count(), 0);
}

#[test]
fn test_failed_mutation_notifies_nothing() {
    let adapter = RecyclerAdapter::with_items(vec!['a']);
    let host = RecordingHost::linear();
    let _host = attached(&adapter, &host);

    assert!(matches!(
        adapter.items().remove(5),
        Err(AdapterError::OutOfRange { position: 5, len: 1 })
    ));
    adapter.items().extend(Vec::new());
    assert!(host.take_calls().is_empty());
    assert_eq!(adapter.item_count(), 1);
}

#[test]
fn test_missing_factory_and_missing_binder() {
    let adapter = RecyclerAdapter::builder()
        .items(vec!["zero", "one"])
        .item_type_resolver(|_, position| ViewType::new(position as i32))
        .build();
    adapter.register_factory(ViewType::new(0), plain_holder);
    adapter.register_binder(ViewType::new(0), |holder: &mut PlainHolder, _: Option<&&str>| {
        holder.bound += 1;
    });
    let parent = Inflater::default();

    assert!(matches!(
        adapter.create_view_holder(&parent, ViewType::new(1)),
        Err(AdapterError::NoFactory { view_type }) if view_type == ViewType::new(1)
    ));

    let mut type_one = AnyViewHolder::new(ViewType::new(1), plain_holder(&parent));
    adapter.bind_view_holder(&mut type_one, 1).unwrap();
    assert_eq!(type_one.downcast_ref::<PlainHolder>().unwrap().bound, 0);

    let mut type_zero = adapter.create_view_holder(&parent, ViewType::new(0)).unwrap();
    adapter.bind_view_holder(&mut type_zero, 0).unwrap();
    assert_eq!(type_zero.downcast_ref::<PlainHolder>().unwrap().bound, 1);
}

#[test]
fn test_position_validation() {
    let adapter = RecyclerAdapter::with_items(vec![1u8, 2, 3]);
    adapter.register_factory_default(plain_holder);
    let mut holder = adapter
        .create_view_holder(&Inflater::default(), ViewType::DEFAULT)
        .unwrap();

    for position in [-1isize, -100, isize::MIN] {
        assert!(matches!(
            adapter.view_type(position),
            Err(AdapterError::InvalidPosition { .. })
        ));
        assert!(matches!(
            adapter.bind_view_holder(&mut holder, position),
            Err(AdapterError::InvalidPosition { .. })
        ));
    }
    for position in [3isize, 4, isize::MAX] {
        assert!(matches!(
            adapter.view_type(position),
            Err(AdapterError::OutOfRange { len: 3, .. })
        ));
    }
}

#[test]
fn test_register_auto_binds_through_cached_views() {
    let adapter = RecyclerAdapter::with_items(vec!["alpha".to_string(), "beta".to_string()]);
    adapter.register_auto_default(ROW, |holder: &mut AutoViewHolder, item: Option<&String>| {
        let text = item.cloned().unwrap_or_default();
        holder.find_view_as::<Label>(TITLE, |label| *label.text.lock() = text);
    });
    let parent = Inflater::default();

    let mut holder = adapter.create_view_holder(&parent, ViewType::DEFAULT).unwrap();
    assert_eq!(parent.inflated.load(Ordering::SeqCst), 1);

    adapter.bind_view_holder(&mut holder, 0).unwrap();
    assert_eq!(title_of(&mut holder), "alpha");

    // Rebinding the same holder to another position reuses it.
    adapter.bind_view_holder(&mut holder, 1).unwrap();
    assert_eq!(title_of(&mut holder), "beta");
    assert_eq!(parent.inflated.load(Ordering::SeqCst), 1);
    assert_eq!(holder.downcast_ref::<AutoViewHolder>().unwrap().cached_len(), 1);
}

#[test]
fn test_scroll_fan_out_while_attached() {
    let adapter = RecyclerAdapter::<u32>::new();
    let host = RecordingHost::linear();
    host.show(50, 10, 19);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: Arc<dyn ScrollListener> =
        Arc::new(move |state: ScrollState| sink.lock().push(state));
    assert!(adapter.add_scroll_listener(listener.clone()));
    assert!(!adapter.add_scroll_listener(listener.clone()));

    host.scroll(5);
    assert!(seen.lock().is_empty());

    let dyn_host = attached(&adapter, &host);
    host.scroll(5);
    adapter.on_scrolled(0, 5);
    assert_eq!(
        *seen.lock(),
        vec![
            ScrollState {
                count: 50,
                first_visible: Some(10),
                last_visible: Some(19),
            };
            2
        ]
    );

    adapter.on_detached_from_host(&dyn_host);
    host.scroll(5);
    assert_eq!(seen.lock().len(), 2);

    assert!(adapter.remove_scroll_listener(&listener));
    assert!(!adapter.remove_scroll_listener(&listener));
}

#[test]
fn test_non_linear_host_reports_no_scrolls() {
    let adapter = RecyclerAdapter::<u32>::new();
    let host = RecordingHost::grid();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    adapter.add_scroll_listener(Arc::new(move |_: ScrollState| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let _host = attached(&adapter, &host);
    host.scroll(12);
    adapter.on_scrolled(0, 12);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_attach_detach_cycles() {
    let adapter = RecyclerAdapter::<u32>::new();
    let host = RecordingHost::linear();
    let dyn_host: Arc<dyn RecyclerHost> = host.clone();

    for round in 0..3u32 {
        adapter.on_attached_to_host(&dyn_host);
        assert!(adapter.is_attached());
        assert_eq!(host.scrolled.connection_count(), 1);
        adapter.items().push(round);

        adapter.on_detached_from_host(&dyn_host);
        adapter.on_detached_from_host(&dyn_host);
        assert!(!adapter.is_attached());
        assert_eq!(host.scrolled.connection_count(), 0);
        adapter.items().push(round);
    }

    assert_eq!(
        host.take_calls(),
        vec![Call::Inserted(0), Call::Inserted(2), Call::Inserted(4)]
    );
}

#[test]
fn test_load_more_appends_from_listener() {
    let adapter = RecyclerAdapter::with_items((0..10).collect::<Vec<u32>>());
    let host = RecordingHost::linear();
    let _host = attached(&adapter, &host);

    let items = adapter.items().clone();
    let trigger = LoadMoreTrigger::new(2, move |state| {
        let next = state.count as u32;
        items.extend(next..next + 10);
    });
    adapter.add_scroll_listener(Arc::new(trigger));

    host.show(10, 0, 6);
    host.scroll(40);
    assert_eq!(adapter.item_count(), 10);

    host.show(10, 2, 7);
    host.scroll(40);
    host.scroll(1);
    assert_eq!(adapter.item_count(), 20);
    assert_eq!(host.take_calls(), vec![Call::RangeInserted(10, 10)]);
}

#[test]
fn test_background_mutations_reach_host() {
    let adapter = Arc::new(RecyclerAdapter::<usize>::new());
    let host = RecordingHost::linear();
    let _host = attached(&adapter, &host);

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let adapter = adapter.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    adapter.items().push(t * 100 + i);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let calls = host.take_calls();
    assert_eq!(adapter.item_count(), 100);
    assert_eq!(calls.len(), 100);
    // Mutations serialize, so each insert lands at the then-current end.
    let expected: Vec<Call> = (0..100).map(Call::Inserted).collect();
    assert_eq!(calls, expected);
}
