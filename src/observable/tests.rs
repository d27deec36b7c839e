use super::*;

use std::io;

use tokio::time::Duration;

use crate::{
    emitter::Emission, observer::Observer, subscription::subscribe::SubscriptionHandle,
};

#[derive(Clone)]
struct Recorder<T> {
    nexts: Arc<Mutex<Vec<T>>>,
    errors: Arc<Mutex<Vec<String>>>,
    dones: Arc<Mutex<u32>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    fn new() -> Self {
        Recorder {
            nexts: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(Vec::new())),
            dones: Arc::new(Mutex::new(0)),
        }
    }

    fn observer(&self) -> Observer<T> {
        let nexts = Arc::clone(&self.nexts);
        let errors = Arc::clone(&self.errors);
        let dones = Arc::clone(&self.dones);
        Observer::new(
            move |v| nexts.lock().unwrap().push(v),
            move |e| errors.lock().unwrap().push(e.to_string()),
            move || *dones.lock().unwrap() += 1,
        )
    }

    fn nexts(&self) -> Vec<T> {
        self.nexts.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    fn dones(&self) -> u32 {
        *self.dones.lock().unwrap()
    }
}

fn boom() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "boom")
}

#[tokio::test]
async fn range_emits_in_order_then_done() {
    let rec = Recorder::new();
    let observable = Observable::range(0, 5);
    let s = observable.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![0, 1, 2, 3, 4]);
    assert!(rec.errors().is_empty());
    assert_eq!(rec.dones(), 1);
    assert!(observable.is_done());
}

#[tokio::test]
async fn range_with_empty_bounds_is_only_done() {
    let rec = Recorder::new();
    let s = Observable::range(5, 5).subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert!(rec.nexts().is_empty());
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn range_yields_across_many_values() {
    let rec = Recorder::new();
    let s = Observable::range(-500, 1500).subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    let nexts = rec.nexts();
    assert_eq!(nexts.len(), 2000);
    assert!(nexts.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn empty_is_done_without_values() {
    let rec = Recorder::<i32>::new();
    let s = Observable::empty().subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert!(rec.nexts().is_empty());
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn just_emits_items_as_is() {
    let rec = Recorder::new();
    let s = Observable::just(["a", "b", "c"]).subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec!["a", "b", "c"]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn from_iterator_preserves_order() {
    let rec = Recorder::new();
    let s = Observable::from_iterator((1..=4).map(|i| i * 10))
        .subscribe(rec.observer())
        .unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![10, 20, 30, 40]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn start_emits_in_completion_order() {
    let rec = Recorder::new();
    let fns: Vec<Box<dyn FnOnce() -> u32 + Send>> = vec![
        Box::new(|| -> u32 {
            std::thread::sleep(Duration::from_millis(60));
            1
        }),
        Box::new(|| -> u32 { 2 }),
    ];
    let s = Observable::start(fns).subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![2, 1]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn start_skips_panicking_functions() {
    let rec = Recorder::new();
    let fns: Vec<Box<dyn FnOnce() -> u32 + Send>> = vec![
        Box::new(|| -> u32 { 7 }),
        Box::new(|| -> u32 { panic!("start function failed") }),
    ];
    let s = Observable::start(fns).subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![7]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn create_runs_setup_with_a_writer() {
    use crate::{observer::Producer, stream::StreamWriter};

    let rec = Recorder::new();
    let observable = Observable::create([|mut o: StreamWriter<&'static str>| {
        o.next("hello");
        o.next("world");
        o.complete();
    }]);
    let s = observable.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec!["hello", "world"]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn subscribe_after_done_is_end_of_iterator() {
    let observable = Observable::just([1]);
    let s = observable.subscribe(Handler::next(|_| {})).unwrap();
    s.join_concurrent().await.unwrap();

    let err = observable.subscribe(Handler::next(|_| {})).unwrap_err();
    assert_eq!(err, SubscribeError::EndOfIterator);
}

#[tokio::test]
async fn done_observable_rejects_every_subscribe_while_dispatcher_runs() {
    let observable = Observable::interval(Duration::from_millis(5));
    let s = observable.subscribe(Handler::next(|_| {})).unwrap();

    // The dispatcher has not run yet and still holds the stream.
    observable.done();
    assert!(observable.is_done());
    for _ in 0..2 {
        let err = observable.subscribe(Handler::next(|_| {})).unwrap_err();
        assert_eq!(err, SubscribeError::EndOfIterator);
    }

    s.join_concurrent().await.unwrap();
}

#[tokio::test]
async fn unsubscribed_observable_is_end_of_iterator() {
    let observable = Observable::<i32>::new();
    let s = observable.subscribe(Handler::next(|_| {})).unwrap();

    observable.unsubscribe();
    let err = observable.subscribe(Handler::next(|_| {})).unwrap_err();
    assert_eq!(err, SubscribeError::EndOfIterator);

    s.join_concurrent().await.unwrap();
}

#[tokio::test]
async fn subscribe_while_dispatching_is_nil_event_stream() {
    let observable = Observable::<i32>::new();
    let s = observable.subscribe(Handler::next(|_| {})).unwrap();

    let err = observable.subscribe(Handler::next(|_| {})).unwrap_err();
    assert_eq!(err, SubscribeError::NilEventStream);

    observable.unsubscribe();
    s.join_concurrent().await.unwrap();
    assert!(
        observable.core.lock_reader().is_some(),
        "dispatcher must hand the stream back on exit"
    );
}

#[test]
fn subscribe_through_dead_ref_is_nil_observable() {
    let weak = {
        let observable = Observable::just([1, 2]);
        observable.downgrade()
    };
    assert!(!weak.is_alive());
    assert!(!weak.is_done());

    let err = weak.subscribe(Handler::next(|_| {})).unwrap_err();
    assert_eq!(err, SubscribeError::NilObservable);
}

#[tokio::test]
async fn done_delivers_queued_values_then_done_once() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let s = observable.subscribe(rec.observer()).unwrap();

    let writer = observable.writer();
    writer.send(Emission::value(1));
    writer.send(Emission::value(2));
    writer.send(Emission::value(3));
    observable.done();
    observable.done();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![1, 2, 3]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn unsubscribe_stops_every_handler() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let s = observable.subscribe(rec.observer()).unwrap();

    observable.writer().send(Emission::value(1));
    observable.downgrade().unsubscribe();
    s.join_concurrent().await.unwrap();

    assert!(rec.nexts().is_empty());
    assert!(rec.errors().is_empty());
    assert_eq!(rec.dones(), 0);
    assert!(observable.is_terminated());
    assert!(!observable.is_done());
}

#[tokio::test]
async fn error_without_value_is_terminal() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let writer = observable.writer();
    writer.send(Emission::value(1));
    writer.send(Emission::<i32>::error(boom()));
    writer.send(Emission::value(2));
    writer.close();

    let s = observable.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![1]);
    assert_eq!(rec.errors(), vec!["boom".to_string()]);
    assert_eq!(rec.dones(), 0);
    assert_eq!(
        observable.subscribe(Handler::next(|_| {})).unwrap_err(),
        SubscribeError::EndOfIterator
    );
}

#[tokio::test]
async fn value_with_error_goes_to_next() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let writer = observable.writer();
    writer.send(Emission::with_error(5, Arc::new(boom())));
    writer.send(Ok::<i32, io::Error>(6));
    writer.close();

    let s = observable.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![5, 6]);
    assert!(rec.errors().is_empty());
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn error_without_handler_ends_dispatch() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let writer = observable.writer();
    writer.send(Err::<i32, io::Error>(boom()));
    writer.send(Emission::value(1));
    writer.close();

    let dones = Arc::clone(&rec.dones);
    let mut observer = Observer::on_next({
        let nexts = Arc::clone(&rec.nexts);
        move |v| nexts.lock().unwrap().push(v)
    });
    observer.on_done(move || *dones.lock().unwrap() += 1);
    assert!(!observer.has_error_handler());

    let s = observable.subscribe(observer).unwrap();
    s.join_concurrent().await.unwrap();

    assert!(rec.nexts().is_empty());
    assert_eq!(rec.dones(), 0);
}

#[tokio::test]
async fn single_handler_variants() {
    let rec = Recorder::<i32>::new();
    let dones = Arc::clone(&rec.dones);
    let s = Observable::just([1, 2])
        .subscribe(Handler::done(move || *dones.lock().unwrap() += 1))
        .unwrap();
    s.join_concurrent().await.unwrap();
    assert_eq!(rec.dones(), 1);

    let errors = Arc::clone(&rec.errors);
    let observable = Observable::<i32>::new();
    observable.writer().send(Emission::<i32>::error(boom()));
    let s = observable
        .subscribe(Handler::error(move |e| errors.lock().unwrap().push(e.to_string())))
        .unwrap();
    s.join_concurrent().await.unwrap();
    assert_eq!(rec.errors(), vec!["boom".to_string()]);
}

#[tokio::test]
async fn add_swaps_in_a_fresh_observable() {
    let mut source = Observable::<i32>::new();
    let source_id = source.id();

    let populated = source.add([Emission::value(1), Emission::value(2)]);
    assert_eq!(populated.id(), source_id);
    assert_ne!(source.id(), source_id);
    assert!(!source.is_terminated());

    populated.complete();
    let rec = Recorder::new();
    let s = populated.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();
    assert_eq!(rec.nexts(), vec![1, 2]);
    assert_eq!(rec.dones(), 1);
}

#[tokio::test]
async fn add_to_terminated_observable_leaves_it_untouched() {
    let mut source = Observable::<i32>::new();
    source.done();
    let source_id = source.id();

    let out = source.add([Emission::value(9)]);
    assert_eq!(source.id(), source_id);
    assert_ne!(out.id(), source_id);

    out.complete();
    let rec = Recorder::new();
    let s = out.subscribe(rec.observer()).unwrap();
    s.join_concurrent().await.unwrap();
    assert_eq!(rec.nexts(), vec![9]);
}

#[tokio::test(flavor = "multi_thread")]
async fn interval_stops_on_unsubscribe() {
    let rec = Recorder::<u64>::new();
    let observable = Observable::interval(Duration::ZERO);
    let weak = observable.downgrade();

    let nexts = Arc::clone(&rec.nexts);
    let mut observer = Observer::on_next(move |v| {
        let mut nexts = nexts.lock().unwrap();
        nexts.push(v);
        if nexts.len() == 3 {
            weak.unsubscribe();
        }
    });
    let dones = Arc::clone(&rec.dones);
    observer.on_done(move || *dones.lock().unwrap() += 1);

    let s = observable.subscribe(observer).unwrap();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![0, 1, 2]);
    assert_eq!(rec.dones(), 0);
    assert!(observable.is_terminated());
}

#[test]
fn join_outside_runtime() {
    let rec = Recorder::new();
    let s = Observable::range(0, 3).subscribe(rec.observer()).unwrap();
    assert!(matches!(s.subscription_future, SubscriptionHandle::JoinThread(_)));
    s.join().unwrap();

    assert_eq!(rec.nexts(), vec![0, 1, 2]);
    assert_eq!(rec.dones(), 1);
}

#[test]
fn configured_runtime_is_used() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ObservableConfig::new()
        .with_name("configured")
        .with_runtime(rt.handle().clone());

    let observable = Observable::<i32>::with_config(config);
    assert_eq!(observable.name(), Some("configured"));
    observable.writer().send(Emission::value(4));
    observable.complete();

    let rec = Recorder::new();
    let s = observable.subscribe(rec.observer()).unwrap();
    assert!(matches!(s.subscription_future, SubscriptionHandle::JoinTask(_)));
    rt.block_on(s.join_concurrent()).unwrap();

    assert_eq!(rec.nexts(), vec![4]);
    assert_eq!(rec.dones(), 1);
}

#[test]
fn observables_have_distinct_ids() {
    let a = Observable::<i32>::new();
    let b = Observable::<i32>::new();
    assert_ne!(a.id(), b.id());
    assert!(format!("{:?}", a).contains("Observable"));
}

#[tokio::test]
async fn error_queued_behind_done_is_dropped() {
    let rec = Recorder::new();
    let observable = Observable::<i32>::new();
    let s = observable.subscribe(rec.observer()).unwrap();

    let writer = observable.writer();
    writer.send(Emission::value(1));
    writer.send(Emission::<i32>::error(boom()));
    writer.send(Emission::value(2));
    observable.done();
    s.join_concurrent().await.unwrap();

    assert_eq!(rec.nexts(), vec![1]);
    assert!(rec.errors().is_empty());
    assert_eq!(rec.dones(), 1);
    assert!(observable.is_done());
}

#[tokio::test]
async fn bound_observer_refers_back_to_its_observable() {
    let observable = Observable::<i32>::new();
    let observer = Core::bind(&observable.core, Handler::next(|_| {}));

    let back = observer.attached_to().unwrap();
    assert!(back.is_alive());
    assert!(!back.is_done());

    let s = back.subscribe(Handler::next(|_| {})).unwrap();
    assert_eq!(
        observable.subscribe(Handler::next(|_| {})).unwrap_err(),
        SubscribeError::NilEventStream
    );

    back.unsubscribe();
    assert!(observable.is_terminated());
    s.join_concurrent().await.unwrap();

    assert!(Observer::<i32>::default().attached_to().is_none());
}
