//! Source constructors.
//!
//! Each constructor builds a fresh `Observable` and spawns one producer that
//! writes into its stream. Producers check the notifier between emissions and
//! stop as soon as the observable is terminated or its stream is gone.

use std::{future::Future, time::Duration};

use tokio::{
    task::JoinSet,
    time::{self, MissedTickBehavior},
};
use tracing::{trace, warn};

use super::Observable;
use crate::{
    config::ObservableConfig, emitter::Emission, notifier::Notifier, runtime,
    stream::StreamWriter,
};

/// Shortest period accepted by [`Observable::interval`].
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

// Number of values a synchronous loop emits before yielding to the runtime.
const YIELD_EVERY: i64 = 256;

impl<T: Send + 'static> Observable<T> {
    fn produce<F, Fut>(config: ObservableConfig, role: &'static str, producer: F) -> Self
    where
        F: FnOnce(StreamWriter<T>, Notifier) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let observable = Observable::with_config(config);
        let fut = producer(observable.writer(), observable.notifier());
        // Detached: the producer ends on its own or through the notifier.
        let _ = runtime::spawn(&observable.core.config, role, fut);
        observable
    }

    /// Creates an `Observable` driven by user code.
    ///
    /// Each setup function runs concurrently on the blocking pool and gets its
    /// own [`StreamWriter`] for emitting. The call returns immediately without
    /// waiting for the setup functions. The stream ends when one of them calls
    /// `complete` or `error` on its writer.
    ///
    /// ```no_run
    /// use rxstream::{Handler, Observable, Producer, StreamWriter};
    ///
    /// # #[tokio::main] async fn main() {
    /// let observable = Observable::create([|mut o: StreamWriter<&'static str>| {
    ///     o.next("hello");
    ///     o.next("world");
    ///     o.complete();
    /// }]);
    ///
    /// let s = observable.subscribe(Handler::next(|v| println!("{}", v))).unwrap();
    /// s.join_concurrent().await.unwrap();
    /// # }
    /// ```
    pub fn create<F>(setups: impl IntoIterator<Item = F>) -> Self
    where
        F: FnOnce(StreamWriter<T>) + Send + 'static,
    {
        Self::create_with_config(ObservableConfig::default(), setups)
    }

    /// Same as [`create`](Self::create) with an explicit configuration.
    pub fn create_with_config<F>(
        config: ObservableConfig,
        setups: impl IntoIterator<Item = F>,
    ) -> Self
    where
        F: FnOnce(StreamWriter<T>) + Send + 'static,
    {
        let setups: Vec<F> = setups.into_iter().collect();
        Self::produce(config, "create", move |writer, _| async move {
            let mut set = JoinSet::new();
            for setup in setups {
                let writer = writer.clone();
                set.spawn_blocking(move || setup(writer));
            }
            while let Some(res) = set.join_next().await {
                if let Err(e) = res {
                    warn!(error = %e, "setup function panicked");
                }
            }
        })
    }

    /// Creates an `Observable` that emits nothing and is done as soon as it is
    /// subscribed.
    pub fn empty() -> Self {
        let observable = Observable::new();
        observable.complete();
        observable
    }

    /// Creates an `Observable` emitting `items` as-is, in order, then done.
    ///
    /// The items are already in memory, so they are queued right away and no
    /// producer is spawned.
    pub fn just(items: impl IntoIterator<Item = T>) -> Self {
        let observable = Observable::new();
        for item in items {
            observable.core.writer.send(Emission::value(item));
        }
        observable.complete();
        observable
    }

    /// Creates an `Observable` that drains an iterator, emitting each element
    /// in order, then done.
    ///
    /// The iterator runs on the blocking pool, so it may block between items.
    /// Iteration stops early once the observable is terminated.
    pub fn from_iterator<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let iter = iter.into_iter();
        Self::produce(ObservableConfig::default(), "from_iterator", move |writer, notifier| {
            async move {
                let w = writer.clone();
                let res = tokio::task::spawn_blocking(move || {
                    for v in iter {
                        if notifier.is_terminated() || !w.send(Emission::value(v)) {
                            trace!("iterator producer stopped early");
                            return;
                        }
                    }
                })
                .await;
                if let Err(e) = res {
                    warn!(error = %e, "iterator panicked");
                }
                writer.close();
            }
        })
    }

    /// Creates an `Observable` from functions run concurrently.
    ///
    /// Each function runs on the blocking pool and its return value is emitted
    /// as soon as it returns, so values arrive in completion order rather than
    /// in the order the functions were given. The observable is done once all
    /// of them have returned. A panicking function emits nothing.
    pub fn start<F>(fns: impl IntoIterator<Item = F>) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let fns: Vec<F> = fns.into_iter().collect();
        Self::produce(ObservableConfig::default(), "start", move |writer, notifier| {
            async move {
                let mut set = JoinSet::new();
                for f in fns {
                    let writer = writer.clone();
                    let notifier = notifier.clone();
                    set.spawn_blocking(move || {
                        let v = f();
                        if !notifier.is_terminated() {
                            writer.send(Emission::value(v));
                        }
                    });
                }
                while let Some(res) = set.join_next().await {
                    if let Err(e) = res {
                        warn!(error = %e, "start function panicked");
                    }
                }
                writer.close();
            }
        })
    }
}

impl Observable<i64> {
    /// Creates an `Observable` emitting `start..end` in order, then done.
    ///
    /// Emits nothing when `start >= end`.
    pub fn range(start: i64, end: i64) -> Self {
        Self::produce(ObservableConfig::default(), "range", move |writer, notifier| {
            async move {
                for i in start..end {
                    if notifier.is_terminated() || !writer.send(Emission::value(i)) {
                        trace!(at = i, "range producer stopped early");
                        return;
                    }
                    if i.wrapping_sub(start) % YIELD_EVERY == YIELD_EVERY - 1 {
                        tokio::task::yield_now().await;
                    }
                }
                writer.close();
            }
        })
    }
}

impl Observable<u64> {
    /// Creates an `Observable` emitting `0, 1, 2, ...`, the first value right
    /// away and then one per `period`.
    ///
    /// The observable never completes on its own. Its producer stops once the
    /// observable is unsubscribed, done or dropped. Periods shorter than
    /// [`MIN_INTERVAL`] are raised to it.
    pub fn interval(period: Duration) -> Self {
        let period = period.max(MIN_INTERVAL);
        Self::produce(ObservableConfig::default(), "interval", move |writer, notifier| {
            async move {
                let mut ticker = time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut i: u64 = 0;
                loop {
                    tokio::select! {
                        biased;
                        _ = notifier.terminated() => break,
                        _ = ticker.tick() => {
                            if !writer.send(Emission::value(i)) {
                                break;
                            }
                            i = i.wrapping_add(1);
                        }
                    }
                }
                trace!(emitted = i, "interval producer stopped");
            }
        })
    }
}
