#![allow(clippy::needless_doctest_main)]
//! The `observable` module provides the `Observable` type, its source
//! constructors and the dispatcher that delivers emissions to an `Observer`.

mod dispatch;
mod sources;

#[cfg(test)]
mod tests;

pub use sources::MIN_INTERVAL;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};

use tracing::debug;

use crate::{
    config::ObservableConfig,
    emitter::Emitter,
    errors::SubscribeError,
    notifier::Notifier,
    observer::{Handler, Observer},
    runtime,
    stream::{self, StreamReader, StreamWriter},
    subscription::subscribe::Subscription,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// The `Observable` struct represents a stream of emissions that can be
/// subscribed to.
///
/// Every `Observable` owns exactly one event stream and one notifier. Source
/// constructors such as [`range`], [`just`] or [`interval`] spawn a producer
/// that writes into the stream; [`subscribe`] attaches an `Observer` and starts
/// a dispatcher that drains the stream and calls the observer's handlers.
///
/// [`range`]: Observable::range
/// [`just`]: Observable::just
/// [`interval`]: Observable::interval
/// [`subscribe`]: Observable::subscribe
///
/// # Example: basic `Observable`
///
/// ```no_run
/// use rxstream::{Observable, Observer};
///
/// #[tokio::main]
/// async fn main() {
///     let mut observer = Observer::on_next(|v| println!("Emitted {}", v));
///     observer.on_done(|| println!("Completed"));
///
///     let subscription = Observable::range(1, 11).subscribe(observer).unwrap();
///
///     // The dispatcher runs in its own task, wait for it to finish.
///     subscription.join_concurrent().await.unwrap();
/// }
/// ```
///
/// # Example: custom `Observable` with unsubscribe
///
/// ```no_run
/// use std::time::Duration;
///
/// use rxstream::{Handler, Observable, Producer};
///
/// #[tokio::main]
/// async fn main() {
///     let observable = Observable::create([|mut o: rxstream::StreamWriter<u32>| {
///         for i in 0..=10000 {
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///         o.complete();
///     }]);
///
///     let subscription = observable
///         .subscribe(Handler::next(|v| println!("Emitted {}", v)))
///         .unwrap();
///
///     tokio::time::sleep(Duration::from_millis(50)).await;
///
///     // No handler is called once the dispatcher observes the signal.
///     observable.unsubscribe();
///     subscription.join_concurrent().await.unwrap();
/// }
/// ```
pub struct Observable<T> {
    core: Arc<Core<T>>,
}

pub(crate) struct Core<T> {
    id: u64,
    config: ObservableConfig,
    writer: StreamWriter<T>,
    reader: Mutex<Option<StreamReader<T>>>,
    notifier: Notifier,
}

impl<T> Core<T> {
    fn lock_reader(&self) -> MutexGuard<'_, Option<StreamReader<T>>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restore_reader(&self, reader: StreamReader<T>) {
        *self.lock_reader() = Some(reader);
    }
}

impl<T: Send + 'static> Core<T> {
    fn subscribe(
        core: &Arc<Self>,
        handler: Handler<T>,
    ) -> Result<Subscription, SubscribeError> {
        if core.notifier.is_terminated() {
            debug!(observable = core.id, "subscribe rejected, observable already done");
            return Err(SubscribeError::EndOfIterator);
        }

        let reader = {
            let mut slot = core.lock_reader();
            let Some(reader) = slot.take() else {
                debug!(observable = core.id, "subscribe rejected, stream held by a dispatcher");
                return Err(SubscribeError::NilEventStream);
            };
            // The notifier may have fired while the slot was being claimed.
            if core.notifier.is_terminated() {
                *slot = Some(reader);
                debug!(observable = core.id, "subscribe rejected, observable already done");
                return Err(SubscribeError::EndOfIterator);
            }
            reader
        };

        let observer = Core::bind(core, handler);
        debug!(observable = core.id, name = %core.config.label(), ?observer, "subscribed");
        let handle = runtime::spawn(
            &core.config,
            "dispatcher",
            dispatch::run(Arc::clone(core), reader, observer),
        );
        Ok(Subscription::new(core.notifier.clone(), handle))
    }

    /// Resolves `handler` into an observer holding a back-reference to `core`.
    fn bind(core: &Arc<Self>, handler: Handler<T>) -> Observer<T> {
        let mut observer = handler.into_observer();
        observer.attach(ObservableRef {
            core: Arc::downgrade(core),
        });
        observer
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::with_config(ObservableConfig::default())
    }
}

impl<T> Observable<T> {
    /// Creates a new, empty `Observable` with the default configuration.
    ///
    /// Every call allocates a fresh instance with its own stream and notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty `Observable` configured with `config`.
    pub fn with_config(config: ObservableConfig) -> Self {
        let (writer, reader) = stream::channel();
        Observable {
            core: Arc::new(Core {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                config,
                writer,
                reader: Mutex::new(Some(reader)),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Process-unique identifier, used in log events.
    pub fn id(&self) -> u64 {
        self.core.id
    }

    pub fn name(&self) -> Option<&str> {
        self.core.config.name.as_deref()
    }

    pub fn config(&self) -> &ObservableConfig {
        &self.core.config
    }

    /// A writer for pushing emitters into this observable's stream from
    /// outside of the source constructors.
    pub fn writer(&self) -> StreamWriter<T> {
        self.core.writer.clone()
    }

    /// The notifier of this observable. Producers use it to stop emitting
    /// once the stream is terminated.
    pub fn notifier(&self) -> Notifier {
        self.core.notifier.clone()
    }

    /// Closes the stream: no more values will come. Values already sent are
    /// still delivered, then the done handler is called.
    pub fn complete(&self) {
        self.core.writer.close();
    }

    /// Fires the done signal immediately.
    ///
    /// An active dispatcher delivers the values already queued and then calls
    /// the done handler once. Values sent afterwards are not delivered.
    pub fn done(&self) {
        self.core.notifier.done();
    }

    /// Fires the unsubscribed signal. The dispatcher returns without calling
    /// any further handler, producers stop at their next check.
    pub fn unsubscribe(&self) {
        self.core.notifier.unsubscribe();
    }

    pub fn is_done(&self) -> bool {
        self.core.notifier.is_done()
    }

    /// Returns `true` once the observable is done, errored or unsubscribed.
    pub fn is_terminated(&self) -> bool {
        self.core.notifier.is_terminated()
    }

    /// Creates a weak reference to this observable.
    pub fn downgrade(&self) -> ObservableRef<T> {
        ObservableRef {
            core: Arc::downgrade(&self.core),
        }
    }

    /// Appends emitters to this observable and returns the observable that
    /// holds them.
    ///
    /// If this observable can still emit, the items are sent to its stream and
    /// `self` is replaced with a fresh, empty observable with the same
    /// configuration; the returned value is the populated one. If this
    /// observable is already terminated or its stream is closed, a new
    /// observable receives the items and `self` is left untouched.
    ///
    /// Either way the returned observable is the live one.
    ///
    /// ```no_run
    /// use rxstream::{Emission, Observable};
    ///
    /// let mut source = Observable::<i32>::new();
    /// let populated = source.add([Emission::value(1), Emission::value(2)]);
    /// populated.complete();
    ///
    /// // `source` is now a fresh observable with nothing in it.
    /// assert_ne!(source.id(), populated.id());
    /// ```
    #[must_use = "the returned observable holds the added items"]
    pub fn add<E>(&mut self, items: impl IntoIterator<Item = E>) -> Observable<T>
    where
        E: Emitter<T> + 'static,
    {
        if self.is_terminated() || self.core.writer.is_closed() {
            let out = Observable::with_config(self.core.config.clone());
            out.send_all(items);
            return out;
        }
        self.send_all(items);
        let fresh = Observable::with_config(self.core.config.clone());
        std::mem::replace(self, fresh)
    }

    fn send_all<E>(&self, items: impl IntoIterator<Item = E>)
    where
        E: Emitter<T> + 'static,
    {
        for item in items {
            self.core.writer.send(item);
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Subscribes a handler and starts the dispatcher.
    ///
    /// `handler` may be a single callback built with [`Handler::next`],
    /// [`Handler::error`] or [`Handler::done`], or a full [`Observer`]. The
    /// call returns as soon as the dispatcher is started.
    ///
    ///
    /// # Errors
    ///
    /// - [`SubscribeError::EndOfIterator`] if the observable is already done,
    ///   errored or unsubscribed, even while its previous dispatcher is still
    ///   winding down.
    /// - [`SubscribeError::NilEventStream`] if another dispatcher is draining
    ///   this observable.
    pub fn subscribe(&self, handler: impl Into<Handler<T>>) -> Result<Subscription, SubscribeError> {
        Core::subscribe(&self.core, handler.into())
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("id", &self.core.id)
            .field("name", &self.core.config.name)
            .field("state", &self.core.notifier.state())
            .finish()
    }
}

/// Weak reference to an [`Observable`].
///
/// Held by observers as a back-reference to the observable they are attached
/// to. It does not keep the observable alive.
pub struct ObservableRef<T> {
    core: Weak<Core<T>>,
}

impl<T> Clone for ObservableRef<T> {
    fn clone(&self) -> Self {
        ObservableRef {
            core: Weak::clone(&self.core),
        }
    }
}

impl<T> ObservableRef<T> {
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// Returns `false` if the observable is gone.
    pub fn is_done(&self) -> bool {
        self.core.upgrade().map_or(false, |c| c.notifier.is_done())
    }

    pub fn unsubscribe(&self) {
        if let Some(core) = self.core.upgrade() {
            core.notifier.unsubscribe();
        }
    }
}

impl<T: Send + 'static> ObservableRef<T> {
    /// Subscribes to the referenced observable.
    ///
    /// # Errors
    ///
    /// [`SubscribeError::NilObservable`] if the observable no longer exists,
    /// otherwise the same errors as [`Observable::subscribe`].
    pub fn subscribe(&self, handler: impl Into<Handler<T>>) -> Result<Subscription, SubscribeError> {
        let core = self.core.upgrade().ok_or(SubscribeError::NilObservable)?;
        Core::subscribe(&core, handler.into())
    }
}

impl<T> std::fmt::Debug for ObservableRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}
