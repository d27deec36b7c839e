use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::{
    config::ObservableConfig,
    emitter::Emission,
    errors::{EmitError, SubscribeError},
    notifier::Notifier,
    observable::Observable,
    observer::{Handler, Observer, Producer},
    stream::StreamWriter,
    subscription::subscribe::Subscription,
};

/// A `Subject` is an observer that is also a source of observables, enabling
/// multicasting values to multiple subscribers.
///
/// Every call to [`observable`] returns a fresh `Observable` fed by the
/// subject. Values pushed with `next` are delivered to the subject's own
/// observer (if one was set) and re-emitted to every such observable that is
/// still active.
///
/// If the subject completed or errored, observables taken afterwards replay
/// that terminal notification and emit nothing else.
///
/// [`observable`]: Subject::observable
///
/// # Examples
///
/// Subject completion
///
///```no_run
/// use rxstream::{Handler, Observer, Producer, Subject};
///
/// # #[tokio::main] async fn main() {
/// let mut subject = Subject::new();
///
/// // Registers two subscribers.
/// let s1 = subject.subscribe(Handler::next(|v| println!("Subscriber #1 emitted: {}", v))).unwrap();
/// let s2 = subject.subscribe(Observer::new(
///     |v| println!("Subscriber #2 emitted: {}", v),
///     |e| eprintln!("Error {}", e),
///     || println!("Completed 2"),
/// )).unwrap();
///
/// subject.next(101); // Emits 101 to both subscribers.
/// subject.next(102); // Emits 102 to both subscribers.
/// subject.complete(); // Both subscribers are done once they drain.
///
/// s1.join_concurrent().await.unwrap();
/// s2.join_concurrent().await.unwrap();
///
/// subject.next(103); // Called post-completion, does not emit.
/// # }
///```
///
/// Utilizing a `Subject` as an observer of another `Observable`.
///
///```no_run
/// use rxstream::{Handler, Observable, Subject};
///
/// # #[tokio::main] async fn main() {
/// let subject = Subject::new();
/// let a = subject.subscribe(Handler::next(|v| println!("a: {}", v))).unwrap();
/// let b = subject.subscribe(Handler::next(|v| println!("b: {}", v))).unwrap();
///
/// // The subject completes when the source observable is done.
/// Observable::range(0, 10).subscribe(subject).unwrap();
///
/// a.join_concurrent().await.unwrap();
/// b.join_concurrent().await.unwrap();
/// # }
///```
pub struct Subject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
    // Kept apart from `state` so the observer can query the subject.
    observer: Arc<Mutex<Option<Observer<T>>>>,
    config: ObservableConfig,
}

struct Outlet<T> {
    writer: StreamWriter<T>,
    notifier: Notifier,
}

impl<T> Outlet<T> {
    fn is_active(&self) -> bool {
        !self.notifier.is_terminated() && !self.writer.is_closed()
    }
}

enum Terminal {
    Completed,
    Errored(EmitError),
}

struct SubjectState<T> {
    outlets: Vec<Outlet<T>>,
    terminal: Option<Terminal>,
}

impl<T> Clone for Subject<T> {
    /// Shallow clone: clones only the pointer to the subject.
    fn clone(&self) -> Self {
        Subject {
            state: Arc::clone(&self.state),
            observer: Arc::clone(&self.observer),
            config: self.config.clone(),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::with_config(ObservableConfig::default())
    }
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subject whose observables use `config`.
    pub fn with_config(config: ObservableConfig) -> Self {
        Subject {
            state: Arc::new(Mutex::new(SubjectState {
                outlets: Vec::with_capacity(16),
                terminal: None,
            })),
            observer: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Sets the subject's own observer, which receives every value before it
    /// is re-emitted downstream.
    ///
    /// The observer runs without the subject's state lock held, so it may call
    /// `len` or `is_terminated`. It must not push into the subject itself.
    #[must_use]
    pub fn with_observer(self, observer: Observer<T>) -> Self {
        *self.own_observer() = Some(observer);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SubjectState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn own_observer(&self) -> MutexGuard<'_, Option<Observer<T>>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of downstream observables that are still active.
    pub fn len(&self) -> usize {
        let mut state = self.lock();
        state.outlets.retain(Outlet::is_active);
        state.outlets.len()
    }

    /// Returns `true` if no downstream observable is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the subject completed or errored.
    pub fn is_terminated(&self) -> bool {
        self.lock().terminal.is_some()
    }
}

impl<T: Send + 'static> Subject<T> {
    /// Returns a new `Observable` fed by this subject.
    pub fn observable(&self) -> Observable<T> {
        let observable = Observable::with_config(self.config.clone());
        let mut guard = self.lock();
        let state = &mut *guard;
        match &state.terminal {
            None => state.outlets.push(Outlet {
                writer: observable.writer(),
                notifier: observable.notifier(),
            }),
            Some(Terminal::Completed) => observable.complete(),
            Some(Terminal::Errored(e)) => {
                let writer = observable.writer();
                writer.send(Emission::<T> {
                    value: None,
                    error: Some(Arc::clone(e)),
                });
                writer.close();
            }
        }
        observable
    }

    /// Subscribes a handler to a new observable fed by this subject.
    ///
    /// # Errors
    ///
    /// Fails only if the dispatcher cannot be started, see
    /// [`Observable::subscribe`].
    pub fn subscribe(&self, handler: impl Into<Handler<T>>) -> Result<Subscription, SubscribeError> {
        self.observable().subscribe(handler)
    }
}

impl<T: Clone + Send + 'static> Producer for Subject<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.is_terminated() {
            return;
        }
        if let Some(o) = &mut *self.own_observer() {
            o.emit_next(v.clone());
        }
        let mut state = self.lock();
        if state.terminal.is_some() {
            return;
        }
        state.outlets.retain(Outlet::is_active);
        for outlet in &state.outlets {
            outlet.writer.send(Emission::value(v.clone()));
        }
        trace!(subscribers = state.outlets.len(), "subject multicast");
    }

    fn error(&mut self, e: EmitError) {
        {
            let mut state = self.lock();
            if state.terminal.is_some() {
                return;
            }
            for outlet in state.outlets.drain(..) {
                outlet.writer.send(Emission::<T> {
                    value: None,
                    error: Some(Arc::clone(&e)),
                });
                outlet.writer.close();
            }
            state.terminal = Some(Terminal::Errored(Arc::clone(&e)));
        }
        if let Some(o) = &mut *self.own_observer() {
            o.emit_error(e);
        }
    }

    fn complete(&mut self) {
        {
            let mut state = self.lock();
            if state.terminal.is_some() {
                return;
            }
            for outlet in state.outlets.drain(..) {
                outlet.writer.close();
            }
            state.terminal = Some(Terminal::Completed);
        }
        if let Some(o) = &mut *self.own_observer() {
            o.emit_done();
        }
    }
}

impl<T: Clone + Send + 'static> From<Subject<T>> for Handler<T> {
    /// Turns the subject into an observer of another observable: its `next`,
    /// `error` and `done` drive the subject's `next`, `error` and `complete`.
    fn from(subject: Subject<T>) -> Self {
        let mut next_s = subject.clone();
        let mut error_s = subject.clone();
        let mut done_s = subject;
        Handler::Observer(Observer::new(
            move |v| next_s.next(v),
            move |e| error_s.error(e),
            move || done_s.complete(),
        ))
    }
}
