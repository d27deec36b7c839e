//! Observers, the handlers they are built from, and the producer-facing API.

use std::fmt;

use crate::{errors::EmitError, observable::ObservableRef};

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(EmitError) + Send>;
type DoneFn = Box<dyn FnMut() + Send>;

/// The producer-facing side of a stream: anything values can be pushed into.
///
/// Implemented by `StreamWriter`, handed to `Observable::create` setup
/// functions, and by `Subject`.
pub trait Producer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn error(&mut self, _: EmitError);
    fn complete(&mut self);
}

/// A bundle of optional `next`, `error` and `done` callbacks.
///
/// Every callback is optional. A missing error handler does not make errors
/// disappear silently, the dispatcher logs them instead.
///
/// Once subscribed, the observer keeps a weak back-reference to the
/// `Observable` it is attached to.
pub struct Observer<T> {
    next_fn: Option<NextFn<T>>,
    error_fn: Option<ErrorFn>,
    done_fn: Option<DoneFn>,
    observable: Option<ObservableRef<T>>,
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Observer {
            next_fn: None,
            error_fn: None,
            done_fn: None,
            observable: None,
        }
    }
}

impl<T> Observer<T> {
    /// Creates a new `Observer` with all three handlers.
    pub fn new(
        next_fn: impl FnMut(T) + Send + 'static,
        error_fn: impl FnMut(EmitError) + Send + 'static,
        done_fn: impl FnMut() + Send + 'static,
    ) -> Self {
        Observer {
            next_fn: Some(Box::new(next_fn)),
            error_fn: Some(Box::new(error_fn)),
            done_fn: Some(Box::new(done_fn)),
            observable: None,
        }
    }

    /// Create a new `Observer` with only the provided `next` function.
    pub fn on_next(next_fn: impl FnMut(T) + Send + 'static) -> Self {
        Observer {
            next_fn: Some(Box::new(next_fn)),
            ..Observer::default()
        }
    }

    /// Set the error-handling function.
    ///
    /// Called at most once, when an emission carries an error without a value.
    pub fn on_error(&mut self, error_fn: impl FnMut(EmitError) + Send + 'static) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Set the function called once the stream is done.
    pub fn on_done(&mut self, done_fn: impl FnMut() + Send + 'static) {
        self.done_fn = Some(Box::new(done_fn));
    }

    pub fn has_error_handler(&self) -> bool {
        self.error_fn.is_some()
    }

    /// The `Observable` this observer is subscribed to, if any.
    pub fn attached_to(&self) -> Option<&ObservableRef<T>> {
        self.observable.as_ref()
    }

    pub(crate) fn attach(&mut self, observable: ObservableRef<T>) {
        self.observable = Some(observable);
    }

    pub(crate) fn emit_next(&mut self, v: T) {
        if let Some(nfn) = &mut self.next_fn {
            (nfn)(v);
        }
    }

    /// Returns `false` if there is no error handler.
    pub(crate) fn emit_error(&mut self, e: EmitError) -> bool {
        match &mut self.error_fn {
            Some(efn) => {
                (efn)(e);
                true
            }
            None => false,
        }
    }

    pub(crate) fn emit_done(&mut self) {
        if let Some(dfn) = &mut self.done_fn {
            (dfn)();
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("next", &self.next_fn.is_some())
            .field("error", &self.error_fn.is_some())
            .field("done", &self.done_fn.is_some())
            .field("attached", &self.observable.is_some())
            .finish()
    }
}

/// What `subscribe` accepts: a single callback or a full [`Observer`].
///
/// The variant is resolved into an `Observer` once, at subscribe time.
pub enum Handler<T> {
    Next(NextFn<T>),
    Error(ErrorFn),
    Done(DoneFn),
    Observer(Observer<T>),
}

impl<T> Handler<T> {
    pub fn next(f: impl FnMut(T) + Send + 'static) -> Self {
        Handler::Next(Box::new(f))
    }

    pub fn error(f: impl FnMut(EmitError) + Send + 'static) -> Self {
        Handler::Error(Box::new(f))
    }

    pub fn done(f: impl FnMut() + Send + 'static) -> Self {
        Handler::Done(Box::new(f))
    }

    pub(crate) fn into_observer(self) -> Observer<T> {
        match self {
            Handler::Next(f) => Observer {
                next_fn: Some(f),
                ..Observer::default()
            },
            Handler::Error(f) => Observer {
                error_fn: Some(f),
                ..Observer::default()
            },
            Handler::Done(f) => Observer {
                done_fn: Some(f),
                ..Observer::default()
            },
            Handler::Observer(o) => o,
        }
    }
}

impl<T> From<Observer<T>> for Handler<T> {
    fn from(o: Observer<T>) -> Self {
        Handler::Observer(o)
    }
}
