//! Units of emission consumed by the dispatcher.
//!
//! An [`Emitter`] produces at most one value and/or one error when the
//! dispatcher asks for it. Producers push emitters onto an `Observable`'s event
//! stream and the dispatcher consumes each of them exactly once.

use std::{error::Error, fmt, sync::Arc};

use crate::errors::EmitError;

/// A capability producing one item and/or an error.
///
/// `emit` consumes the emitter, so every emitter is observed at most once.
pub trait Emitter<T>: Send {
    /// Produces the emission.
    fn emit(self: Box<Self>) -> Emission<T>;
}

/// Boxed emitter as stored on the event stream.
pub type BoxedEmitter<T> = Box<dyn Emitter<T>>;

/// The outcome of a single [`Emitter::emit`] call.
///
/// A value, if present, is always delivered to the next handler, even when an
/// error accompanies it. An error without a value is terminal. An emission
/// with neither is skipped.
pub struct Emission<T> {
    pub value: Option<T>,
    pub error: Option<EmitError>,
}

impl<T> Emission<T> {
    /// An emission carrying only a value.
    pub fn value(value: T) -> Self {
        Emission {
            value: Some(value),
            error: None,
        }
    }

    /// An emission carrying only an error. The dispatcher treats it as terminal.
    pub fn error(error: impl Error + Send + Sync + 'static) -> Self {
        Emission {
            value: None,
            error: Some(Arc::new(error)),
        }
    }

    /// An emission carrying a value together with a non-terminal error.
    pub fn with_error(value: T, error: EmitError) -> Self {
        Emission {
            value: Some(value),
            error: Some(error),
        }
    }

    /// An emission carrying nothing.
    pub fn empty() -> Self {
        Emission {
            value: None,
            error: None,
        }
    }

    /// Returns `true` if neither a value nor an error is present.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.error.is_none()
    }

    /// Returns `true` if this emission ends the stream with an error.
    pub fn is_terminal_error(&self) -> bool {
        self.value.is_none() && self.error.is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Emission<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emission")
            .field("value", &self.value)
            .field("error", &self.error.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl<T: Send> Emitter<T> for Emission<T> {
    fn emit(self: Box<Self>) -> Emission<T> {
        *self
    }
}

impl<T, E> Emitter<T> for Result<T, E>
where
    T: Send,
    E: Error + Send + Sync + 'static,
{
    fn emit(self: Box<Self>) -> Emission<T> {
        match *self {
            Ok(v) => Emission::value(v),
            Err(e) => Emission::error(e),
        }
    }
}
