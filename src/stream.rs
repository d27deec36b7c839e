//! The event stream: an unbounded FIFO conduit of emitters.
//!
//! Producers hold [`StreamWriter`]s, the dispatcher holds the single
//! [`StreamReader`]. Closing the stream appends an end-of-stream marker, so
//! everything sent before the close is still delivered.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{trace, warn};

use crate::{
    emitter::{BoxedEmitter, Emission, Emitter},
    errors::EmitError,
    observer::Producer,
};

enum Signal<T> {
    Emit(BoxedEmitter<T>),
    Close,
}

/// Creates a new event stream.
pub fn channel<T>() -> (StreamWriter<T>, StreamReader<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let closed = Arc::new(RwLock::new(false));
    (
        StreamWriter {
            tx,
            closed: Arc::clone(&closed),
        },
        StreamReader {
            rx,
            exhausted: false,
        },
    )
}

/// Sending half of an event stream. Cheap to clone.
pub struct StreamWriter<T> {
    tx: mpsc::UnboundedSender<Signal<T>>,
    // Sends hold the read side, `close` the write side, so an accepted send
    // is always queued ahead of the end-of-stream marker.
    closed: Arc<RwLock<bool>>,
}

impl<T> Clone for StreamWriter<T> {
    fn clone(&self) -> Self {
        StreamWriter {
            tx: self.tx.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> StreamWriter<T> {
    /// Appends an emitter to the stream. Never blocks.
    ///
    /// Returns `false` if the stream is closed or its reader is gone; the
    /// emitter is dropped in that case.
    pub fn send(&self, emitter: impl Emitter<T> + 'static) -> bool {
        self.send_boxed(Box::new(emitter))
    }

    pub(crate) fn send_boxed(&self, emitter: BoxedEmitter<T>) -> bool {
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            warn!("send on a closed event stream, emission dropped");
            return false;
        }
        self.tx.send(Signal::Emit(emitter)).is_ok()
    }

    /// Marks the end of the stream. Idempotent.
    ///
    /// Waits for sends already in progress, so everything accepted before the
    /// close is delivered.
    pub fn close(&self) {
        let mut closed = self.closed.write().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return;
        }
        *closed = true;
        trace!("event stream closed");
        let _ = self.tx.send(Signal::Close);
    }

    /// Returns `true` once [`close`](Self::close) was called or the reader is gone.
    pub fn is_closed(&self) -> bool {
        *self.closed.read().unwrap_or_else(PoisonError::into_inner) || self.tx.is_closed()
    }
}

impl<T: Send + 'static> Producer for StreamWriter<T> {
    type NextFnType = T;

    fn next(&mut self, value: T) {
        self.send(Emission::value(value));
    }

    fn error(&mut self, error: EmitError) {
        self.send(Emission {
            value: None,
            error: Some(error),
        });
        self.close();
    }

    fn complete(&mut self) {
        self.close();
    }
}

/// Receiving half of an event stream.
pub struct StreamReader<T> {
    rx: mpsc::UnboundedReceiver<Signal<T>>,
    exhausted: bool,
}

impl<T> StreamReader<T> {
    /// Waits for the next emitter. Returns `None` once the stream is exhausted,
    /// and keeps returning `None` afterwards.
    pub async fn receive(&mut self) -> Option<BoxedEmitter<T>> {
        if self.exhausted {
            return None;
        }
        match self.rx.recv().await {
            Some(Signal::Emit(e)) => Some(e),
            Some(Signal::Close) | None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Takes the next emitter if one is already queued.
    pub fn try_receive(&mut self) -> Option<BoxedEmitter<T>> {
        if self.exhausted {
            return None;
        }
        match self.rx.try_recv() {
            Ok(Signal::Emit(e)) => Some(e),
            Ok(Signal::Close) | Err(TryRecvError::Disconnected) => {
                self.exhausted = true;
                None
            }
            Err(TryRecvError::Empty) => None,
        }
    }

    /// Returns `true` once the end-of-stream marker was read.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
