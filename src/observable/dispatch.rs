//! The dispatcher: drains an observable's stream into its observer.

use std::sync::Arc;

use tracing::{debug, debug_span, trace, warn, Instrument};

use super::Core;
use crate::{
    emitter::{BoxedEmitter, Emission},
    notifier::{Notifier, NotifierState},
    observer::Observer,
    stream::StreamReader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Done,
    Errored,
    Unsubscribed,
}

enum Flow {
    Continue,
    Errored,
    Unsubscribed,
    // Done won the latch over an error, nothing after it is delivered.
    Halted,
}

pub(super) async fn run<T: Send + 'static>(
    core: Arc<Core<T>>,
    reader: StreamReader<T>,
    observer: Observer<T>,
) {
    let span = debug_span!("dispatch", observable = core.id, name = %core.config.label());
    drain(core, reader, observer).instrument(span).await;
}

async fn drain<T: Send + 'static>(
    core: Arc<Core<T>>,
    mut reader: StreamReader<T>,
    mut observer: Observer<T>,
) {
    let notifier = core.notifier.clone();
    let mut drain_queued = true;

    // Termination is polled first so that nothing is delivered once it fired.
    let mut exit = loop {
        tokio::select! {
            biased;
            state = notifier.terminated() => break exit_for(state),
            next = reader.receive() => match next {
                Some(emitter) => match deliver(&core, &notifier, &mut observer, emitter) {
                    Flow::Continue => {}
                    Flow::Errored => break Exit::Errored,
                    Flow::Unsubscribed => break Exit::Unsubscribed,
                    Flow::Halted => {
                        drain_queued = false;
                        break Exit::Done;
                    }
                },
                None => {
                    trace!("stream exhausted");
                    notifier.done();
                    break exit_for(notifier.state());
                }
            },
        }
    };

    if exit == Exit::Done && drain_queued {
        // Done may have been fired from outside while values were queued.
        while let Some(emitter) = reader.try_receive() {
            match deliver(&core, &notifier, &mut observer, emitter) {
                Flow::Continue => {}
                Flow::Errored => {
                    exit = Exit::Errored;
                    break;
                }
                Flow::Unsubscribed => {
                    exit = Exit::Unsubscribed;
                    break;
                }
                Flow::Halted => break,
            }
        }
    }

    core.restore_reader(reader);
    debug!(exit = ?exit, "dispatcher finished");

    if exit == Exit::Done {
        observer.emit_done();
    }
}

fn exit_for(state: NotifierState) -> Exit {
    match state {
        NotifierState::Done | NotifierState::Active => Exit::Done,
        NotifierState::Errored => Exit::Errored,
        NotifierState::Unsubscribed => Exit::Unsubscribed,
    }
}

fn deliver<T>(
    core: &Core<T>,
    notifier: &Notifier,
    observer: &mut Observer<T>,
    emitter: BoxedEmitter<T>,
) -> Flow {
    if notifier.is_unsubscribed() {
        return Flow::Unsubscribed;
    }
    let Emission { value, error } = emitter.emit();
    if notifier.is_unsubscribed() {
        return Flow::Unsubscribed;
    }

    match (value, error) {
        (Some(v), _) => {
            trace!("next");
            observer.emit_next(v);
            Flow::Continue
        }
        (None, Some(e)) => {
            if !notifier.fail() {
                // An error queued behind an external done is dropped, the
                // observer still gets its single done call.
                return match notifier.state() {
                    NotifierState::Unsubscribed => Flow::Unsubscribed,
                    _ => {
                        trace!(error = %e, "error after done ignored");
                        Flow::Halted
                    }
                };
            }
            trace!(error = %e, "error");
            if !observer.emit_error(Arc::clone(&e)) && core.config.warn_unhandled_errors {
                warn!(error = %e, "observable emitted an error but the observer has no error handler");
            }
            Flow::Errored
        }
        (None, None) => Flow::Continue,
    }
}
