use std::{error::Error, sync::Arc};

use thiserror::Error;

/// Error payload carried by an emission and delivered to the error handler.
///
/// Errors are wrapped in an `Arc` so they can be handed to several observers,
/// for example when a `Subject` multicasts an error notification.
pub type EmitError = Arc<dyn Error + Send + Sync>;

/// Errors returned synchronously from `subscribe`.
///
/// None of these start a dispatcher. Emission errors are never reported here,
/// they reach the error handler of the attached `Observer` instead.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    /// The `Observable` behind a weak reference no longer exists.
    #[error("observable is nil")]
    NilObservable,

    /// The receiving end of the event stream is not available, it is held by
    /// a dispatcher that is still running.
    #[error("observable event stream is nil")]
    NilEventStream,

    /// The `Observable` already reached a terminal state (done, errored or
    /// unsubscribed) and has nothing left to emit.
    #[error("end of iterator: observable is already done")]
    EndOfIterator,
}

impl SubscribeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::NilObservable => "nil_observable",
            SubscribeError::NilEventStream => "nil_event_stream",
            SubscribeError::EndOfIterator => "end_of_iterator",
        }
    }
}

/// Errors returned when awaiting the dispatcher behind a `Subscription`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JoinError {
    /// The Tokio task running the dispatcher panicked or was aborted.
    #[error("dispatcher task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The OS thread running the dispatcher panicked.
    #[error("dispatcher thread panicked: {0}")]
    Thread(String),

    /// A blocking `join` was requested for a dispatcher running as a Tokio
    /// task. Use `join_concurrent().await` instead.
    #[error("dispatcher runs as a Tokio task, use `join_concurrent().await`")]
    TokioTask,
}

impl JoinError {
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        JoinError::Thread(message)
    }
}
