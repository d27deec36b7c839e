use std::{thread::JoinHandle as ThreadJoinHandle, time::SystemTime};

use tokio::task::JoinHandle;

use crate::{errors::JoinError, notifier::Notifier};

/// A trait for types that can be unsubscribed, signalling the `Observable`
/// to stop delivering values.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription.
    ///
    /// Cancellation is cooperative: the dispatcher observes the signal at its
    /// next check and makes no further handler call from then on. The done
    /// handler is never invoked after a successful unsubscribe.
    ///
    /// The instance this method is called on is consumed, making it unusable
    /// after the `unsubscribe` operation.
    fn unsubscribe(self);
}

/// Enumeration representing different types of handles used to await the
/// dispatcher of a subscription.
#[derive(Debug)]
pub enum SubscriptionHandle {
    /// No specific handle for task or thread awaiting.
    Nil,

    /// Holds a join handle for a dispatcher running as a Tokio task.
    JoinTask(JoinHandle<()>),

    /// Holds a join handle for a dispatcher running on an OS thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Handle returned from `subscribe`.
///
/// Records when the subscription was made and allows the caller to
/// unsubscribe later or to await the dispatcher.
#[derive(Debug)]
pub struct Subscription {
    subscribed_at: SystemTime,
    notifier: Notifier,
    pub(crate) subscription_future: SubscriptionHandle,
}

impl Subscription {
    pub(crate) fn new(notifier: Notifier, subscription_future: SubscriptionHandle) -> Self {
        Subscription {
            subscribed_at: SystemTime::now(),
            notifier,
            subscription_future,
        }
    }

    /// Time at which the subscription was made.
    #[must_use]
    pub fn subscribed_at(&self) -> SystemTime {
        self.subscribed_at
    }

    /// Returns `true` once the observed stream reached any terminal state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.notifier.is_terminated()
    }

    /// Awaits the dispatcher of this subscription.
    ///
    /// Works for dispatchers running as Tokio tasks as well as on OS threads,
    /// the latter are joined on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher task or thread panicked.
    pub async fn join_concurrent(self) -> Result<(), JoinError> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => Ok(task_handle.await?),
            SubscriptionHandle::JoinThread(thread_handle) => {
                match tokio::task::spawn_blocking(move || thread_handle.join()).await? {
                    Ok(()) => Ok(()),
                    Err(payload) => Err(JoinError::from_panic(payload)),
                }
            }
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Blocks until the dispatcher thread of this subscription finishes.
    ///
    /// This is the way to await a subscription made outside of a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher thread panicked, or
    /// [`JoinError::TokioTask`] if the dispatcher runs as a Tokio task, use
    /// `join_concurrent().await` for those.
    pub fn join(self) -> Result<(), JoinError> {
        match self.subscription_future {
            SubscriptionHandle::JoinThread(thread_handle) => {
                thread_handle.join().map_err(JoinError::from_panic)
            }
            SubscriptionHandle::Nil => Ok(()),
            SubscriptionHandle::JoinTask(_) => Err(JoinError::TokioTask),
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.notifier.unsubscribe();
    }
}
