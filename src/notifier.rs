//! Terminal signalling for an `Observable`.
//!
//! A [`Notifier`] carries two one-shot signals, *done* (the stream was
//! exhausted normally) and *unsubscribed* (the consumer walked away). Both are
//! backed by one single-assignment latch: whichever terminal state is stored
//! first wins and every later attempt is a no-op.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Lifecycle state stored in a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierState {
    /// No terminal signal fired yet.
    Active,
    /// The stream finished normally.
    Done,
    /// The stream ended with an emission error.
    Errored,
    /// The consumer unsubscribed.
    Unsubscribed,
}

impl NotifierState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => NotifierState::Done,
            2 => NotifierState::Errored,
            3 => NotifierState::Unsubscribed,
            _ => NotifierState::Active,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            NotifierState::Active => 0,
            NotifierState::Done => 1,
            NotifierState::Errored => 2,
            NotifierState::Unsubscribed => 3,
        }
    }
}

#[derive(Debug)]
struct Latch {
    state: AtomicU8,
    fired: CancellationToken,
}

/// Done/unsubscribed signalling primitive. Clones share the same latch.
#[derive(Debug, Clone)]
pub struct Notifier(Arc<Latch>);

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Notifier(Arc::new(Latch {
            state: AtomicU8::new(NotifierState::Active.as_u8()),
            fired: CancellationToken::new(),
        }))
    }

    /// Fires the done signal. Returns `false` if a terminal signal already fired.
    pub fn done(&self) -> bool {
        self.fire(NotifierState::Done)
    }

    /// Fires the unsubscribed signal. Returns `false` if a terminal signal
    /// already fired.
    pub fn unsubscribe(&self) -> bool {
        self.fire(NotifierState::Unsubscribed)
    }

    pub(crate) fn fail(&self) -> bool {
        self.fire(NotifierState::Errored)
    }

    fn fire(&self, to: NotifierState) -> bool {
        let won = self
            .0
            .state
            .compare_exchange(
                NotifierState::Active.as_u8(),
                to.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            trace!(state = ?to, "notifier fired");
            self.0.fired.cancel();
        }
        won
    }

    pub fn state(&self) -> NotifierState {
        NotifierState::from_u8(self.0.state.load(Ordering::Acquire))
    }

    /// Non-blocking poll of the done signal.
    pub fn is_done(&self) -> bool {
        self.state() == NotifierState::Done
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.state() == NotifierState::Unsubscribed
    }

    /// Returns `true` once any terminal signal fired.
    pub fn is_terminated(&self) -> bool {
        self.state() != NotifierState::Active
    }

    /// Resolves as soon as any terminal signal fires and returns which one.
    pub async fn terminated(&self) -> NotifierState {
        self.0.fired.cancelled().await;
        self.state()
    }
}
