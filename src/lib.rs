//! # rxstream
//!
//! Push-based reactive event streams for Rust.
//!
//! A producer pushes emitters onto an `Observable`'s event stream; a
//! subscribed `Observer` receives them asynchronously through three handlers,
//! `next`, `error` and `done`, until the stream is exhausted, errors, or the
//! consumer unsubscribes.
//!
//! ```text
//!  producer task ──► EventStream ──► dispatcher ──► Observer { next, error, done }
//!        │                               ▲
//!        └───────────► Notifier ─────────┘
//!                 (done | unsubscribed)
//! ```
//!
//! - Source constructors ([`Observable::range`], [`Observable::just`],
//!   [`Observable::interval`], [`Observable::start`], ...) spawn a producer
//!   that writes into the stream and closes it when finished.
//! - [`Observable::subscribe`] validates the observable, starts a dispatcher
//!   and returns a [`Subscription`] right away.
//! - The dispatcher delivers each value to `next`. An error without a value is
//!   terminal and goes to `error`. Exhausting the stream fires the done signal
//!   and calls `done` exactly once. After an unsubscribe no handler is called.
//! - A [`Subject`] multicasts: it can observe another observable and feed any
//!   number of downstream observables.
//!
//! Producers and dispatchers run as Tokio tasks. Outside of a Tokio runtime
//! they run on dedicated OS threads, and [`Subscription::join`] waits for them.
//!
//! # Example
//!
//! ```no_run
//! use rxstream::{Observable, Observer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let observer = Observer::new(
//!         |v| println!("Emitted {}", v),
//!         |e| eprintln!("Error {}", e),
//!         || println!("Completed"),
//!     );
//!
//!     let subscription = Observable::just([1, 2, 3]).subscribe(observer).unwrap();
//!     subscription.join_concurrent().await.unwrap();
//! }
//! ```

pub mod config;
pub mod emitter;
mod errors;
pub mod notifier;
pub mod observable;
pub mod observer;
mod runtime;
pub mod stream;
pub mod subjects;
pub mod subscription;

pub use config::ObservableConfig;
pub use emitter::{BoxedEmitter, Emission, Emitter};
pub use errors::*;
pub use notifier::{Notifier, NotifierState};
pub use observable::{Observable, ObservableRef};
pub use observer::{Handler, Observer, Producer};
pub use stream::{StreamReader, StreamWriter};
pub use subjects::Subject;
pub use subscription::subscribe::{self, Subscription, SubscriptionHandle, Unsubscribeable};
