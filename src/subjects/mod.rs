//! The `subjects` module provides the `Subject` type for multicasting values
//! to several subscribers.
//!
//! A `Subject` behaves as an observer, enabling `next()`, `error()` and
//! `complete()` calls through the `Producer` trait. It can also be passed to
//! the `subscribe` method of another `Observable`.
//!
//! At the same time it is a source: each call to `observable()` hands out a
//! new `Observable` fed by the subject, and subscribing to several of them
//! fans the subject's values out.

mod subject;

pub use subject::*;
