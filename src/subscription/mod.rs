//! Provides structures and traits related to subscription management.
//!
//! This module includes the `Subscription` handle returned from `subscribe`,
//! the `SubscriptionHandle` used to await the dispatcher behind it, and the
//! `Unsubscribeable` trait for cancelling.
pub mod subscribe;
