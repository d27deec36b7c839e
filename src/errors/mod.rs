//! Error types returned by subscription management.

mod observable_errors;

pub use observable_errors::*;
