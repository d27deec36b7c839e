//! # Observable configuration.
//!
//! [`ObservableConfig`] is applied once, when an `Observable` is built. Every
//! constructor allocates a fresh instance, so configuring one observable never
//! leaks into another.
//!
//! # Example
//! ```
//! use rxstream::ObservableConfig;
//!
//! let config = ObservableConfig::new()
//!     .with_name("ticks")
//!     .configure(|c| c.warn_unhandled_errors = false);
//!
//! assert_eq!(config.name.as_deref(), Some("ticks"));
//! assert!(!config.warn_unhandled_errors);
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;

/// Options for an `Observable`.
#[derive(Clone, Debug)]
pub struct ObservableConfig {
    /// Label attached to log events of this observable.
    pub name: Option<Arc<str>>,
    /// Runtime used for producers and the dispatcher. When `None`, the runtime
    /// of the calling context is used, or a dedicated OS thread when there is
    /// none.
    pub runtime: Option<Handle>,
    /// Log a warning when an emission error reaches an observer without an
    /// error handler.
    pub warn_unhandled_errors: bool,
}

impl Default for ObservableConfig {
    /// Provides a default configuration:
    /// - `name = None`
    /// - `runtime = None` (ambient runtime)
    /// - `warn_unhandled_errors = true`
    fn default() -> Self {
        Self {
            name: None,
            runtime: None,
            warn_unhandled_errors: true,
        }
    }
}

impl ObservableConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Applies a configuration function and returns the result.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("observable")
    }
}
