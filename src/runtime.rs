//! Spawning of producers and dispatchers.
//!
//! Work runs as a Tokio task on the configured runtime or the runtime of the
//! calling context. Outside of any runtime it runs on a dedicated OS thread
//! driving its own current-thread runtime, so `spawn_blocking` and timers
//! keep working inside the spawned future.

use std::future::Future;

use tokio::runtime::{Builder, Handle};
use tracing::error;

use crate::{config::ObservableConfig, subscription::subscribe::SubscriptionHandle};

pub(crate) fn spawn<F>(config: &ObservableConfig, role: &'static str, fut: F) -> SubscriptionHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = config
        .runtime
        .clone()
        .or_else(|| Handle::try_current().ok());

    if let Some(handle) = handle {
        return SubscriptionHandle::JoinTask(handle.spawn(fut));
    }

    let label = config.label().to_string();
    let spawned = std::thread::Builder::new()
        .name(format!("rxstream-{role}"))
        .spawn(move || match Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt.block_on(fut),
            Err(e) => error!(observable = %label, role, error = %e, "failed to build runtime"),
        });

    match spawned {
        Ok(jh) => SubscriptionHandle::JoinThread(jh),
        Err(e) => {
            error!(observable = %config.label(), role, error = %e, "failed to spawn thread");
            SubscriptionHandle::Nil
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn runs_on_os_thread_without_runtime() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(&ObservableConfig::default(), "test", async move {
            tokio::task::yield_now().await;
            let _ = tx.send(std::thread::current().name().map(str::to_string));
        });

        assert!(matches!(handle, SubscriptionHandle::JoinThread(_)));
        assert_eq!(rx.recv().ok().flatten().as_deref(), Some("rxstream-test"));
    }

    #[tokio::test]
    async fn runs_as_task_inside_runtime() {
        let handle = spawn(&ObservableConfig::default(), "test", async {});
        assert!(matches!(handle, SubscriptionHandle::JoinTask(_)));
    }
}
