//! Detached task spawning.
//!
//! Native hosts run on Tokio, browsers on the page's event loop. Callers
//! spawn through [`spawn_detached`] and never see the difference.

use bridge_traits::platform::PlatformSend;
use std::future::Future;

/// Runs `future` to completion in the background without keeping a handle.
///
/// On native targets this must be called from within a Tokio runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + PlatformSend + 'static,
{
    tokio::spawn(future);
}

/// Runs `future` to completion on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + PlatformSend + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_spawn_detached_runs_future() {
        let (tx, rx) = oneshot::channel();
        spawn_detached(async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
    }
}
