//! Per-domain re-entrant refresh guard (spec §4.6): a concurrent call on
//! the same domain awaits the in-flight one instead of racing it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

/// One lock per domain, created lazily. Holding `domain_locks` itself is
/// always short — the actual refresh work happens under the per-domain
/// `AsyncMutex`, not under this one.
#[derive(Default)]
pub struct RefreshGuard {
    domain_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, domain: &str) -> Arc<AsyncMutex<()>> {
        self.domain_locks.lock().entry(domain.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Runs `f` with exclusive access for `domain`; a second caller for the
    /// same domain waits for the first to finish rather than duplicating
    /// the refresh.
    pub async fn run<F, Fut, T>(&self, domain: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let lock = self.lock_for(domain);
        let _permit = lock.lock().await;
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn concurrent_calls_for_same_domain_do_not_overlap() {
        let guard = Arc::new(RefreshGuard::new());
        let counter = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let guard = guard.clone();
            let counter = counter.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .run("example.com", || async {
                        let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(current, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        counter.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
