//! Cooperative cancellation of in-flight fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::task::AtomicWaker;

/// A handle through which a fetch can be told to stop.
///
/// Clones share the same state: cancelling any of them cancels all of them.
/// A fetch holding the token wakes up on cancellation and drops its request.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

static_assertions::assert_impl_all!(CancelToken: Send, Sync);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes the task waiting on it, if any.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the token is cancelled, registering the current task
    /// to be woken when that happens.
    pub fn poll_cancelled(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_cancelled() {
            return Poll::Ready(());
        }
        self.inner.waker.register(cx.waker());
        // `cancel` may have run between the check and the registration.
        if self.is_cancelled() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::future::poll_fn;
    use futures::task::noop_waker;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        // Cancelling twice is harmless.
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn poll_cancelled() {
        let token = CancelToken::new();
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(token.poll_cancelled(&mut cx).is_pending());
        token.cancel();
        assert!(token.poll_cancelled(&mut cx).is_ready());
    }

    #[tokio::test]
    async fn wakes_waiting_task() {
        let token = CancelToken::new();
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { poll_fn(|cx| token.poll_cancelled(cx)).await }
        });
        tokio::task::yield_now().await;
        token.cancel();
        waiter.await.unwrap();
    }
}
