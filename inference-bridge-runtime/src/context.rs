use std::future::Future;
use std::time::Duration;

use inference_bridge_core::{Error, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::debug::state::DebugStateHandle;

/// Per-call carrier for cancellation, deadline and diagnostics
///
/// Cloning is cheap; clones share the cancellation token and the debug state.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use inference_bridge_runtime::CallContext;
///
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(30));
/// assert!(!ctx.is_cancelled());
/// ctx.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    debug_state: Option<DebugStateHandle>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Ties this call to an externally owned token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn with_debug_state(mut self, state: DebugStateHandle) -> Self {
        self.debug_state = Some(state);
        self
    }

    pub fn debug_state(&self) -> Option<&DebugStateHandle> {
        self.debug_state.as_ref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the token fired or the deadline passed
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fails fast when the call is already cancelled
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(deadline_exceeded());
        }
        Ok(())
    }

    /// Runs `fut` until it completes, the token fires, or the deadline passes
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(cancelled()),
            _ = deadline => Err(deadline_exceeded()),
            out = fut => out,
        }
    }
}

fn cancelled() -> Error {
    Error::Cancelled("context cancelled".to_string())
}

fn deadline_exceeded() -> Error {
    Error::Cancelled("context deadline exceeded".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let ctx = CallContext::new();
        let out = ctx.run(async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let ctx = CallContext::new();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, Error>(())
            })
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(err.to_string(), "Request cancelled: context cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, Error>(())
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deadline exceeded"));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_context_does_not_poll() {
        let ctx = CallContext::new();
        ctx.cancel();
        let mut polled = false;
        let res = ctx
            .run(async {
                polled = true;
                Ok::<_, Error>(())
            })
            .await;
        assert!(res.is_err());
        assert!(!polled);
    }

    #[test]
    fn test_clones_share_debug_state() {
        let ctx = CallContext::new().with_debug_state(DebugStateHandle::new());
        let clone = ctx.clone();
        clone
            .debug_state()
            .unwrap()
            .record_error(Default::default());
        assert!(ctx.debug_state().unwrap().snapshot().error_details.is_some());
    }
}
