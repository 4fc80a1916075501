//! The bounded attempt loop around the transport.

use crate::error::TransportError;
use crate::invoke::transport::{FunctionTransport, InvokeOutput, InvokeRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

/// Runs invocation attempts with a fixed inter-attempt delay.
///
/// Every transport error is retryable; the delay runs only between
/// attempts, never before the first or after the last. The loop blocks
/// its own task for up to `(attempts - 1) * delay` plus transport
/// latency. Cancellation is cooperative: dropping the future stops the
/// loop at its next await point, in practice the inter-attempt sleep; an
/// in-flight transport call is not interrupted.
pub struct Invoker {
    transport: Arc<dyn FunctionTransport>,
    max_attempts: u32,
    retry_delay: Duration,
}

/// Outcome of the attempt loop.
#[derive(Debug, Clone)]
pub enum AttemptResult {
    /// The transport produced a response on the `attempts`-th try.
    Completed {
        /// Raw transport output.
        output: InvokeOutput,
        /// Attempts performed, counting the successful one.
        attempts: u32,
    },
    /// Every attempt failed; `last_error` is the final transport error.
    Exhausted {
        /// The error from the last attempt.
        last_error: TransportError,
        /// Total attempts performed.
        attempts: u32,
    },
}

impl Invoker {
    /// Attempt ceiling applied to every invocation.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Create an invoker with the default attempt ceiling.
    pub fn new(transport: Arc<dyn FunctionTransport>, retry_delay: Duration) -> Self {
        Self {
            transport,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            retry_delay,
        }
    }

    /// Override the attempt ceiling; a minimum of one attempt always runs.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The configured inter-attempt delay.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Run the attempt loop until success or exhaustion.
    pub async fn run(&self, request: &InvokeRequest) -> AttemptResult {
        let mut last_error: Option<TransportError> = None;

        for attempt in 1..=self.max_attempts {
            debug!(
                "Attempt {} of {} for function '{}'",
                attempt, self.max_attempts, request.function_name
            );
            match self.transport.invoke(request).await {
                Ok(output) => {
                    return AttemptResult::Completed {
                        output,
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    error!("Attempt {} failed: {}", attempt, err);
                    last_error = Some(err);
                    if attempt < self.max_attempts {
                        debug!("Waiting {}ms before next attempt", self.retry_delay.as_millis());
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!("All {} attempts failed", self.max_attempts);
        AttemptResult::Exhausted {
            last_error: last_error
                .unwrap_or_else(|| TransportError::new("no attempt was made")),
            attempts: self.max_attempts,
        }
    }
}
