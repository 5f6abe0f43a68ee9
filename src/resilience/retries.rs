//! Retry loop driver.
//!
//! Drives a fallible attempt up to a configured number of times. A result
//! the caller accepts ends the loop immediately; anything else (a
//! retryable result or an error) is followed by an unconditional delay
//! before the next attempt. The last retryable result is kept so an
//! all-503 run can still answer the client with the final response.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Bounded-attempt retry policy with a fixed inter-attempt delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Runs `attempt` until `accept` approves a result or attempts run out.
    ///
    /// `on_error` observes every failed attempt (for classification and
    /// logging); errors never abort the loop. Returns the accepted result,
    /// or the last unaccepted result, or `None` when every attempt errored.
    pub async fn run<R, E, F, Fut>(
        &self,
        mut attempt: F,
        accept: impl Fn(&R) -> bool,
        mut on_error: impl FnMut(u32, &E),
    ) -> Option<R>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let mut last = None;
        for index in 0..self.max_attempts {
            match attempt(index).await {
                Ok(result) if accept(&result) => return Some(result),
                Ok(result) => last = Some(result),
                Err(err) => on_error(index, &err),
            }
            // Unconditional after any failure, including the final attempt.
            sleep(self.delay).await;
        }
        last
    }
}
