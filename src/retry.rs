use std::time::Duration;

/// Bounded resubmission policy for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Maximum number of resubmissions after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fixed delay before each resubmission.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides what happens after `attempt` failed.
    pub fn decide(&self, attempt: Attempt) -> RetryDecision {
        if attempt.retry_count >= self.max_retries {
            return RetryDecision::Propagate;
        }
        RetryDecision::Resubmit {
            next: attempt.next(),
            delay: self.delay,
        }
    }
}

/// Position of one dispatch within a request's lifecycle.
///
/// Values are immutable; [`Attempt::next`] returns the context for the
/// following dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attempt {
    retry_count: u32,
}

impl Attempt {
    pub fn first() -> Self {
        Self::default()
    }

    /// Number of resubmissions that preceded this dispatch.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn next(self) -> Self {
        Self {
            retry_count: self.retry_count.saturating_add(1),
        }
    }
}

/// Outcome of checking a failed attempt against the retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then dispatch the same request as `next`.
    Resubmit { next: Attempt, delay: Duration },
    /// Surface the failure to the caller.
    Propagate,
}

/// Applies an optional policy; requests without one always propagate.
pub fn check_retry(policy: Option<&RetryPolicy>, attempt: Attempt) -> RetryDecision {
    match policy {
        Some(policy) => policy.decide(attempt),
        None => RetryDecision::Propagate,
    }
}
