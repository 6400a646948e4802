//! Retry wrapper
//!
//! A [`RetryPolicy`] re-invokes a fallible operation until it succeeds, the
//! attempt budget runs out, or it fails with an error kind the policy does
//! not consider transient. Retries and exhaustion are reported to an
//! injected [`RetryObserver`] instead of a process-wide logger.

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Classify, ErrorKind, InvalidPolicy};

/// Receives retry observations
pub trait RetryObserver: Send + Sync {
    /// Called after a failed attempt when another attempt will follow
    fn on_retry(&self, label: &str, attempt: u32, remaining: u32, error: &dyn Display);

    /// Called when the last allowed attempt failed with a retryable error
    fn on_exhausted(&self, label: &str, max_attempts: u32, error: &dyn Display);
}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, label: &str, attempt: u32, remaining: u32, error: &dyn Display) {
        tracing::warn!(
            attempt,
            remaining,
            "{}: retrying \"{}\" {} more times",
            error,
            label,
            remaining
        );
    }

    fn on_exhausted(&self, label: &str, max_attempts: u32, error: &dyn Display) {
        tracing::error!(
            "{}: max tries ({}) reached for \"{}\", raising exception",
            error,
            max_attempts,
            label
        );
    }
}

/// How many times to run an operation and which failures to retry
#[derive(Clone)]
pub struct RetryPolicy {
    label: String,
    max_attempts: u32,
    /// `None` means every error kind is retryable
    retryable: Option<HashSet<ErrorKind>>,
    delay: Option<Duration>,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl RetryPolicy {
    /// Create a policy that retries any error, reporting through `tracing`
    pub fn new(label: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            label: label.into(),
            max_attempts,
            retryable: None,
            delay: None,
            observer: Some(Arc::new(TracingObserver)),
        }
    }

    /// Restrict retries to the given error kinds
    pub fn retry_on(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable = Some(kinds.into_iter().collect());
        self
    }

    /// Wait this long between attempts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Drop the observer entirely
    pub fn silent(mut self) -> Self {
        self.observer = None;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Whether an error of this kind is worth another attempt
    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        self.retryable
            .as_ref()
            .map(|kinds| kinds.contains(&kind))
            .unwrap_or(true)
    }

    /// Reject policies that could never run their operation
    pub fn validate(&self) -> Result<(), InvalidPolicy> {
        if self.max_attempts == 0 {
            return Err(InvalidPolicy {
                label: self.label.clone(),
                max_attempts: self.max_attempts,
            });
        }
        Ok(())
    }

    /// Run a synchronous operation under this policy
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Classify + Display + From<InvalidPolicy>,
    {
        self.validate()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.should_retry(attempt, &err) {
                        return Err(err);
                    }
                    if let Some(delay) = self.delay {
                        std::thread::sleep(delay);
                    }
                }
            }
        }
    }

    /// Run an asynchronous operation under this policy
    ///
    /// Same semantics as [`RetryPolicy::run`]; the closure is called once per
    /// attempt to build a fresh future.
    pub async fn run_async<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display + From<InvalidPolicy>,
    {
        self.validate()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.should_retry(attempt, &err) {
                        return Err(err);
                    }
                    if let Some(delay) = self.delay {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// Decide what follows a failed attempt and report it
    fn should_retry<E: Classify + Display>(&self, attempt: u32, err: &E) -> bool {
        if !self.is_retryable(err.kind()) {
            return false;
        }

        // A single-attempt policy is an unguarded call
        if self.max_attempts == 1 {
            return false;
        }

        if attempt >= self.max_attempts {
            if let Some(observer) = &self.observer {
                observer.on_exhausted(&self.label, self.max_attempts, err);
            }
            return false;
        }

        if let Some(observer) = &self.observer {
            observer.on_retry(&self.label, attempt, self.max_attempts - attempt, err);
        }
        true
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("label", &self.label)
            .field("max_attempts", &self.max_attempts)
            .field("retryable", &self.retryable)
            .field("delay", &self.delay)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScrapeError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl RetryObserver for Recorder {
        fn on_retry(&self, label: &str, attempt: u32, remaining: u32, error: &dyn Display) {
            self.events
                .lock()
                .unwrap()
                .push(format!("retry {} {} {} {}", label, attempt, remaining, error));
        }

        fn on_exhausted(&self, label: &str, max_attempts: u32, error: &dyn Display) {
            self.events
                .lock()
                .unwrap()
                .push(format!("exhausted {} {} {}", label, max_attempts, error));
        }
    }

    /// Fails `failures` times with `make_err`, then returns the call count
    fn flaky(
        failures: u32,
        calls: &mut u32,
        make_err: fn() -> ScrapeError,
    ) -> Result<u32, ScrapeError> {
        *calls += 1;
        if *calls <= failures {
            Err(make_err())
        } else {
            Ok(*calls)
        }
    }

    #[test]
    fn test_fail_then_succeed_matrix() {
        for n in 1..=4u32 {
            for k in 0..=5u32 {
                let mut calls = 0;
                let policy = RetryPolicy::new("op", n).silent();
                let result = policy.run(|| flaky(k, &mut calls, || ScrapeError::browser("down")));

                if k < n {
                    assert_eq!(result.unwrap(), k + 1, "n={} k={}", n, k);
                    assert_eq!(calls, k + 1);
                } else {
                    assert!(matches!(result, Err(ScrapeError::Browser(_))));
                    assert_eq!(calls, n, "n={} k={}", n, k);
                }
            }
        }
    }

    #[test]
    fn test_non_retryable_runs_once() {
        let recorder = Arc::new(Recorder::default());
        let policy = RetryPolicy::new("logout", 5)
            .retry_on([ErrorKind::Verification])
            .with_observer(recorder.clone());

        let mut calls = 0;
        let result = policy.run(|| flaky(10, &mut calls, || ScrapeError::browser("gone")));

        assert!(matches!(result, Err(ScrapeError::Browser(_))));
        assert_eq!(calls, 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_restricted_kinds_still_retry_matching() {
        let policy = RetryPolicy::new("logout", 3)
            .retry_on([ErrorKind::Verification])
            .silent();

        let mut calls = 0;
        let result = policy.run(|| flaky(2, &mut calls, || ScrapeError::verification("still in")));

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_single_attempt_is_unguarded() {
        let recorder = Arc::new(Recorder::default());
        let policy = RetryPolicy::new("once", 1).with_observer(recorder.clone());

        let mut calls = 0;
        let result = policy.run(|| flaky(1, &mut calls, || ScrapeError::browser("x")));

        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_zero_attempts_fails_fast() {
        let policy = RetryPolicy::new("never", 0);

        let mut calls = 0;
        let result = policy.run(|| flaky(0, &mut calls, || ScrapeError::browser("x")));

        assert!(matches!(result, Err(ScrapeError::Policy(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_observations() {
        let recorder = Arc::new(Recorder::default());
        let policy = RetryPolicy::new("login", 3).with_observer(recorder.clone());

        let mut calls = 0;
        let result = policy.run(|| flaky(5, &mut calls, || ScrapeError::browser("timeout")));

        assert!(result.is_err());
        assert_eq!(
            recorder.events(),
            vec![
                "retry login 1 2 Browser error: timeout",
                "retry login 2 1 Browser error: timeout",
                "exhausted login 3 Browser error: timeout",
            ]
        );
    }

    #[test]
    fn test_is_retryable_defaults_to_any() {
        let policy = RetryPolicy::new("any", 2);
        assert!(policy.is_retryable(ErrorKind::Parse));
        assert!(policy.is_retryable(ErrorKind::Config));

        let policy = policy.retry_on([ErrorKind::Navigation]);
        assert!(policy.is_retryable(ErrorKind::Navigation));
        assert!(!policy.is_retryable(ErrorKind::Parse));
    }

    #[test]
    fn test_policy_is_stateless_between_runs() {
        let policy = RetryPolicy::new("op", 2).silent();

        for _ in 0..3 {
            let mut calls = 0;
            let result = policy.run(|| flaky(1, &mut calls, || ScrapeError::browser("x")));
            assert_eq!(result.unwrap(), 2);
        }
    }

    #[test]
    fn test_run_async() {
        let policy = RetryPolicy::new("async", 3)
            .with_delay(Duration::from_millis(1))
            .silent();

        let calls = Mutex::new(0u32);
        let result: Result<u32, ScrapeError> = tokio_test::block_on(policy.run_async(|| {
            let mut guard = calls.lock().unwrap();
            *guard += 1;
            let current = *guard;
            async move {
                if current < 3 {
                    Err(ScrapeError::ElementNotFound(".product-name".into()))
                } else {
                    Ok(current)
                }
            }
        }));

        assert_eq!(result.unwrap(), 3);
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_async_zero_attempts() {
        let policy = RetryPolicy::new("never", 0);
        let mut calls = 0u32;
        let result: Result<(), ScrapeError> = policy
            .run_async(|| {
                calls += 1;
                async { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(ScrapeError::Policy(_))));
        assert_eq!(calls, 0);
    }
}
