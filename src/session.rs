//! Session state and request pacing.
//!
//! Two checks guard privileged operations, applied in this order: the
//! session must hold a login token, and rate-sensitive operations must
//! wait out a cooldown measured from the end of the previous call.

use crate::error::ClientError;
use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Login token held by one client instance.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the token issued by a successful login.
    pub fn establish(&self, token: String) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    /// Forgets the current token.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Fails with [`ClientError::NotAuthenticated`] unless logged in.
    pub fn ensure_authenticated(&self) -> Result<(), ClientError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}

/// Minimum spacing between the end of one call and the start of the next.
///
/// Callers are serialized: only one call runs inside [`Cooldown::run`] at a
/// time, and each waits out whatever remains of the interval since the
/// previous call finished. The baseline is updated however the call ends,
/// including errors and cancellation.
#[derive(Debug)]
pub struct Cooldown {
    interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl Cooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_finished: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `call` once the cooldown has elapsed.
    pub async fn run<F: Future>(&self, call: F) -> F::Output {
        let slot = self.last_finished.lock().await;

        if let Some(finished) = *slot {
            let elapsed = finished.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "waiting for cooldown");
                tokio::time::sleep(wait).await;
            }
        }

        let _finish = FinishOnDrop(slot);
        call.await
    }
}

/// Records the completion time when dropped.
struct FinishOnDrop<'a>(MutexGuard<'a, Option<Instant>>);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_session_lifecycle() {
        let session = Session::new();
        assert!(matches!(
            session.ensure_authenticated(),
            Err(ClientError::NotAuthenticated)
        ));

        session.establish("abc123".to_string());
        assert!(session.ensure_authenticated().is_ok());
        assert_eq!(session.token().as_deref(), Some("abc123"));

        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let session = Session::new();
        session.establish(String::new());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let cooldown = Cooldown::new(Duration::from_secs(5));
        let start = Instant::now();
        let value = cooldown.run(async { 7 }).await;
        assert_eq!(value, 7);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_spaced_from_completion() {
        let interval = Duration::from_millis(150);
        let cooldown = Arc::new(Cooldown::new(interval));
        let spans = Arc::new(std::sync::Mutex::new(Vec::new()));

        let call = |cooldown: Arc<Cooldown>, spans: Arc<std::sync::Mutex<Vec<(Instant, Instant)>>>| async move {
            cooldown
                .run(async {
                    let start = Instant::now();
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    spans.lock().unwrap().push((start, Instant::now()));
                })
                .await;
        };

        tokio::join!(
            call(cooldown.clone(), spans.clone()),
            call(cooldown.clone(), spans.clone()),
            call(cooldown.clone(), spans.clone()),
        );

        let spans = spans.lock().unwrap();
        assert_eq!(spans.len(), 3);
        for pair in spans.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            assert!(next_start >= prev_end + interval);
        }
    }

    #[tokio::test]
    async fn test_failed_call_still_sets_baseline() {
        let interval = Duration::from_millis(100);
        let cooldown = Cooldown::new(interval);

        let failed: Result<(), &str> = cooldown.run(async { Err("boom") }).await;
        assert!(failed.is_err());
        let failed_at = Instant::now();

        let started = cooldown.run(async { Instant::now() }).await;
        assert!(started >= failed_at + interval - Duration::from_millis(5));
    }
}
