use std::future::Future;

use tokio::sync::Mutex;

use crate::error::ProviderError;

/// Process-wide scrape session for mirastream: the portal redirects to the
/// currently-active mirror, hands out a session cookie, and embeds a CSRF
/// token that its AJAX endpoints require. All three are established
/// together and invalidated together.
#[derive(Debug, Clone)]
pub struct Session {
    /// Base URL after following the portal redirect.
    pub base_url: String,
    /// "name=value" pairs joined with "; ", ready for a Cookie header.
    pub cookie: String,
    pub csrf_token: String,
}

/// Mutex-guarded cache so concurrent catalog calls share one session and
/// a refresh is a single read-modify-write.
pub struct SessionCache {
    inner: Mutex<Option<Session>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Return the cached session, establishing it under the lock when
    /// absent so only one task hits the portal.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Session, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session, ProviderError>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let session = init().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Drop the cached session; the next call re-establishes it. Used
    /// when an AJAX endpoint answers 403 (expired cookie or rotated CSRF).
    pub async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_init_runs_once_until_invalidated() {
        let cache = SessionCache::new();
        let calls = AtomicUsize::new(0);

        let make = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(Session {
                    base_url: "https://mirror1.example".to_string(),
                    cookie: "sid=abc".to_string(),
                    csrf_token: "tok".to_string(),
                })
            }
        };

        let first = cache.get_or_init(make).await.unwrap();
        let second = cache.get_or_init(make).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.cookie, second.cookie);

        cache.invalidate().await;
        cache.get_or_init(make).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
