//! Per-installation cache of access tokens.
//!
//! Each installation id owns a slot guarded by an async mutex. Whoever holds
//! the slot either reuses the cached token or mints a fresh one, so
//! concurrent callers for the same installation share one exchange.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::InstallationToken;
use crate::domain::ports::CredentialMinter;

type Slot = Arc<AsyncMutex<Option<InstallationToken>>>;

pub struct InstallationTokenCache {
    minter: Arc<dyn CredentialMinter>,
    margin: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl InstallationTokenCache {
    pub fn new(minter: Arc<dyn CredentialMinter>, margin: Duration) -> Self {
        Self {
            minter,
            margin,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, installation_id: &str) -> DomainResult<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| DomainError::Credential("token cache lock poisoned".to_string()))?;
        Ok(slots
            .entry(installation_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone())
    }

    /// Return a token valid beyond the refresh margin, minting if needed.
    ///
    /// A failed mint leaves the slot empty; the next waiter tries again.
    pub async fn token(&self, installation_id: &str) -> DomainResult<InstallationToken> {
        let slot = self.slot(installation_id)?;
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh_at(Utc::now(), self.margin) {
                return Ok(token.clone());
            }
        }

        let token = self.minter.mint(installation_id).await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop a cached token so the next call re-mints.
    pub async fn invalidate(&self, installation_id: &str) -> DomainResult<()> {
        let slot = self.slot(installation_id)?;
        *slot.lock().await = None;
        Ok(())
    }
}

impl std::fmt::Debug for InstallationTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationTokenCache")
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts mints and hands out tokens with a fixed lifetime.
    struct CountingMinter {
        calls: AtomicUsize,
        lifetime_secs: i64,
        fail: bool,
    }

    impl CountingMinter {
        fn new(lifetime_secs: i64) -> Self {
            Self { calls: AtomicUsize::new(0), lifetime_secs, fail: false }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialMinter for CountingMinter {
        async fn mint(&self, installation_id: &str) -> DomainResult<InstallationToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Widen the race window for concurrent callers.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail {
                return Err(DomainError::Credential("rejected".to_string()));
            }
            Ok(InstallationToken {
                token: format!("ghs_{installation_id}_{n}"),
                expires_at: Utc::now() + Duration::seconds(self.lifetime_secs),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_mint() {
        let minter = Arc::new(CountingMinter::new(3_600));
        let cache = Arc::new(InstallationTokenCache::new(minter.clone(), Duration::seconds(60)));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.token("42").await })
            })
            .collect();
        let tokens: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap().token)
            .collect();

        assert_eq!(minter.calls(), 1);
        assert!(tokens.iter().all(|t| t == "ghs_42_1"));
    }

    #[tokio::test]
    async fn test_installations_are_cached_separately() {
        let minter = Arc::new(CountingMinter::new(3_600));
        let cache = InstallationTokenCache::new(minter.clone(), Duration::seconds(60));

        cache.token("1").await.unwrap();
        cache.token("2").await.unwrap();
        cache.token("1").await.unwrap();

        assert_eq!(minter.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_token_is_reminted_once() {
        // Tokens expire inside the refresh margin, so every lookup is stale.
        let minter = Arc::new(CountingMinter::new(30));
        let cache = InstallationTokenCache::new(minter.clone(), Duration::seconds(60));

        let first = cache.token("42").await.unwrap();
        assert_eq!(minter.calls(), 1);

        let second = cache.token("42").await.unwrap();
        assert_eq!(minter.calls(), 2);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_failed_mint_is_not_cached() {
        let minter = Arc::new(CountingMinter { fail: true, ..CountingMinter::new(3_600) });
        let cache = InstallationTokenCache::new(minter.clone(), Duration::seconds(60));

        assert!(matches!(cache.token("42").await, Err(DomainError::Credential(_))));
        assert!(cache.token("42").await.is_err());
        assert_eq!(minter.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_remint() {
        let minter = Arc::new(CountingMinter::new(3_600));
        let cache = InstallationTokenCache::new(minter.clone(), Duration::seconds(60));

        cache.token("42").await.unwrap();
        cache.invalidate("42").await.unwrap();
        cache.token("42").await.unwrap();

        assert_eq!(minter.calls(), 2);
    }
}
