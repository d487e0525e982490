//! Per-key registry of in-flight refreshes
//!
//! The first caller for a key becomes the leader and runs the refresh; later
//! callers subscribe to the leader's outcome. A leader that is dropped before
//! completing removes its registration and closes the channel, so waiting
//! callers try again and one of them takes over.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::types::{CacheKey, EngineError};
use crate::stats::ResultSet;

pub type Outcome = Result<Arc<ResultSet>, EngineError>;

struct Pending {
    id: u64,
    outcome: watch::Receiver<Option<Outcome>>,
}

#[derive(Default)]
pub struct PendingRegistry {
    pending: DashMap<CacheKey, Pending>,
    next_id: AtomicU64,
}

/// Result of [`PendingRegistry::join`]
pub enum Joined<'a> {
    Leader(LeaderGuard<'a>),
    Follower(Follower),
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become leader for `key`, or follow the refresh already running
    pub fn join(&self, key: &CacheKey) -> Joined<'_> {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(entry) => Joined::Follower(Follower {
                outcome: entry.get().outcome.clone(),
            }),
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(None);
                entry.insert(Pending { id, outcome: rx });
                Joined::Leader(LeaderGuard {
                    registry: self,
                    key: key.clone(),
                    id,
                    tx,
                })
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

/// Held by the caller running a refresh
pub struct LeaderGuard<'a> {
    registry: &'a PendingRegistry,
    key: CacheKey,
    id: u64,
    tx: watch::Sender<Option<Outcome>>,
}

impl LeaderGuard<'_> {
    /// Publish the outcome to every follower and release the key
    pub fn complete(self, outcome: Outcome) {
        self.tx.send_replace(Some(outcome));
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        let id = self.id;
        self.registry
            .pending
            .remove_if(&self.key, |_, pending| pending.id == id);
    }
}

/// Waiting side of an in-flight refresh
pub struct Follower {
    outcome: watch::Receiver<Option<Outcome>>,
}

impl Follower {
    /// The leader's outcome, or `None` if the leader was dropped first
    pub async fn wait(mut self) -> Option<Outcome> {
        match self.outcome.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::scraping::fetcher::FetchError;

    fn key() -> CacheKey {
        CacheKey::new("noble", "sv")
    }

    fn result() -> Arc<ResultSet> {
        Arc::new(ResultSet {
            distribution: "noble".to_string(),
            language: "sv".to_string(),
            fetched_at: Utc::now(),
            packages: Vec::new(),
            summary: Default::default(),
            dropped: 0,
            empty: 0,
            warnings: 0,
        })
    }

    #[tokio::test]
    async fn test_followers_receive_leader_outcome() {
        let registry = PendingRegistry::new();
        let Joined::Leader(leader) = registry.join(&key()) else {
            panic!("first caller should lead");
        };
        let Joined::Follower(a) = registry.join(&key()) else {
            panic!("second caller should follow");
        };
        let Joined::Follower(b) = registry.join(&key()) else {
            panic!("third caller should follow");
        };
        assert_eq!(registry.in_flight(), 1);

        let expected = result();
        leader.complete(Ok(expected.clone()));
        assert_eq!(registry.in_flight(), 0);

        let a = a.wait().await.unwrap().unwrap();
        let b = b.wait().await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &expected));
        assert!(Arc::ptr_eq(&b, &expected));
    }

    #[tokio::test]
    async fn test_errors_fan_out() {
        let registry = PendingRegistry::new();
        let Joined::Leader(leader) = registry.join(&key()) else {
            panic!("first caller should lead");
        };
        let Joined::Follower(follower) = registry.join(&key()) else {
            panic!("second caller should follow");
        };

        let error = EngineError::fetch(FetchError::HttpStatus { code: 500 });
        leader.complete(Err(error.clone()));
        assert_eq!(follower.wait().await, Some(Err(error)));
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_key() {
        let registry = PendingRegistry::new();
        let Joined::Leader(leader) = registry.join(&key()) else {
            panic!("first caller should lead");
        };
        let Joined::Follower(follower) = registry.join(&key()) else {
            panic!("second caller should follow");
        };

        drop(leader);
        assert_eq!(follower.wait().await, None);
        assert!(matches!(registry.join(&key()), Joined::Leader(_)));
    }

    #[test]
    fn test_keys_are_independent() {
        let registry = PendingRegistry::new();
        let _noble = registry.join(&key());
        assert!(matches!(
            registry.join(&CacheKey::new("focal", "sv")),
            Joined::Leader(_)
        ));
    }
}
