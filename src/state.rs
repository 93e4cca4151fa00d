use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tweet::Tweet;

/// The widget's synchronized state slots. The loaded tweet and the text
/// sitting in the input field are independent of each other and survive
/// both re-renders and restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Slots {
    tweet: Option<Tweet>,
    #[serde(default)]
    pending_input: String,
}

/// Per-instance synchronized state store. Slots are only mutated through
/// the setters here; every mutation bumps the revision (the change signal
/// the render loop watches) and snapshots the slots to disk when a state
/// file is configured.
///
/// The owning widget instance is the sole reader and writer, on a single
/// thread, so there is no locking.
#[derive(Debug)]
pub struct SyncedStore {
    slots: Slots,
    revision: u64,
    path: Option<PathBuf>,
}

impl SyncedStore {
    /// A store with no backing file. Used in tests and as a fallback when
    /// no state directory is available.
    pub fn in_memory() -> Self {
        Self {
            slots: Slots::default(),
            revision: 0,
            path: None,
        }
    }

    /// Restore the previous session's slots from `path`, or start empty if
    /// the file does not exist yet. A corrupt snapshot is an error rather
    /// than a silent reset.
    pub fn load_or_default(path: PathBuf) -> Result<Self> {
        let slots = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read state file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("corrupt state file {}", path.display()))?
        } else {
            Slots::default()
        };

        Ok(Self {
            slots,
            revision: 0,
            path: Some(path),
        })
    }

    pub fn tweet(&self) -> Option<&Tweet> {
        self.slots.tweet.as_ref()
    }

    pub fn pending_input(&self) -> &str {
        &self.slots.pending_input
    }

    /// Monotonic change counter. A render pass compares this against the
    /// value it last saw to decide whether anything changed underneath it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Overwrite the tweet slot. `None` resets the widget to its
    /// no-tweet-loaded state.
    pub fn set_tweet(&mut self, tweet: Option<Tweet>) -> Result<()> {
        self.slots.tweet = tweet;
        self.touch()
    }

    /// Record the current contents of the input field.
    pub fn set_pending_input(&mut self, text: impl Into<String>) -> Result<()> {
        self.slots.pending_input = text.into();
        self.touch()
    }

    fn touch(&mut self) -> Result<()> {
        self.revision += 1;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.slots)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write state file {}", path.display()))?;
        debug!(revision = self.revision, "state snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tweet::{Author, PublicMetrics};

    fn sample_tweet() -> Tweet {
        Tweet {
            text: "hello".to_string(),
            public_metrics: PublicMetrics {
                retweet_count: 1,
                like_count: 2,
                reply_count: 3,
            },
            author: Author {
                name: "Jane".to_string(),
                username: "jane".to_string(),
                verified: false,
                profile_image_uri: None,
            },
        }
    }

    #[test]
    fn test_starts_empty() {
        let store = SyncedStore::in_memory();
        assert!(store.tweet().is_none());
        assert_eq!(store.pending_input(), "");
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_setters_bump_revision() {
        let mut store = SyncedStore::in_memory();
        store.set_pending_input("123").unwrap();
        assert_eq!(store.revision(), 1);
        store.set_tweet(Some(sample_tweet())).unwrap();
        assert_eq!(store.revision(), 2);
        assert_eq!(store.pending_input(), "123");
    }

    #[test]
    fn test_slots_are_independent() {
        let mut store = SyncedStore::in_memory();
        store.set_pending_input("draft").unwrap();
        store.set_tweet(Some(sample_tweet())).unwrap();
        store.set_tweet(None).unwrap();
        // resetting the tweet leaves the input field alone
        assert_eq!(store.pending_input(), "draft");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut store = SyncedStore::in_memory();
        store.set_tweet(Some(sample_tweet())).unwrap();
        store.set_tweet(None).unwrap();
        store.set_tweet(None).unwrap();
        assert!(store.tweet().is_none());
    }

    #[test]
    fn test_persists_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = SyncedStore::load_or_default(path.clone()).unwrap();
        store.set_pending_input("1585396100026208257").unwrap();
        store.set_tweet(Some(sample_tweet())).unwrap();
        drop(store);

        let restored = SyncedStore::load_or_default(path).unwrap();
        assert_eq!(restored.pending_input(), "1585396100026208257");
        assert_eq!(restored.tweet(), Some(&sample_tweet()));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SyncedStore::load_or_default(dir.path().join("none.json")).unwrap();
        assert!(store.tweet().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(SyncedStore::load_or_default(path).is_err());
    }
}
