//! Read-mostly catalog snapshots.
//!
//! A refresh builds a new immutable [`CatalogSnapshot`] and swaps it into
//! [`SharedCatalog`]. Readers clone the `Arc` and keep using the snapshot
//! they started with, whatever refreshes happen meanwhile.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use faqdesk_shared::FaqEntry;
use sha2::{Digest, Sha256};

/// An immutable catalog with its load time and content fingerprint.
#[derive(Debug)]
pub struct CatalogSnapshot {
    entries: Arc<[FaqEntry]>,
    fetched_at: DateTime<Utc>,
    fingerprint: String,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        let fingerprint = fingerprint(&entries);
        Self {
            entries: entries.into(),
            fetched_at: Utc::now(),
            fingerprint,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Hex SHA-256 over every entry, in order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Compute a content fingerprint for a list of entries.
fn fingerprint(entries: &[FaqEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        hasher.update(entry.question.as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.answer.as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.link.as_deref().unwrap_or_default().as_bytes());
        hasher.update([0xffu8]);
    }
    format!("{:x}", hasher.finalize())
}

/// The current snapshot, replaceable as a whole.
#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl Default for SharedCatalog {
    fn default() -> Self {
        Self::new(CatalogSnapshot::empty())
    }
}

impl SharedCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Install `snapshot` and return the one it replaced.
    pub fn replace(&self, snapshot: Arc<CatalogSnapshot>) -> Arc<CatalogSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(q: &str) -> FaqEntry {
        FaqEntry::new(q, "a", None)
    }

    #[test]
    fn fingerprint_tracks_content_and_order() {
        let a = CatalogSnapshot::new(vec![entry("one"), entry("two")]);
        let b = CatalogSnapshot::new(vec![entry("one"), entry("two")]);
        let c = CatalogSnapshot::new(vec![entry("two"), entry("one")]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_separates_fields() {
        let a = CatalogSnapshot::new(vec![FaqEntry::new("ab", "c", None)]);
        let b = CatalogSnapshot::new(vec![FaqEntry::new("a", "bc", None)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn readers_keep_their_snapshot_across_refresh() {
        let shared = SharedCatalog::new(CatalogSnapshot::new(vec![entry("old")]));
        let held = shared.snapshot();

        let previous = shared.replace(Arc::new(CatalogSnapshot::new(vec![
            entry("new"),
            entry("newer"),
        ])));
        assert_eq!(previous.entries()[0].question, "old");

        assert_eq!(held.len(), 1);
        assert_eq!(held.entries()[0].question, "old");
        assert_eq!(shared.snapshot().len(), 2);
    }

    #[test]
    fn default_is_empty() {
        let shared = SharedCatalog::default();
        assert!(shared.snapshot().is_empty());
    }
}
