//! Per-session registry of active locks.
//!
//! Owned by one session instance, never process-wide. Read by every mutating
//! call (affinity lookup) and written by every lock/unlock call, potentially
//! concurrently; `DashMap` gives atomic per-entry operations so a reader
//! never observes a partially constructed entry.

use dashmap::DashMap;
use dav_session_core::LockEntry;
use tracing::debug;
use url::Url;

use crate::resolver;

/// Concurrent store of the locks a session currently holds, keyed by the
/// normalized lock root.
#[derive(Debug, Default)]
pub struct LockRegistry {
    entries: DashMap<String, LockEntry>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record a lock under its normalized root, overwriting any entry
    /// already keyed by the same root.
    pub fn add(&self, root: Url, token: String) {
        debug!("tracking lock on {root}");
        self.entries
            .insert(root.as_str().to_string(), LockEntry { root, token });
    }

    /// Stop tracking the lock rooted at `root`, returning the removed entry
    /// if one was present.
    pub fn remove(&self, root: &Url) -> Option<LockEntry> {
        self.entries.remove(root.as_str()).map(|(_, entry)| entry)
    }

    /// Find the most specific active lock covering `target` (which the
    /// session has already normalized).
    ///
    /// A root covers the target when it equals it or is an ancestor
    /// collection under the URI path hierarchy; among nested covering roots
    /// the one with the most path segments wins.
    pub fn find_covering(&self, target: &Url) -> Option<LockEntry> {
        self.entries
            .iter()
            .filter(|entry| resolver::is_ancestor_or_self(&entry.root, target))
            .max_by_key(|entry| resolver::path_segments(&entry.root).len())
            .map(|entry| entry.value().clone())
    }

    /// Drain every tracked entry, returning each exactly once. The registry
    /// is empty when this returns.
    pub fn drain(&self) -> Vec<LockEntry> {
        let mut drained = Vec::new();
        loop {
            let roots: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
            if roots.is_empty() {
                break;
            }
            for root in roots {
                if let Some((_, entry)) = self.entries.remove(&root) {
                    drained.push(entry);
                }
            }
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
