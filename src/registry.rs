//! Fingerprint to upload identifier registry
//!
//! Lookup-and-insert happens under one mutex, so when several callers race
//! to register the same fingerprint exactly one of them wins and every
//! other caller observes the winner's identifier.

use crate::fingerprint::Fingerprint;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Outcome of [`DuplicateRegistry::try_insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The fingerprint was new; the given identifier now owns it
    Inserted,
    /// The fingerprint was already registered under this identifier
    AlreadyExists(String),
}

impl Registration {
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

#[derive(Debug, Default)]
pub struct DuplicateRegistry {
    entries: Mutex<HashMap<Fingerprint, String>>,
}

impl DuplicateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with known entries
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (Fingerprint, String)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    // Critical sections are single map operations; a poisoned map is still consistent
    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `id` under `fingerprint` unless it is already taken
    pub fn try_insert(&self, fingerprint: Fingerprint, id: impl Into<String>) -> Registration {
        let mut entries = self.lock();
        match entries.get(&fingerprint) {
            Some(existing) => {
                debug!(%fingerprint, existing = %existing, "duplicate fingerprint");
                Registration::AlreadyExists(existing.clone())
            }
            None => {
                let id = id.into();
                info!(%fingerprint, id = %id, "registered new fingerprint");
                entries.insert(fingerprint, id);
                Registration::Inserted
            }
        }
    }

    /// Add entries without overwriting existing ones
    pub fn seed(&self, entries: impl IntoIterator<Item = (Fingerprint, String)>) {
        let mut map = self.lock();
        for (fingerprint, id) in entries {
            map.entry(fingerprint).or_insert(id);
        }
    }

    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.lock().get(fingerprint).cloned()
    }

    /// Remove `fingerprint` only if it still maps to `stale_id`.
    ///
    /// Returns whether an entry was removed. A concurrent re-registration
    /// under a different identifier is left alone.
    pub fn evict(&self, fingerprint: &Fingerprint, stale_id: &str) -> bool {
        let mut entries = self.lock();
        if entries.get(fingerprint).is_some_and(|id| id == stale_id) {
            entries.remove(fingerprint);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> HashMap<Fingerprint, String> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

static GLOBAL: Lazy<DuplicateRegistry> = Lazy::new(DuplicateRegistry::new);

/// Process-wide registry used by [`register_if_new`]
#[must_use]
pub fn global() -> &'static DuplicateRegistry {
    &GLOBAL
}

/// Register `id` under `fingerprint` in the process-wide registry
pub fn register_if_new(fingerprint: Fingerprint, id: impl Into<String>) -> Registration {
    GLOBAL.try_insert(fingerprint, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_first_insert_wins() {
        let registry = DuplicateRegistry::new();
        let fp = fingerprint_bytes(b"one");

        assert_eq!(registry.try_insert(fp, "a"), Registration::Inserted);
        assert_eq!(registry.try_insert(fp, "b"), Registration::AlreadyExists("a".into()));
        assert_eq!(registry.get(&fp).as_deref(), Some("a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_single_winner() {
        const THREADS: usize = 16;
        let registry = DuplicateRegistry::new();
        let barrier = Barrier::new(THREADS);
        let fp = fingerprint_bytes(b"shared");

        let results: Vec<(String, Registration)> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let registry = &registry;
                    let barrier = &barrier;
                    s.spawn(move || {
                        let id = format!("id-{i}");
                        barrier.wait();
                        (id.clone(), registry.try_insert(fp, id))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<&String> = results
            .iter()
            .filter(|(_, r)| *r == Registration::Inserted)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(winners.len(), 1);

        let winner = winners[0];
        for (_, result) in results.iter().filter(|(_, r)| r.is_duplicate()) {
            assert_eq!(result, &Registration::AlreadyExists(winner.clone()));
        }
        assert_eq!(registry.get(&fp).as_ref(), Some(winner));
    }

    #[test]
    fn test_seed_and_evict() {
        let fp = fingerprint_bytes(b"seeded");
        let registry = DuplicateRegistry::with_entries([(fp, "old".to_string())]);
        registry.seed([(fp, "ignored".to_string())]);
        assert_eq!(registry.get(&fp).as_deref(), Some("old"));

        assert!(!registry.evict(&fp, "other"));
        assert!(registry.evict(&fp, "old"));
        assert!(registry.is_empty());
        assert_eq!(registry.try_insert(fp, "new"), Registration::Inserted);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let registry = DuplicateRegistry::new();
        let _ = thread::scope(|s| {
            s.spawn(|| {
                let _guard = registry.entries.lock().unwrap();
                panic!("poison");
            })
            .join()
        });
        assert!(registry.entries.is_poisoned());
        assert_eq!(registry.try_insert(fingerprint_bytes(b"x"), "x"), Registration::Inserted);
    }

    #[test]
    fn test_global_register() {
        let fp = fingerprint_bytes(b"global registry test");
        assert_eq!(register_if_new(fp, "g1"), Registration::Inserted);
        assert_eq!(register_if_new(fp, "g2"), Registration::AlreadyExists("g1".into()));
        assert_eq!(global().get(&fp).as_deref(), Some("g1"));
    }
}
