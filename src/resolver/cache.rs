//! Memoized hostname → persona resolutions.
//!
//! Only positive results are stored. Entries belong to one policy version and
//! the engine clears the whole cache whenever the policy is replaced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::persona::Persona;

/// Hostname-keyed resolution cache. Keys are normalized (lower-cased) hosts.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, Arc<Persona>>,
    /// 0 = unbounded.
    max_entries: usize,
}

impl ResolutionCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    pub fn get(&self, host: &str) -> Option<Arc<Persona>> {
        self.entries.get(host).cloned()
    }

    /// Store a resolution. At capacity the cache is emptied first; dropping
    /// memoized positives never changes an answer, only its cost.
    pub fn insert(&mut self, host: String, persona: Arc<Persona>) {
        if self.max_entries > 0
            && self.entries.len() >= self.max_entries
            && !self.entries.contains_key(&host)
        {
            self.entries.clear();
        }
        self.entries.insert(host, persona);
    }

    /// Drop every entry, returning how many were evicted.
    pub fn clear(&mut self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.entries.contains_key(host)
    }
}
