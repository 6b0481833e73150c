use indexmap::IndexMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

/// Chooses which entry to drop when a full cache receives a new key.
pub trait EvictionPolicy: Send + Sync {
    /// Index (in insertion order) of the entry to evict from a cache holding `len` entries.
    fn victim(&self, len: usize) -> Option<usize>;
}

/// Drops the entry that was inserted first.
#[derive(Debug, Default, Clone, Copy)]
pub struct OldestInserted;

impl EvictionPolicy for OldestInserted {
    fn victim(&self, len: usize) -> Option<usize> {
        (len > 0).then_some(0)
    }
}

/// Fixed-capacity map shared across requests. Lookup and evict+insert each run in a single
/// critical section, so the size never exceeds `capacity`.
pub struct BoundedCache<V> {
    entries: Mutex<IndexMap<String, V>>,
    capacity: usize,
    policy: Box<dyn EvictionPolicy>,
}

impl<V: Clone> BoundedCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, Box::new(OldestInserted))
    }

    pub fn with_policy(capacity: usize, policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            capacity,
            policy,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    /// Inserts or replaces `key`. Replacing an existing key never evicts.
    pub fn insert(&self, key: String, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.get_mut(&key) {
            *slot = value;
            return;
        }
        while entries.len() >= self.capacity {
            match self.policy.victim(entries.len()) {
                Some(index) if index < entries.len() => {
                    entries.shift_remove_index(index);
                }
                _ => {
                    entries.shift_remove_index(0);
                }
            }
        }
        entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Cache key for an answer analysis: hex sha256 of `question_id` and the normalized answer.
/// Deliberately session independent.
pub fn fingerprint(question_id: u32, normalized_answer: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(question_id.to_be_bytes());
    hasher.update(b":");
    hasher.update(normalized_answer.as_bytes());
    format!("{:x}", hasher.finalize())
}
