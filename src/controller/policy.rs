//! Directed whitelist of IP pairs
//!
//! Matching is exact and case-sensitive on the textual form of the address.
//! Packet addresses are rendered in dotted-quad, so an entry such as
//! "010.0.0.1" is stored as given and never matches any traffic.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// An ordered (source, destination) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpPair {
    pub src: String,
    pub dst: String,
}

impl IpPair {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.dst.clone(), self.src.clone())
    }
}

impl fmt::Display for IpPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

/// Default-deny policy store
#[derive(Debug, Default)]
pub struct PolicyStore {
    pairs: RwLock<HashSet<IpPair>>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pairs<I: IntoIterator<Item = IpPair>>(pairs: I) -> Self {
        Self {
            pairs: RwLock::new(pairs.into_iter().collect()),
        }
    }

    pub fn is_allowed(&self, src: &str, dst: &str) -> bool {
        self.pairs.read().contains(&IpPair::new(src, dst))
    }

    /// Add a pair. Returns false if it was already present.
    pub fn add(&self, src: &str, dst: &str) -> bool {
        self.pairs.write().insert(IpPair::new(src, dst))
    }

    /// Remove a pair. Returns false if it was not present.
    pub fn remove(&self, src: &str, dst: &str) -> bool {
        self.pairs.write().remove(&IpPair::new(src, dst))
    }

    /// Sorted snapshot of every pair
    pub fn pairs(&self) -> Vec<IpPair> {
        let mut pairs: Vec<_> = self.pairs.read().iter().cloned().collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deny() {
        let policy = PolicyStore::new();
        assert!(!policy.is_allowed("10.0.0.1", "10.0.0.2"));
    }

    #[test]
    fn test_directionality() {
        let policy = PolicyStore::new();
        policy.add("10.0.0.1", "10.0.0.2");

        assert!(policy.is_allowed("10.0.0.1", "10.0.0.2"));
        assert!(!policy.is_allowed("10.0.0.2", "10.0.0.1"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let policy = PolicyStore::new();
        assert!(policy.add("10.0.0.1", "10.0.0.2"));
        assert!(!policy.add("10.0.0.1", "10.0.0.2"));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let policy = PolicyStore::new();
        policy.add("10.0.0.1", "10.0.0.2");

        assert!(!policy.remove("10.0.0.9", "10.0.0.2"));
        assert_eq!(policy.len(), 1);
        assert!(policy.remove("10.0.0.1", "10.0.0.2"));
        assert!(policy.is_empty());
    }

    #[test]
    fn test_no_normalization() {
        let policy = PolicyStore::new();
        policy.add("010.0.0.1", "10.0.0.2");
        assert!(!policy.is_allowed("10.0.0.1", "10.0.0.2"));
    }

    #[test]
    fn test_seeded_pairs_sorted_snapshot() {
        let seed = IpPair::new("10.0.0.2", "10.0.0.1");
        let policy = PolicyStore::with_pairs([seed.clone(), seed.reversed()]);

        assert_eq!(
            policy.pairs(),
            vec![
                IpPair::new("10.0.0.1", "10.0.0.2"),
                IpPair::new("10.0.0.2", "10.0.0.1"),
            ]
        );
    }

    #[test]
    fn test_pair_display() {
        assert_eq!(IpPair::new("a", "b").to_string(), "a -> b");
    }
}
