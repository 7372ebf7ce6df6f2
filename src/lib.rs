//! A persistent set of hashable values built on a hash array mapped trie,
//! with O(1) structural sharing between versions and a lock-free container
//! for publishing new versions across threads.
//!
//! Each level of the trie consumes five bits of a value's 64-bit hash; a
//! branch stores its up-to-32 children compactly behind a bitmap, and full
//! hash collisions fall into per-leaf buckets.  Insertion rewrites only the
//! branches on the path from the root to the touched slot, so a clone of a
//! [`HashTrie`] costs one refcount and two words no matter how large the set
//! is.
//!
//! ```
//! use hashtrie::{HashTrie, SharedHashTrie};
//!
//! let shared: SharedHashTrie<u64> = SharedHashTrie::new();
//! shared.update_with(|set| {
//!     set.insert(1);
//!     set.insert(2);
//! });
//!
//! let snapshot = shared.snapshot();
//! assert_eq!(snapshot.len(), 2);
//! assert!(snapshot.contains(&1));
//! ```

pub mod counters;
pub mod fuzzer;
pub mod hash_trie;
pub mod shared;

mod branch_node;
mod leaf_node;
mod path;
mod trie_node;

pub use hash_trie::{HashTrie, Iter};
pub use shared::{SharedHashTrie, Transaction};


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::counters::Counters;
    use crate::testing::IdentityState;
    use crate::{HashTrie, SharedHashTrie};

    #[test]
    fn repeated_insert_of_one_value() {
        let mut set: HashTrie<u64> = HashTrie::new();
        set.insert(42);
        set.insert(42);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&42));
        assert!(!set.contains(&7));
    }

    #[test]
    fn hash_pattern_chain_releases_its_nodes() {
        // Two identity hashes differing only in the third chunk: the insert
        // builds a three-branch chain, and dropping the trie must release
        // every node in it.
        let mut set: HashTrie<u64, IdentityState> = HashTrie::new();
        set.insert(0b01000_00010_00001);
        set.insert(0b00100_00010_00001);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&0b01000_00010_00001));
        assert!(set.contains(&0b00100_00010_00001));

        let counters = Counters::count_occupancy(&set);
        assert_eq!(counters.total_branches(), 3);
        assert_eq!(counters.max_depth(), 3);

        // Probe the deepest subtree, then drop the trie: our probe must be
        // the only remaining holder of that chain.
        let root = set.root().clone();
        assert_eq!(root.refcount(), 2);
        drop(set);
        assert_eq!(root.refcount(), 1);
    }

    #[test]
    fn insert_iterate_range() {
        let mut set: HashTrie<u64> = HashTrie::new();
        for value in 0..1000 {
            set.insert(value);
        }
        assert_eq!(set.len(), 1000);
        let collected: HashSet<u64> = set.iter().copied().collect();
        assert_eq!(collected, (0..1000).collect());
    }

    #[test]
    fn distinct_count_under_duplicates() {
        let mut set: HashTrie<u64> = HashTrie::new();
        for value in 0..300u64 {
            set.insert(value % 100);
        }
        assert_eq!(set.len(), 100);
    }

    #[test]
    fn two_transactions_reach_the_union() {
        let shared: SharedHashTrie<u64> = SharedHashTrie::new();

        let mut t1 = shared.start_transaction();
        let mut t2 = shared.start_transaction();

        let mut h1 = t1.get();
        for value in [1, 2, 10] {
            h1.insert(value);
        }
        let mut h2 = t2.get();
        for value in [3, 4, 10] {
            h2.insert(value);
        }

        assert!(t1.try_commit(h1));
        assert!(!t2.try_commit(h2));

        let mut h2 = t2.get();
        for value in [3, 4, 10] {
            h2.insert(value);
        }
        assert!(t2.try_commit(h2));

        assert_eq!(shared.len(), 5);
        let members: HashSet<u64> = shared.snapshot().iter().copied().collect();
        assert_eq!(members, HashSet::from([1, 2, 3, 4, 10]));
    }

    #[test]
    fn update_with_from_empty() {
        let shared: SharedHashTrie<u64> = SharedHashTrie::new();
        shared.update_with(|set| {
            set.insert(1);
            set.insert(2);
            set.insert(10);
        });
        assert_eq!(shared.len(), 3);
    }

    #[test]
    fn dropping_every_handle_releases_the_root() {
        let mut set: HashTrie<u64> = HashTrie::new();
        for value in 0..50 {
            set.insert(value);
        }
        let root = set.root().clone();
        let snapshot = set.clone();
        assert_eq!(root.refcount(), 3);
        drop(set);
        assert_eq!(root.refcount(), 2);
        drop(snapshot);
        assert_eq!(root.refcount(), 1);
    }
}
