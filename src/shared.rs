use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::hash_trie::HashTrie;
use crate::trie_node::NodeRef;

/// One published version of a trie: its root and its value count.  Versions
/// are immutable once published; publication swaps in a whole new pair.
pub(crate) struct TrieData<T> {
    root: NodeRef<T>,
    size: usize,
}

/// A trie version shared between threads.
///
/// The container holds the current `(root, size)` pair in a lock-free cell.
/// Readers take [`snapshot`](Self::snapshot)s; writers run optimistic
/// [`Transaction`]s that publish a new pair by compare-and-swap and rebase on
/// conflict.  Mutation never happens inside a published trie, only by
/// replacing which trie is published, so readers need no coordination at all.
pub struct SharedHashTrie<T, S = RandomState> {
    data: ArcSwap<TrieData<T>>,
    hasher: S,
}

impl<T, S: BuildHasher + Default> SharedHashTrie<T, S> {
    /// Creates a container publishing an empty trie.
    pub fn new() -> Self {
        Self::from(HashTrie::new())
    }
}

impl<T, S: BuildHasher + Default> Default for SharedHashTrie<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: BuildHasher> From<HashTrie<T, S>> for SharedHashTrie<T, S> {
    fn from(trie: HashTrie<T, S>) -> Self {
        let (root, size, hasher) = trie.into_raw_parts();
        Self {
            data: ArcSwap::new(Arc::new(TrieData { root, size })),
            hasher,
        }
    }
}

impl<T, S: BuildHasher> SharedHashTrie<T, S> {
    /// Size of the currently published version.
    pub fn len(&self) -> usize {
        self.data.load().size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether publication is lock-free.  The cell is an [`ArcSwap`], whose
    /// loads and compare-and-swaps never take a lock, so this holds on every
    /// supported target.
    pub fn is_lock_free(&self) -> bool {
        true
    }

    /// An O(1) handle on the currently published version.  Later commits do
    /// not affect it.
    pub fn snapshot(&self) -> HashTrie<T, S>
    where
        S: Clone,
    {
        let data = self.data.load();
        HashTrie::from_parts(data.root.clone(), data.size, self.hasher.clone())
    }

    /// Starts an optimistic transaction based on the currently published
    /// version.
    pub fn start_transaction(&self) -> Transaction<'_, T, S> {
        Transaction {
            base: self.data.load_full(),
            shared: self,
        }
    }

    /// Runs `f` against a private copy of the published trie and commits the
    /// result, retrying from the latest version for as long as concurrent
    /// commits win the race.  See [`Transaction::update_with`].
    pub fn update_with(&self, f: impl FnMut(&mut HashTrie<T, S>))
    where
        S: Clone,
    {
        self.start_transaction().update_with(f);
    }

    /// Publishes `new` iff `expected` is still the current pair.  On failure
    /// `expected` is rebased to the pair that was actually published.
    fn reset(&self, expected: &mut Arc<TrieData<T>>, new: Arc<TrieData<T>>) -> bool {
        let previous = self.data.compare_and_swap(&*expected, Arc::clone(&new));
        if Arc::ptr_eq(&*previous, expected) {
            *expected = new;
            true
        } else {
            *expected = Guard::into_inner(previous);
            false
        }
    }
}

impl<T, S> fmt::Debug for SharedHashTrie<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHashTrie")
            .field("len", &self.data.load().size)
            .finish_non_exhaustive()
    }
}

/// An optimistic attempt to publish a new trie version.
///
/// The transaction pins the pair it started from.  Committing succeeds only
/// if that pair is still the published one; otherwise the base is rebased
/// onto the winner and the caller can rebuild and retry, which
/// [`update_with`](Self::update_with) automates.
pub struct Transaction<'a, T, S = RandomState> {
    base: Arc<TrieData<T>>,
    shared: &'a SharedHashTrie<T, S>,
}

impl<T, S: BuildHasher + Clone> Transaction<'_, T, S> {
    /// A private handle on the base version, sharing its nodes.
    pub fn get(&self) -> HashTrie<T, S> {
        HashTrie::from_parts(
            self.base.root.clone(),
            self.base.size,
            self.shared.hasher.clone(),
        )
    }

    /// Attempts to publish `modified` in place of the base version.  Returns
    /// `false` when another commit got there first; the transaction is then
    /// rebased onto the current version, and [`get`](Self::get) starts from
    /// there.
    pub fn try_commit(&mut self, modified: HashTrie<T, S>) -> bool {
        let (root, size, _) = modified.into_raw_parts();
        self.shared.reset(&mut self.base, Arc::new(TrieData { root, size }))
    }

    /// Build, mutate, commit: hand `f` a copy of the base version, stop if
    /// `f` changed nothing, otherwise commit or rebase and go again.  Each
    /// retry observes the newest published pair, so the loop makes progress
    /// unless it loses every race indefinitely.
    pub fn update_with(&mut self, mut f: impl FnMut(&mut HashTrie<T, S>)) {
        loop {
            let mut copy = self.get();
            f(&mut copy);
            if copy.root().ptr_eq(&self.base.root) {
                break;
            }
            if self.try_commit(copy) {
                break;
            }
        }
    }
}

impl<T, S> fmt::Debug for Transaction<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("base_len", &self.base.size)
            .finish_non_exhaustive()
    }
}
