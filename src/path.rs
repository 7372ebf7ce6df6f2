use arrayvec::ArrayVec;

use crate::branch_node::BranchNode;
use crate::leaf_node::LeafNode;
use crate::trie_node::{ChunkedHash, NodeRef, TrieNode, MAX_DEPTH};

/// A recorded descent from the root toward a hash's home slot.
///
/// Descent follows one 5-bit chunk per branch and stops at the first leaf it
/// meets, or at the branch whose slot for the current chunk is empty.  The
/// `(branch, chunk)` pairs passed through on the way down are kept so the
/// mutation can be folded back up into a fresh root.
pub(crate) struct Path<'a, T> {
    steps: ArrayVec<(&'a BranchNode<T>, u32), MAX_DEPTH>,
    last_branch: &'a BranchNode<T>,
    leaf: Option<&'a NodeRef<T>>,
    cursor: ChunkedHash,
}

impl<'a, T> Path<'a, T> {
    pub fn new(root: &'a BranchNode<T>, hash: u64) -> Self {
        let mut cursor = ChunkedHash::new(hash);
        let mut steps = ArrayVec::new();
        let mut last_branch = root;
        loop {
            match last_branch.child_at_chunk(cursor.chunk()) {
                None => {
                    return Self {
                        steps,
                        last_branch,
                        leaf: None,
                        cursor,
                    }
                }
                Some(child) => match child.borrow() {
                    TrieNode::Leaf(_) => {
                        return Self {
                            steps,
                            last_branch,
                            leaf: Some(child),
                            cursor,
                        }
                    }
                    TrieNode::Branch(branch) => {
                        steps.push((last_branch, cursor.chunk()));
                        last_branch = branch;
                        cursor.advance();
                    }
                },
            }
        }
    }

    /// Number of branches descended *into*; also the level the descent
    /// stopped at.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// The deepest branch reached.
    #[inline]
    pub fn last_branch(&self) -> &'a BranchNode<T> {
        self.last_branch
    }

    /// The leaf the descent ended on, if the slot was occupied by one.
    pub fn leaf(&self) -> Option<&'a LeafNode<T>> {
        self.leaf.map(|node| node.borrow().as_leaf())
    }

    /// The shared handle of that leaf, for callers that need to keep it alive
    /// in a rebuilt subtree.
    #[inline]
    pub fn leaf_ref(&self) -> Option<&'a NodeRef<T>> {
        self.leaf
    }

    /// The chunk indexing `last_branch` at the stopping level.
    #[inline]
    pub fn chunk(&self) -> u32 {
        self.cursor.chunk()
    }

    #[inline]
    pub fn whole_hash(&self) -> u64 {
        self.cursor.whole()
    }

    /// The chunk cursor as it stood when descent stopped.
    #[inline]
    pub fn cursor(&self) -> ChunkedHash {
        self.cursor
    }

    /// Folds the recorded path back up around a replacement for the deepest
    /// branch, producing a fresh root.  One new branch is allocated per
    /// recorded level; every sibling subtree is shared with the original.
    pub fn rewrite(&self, new_last_branch: BranchNode<T>) -> NodeRef<T> {
        let mut current = new_last_branch;
        for (branch, chunk) in self.steps.iter().rev() {
            current = branch.with_replaced(*chunk, NodeRef::new_branch(current));
        }
        NodeRef::new_branch(current)
    }
}

/// Computes the root of a trie equal to `root` plus `value`, or `None` when
/// `value` is already present and the trie is unchanged.
pub(crate) fn inserted<T: Clone + PartialEq>(
    root: &BranchNode<T>,
    value: T,
    hash: u64,
) -> Option<NodeRef<T>> {
    let path = Path::new(root, hash);

    let existing_ref = match path.leaf_ref() {
        // The slot is empty: hang a fresh leaf there.
        None => {
            let leaf = NodeRef::new_leaf(LeafNode::new(value, path.whole_hash()));
            let branch = path.last_branch().with_inserted(path.chunk(), leaf);
            return Some(path.rewrite(branch));
        }
        Some(node) => node,
    };
    let existing = existing_ref.borrow().as_leaf();

    if existing.find(&value).is_some() {
        return None;
    }

    if existing.hash() == hash {
        // Full 64-bit collision: grow the bucket.
        let grown = NodeRef::new_leaf(existing.with_appended_value(value));
        let branch = path.last_branch().with_replaced(path.chunk(), grown);
        return Some(path.rewrite(branch));
    }

    // The two hashes agree on every chunk consumed so far but differ somewhere
    // below.  Align the existing leaf's cursor with the stopping level, step
    // both cursors one level down, and build the chain that routes both leaves
    // to their first diverging chunk.
    let mut existing_hash = ChunkedHash::new(existing.hash());
    existing_hash.advance_by(path.len());
    existing_hash.advance();
    let mut new_hash = path.cursor();
    new_hash.advance();

    let new_leaf = NodeRef::new_leaf(LeafNode::new(value, path.whole_hash()));
    let chain = extend(existing_hash, existing_ref.clone(), new_hash, new_leaf);
    let branch = path
        .last_branch()
        .with_replaced(path.chunk(), NodeRef::new_branch(chain));
    Some(path.rewrite(branch))
}

/// Builds the branch chain routing two leaves with distinct hashes down to the
/// first chunk where they diverge: single-child links while the chunks agree,
/// then a two-leaf branch.  The existing leaf is shared into the chain; the
/// original trie keeps its own handle.
fn extend<T>(
    mut existing_hash: ChunkedHash,
    existing_leaf: NodeRef<T>,
    mut new_hash: ChunkedHash,
    new_leaf: NodeRef<T>,
) -> BranchNode<T> {
    if existing_hash.chunk() == new_hash.chunk() {
        let shared_chunk = new_hash.chunk();
        existing_hash.advance();
        new_hash.advance();
        let child = extend(existing_hash, existing_leaf, new_hash, new_leaf);
        BranchNode::single(shared_chunk, NodeRef::new_branch(child))
    } else {
        BranchNode::pair(
            existing_hash.chunk(),
            existing_leaf,
            new_hash.chunk(),
            new_leaf,
        )
    }
}

/// Finds the stored value equal to `value`, following `hash` down from `root`.
pub(crate) fn lookup<'a, T: PartialEq>(
    root: &'a BranchNode<T>,
    value: &T,
    hash: u64,
) -> Option<&'a T> {
    let path = Path::new(root, hash);
    path.leaf().and_then(|leaf| leaf.find(value))
}
