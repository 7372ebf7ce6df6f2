use smallvec::SmallVec;

use crate::trie_node::{chunk_bit, compact_index, NodeRef};

/// Sparse 32-way interior node.
///
/// Bit `i` of `bitmap` is set iff sparse slot `i` holds a child; the children
/// themselves sit packed in `children` in ascending slot order, so a slot's
/// physical position is the popcount of the bitmap bits below it.
///
/// Apart from the empty root, construction never produces a branch with fewer
/// than two meaningful descendants: single-child branches only appear as links
/// in a collision chain that ends in a two-leaf branch.
pub(crate) struct BranchNode<T> {
    bitmap: u32,
    children: SmallVec<[NodeRef<T>; 2]>,
}

impl<T> BranchNode<T> {
    /// The empty root.  The only branch allowed to have no children.
    pub fn empty() -> Self {
        Self {
            bitmap: 0,
            children: SmallVec::new(),
        }
    }

    /// A branch with one child at slot `chunk`.
    pub fn single(chunk: u32, child: NodeRef<T>) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self {
            bitmap: chunk_bit(chunk),
            children,
        }
    }

    /// A branch holding two leaves at distinct slots, stored in ascending
    /// slot order.
    pub fn pair(chunk1: u32, leaf1: NodeRef<T>, chunk2: u32, leaf2: NodeRef<T>) -> Self {
        debug_assert_ne!(chunk1, chunk2);
        let mut children = SmallVec::new();
        if chunk1 < chunk2 {
            children.push(leaf1);
            children.push(leaf2);
        } else {
            children.push(leaf2);
            children.push(leaf1);
        }
        Self {
            bitmap: chunk_bit(chunk1) | chunk_bit(chunk2),
            children,
        }
    }

    /// A copy of this branch with `child` added at the currently-empty slot
    /// `chunk`.  Children below the split point keep their positions, the
    /// rest shift up by one; all of them are shared with the original.
    pub fn with_inserted(&self, chunk: u32, child: NodeRef<T>) -> Self {
        debug_assert_eq!(self.bitmap & chunk_bit(chunk), 0);
        let split = compact_index(self.bitmap, chunk);
        let mut children = self.children.clone();
        children.insert(split, child);
        Self {
            bitmap: self.bitmap | chunk_bit(chunk),
            children,
        }
    }

    /// A copy of this branch with the child at the occupied slot `chunk`
    /// substituted.  Arity and bitmap are unchanged; the siblings are shared
    /// with the original.
    pub fn with_replaced(&self, chunk: u32, child: NodeRef<T>) -> Self {
        debug_assert_ne!(self.bitmap & chunk_bit(chunk), 0);
        let mut children = self.children.clone();
        children[compact_index(self.bitmap, chunk)] = child;
        Self {
            bitmap: self.bitmap,
            children,
        }
    }

    #[inline]
    pub fn bitmap(&self) -> u32 {
        self.bitmap
    }

    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.bitmap.count_ones() as usize, self.children.len());
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitmap == 0
    }

    /// Direct compact-index access.
    #[inline]
    pub fn child_at(&self, compact: usize) -> &NodeRef<T> {
        &self.children[compact]
    }

    /// Sparse-slot access; `None` when the slot is unoccupied.
    #[inline]
    pub fn child_at_chunk(&self, chunk: u32) -> Option<&NodeRef<T>> {
        if self.bitmap & chunk_bit(chunk) == 0 {
            None
        } else {
            Some(&self.children[compact_index(self.bitmap, chunk)])
        }
    }
}
