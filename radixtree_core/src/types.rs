//! Data structures for the radix tree

use crate::constants::DEFAULT_INITIAL_CAPACITY;
use crate::errors::Error;
use crate::helpers::try_copy;

/// Arena slot index; a node's identity for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owned key bytes. Ordering is byte-wise with the shorter key first on ties,
/// which is exactly slice ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteKey(Vec<u8>);

impl ByteKey {
    /// The zero-length end-of-string key.
    pub const EOS: ByteKey = ByteKey(Vec::new());

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, Error> {
        try_copy(bytes).map(ByteKey)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// Split support: keep the first `len` bytes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Undoes `truncate`. The bytes fit the capacity the key kept.
    pub(crate) fn rejoin(&mut self, tail: &[u8]) {
        self.0.extend_from_slice(tail);
    }

    /// Releases the key's allocation; used when a slot is freed.
    pub(crate) fn clear(&mut self) {
        self.0 = Vec::new();
    }
}

/// Node in the radix tree arena
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub key: ByteKey,
    /// Head of the chain of continuations after `key`.
    pub child: Option<NodeId>,
    /// Next sibling, ascending key order.
    pub next: Option<NodeId>,
}

impl Node {
    #[inline]
    pub fn is_eos(&self) -> bool {
        self.key.is_empty()
    }
}

/// Where a sibling chain's head is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSlot {
    Root,
    Child(NodeId),
}

/// Construction-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Arena slots reserved up front.
    pub initial_capacity: usize,
    /// Maximum live nodes; inserts needing more fail with `OutOfMemory`.
    pub node_limit: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            node_limit: None,
        }
    }
}

/// Aggregate figures from a full walk of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub node_count: usize,
    /// Zero-length end-of-string markers, i.e. stored strings.
    pub eos_count: usize,
    pub total_key_bytes: usize,
    /// Distinct sibling chains, root chain included.
    pub chain_count: usize,
    /// Lowest and highest arena slot reachable from the root.
    pub lowest_slot: Option<usize>,
    pub highest_slot: Option<usize>,
}

impl Stats {
    /// Width of the arena range the live nodes occupy.
    pub fn slot_span(&self) -> usize {
        match (self.lowest_slot, self.highest_slot) {
            (Some(lo), Some(hi)) => hi - lo + 1,
            _ => 0,
        }
    }
}

/// RadixTree struct (core handle)
///
/// Not designed for concurrent mutation: all mutating operations take
/// `&mut self`, so sharing a tree between threads requires external
/// synchronization (the C ABI goes through the handle registry for that).
#[derive(Clone)]
pub struct RadixTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) free: Vec<NodeId>,
    pub(crate) root: Option<NodeId>,
    pub(crate) len: usize,
    pub(crate) config: TreeConfig,
}
