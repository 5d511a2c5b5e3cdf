//! Sibling-chain manager.
//!
//! A chain is a singly-linked run of nodes at one tree level, sorted strictly
//! ascending by key, with at most one non-empty key per first byte. The head
//! of every chain lives in a [`ChainSlot`] (the tree root or a parent's
//! `child` field), so linking a new first element only rewrites the slot and
//! every existing `NodeId` keeps naming the same node.

use crate::constants::MAX_NODES;
use crate::errors::Error;
use crate::helpers::{shared_prefix_len, show};
use crate::types::{ByteKey, ChainSlot, Node, NodeId, RadixTree};
use log::{trace, warn};

/// Iterator over the ids of one sibling chain, in chain order.
pub struct Siblings<'a> {
    tree: &'a RadixTree,
    cur: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.tree.node(id).next;
        Some(id)
    }
}

impl RadixTree {
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn head(&self, slot: ChainSlot) -> Option<NodeId> {
        match slot {
            ChainSlot::Root => self.root,
            ChainSlot::Child(id) => self.node(id).child,
        }
    }

    fn set_head(&mut self, slot: ChainSlot, head: Option<NodeId>) {
        match slot {
            ChainSlot::Root => self.root = head,
            ChainSlot::Child(id) => self.node_mut(id).child = head,
        }
    }

    pub(crate) fn siblings(&self, head: Option<NodeId>) -> Siblings<'_> {
        Siblings { tree: self, cur: head }
    }

    /// Node in `slot`'s chain whose key is exactly `key`.
    pub(crate) fn find_exact(&self, slot: ChainSlot, key: &[u8]) -> Option<NodeId> {
        for id in self.siblings(self.head(slot)) {
            let k = self.node(id).key.as_bytes();
            if k == key {
                return Some(id);
            }
            if k > key {
                break;
            }
        }
        None
    }

    /// The one non-empty-key node whose first byte matches `word`'s, with the
    /// length of the prefix the two share.
    pub(crate) fn longest_prefix(&self, slot: ChainSlot, word: &[u8]) -> Option<(NodeId, usize)> {
        let wc = *word.first()?;
        self.siblings(self.head(slot)).find_map(|id| {
            let key = &self.node(id).key;
            (key.first() == Some(wc)).then(|| (id, shared_prefix_len(word, key.as_bytes())))
        })
    }

    /// Returns the node keyed `key` in `slot`'s chain, creating it in sorted
    /// position when absent. `child` seeds a newly created node only; an
    /// existing node is returned untouched.
    pub(crate) fn insert_or_get(
        &mut self,
        slot: ChainSlot,
        key: &[u8],
        child: Option<NodeId>,
    ) -> Result<NodeId, Error> {
        if let Some(found) = self.find_exact(slot, key) {
            return Ok(found);
        }

        let id = self.alloc_node(ByteKey::try_from_slice(key)?, child)?;

        let mut prev = None;
        let mut cur = self.head(slot);
        while let Some(c) = cur {
            if key <= self.node(c).key.as_bytes() {
                break;
            }
            prev = Some(c);
            cur = self.node(c).next;
        }

        self.node_mut(id).next = cur;
        match prev {
            Some(p) => self.node_mut(p).next = Some(id),
            None => self.set_head(slot, Some(id)),
        }
        trace!(
            "[CHAIN] linked {:?} key=\"{}\" after {:?} in {:?}",
            id,
            show(key),
            prev,
            slot
        );
        Ok(id)
    }

    /// Unlinks `target` from `slot`'s chain. The node itself stays allocated.
    pub(crate) fn unlink(&mut self, slot: ChainSlot, target: NodeId) -> bool {
        let mut prev = None;
        let mut cur = self.head(slot);
        while let Some(c) = cur {
            if c == target {
                let next = self.node_mut(c).next.take();
                match prev {
                    Some(p) => self.node_mut(p).next = next,
                    None => self.set_head(slot, next),
                }
                return true;
            }
            prev = Some(c);
            cur = self.node(c).next;
        }
        false
    }

    #[inline]
    pub(crate) fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn alloc_node(&mut self, key: ByteKey, child: Option<NodeId>) -> Result<NodeId, Error> {
        let live = self.live_nodes();
        if self.config.node_limit.is_some_and(|limit| live >= limit) {
            warn!("[ALLOC] node limit reached at {} live nodes", live);
            return Err(Error::OutOfMemory);
        }
        let node = Node { key, child, next: None };

        if let Some(id) = self.free.pop() {
            trace!("[ALLOC] reusing freed slot {:?}", id);
            *self.node_mut(id) = node;
            return Ok(id);
        }
        if self.nodes.len() >= MAX_NODES {
            return Err(Error::OutOfMemory);
        }
        self.nodes.try_reserve(1)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    /// Returns an unlinked node's slot to the free list.
    pub(crate) fn free_node(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.key.clear();
        node.child = None;
        node.next = None;
        self.free.push(id);
    }
}
