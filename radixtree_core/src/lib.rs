//! # radixtree_core
//!
//! An in-memory compressed-prefix tree over opaque byte strings.
//!
//! ```rust
//! use radixtree_core::RadixTree;
//!
//! let mut tree = RadixTree::new();
//! tree.insert(b"hell").unwrap();
//! tree.insert(b"hello").unwrap();
//!
//! assert!(tree.exists(b"hell"));
//! assert!(!tree.exists(b"hel"));
//! assert_eq!(tree.serialize(), "hell(,o())");
//! ```

pub mod chain;
pub mod constants;
pub mod debug;
pub mod errors;
pub mod handle_registry;
pub mod helpers;
pub mod telemetry;
pub mod types;
pub mod url_tree;

pub use errors::{Error, ErrorCode};
pub use types::{ByteKey, NodeId, RadixTree, Stats, TreeConfig};

use constants::*;
use helpers::{show, try_copy};
use log::{debug, info, trace};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use std::fmt;
use types::ChainSlot;

/// One step of the iterative canonical dump.
enum Emit {
    Node(NodeId),
    Separator,
    Close,
}

impl RadixTree {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            // Fallback: simple env_logger with RFC‑3339 ts off.
            let _ = env_logger::builder()
                .format_timestamp(None)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    /// Empty tree with default settings.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self::ensure_logging();
        telemetry::init();

        let mut nodes = Vec::new();
        // A failed reservation is not fatal here; the first insert reports it.
        let _ = nodes.try_reserve(config.initial_capacity.min(MAX_NODES));
        debug!("[OPEN] config={:?}", config);
        Self {
            nodes,
            free: Vec::new(),
            root: None,
            len: 0,
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of stored strings.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Releases every node. The tree is empty and reusable afterwards.
    pub fn clear(&mut self) {
        info!("[CLEAR] Clearing tree of {} nodes.", self.live_nodes());
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Inserts `word`. Returns `Ok(false)` when it was already stored.
    pub fn insert(&mut self, word: &[u8]) -> Result<bool, Error> {
        counter!(METRIC_INSERTS).increment(1);
        debug!("[INSERT] word=\"{}\"", show(word));

        let mut slot = ChainSlot::Root;
        let mut rest = word;
        // At most one split per insert: below it only the remainder remains,
        // and that never shares a first byte with what is left of `word`.
        let mut split = None;

        while let Some((id, lp)) = self.longest_prefix(slot, rest) {
            if lp < self.node(id).key.len() {
                self.split(id, lp)?;
                split = Some(id);
            } else {
                trace!("[INSERT] segment {:?} fully matched", id);
            }
            rest = &rest[lp..];
            slot = ChainSlot::Child(id);
        }

        let added = match self.attach(slot, rest) {
            Ok(added) => added,
            Err(e) => {
                if let Some(id) = split {
                    self.unsplit(id);
                }
                return Err(e);
            }
        };
        if added {
            self.len += 1;
        } else {
            debug!("[INSERT] \"{}\" already present", show(word));
        }

        #[cfg(feature = "trace")]
        trace!("[INSERT] done:\n{}", self.dump_nodes());
        debug_assert!(self.is_well_formed(), "chain invariants broken by insert");
        Ok(added)
    }

    /// Inserts every word, stopping at the first error. Returns how many were new.
    pub fn insert_all<I, W>(&mut self, words: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        let mut added = 0;
        for word in words {
            if self.insert(word.as_ref())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Rewrites `id` into its first `at` key bytes, moving the rest of the key
    /// and the existing child chain into a new sole child.
    fn split(&mut self, id: NodeId, at: usize) -> Result<(), Error> {
        counter!(METRIC_SPLITS).increment(1);
        let remainder = try_copy(&self.node(id).key.as_bytes()[at..])?;
        let below = self.node_mut(id).child.take();

        if let Err(e) = self.insert_or_get(ChainSlot::Child(id), &remainder, below) {
            self.node_mut(id).child = below;
            return Err(e);
        }
        self.node_mut(id).key.truncate(at);
        trace!(
            "[INSERT] split {:?} into \"{}\" + \"{}\"",
            id,
            show(self.node(id).key.as_bytes()),
            show(&remainder)
        );
        Ok(())
    }

    /// Hangs the unmatched `rest` below `slot` and marks the end of the word.
    /// On failure nothing added here stays linked.
    fn attach(&mut self, slot: ChainSlot, rest: &[u8]) -> Result<bool, Error> {
        // Nothing else in the chain shares the tail's first byte, so the
        // tail node is always new.
        let mut tail = None;
        let mut slot = slot;
        if !rest.is_empty() {
            let id = self.insert_or_get(slot, rest, None)?;
            tail = Some((slot, id));
            slot = ChainSlot::Child(id);
        }

        if self.find_exact(slot, &[]).is_some() {
            return Ok(false);
        }
        if let Err(e) = self.insert_or_get(slot, &[], None) {
            if let Some((parent, id)) = tail {
                self.unlink(parent, id);
                self.free_node(id);
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Undoes `split`: folds the sole remainder child back into `id`.
    fn unsplit(&mut self, id: NodeId) {
        let Some(remainder) = self.node(id).child else {
            return;
        };
        let tail = std::mem::take(&mut self.node_mut(remainder).key);
        let below = self.node_mut(remainder).child.take();
        let node = self.node_mut(id);
        node.key.rejoin(tail.as_bytes());
        node.child = below;
        self.free_node(remainder);
        trace!("[INSERT] rolled back split of {:?}", id);
    }

    /// Follows exact segment matches for all of `word`, reporting each matched
    /// node, and returns the slot of the chain reached.
    fn descend_exact(&self, word: &[u8], mut on_step: impl FnMut(NodeId)) -> Option<ChainSlot> {
        let mut slot = ChainSlot::Root;
        let mut rest = word;
        while !rest.is_empty() {
            let (id, lp) = self.longest_prefix(slot, rest)?;
            if lp != self.node(id).key.len() {
                return None;
            }
            on_step(id);
            rest = &rest[lp..];
            slot = ChainSlot::Child(id);
        }
        Some(slot)
    }

    /// True iff `word` was inserted (and not removed since).
    pub fn exists(&self, word: &[u8]) -> bool {
        counter!(METRIC_LOOKUPS).increment(1);
        let found = self
            .descend_exact(word, |_| {})
            .is_some_and(|slot| self.find_exact(slot, &[]).is_some());
        trace!("[LOOKUP] \"{}\" -> {}", show(word), found);
        found
    }

    /// Best-effort removal: drops the string's end marker and prunes nodes
    /// left without continuations. Surviving single-child chains are not
    /// merged back into their parents.
    pub fn remove(&mut self, word: &[u8]) -> bool {
        counter!(METRIC_REMOVES).increment(1);
        debug!("[REMOVE] word=\"{}\"", show(word));

        let mut path = Vec::new();
        let Some(slot) = self.descend_exact(word, |id| path.push(id)) else {
            debug!("[REMOVE] Diverged. Word not found.");
            return false;
        };
        let Some(eos) = self.find_exact(slot, &[]) else {
            debug!("[REMOVE] No end marker. Word not found.");
            return false;
        };
        self.unlink(slot, eos);
        self.free_node(eos);
        self.len -= 1;

        while let Some(&id) = path.last() {
            if self.node(id).child.is_some() {
                break;
            }
            path.pop();
            let parent = path.last().map_or(ChainSlot::Root, |&p| ChainSlot::Child(p));
            self.unlink(parent, id);
            self.free_node(id);
            trace!("[REMOVE] pruned {:?}", id);
        }

        debug_assert!(self.is_well_formed(), "chain invariants broken by remove");
        true
    }

    /// Canonical dump as raw bytes: siblings joined by `,`, a node with a
    /// child chain rendered as `key(children)`.
    pub fn serialize_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stack: Vec<Emit> = self.root.map(Emit::Node).into_iter().collect();

        while let Some(step) = stack.pop() {
            match step {
                Emit::Separator => out.push(SEPARATOR),
                Emit::Close => out.push(CLOSE),
                Emit::Node(id) => {
                    let node = self.node(id);
                    out.extend_from_slice(node.key.as_bytes());
                    if let Some(next) = node.next {
                        stack.push(Emit::Node(next));
                        stack.push(Emit::Separator);
                    }
                    if let Some(child) = node.child {
                        out.push(OPEN);
                        stack.push(Emit::Close);
                        stack.push(Emit::Node(child));
                    }
                }
            }
        }
        out
    }

    /// Canonical dump as text; key bytes that are not UTF-8 are replaced.
    pub fn serialize(&self) -> String {
        String::from_utf8_lossy(&self.serialize_bytes()).into_owned()
    }

    /// Writes the canonical dump into `buf`, returning the bytes written.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let text = self.serialize_bytes();
        let available = buf.len();
        let dst = buf.get_mut(..text.len()).ok_or(Error::BufferTooSmall {
            needed: text.len(),
            available,
        })?;
        dst.copy_from_slice(&text);
        Ok(text.len())
    }

    /// Every stored string, ascending.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len);
        let mut path: Vec<u8> = Vec::new();
        // (node, length of `path` before this node's key)
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();

        while let Some((id, base)) = stack.pop() {
            let node = self.node(id);
            path.truncate(base);
            path.extend_from_slice(node.key.as_bytes());
            if node.is_eos() {
                out.push(path.clone());
            }
            if let Some(next) = node.next {
                stack.push((next, base));
            }
            if let Some(child) = node.child {
                stack.push((child, path.len()));
            }
        }
        out
    }

    /// Aggregate counts over every reachable node.
    pub fn stats(&self) -> Stats {
        let mut s = Stats::default();
        let mut heads: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(head) = heads.pop() {
            s.chain_count += 1;
            for id in self.siblings(Some(head)) {
                let node = self.node(id);
                s.node_count += 1;
                s.total_key_bytes += node.key.len();
                if node.is_eos() {
                    s.eos_count += 1;
                }
                let i = id.index();
                s.lowest_slot = Some(s.lowest_slot.map_or(i, |lo| lo.min(i)));
                s.highest_slot = Some(s.highest_slot.map_or(i, |hi| hi.max(i)));
                if let Some(child) = node.child {
                    heads.push(child);
                }
            }
        }
        s
    }

    /// Publishes `stats()` as gauges (caller decides cadence).
    pub fn report_metrics(&self) -> Stats {
        let s = self.stats();
        gauge!(METRIC_NODES).set(s.node_count as f64);
        gauge!(METRIC_EOS).set(s.eos_count as f64);
        gauge!(METRIC_KEY_BYTES).set(s.total_key_bytes as f64);
        gauge!(METRIC_CHAINS).set(s.chain_count as f64);
        s
    }
} // end impl RadixTree

impl Default for RadixTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Trees are equal when their canonical dumps match. Removal never re-merges
/// segments, so two trees holding the same strings can still differ.
impl PartialEq for RadixTree {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.serialize_bytes() == other.serialize_bytes()
    }
}

impl Eq for RadixTree {}

impl fmt::Display for RadixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl fmt::Debug for RadixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadixTree")
            .field("len", &self.len)
            .field("nodes", &self.live_nodes())
            .field("dump", &self.serialize())
            .finish()
    }
}

// Public module for C API functions
pub mod public_api;

// Re-export all public API functions at the crate root
pub use errors::{radixtree_last_error, radixtree_strerror};
pub use public_api::*;
pub use url_tree::UrlTree;
