//! Constants and configuration defaults for the radix tree

/// Arena slots reserved up front by `RadixTree::new`.
pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// Hard ceiling on arena slots; `NodeId` is a `u32` index.
pub const MAX_NODES: usize = u32::MAX as usize;

// Canonical dump punctuation.
pub const OPEN: u8 = b'(';
pub const CLOSE: u8 = b')';
pub const SEPARATOR: u8 = b',';

// Metric names
pub const METRIC_INSERTS: &str = "radixtree_inserts_total";
pub const METRIC_SPLITS: &str = "radixtree_splits_total";
pub const METRIC_LOOKUPS: &str = "radixtree_lookups_total";
pub const METRIC_REMOVES: &str = "radixtree_removes_total";
pub const METRIC_NODES: &str = "radixtree_nodes";
pub const METRIC_EOS: &str = "radixtree_eos_markers";
pub const METRIC_KEY_BYTES: &str = "radixtree_key_bytes";
pub const METRIC_CHAINS: &str = "radixtree_chains";
