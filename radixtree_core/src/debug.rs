//! Structural dump and invariant checks.

use crate::helpers::show;
use crate::types::{NodeId, RadixTree};
use log::warn;
use std::fmt::Write as _;

impl RadixTree {
    /// One line per reachable node, children indented under their parent:
    /// `#slot key="..." next=... child=...`.
    pub fn dump_nodes(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();

        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let _ = writeln!(
                out,
                "{:indent$}#{} key=\"{}\" next={:?} child={:?}",
                "",
                id.index(),
                show(node.key.as_bytes()),
                node.next.map(NodeId::index),
                node.child.map(NodeId::index),
                indent = depth * 2
            );
            if let Some(next) = node.next {
                stack.push((next, depth));
            }
            if let Some(child) = node.child {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Checks every reachable chain: strictly ascending keys, no two non-empty
    /// keys sharing a first byte, end markers without children, other nodes
    /// with children, and one end marker per stored string.
    pub fn is_well_formed(&self) -> bool {
        match self.check_invariants() {
            Ok(()) => true,
            Err(violation) => {
                warn!("[CHECK] {}", violation);
                false
            }
        }
    }

    fn check_invariants(&self) -> Result<(), String> {
        let live = self.live_nodes();
        let mut seen = 0usize;
        let mut markers = 0usize;
        let mut heads: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(head) = heads.pop() {
            let mut prev: Option<NodeId> = None;
            for id in self.siblings(Some(head)) {
                seen += 1;
                if seen > live {
                    return Err(format!("more reachable nodes than the {live} allocated"));
                }
                let node = self.node(id);
                match (node.is_eos(), node.child) {
                    (true, Some(_)) => return Err(format!("end marker #{} has children", id.index())),
                    (false, None) => {
                        return Err(format!(
                            "#{} \"{}\" has no continuation",
                            id.index(),
                            show(node.key.as_bytes())
                        ))
                    }
                    (true, None) => markers += 1,
                    (false, Some(child)) => heads.push(child),
                }
                if let Some(p) = prev {
                    let pk = &self.node(p).key;
                    if pk >= &node.key {
                        return Err(format!(
                            "#{} \"{}\" not above #{} \"{}\"",
                            id.index(),
                            show(node.key.as_bytes()),
                            p.index(),
                            show(pk.as_bytes())
                        ));
                    }
                    if !pk.is_empty() && pk.first() == node.key.first() {
                        return Err(format!(
                            "#{} and #{} share a first byte",
                            p.index(),
                            id.index()
                        ));
                    }
                }
                prev = Some(id);
            }
        }

        if markers != self.len {
            return Err(format!("{markers} end markers for {} strings", self.len));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChainSlot;

    #[test]
    fn dump_lists_every_node() {
        let mut t = RadixTree::new();
        t.insert(b"hell").unwrap();
        t.insert(b"hello").unwrap();
        let dump = t.dump_nodes();
        assert_eq!(dump.lines().count(), 4);
        assert!(dump.starts_with("#0 key=\"hell\""));
        assert!(dump.contains("  #1 key=\"\" next=Some(2) child=None"));
        assert!(dump.contains("    #3 key=\"\""));
    }

    #[test]
    fn detects_first_byte_collision() {
        let mut t = RadixTree::new();
        t.insert(b"ab").unwrap();
        assert!(t.is_well_formed());
        // bypass the insertion engine
        let id = t.insert_or_get(ChainSlot::Root, b"ac", None).unwrap();
        t.insert_or_get(ChainSlot::Child(id), b"", None).unwrap();
        t.len += 1;
        assert!(!t.is_well_formed());
    }

    #[test]
    fn detects_marker_count_mismatch() {
        let mut t = RadixTree::new();
        t.insert(b"x").unwrap();
        t.len = 2;
        assert!(!t.is_well_formed());
    }

    #[test]
    fn detects_dangling_node() {
        let mut t = RadixTree::new();
        t.insert_or_get(ChainSlot::Root, b"lonely", None).unwrap();
        assert!(!t.is_well_formed());
    }
}
