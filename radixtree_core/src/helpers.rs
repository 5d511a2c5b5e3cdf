//! Helper functions for radix tree operations

use crate::errors::Error;

/// Length of the prefix shared by `a` and `b`.
#[inline]
pub fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Copies `bytes` into a new vector, reporting allocation failure instead of aborting.
pub fn try_copy(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(bytes.len())?;
    v.extend_from_slice(bytes);
    Ok(v)
}

/// Renders bytes for log lines; keys are opaque so invalid UTF-8 is escaped.
pub fn show(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}
