use crate::{
    errors::{record, Error, ErrorCode},
    handle_registry::{register_handle, unregister_handle, with_handle, with_handle_mut, HandleId},
    RadixTree, Stats,
};
use std::slice;

/// Aggregate figures returned by `radixtree_stats`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RadixStatsT {
    pub node_count: u64,
    pub eos_count: u64,
    pub total_key_bytes: u64,
    pub chain_count: u64,
    pub slot_span: u64,
}

impl From<Stats> for RadixStatsT {
    fn from(s: Stats) -> Self {
        Self {
            node_count: s.node_count as u64,
            eos_count: s.eos_count as u64,
            total_key_bytes: s.total_key_bytes as u64,
            chain_count: s.chain_count as u64,
            slot_span: s.slot_span() as u64,
        }
    }
}

// ─────────────────────────── helpers ─────────────────────────────────── //

/// Borrow `len` bytes at `ptr`; a zero length never dereferences.
#[inline]
fn bytes<'a>(ptr: *const u8, len: usize) -> Result<&'a [u8], ErrorCode> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ErrorCode::NullPointer);
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

// ─── small helper to turn Result<T,ErrorCode> into early-return ──────────
macro_rules! try_c { ($expr:expr) => { match $expr {
    Ok(v)  => v,
    Err(e) => return record(e),
}}}

// ───────────────────────── lifetime ──────────────────────────────────── //

/// Create an empty tree.
/// Returns `Success` **and** stores the handle in `*out`
/// -- or an error code otherwise.
#[no_mangle]
pub extern "C" fn radixtree_open(out: *mut HandleId) -> ErrorCode {
    if out.is_null() {
        return record(ErrorCode::NullPointer);
    }
    let id = register_handle(RadixTree::new());
    unsafe { *out = id };
    record(ErrorCode::Success)
}

/// Release a tree and every node it owns. The handle is invalid afterwards.
#[no_mangle]
pub extern "C" fn radixtree_close(h: HandleId) -> ErrorCode {
    try_c!(unregister_handle(h));
    record(ErrorCode::Success)
}

/// Drop all stored strings; the handle stays valid.
#[no_mangle]
pub extern "C" fn radixtree_clear(h: HandleId) -> ErrorCode {
    try_c!(with_handle_mut(h, RadixTree::clear));
    record(ErrorCode::Success)
}

// ───────────────────────── CRUD ──────────────────────────────────────── //

#[no_mangle]
pub extern "C" fn radixtree_insert(h: HandleId, word: *const u8, len: usize) -> ErrorCode {
    let word = try_c!(bytes(word, len));
    match try_c!(with_handle_mut(h, |t| t.insert(word))) {
        Ok(_) => record(ErrorCode::Success),
        Err(e) => record(ErrorCode::from(&e)),
    }
}

#[no_mangle]
pub extern "C" fn radixtree_exists(
    h: HandleId,
    word: *const u8,
    len: usize,
    out_found: *mut bool,
) -> ErrorCode {
    if out_found.is_null() {
        return record(ErrorCode::NullPointer);
    }
    let word = try_c!(bytes(word, len));
    let found = try_c!(with_handle(h, |t| t.exists(word)));
    unsafe { *out_found = found };
    record(ErrorCode::Success)
}

/// Best-effort removal; `*out_removed` tells whether the word was stored.
#[no_mangle]
pub extern "C" fn radixtree_remove(
    h: HandleId,
    word: *const u8,
    len: usize,
    out_removed: *mut bool,
) -> ErrorCode {
    let word = try_c!(bytes(word, len));
    let removed = try_c!(with_handle_mut(h, |t| t.remove(word)));
    if !out_removed.is_null() {
        unsafe { *out_removed = removed };
    }
    record(ErrorCode::Success)
}

// ───────────────────── dump & diagnostics ────────────────────────────── //

/// Write the canonical dump plus a NUL terminator into `buf`.
///
/// On `Success`, `*out_written` holds the dump length (terminator excluded).
/// On `BufferTooSmall`, it holds the buffer size required, terminator included.
#[no_mangle]
pub extern "C" fn radixtree_to_str(
    h: HandleId,
    buf: *mut u8,
    len: usize,
    out_written: *mut usize,
) -> ErrorCode {
    if out_written.is_null() || (buf.is_null() && len != 0) {
        return record(ErrorCode::NullPointer);
    }
    let out: &mut [u8] = if len == 0 {
        &mut []
    } else {
        unsafe { slice::from_raw_parts_mut(buf, len) }
    };

    let written = try_c!(with_handle(h, |t| match out.split_last_mut() {
        Some((_, body)) => t.serialize_into(body),
        None => Err(Error::BufferTooSmall {
            needed: t.serialize_bytes().len(),
            available: 0,
        }),
    }));

    match written {
        Ok(n) => {
            out[n] = 0;
            unsafe { *out_written = n };
            record(ErrorCode::Success)
        }
        Err(Error::BufferTooSmall { needed, .. }) => {
            unsafe { *out_written = needed + 1 };
            record(ErrorCode::BufferTooSmall)
        }
        Err(e) => record(ErrorCode::from(&e)),
    }
}

#[no_mangle]
pub extern "C" fn radixtree_stats(h: HandleId, out: *mut RadixStatsT) -> ErrorCode {
    if out.is_null() {
        return record(ErrorCode::NullPointer);
    }
    let stats = try_c!(with_handle(h, RadixTree::report_metrics));
    unsafe { *out = stats.into() };
    record(ErrorCode::Success)
}

// ───────────────────── convenience ─────────────────────────────────── //

/// Number of stored strings, or 0 for an unknown handle.
#[no_mangle]
pub extern "C" fn radixtree_len(h: HandleId) -> u64 {
    match with_handle(h, RadixTree::len) {
        Ok(n) => n as u64,
        Err(e) => {
            record(e);
            0
        }
    }
}
