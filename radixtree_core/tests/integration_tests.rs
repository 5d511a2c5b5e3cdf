use std::{
    ffi::CStr,
    sync::{Arc, Barrier},
    thread,
};

use radixtree_core::{
    handle_registry::HandleId, radixtree_clear, radixtree_close, radixtree_exists,
    radixtree_insert, radixtree_last_error, radixtree_len, radixtree_open, radixtree_remove,
    radixtree_stats, radixtree_strerror, radixtree_to_str, ErrorCode, RadixStatsT,
};

/// Helper: open a tree through the C ABI.
fn open() -> HandleId {
    let mut h: HandleId = 0;
    assert_eq!(radixtree_open(&mut h), ErrorCode::Success);
    assert_ne!(h, 0);
    h
}

fn insert(h: HandleId, word: &str) -> ErrorCode {
    radixtree_insert(h, word.as_ptr(), word.len())
}

fn exists(h: HandleId, word: &str) -> bool {
    let mut found = false;
    assert_eq!(
        radixtree_exists(h, word.as_ptr(), word.len(), &mut found),
        ErrorCode::Success
    );
    found
}

fn dump(h: HandleId) -> String {
    let mut buf = [0u8; 256];
    let mut written = 0usize;
    assert_eq!(
        radixtree_to_str(h, buf.as_mut_ptr(), buf.len(), &mut written),
        ErrorCode::Success
    );
    assert_eq!(buf[written], 0);
    String::from_utf8(buf[..written].to_vec()).unwrap()
}

#[test]
fn basic_insert_lookup_remove() {
    let h = open();
    assert!(!exists(h, "hello"));
    assert_eq!(insert(h, "hello"), ErrorCode::Success);
    assert_eq!(insert(h, "hell"), ErrorCode::Success);
    assert!(exists(h, "hello"));
    assert!(exists(h, "hell"));
    assert!(!exists(h, "he"));
    assert_eq!(dump(h), "hell(,o())");
    assert_eq!(radixtree_len(h), 2);

    let mut removed = false;
    assert_eq!(
        radixtree_remove(h, b"hello".as_ptr(), 5, &mut removed),
        ErrorCode::Success
    );
    assert!(removed);
    assert!(!exists(h, "hello"));
    assert_eq!(dump(h), "hell()");

    assert_eq!(radixtree_close(h), ErrorCode::Success);
}

#[test]
fn to_str_reports_required_size() {
    let h = open();
    for w in ["http://foo", "http://foo/bar", "http://baz"] {
        assert_eq!(insert(h, w), ErrorCode::Success);
    }
    let expected = "http://(baz(),foo(,/bar()))";

    let mut small = [0u8; 8];
    let mut needed = 0usize;
    assert_eq!(
        radixtree_to_str(h, small.as_mut_ptr(), small.len(), &mut needed),
        ErrorCode::BufferTooSmall
    );
    assert_eq!(needed, expected.len() + 1);
    assert_eq!(radixtree_last_error(), ErrorCode::BufferTooSmall);

    // sizing call with no buffer at all
    let mut sizing = 0usize;
    assert_eq!(
        radixtree_to_str(h, std::ptr::null_mut(), 0, &mut sizing),
        ErrorCode::BufferTooSmall
    );
    assert_eq!(sizing, needed);

    let mut exact = vec![0u8; needed];
    let mut written = 0usize;
    assert_eq!(
        radixtree_to_str(h, exact.as_mut_ptr(), exact.len(), &mut written),
        ErrorCode::Success
    );
    assert_eq!(&exact[..written], expected.as_bytes());
    assert_eq!(exact[written], 0);

    radixtree_close(h);
}

#[test]
fn empty_string_and_empty_tree() {
    let h = open();
    assert_eq!(dump(h), "");
    assert!(!exists(h, ""));
    assert_eq!(radixtree_insert(h, std::ptr::null(), 0), ErrorCode::Success);
    assert!(exists(h, ""));
    assert_eq!(dump(h), "");
    assert_eq!(radixtree_len(h), 1);
    radixtree_close(h);
}

#[test]
fn stats_and_clear() {
    let h = open();
    for w in ["a", "b", "c"] {
        insert(h, w);
    }
    let mut stats = RadixStatsT::default();
    assert_eq!(radixtree_stats(h, &mut stats), ErrorCode::Success);
    assert_eq!(
        stats,
        RadixStatsT {
            node_count: 6,
            eos_count: 3,
            total_key_bytes: 3,
            chain_count: 4,
            slot_span: 6,
        }
    );

    assert_eq!(radixtree_clear(h), ErrorCode::Success);
    assert_eq!(radixtree_len(h), 0);
    assert_eq!(dump(h), "");
    assert_eq!(radixtree_stats(h, &mut stats), ErrorCode::Success);
    assert_eq!(stats, RadixStatsT::default());
    radixtree_close(h);
}

#[test]
fn invalid_handles_and_null_pointers() {
    assert_eq!(insert(0, "x"), ErrorCode::InvalidHandle);
    assert_eq!(radixtree_last_error(), ErrorCode::InvalidHandle);
    assert_eq!(radixtree_close(u64::MAX), ErrorCode::InvalidHandle);
    assert_eq!(radixtree_open(std::ptr::null_mut()), ErrorCode::NullPointer);

    let h = open();
    assert_eq!(radixtree_insert(h, std::ptr::null(), 3), ErrorCode::NullPointer);
    assert_eq!(
        radixtree_exists(h, b"x".as_ptr(), 1, std::ptr::null_mut()),
        ErrorCode::NullPointer
    );
    assert_eq!(
        radixtree_stats(h, std::ptr::null_mut()),
        ErrorCode::NullPointer
    );
    radixtree_close(h);

    // closed handles are rejected
    assert_eq!(insert(h, "x"), ErrorCode::InvalidHandle);
    assert_eq!(radixtree_len(h), 0);

    let msg = unsafe { CStr::from_ptr(radixtree_strerror(ErrorCode::InvalidHandle)) };
    assert_eq!(msg.to_str().unwrap(), "Invalid handle");
}

#[test]
fn threads_with_private_handles() {
    let threads = num_cpus::get().clamp(2, 8);
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                let h = open();
                b.wait();
                for i in 0..200 {
                    let word = format!("t{t}/w{i}");
                    assert_eq!(insert(h, &word), ErrorCode::Success);
                    assert!(exists(h, &word));
                }
                assert!(!exists(h, &format!("t{}/w0", t + 100)));
                let n = radixtree_len(h);
                radixtree_close(h);
                n
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().expect("thread failed"), 200);
    }
}

#[test]
fn threads_sharing_one_handle() {
    const THREADS: usize = 4;
    const WORDS_PER_THREAD: usize = 100;
    let h = open();
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                for i in 0..WORDS_PER_THREAD {
                    let word = format!("shared/{i}/{t}");
                    assert_eq!(insert(h, &word), ErrorCode::Success);
                    assert!(exists(h, &word));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().expect("thread failed");
    }

    assert_eq!(radixtree_len(h), (THREADS * WORDS_PER_THREAD) as u64);
    let mut stats = RadixStatsT::default();
    radixtree_stats(h, &mut stats);
    assert_eq!(stats.eos_count, (THREADS * WORDS_PER_THREAD) as u64);
    radixtree_close(h);
}
