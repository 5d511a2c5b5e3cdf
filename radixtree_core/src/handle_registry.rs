use crate::{errors::ErrorCode, RadixTree};
use dashmap::DashMap;
use log::debug;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle ID type - safer than raw pointers
pub type HandleId = u64;

/// Global handle registry for RadixTree instances handed out over the C ABI.
///
/// Each entry is guarded by its shard lock, which is what serializes access
/// to one tree; distinct handles may be used from different threads at once.
/// Calls must not nest on the same handle (the shard lock is not reentrant).
struct HandleRegistry {
    handles: DashMap<HandleId, RadixTree>,
    next_id: AtomicU64,
}

impl HandleRegistry {
    fn new() -> Self {
        Self {
            handles: DashMap::new(),
            next_id: AtomicU64::new(1), // Start from 1, reserve 0 for null/invalid
        }
    }

    /// Register a new RadixTree and return its handle ID
    fn register(&self, tree: RadixTree) -> HandleId {
        let handle_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handles.insert(handle_id, tree);
        debug!("[HANDLE] registered {}", handle_id);
        handle_id
    }

    fn with<T>(&self, handle_id: HandleId, f: impl FnOnce(&RadixTree) -> T) -> Result<T, ErrorCode> {
        self.handles
            .get(&handle_id)
            .map(|tree| f(&tree))
            .ok_or(ErrorCode::InvalidHandle)
    }

    fn with_mut<T>(
        &self,
        handle_id: HandleId,
        f: impl FnOnce(&mut RadixTree) -> T,
    ) -> Result<T, ErrorCode> {
        self.handles
            .get_mut(&handle_id)
            .map(|mut tree| f(&mut tree))
            .ok_or(ErrorCode::InvalidHandle)
    }

    /// Remove a RadixTree from the registry
    fn unregister(&self, handle_id: HandleId) -> Result<(), ErrorCode> {
        match self.handles.remove(&handle_id) {
            Some(_) => {
                debug!("[HANDLE] released {}", handle_id);
                Ok(())
            }
            None => Err(ErrorCode::InvalidHandle),
        }
    }
}

static REGISTRY: Lazy<HandleRegistry> = Lazy::new(HandleRegistry::new);

/// Register a new RadixTree and return its handle ID
pub fn register_handle(tree: RadixTree) -> HandleId {
    REGISTRY.register(tree)
}

/// Execute a function with a reference to the RadixTree identified by handle_id
pub fn with_handle<T, F>(handle_id: HandleId, f: F) -> Result<T, ErrorCode>
where
    F: FnOnce(&RadixTree) -> T,
{
    REGISTRY.with(handle_id, f)
}

/// Execute a function with a mutable reference to the RadixTree identified by handle_id
pub fn with_handle_mut<T, F>(handle_id: HandleId, f: F) -> Result<T, ErrorCode>
where
    F: FnOnce(&mut RadixTree) -> T,
{
    REGISTRY.with_mut(handle_id, f)
}

/// Unregister and drop a RadixTree
pub fn unregister_handle(handle_id: HandleId) -> Result<(), ErrorCode> {
    REGISTRY.unregister(handle_id)
}
