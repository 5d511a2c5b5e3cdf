//! Minimal run‑time metrics sink.
//!
//! No exporter is bundled; instead the host process may register a raw
//! callback that receives name/value pairs for every counter bump and gauge
//! update the tree emits.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Recorder, SharedString, Unit};
use once_cell::sync::OnceCell;
use std::ffi::CString;
use std::os::raw::{c_char, c_ulonglong};
use std::sync::Arc;

/// Signature for external collectors.
pub type StatsCallback = unsafe extern "C" fn(name: *const c_char, value: c_ulonglong);

static CALLBACK: OnceCell<StatsCallback> = OnceCell::new();

/// Register a callback from C/other languages. Only the first registration wins.
#[no_mangle]
pub unsafe extern "C" fn radixtree_register_stats_callback(cb: StatsCallback) {
    let _ = CALLBACK.set(cb);
}

/// Forwarding recorder. Uses the callback **if** it was registered.
struct FfiRecorder;

/// Shared by every handle kind: the metric name, NUL-terminated once up front.
#[derive(Clone)]
struct FfiSink {
    name: Arc<CString>,
}

impl FfiSink {
    fn new(key: &Key) -> Self {
        let name = CString::new(key.name())
            .unwrap_or_else(|_| CString::new("radixtree_invalid_metric_name").unwrap_or_default());
        Self { name: Arc::new(name) }
    }

    fn forward(&self, value: u64) {
        if let Some(cb) = CALLBACK.get() {
            unsafe { cb(self.name.as_ptr(), value as c_ulonglong) };
        }
    }
}

impl Recorder for FfiRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // No-op for FFI
    }
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // No-op for FFI
    }
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        // No-op for FFI
    }

    fn register_counter(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(FfiSink::new(key)))
    }
    fn register_gauge(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(FfiSink::new(key)))
    }
    fn register_histogram(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(FfiSink::new(key)))
    }
}

impl metrics::CounterFn for FfiSink {
    fn increment(&self, value: u64) {
        self.forward(value);
    }
    fn absolute(&self, value: u64) {
        self.forward(value);
    }
}

// Gauges and histograms are truncated to whole units for the C side. The
// callback carries no operation, so only absolute gauge values are forwarded;
// relative updates would be indistinguishable from a `set`.
impl metrics::GaugeFn for FfiSink {
    fn set(&self, value: f64) {
        self.forward(value as u64);
    }
    fn increment(&self, _value: f64) {}
    fn decrement(&self, _value: f64) {}
}

impl metrics::HistogramFn for FfiSink {
    fn record(&self, value: f64) {
        self.forward(value as u64);
    }
}

/// Install exactly **once** – called whenever a tree is constructed.
pub fn init() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = metrics::set_global_recorder(FfiRecorder);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{METRIC_INSERTS, METRIC_NODES};
    use crate::RadixTree;
    use std::ffi::CStr;
    use std::sync::Mutex;

    static SEEN: Mutex<Vec<(String, u64)>> = Mutex::new(Vec::new());

    unsafe extern "C" fn collect(name: *const c_char, value: c_ulonglong) {
        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
        if let Ok(mut seen) = SEEN.lock() {
            seen.push((name, value));
        }
    }

    #[test]
    fn callback_receives_tree_metrics() {
        unsafe { radixtree_register_stats_callback(collect) };
        let mut t = RadixTree::new();
        t.insert(b"metric").unwrap();
        t.report_metrics();

        let seen = SEEN.lock().unwrap();
        assert!(seen.iter().any(|(n, v)| n == METRIC_INSERTS && *v == 1));
        assert!(seen.iter().any(|(n, v)| n == METRIC_NODES && *v >= 2));
    }

    #[test]
    fn gauge_deltas_are_not_forwarded() {
        use metrics::GaugeFn;

        unsafe { radixtree_register_stats_callback(collect) };
        let name = "radixtree_test_gauge_deltas";
        let sink = FfiSink::new(&Key::from_name(name));
        GaugeFn::increment(&sink, 5.0);
        GaugeFn::decrement(&sink, 2.0);
        GaugeFn::set(&sink, 7.9);

        let seen = SEEN.lock().unwrap();
        let values: Vec<u64> = seen
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(values, vec![7]);
    }
}
