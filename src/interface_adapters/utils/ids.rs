use std::sync::atomic::{AtomicU64, Ordering};

/// Returns a process-unique connection identifier for log correlation.
pub fn next_conn_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
