pub mod review;
pub mod session;

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Returns an opaque, monotonically increasing record id.
///
/// Ids are epoch-millisecond strings; the atomic guard bumps past the last
/// issued value so two records created in the same millisecond still get
/// distinct, ordered ids.
pub fn next_record_id() -> String {
    let now = Utc::now().timestamp_millis();
    let id = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now);
    id.to_string()
}
