//! Server metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::{counter, describe_counter};

/// Response cache lookups, labelled `result=hit|miss|bypass`.
pub const CACHE_REQUESTS: &str = "relreg_cache_requests_total";

/// Lambda layer pre-warm failures.
pub const PREWARM_FAILURES: &str = "relreg_prewarm_failures_total";

/// Registers metric descriptions.
pub fn register_metrics() {
    describe_counter!(CACHE_REQUESTS, "Response cache lookups by result");
    describe_counter!(PREWARM_FAILURES, "Failed eager route pre-warms");
}

/// Records one cache lookup.
pub fn record_cache_result(result: &'static str) {
    counter!(CACHE_REQUESTS, "result" => result).increment(1);
}

pub fn record_prewarm_failure(route: &'static str) {
    counter!(PREWARM_FAILURES, "route" => route).increment(1);
}
