use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`StyleCache`](crate::StyleCache).
///
/// None of these change which representative an intern returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleCacheOptions {
    /// Buckets to pre-allocate.
    pub initial_buckets: usize,
    /// Measure time spent in `intern`. When disabled the clock is never read.
    pub track_timing: bool,
    /// A miss that grows a bucket beyond this depth is logged at `warn` level.
    pub bucket_depth_warning: usize,
}

impl Default for StyleCacheOptions {
    fn default() -> Self {
        Self {
            initial_buckets: 64,
            track_timing: true,
            // Expected depth is 1; five colliding digests means the hasher is being defeated.
            bucket_depth_warning: 5,
        }
    }
}
