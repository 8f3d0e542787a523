use std::time::{Duration, Instant};

use serde::Serialize;

/// Monotonic time source used for intern timing. Never consulted for control flow.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Point-in-time copy of the cache counters.
///
/// `size`, `bucket_count` are live values at snapshot time; everything else accumulates
/// until [`StyleCache::clear`](crate::StyleCache::clear).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    /// Misses that landed in an already occupied bucket.
    pub collisions: u64,
    /// Representatives removed because their reference count reached zero.
    pub evictions: u64,
    #[serde(serialize_with = "serialize_duration_ns")]
    pub total_intern_time: Duration,
    pub size: usize,
    pub bucket_count: usize,
    /// Deepest bucket observed since the last clear.
    pub max_bucket_depth: usize,
}

impl CacheMetrics {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// `hits / (hits + misses)`, or `0.0` before the first intern.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.lookups())
    }

    /// `collisions / misses`, or `0.0` before the first miss.
    pub fn collision_rate(&self) -> f64 {
        ratio(self.collisions, self.misses)
    }

    pub fn avg_intern_time(&self) -> Duration {
        match u32::try_from(self.lookups()) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_intern_time / n,
            Err(_) => Duration::from_secs_f64(
                self.total_intern_time.as_secs_f64() / self.lookups() as f64,
            ),
        }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn serialize_duration_ns<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
}

/// Accumulating counters owned by one cache.
///
/// Each `record_*` call applies all of its updates at once, after the cache operation has
/// finished.
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: u64,
    misses: u64,
    collisions: u64,
    evictions: u64,
    total_intern_time: Duration,
    max_bucket_depth: usize,
}

impl MetricsCollector {
    pub(crate) fn record_hit(&mut self, elapsed: Duration) {
        self.hits += 1;
        self.total_intern_time += elapsed;
    }

    pub(crate) fn record_miss(&mut self, elapsed: Duration, collided: bool, bucket_depth: usize) {
        self.misses += 1;
        if collided {
            self.collisions += 1;
        }
        self.total_intern_time += elapsed;
        self.max_bucket_depth = self.max_bucket_depth.max(bucket_depth);
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn snapshot(&self, size: usize, bucket_count: usize) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits,
            misses: self.misses,
            collisions: self.collisions,
            evictions: self.evictions,
            total_intern_time: self.total_intern_time,
            size,
            bucket_count,
            max_bucket_depth: self.max_bucket_depth,
        }
    }
}
