use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::canonical::CanonicalStyle;
use crate::descriptor::StyleDescriptor;
use crate::equality::styles_equal;
use crate::hash::digest;
use crate::metrics::{CacheMetrics, Clock, MetricsCollector, MonotonicClock};
use crate::normalize::canonicalize;
use crate::options::StyleCacheOptions;
use crate::safeguard::{StoreId, StoreMark};

/// Shared, read-only handle to a cache representative.
///
/// Handles compare and hash by identity: two handles are `==` exactly when they point at the
/// same representative. While a representative is live in its cache this is the same as
/// structural equality of the canonical forms.
#[derive(Clone)]
pub struct StyleRef(Arc<Representative>);

struct Representative {
    /// Digest computed at insertion; `release` locates the bucket with it.
    digest: u32,
    style: CanonicalStyle,
}

impl StyleRef {
    #[inline]
    pub fn ptr_eq(a: &StyleRef, b: &StyleRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    #[inline]
    pub fn canonical(&self) -> &CanonicalStyle {
        &self.0.style
    }

    #[inline]
    pub fn digest(&self) -> u32 {
        self.0.digest
    }
}

impl Deref for StyleRef {
    type Target = CanonicalStyle;

    #[inline]
    fn deref(&self) -> &CanonicalStyle {
        &self.0.style
    }
}

impl AsRef<CanonicalStyle> for StyleRef {
    fn as_ref(&self) -> &CanonicalStyle {
        &self.0.style
    }
}

impl PartialEq for StyleRef {
    fn eq(&self, other: &Self) -> bool {
        StyleRef::ptr_eq(self, other)
    }
}

impl Eq for StyleRef {}

impl Hash for StyleRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for StyleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRef")
            .field("digest", &format_args!("{:#010x}", self.0.digest))
            .field("style", &self.0.style)
            .finish()
    }
}

impl Serialize for StyleRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.style.serialize(serializer)
    }
}

struct BucketEntry {
    style: StyleRef,
    /// Active holders. Always `>= 1` while the entry exists.
    refs: usize,
}

/// Representatives sharing one digest, scanned linearly with full equality.
type Bucket = SmallVec<[BucketEntry; 1]>;

/// Canonicalizing, reference-counted style store.
///
/// One cache belongs to one document. Every descriptor passed to [`intern`](Self::intern) is
/// normalized and mapped to a single shared representative, so two handles for structurally
/// equal styles are always the same handle. Each `intern` must eventually be paired with a
/// [`release`](Self::release); a representative is dropped from the cache the moment its last
/// holder releases it.
///
/// All operations are synchronous and never fail.
pub struct StyleCache<C: Clock = MonotonicClock> {
    buckets: AHashMap<u32, Bucket>,
    len: usize,
    metrics: MetricsCollector,
    options: StyleCacheOptions,
    clock: C,
    store: StoreId,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::with_options(StyleCacheOptions::default())
    }

    pub fn with_options(options: StyleCacheOptions) -> Self {
        Self::with_clock(options, MonotonicClock::default())
    }
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StyleCache<C> {
    pub fn with_clock(options: StyleCacheOptions, clock: C) -> Self {
        Self {
            buckets: AHashMap::with_capacity(options.initial_buckets),
            len: 0,
            metrics: MetricsCollector::default(),
            options,
            clock,
            store: StoreId::next(),
        }
    }

    pub fn options(&self) -> &StyleCacheOptions {
        &self.options
    }

    /// Return the representative for `descriptor`, creating it on first use.
    ///
    /// Increments the representative's reference count either way.
    pub fn intern(&mut self, descriptor: &StyleDescriptor) -> StyleRef {
        let started = self.start_timer();
        let canonical = canonicalize(descriptor);
        self.intern_timed(Cow::Owned(canonical), started)
    }

    /// Like [`intern`](Self::intern) for a value that is already canonical, e.g. a
    /// representative captured earlier by an undo stack.
    ///
    /// If an equal representative is still live it is returned, so re-installing a captured
    /// style yields the original handle.
    pub fn intern_canonical(&mut self, style: &CanonicalStyle) -> StyleRef {
        let started = self.start_timer();
        self.intern_timed(Cow::Borrowed(style), started)
    }

    fn intern_timed(
        &mut self,
        canonical: Cow<'_, CanonicalStyle>,
        started: Option<Duration>,
    ) -> StyleRef {
        let digest = digest(&canonical);
        let store = self.store;
        let bucket = self.buckets.entry(digest).or_default();

        if let Some(entry) = bucket
            .iter_mut()
            .find(|entry| styles_equal(&entry.style, &canonical))
        {
            entry.refs += 1;
            let style = entry.style.clone();
            let elapsed = self.elapsed_since(started);
            self.metrics.record_hit(elapsed);
            return style;
        }

        let collided = !bucket.is_empty();
        let style = StyleRef(Arc::new(Representative {
            digest,
            style: canonical.into_owned().tagged(StoreMark::tagged(store)),
        }));
        bucket.push(BucketEntry {
            style: style.clone(),
            refs: 1,
        });
        let depth = bucket.len();
        self.len += 1;

        if depth > self.options.bucket_depth_warning {
            log::warn!(
                "style cache bucket {digest:#010x} reached depth {depth} ({} live styles)",
                self.len
            );
        }

        let elapsed = self.elapsed_since(started);
        self.metrics.record_miss(elapsed, collided, depth);
        style
    }

    /// Drop one holder of `style`, evicting it when no holders remain.
    ///
    /// Releasing a handle this cache does not know (already evicted, cleared, or from another
    /// cache) is a silent no-op, so duplicate cleanup is harmless.
    pub fn release(&mut self, style: &StyleRef) {
        let digest = style.digest();
        let Some(bucket) = self.buckets.get_mut(&digest) else {
            return;
        };
        let Some(pos) = bucket
            .iter()
            .position(|entry| StyleRef::ptr_eq(&entry.style, style))
        else {
            return;
        };

        let entry = &mut bucket[pos];
        entry.refs -= 1;
        if entry.refs > 0 {
            return;
        }

        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&digest);
        }
        self.len -= 1;
        self.metrics.record_eviction();
        log::trace!("evicted style {digest:#010x}");
    }

    /// Drop every representative and reset all counters, ignoring outstanding holders.
    ///
    /// Handles still held elsewhere stay readable but are unknown to the cache afterwards.
    pub fn clear(&mut self) {
        let dropped = self.len;
        self.buckets.clear();
        self.len = 0;
        self.metrics.reset();
        log::debug!("style cache cleared ({dropped} representatives dropped)");
    }

    /// Number of live representatives.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Current holders of `style`; `0` when the cache does not know it.
    pub fn ref_count(&self, style: &StyleRef) -> usize {
        self.entry(style).map_or(0, |entry| entry.refs)
    }

    /// `true` if `style` is a live representative of this cache.
    pub fn contains(&self, style: &StyleRef) -> bool {
        self.entry(style).is_some()
    }

    /// Live representatives, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleRef> + '_ {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(|entry| &entry.style))
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.snapshot(self.len, self.buckets.len())
    }

    pub fn hit_rate(&self) -> f64 {
        self.metrics().hit_rate()
    }

    pub fn collision_rate(&self) -> f64 {
        self.metrics().collision_rate()
    }

    pub fn avg_intern_time(&self) -> Duration {
        self.metrics().avg_intern_time()
    }

    fn entry(&self, style: &StyleRef) -> Option<&BucketEntry> {
        self.buckets
            .get(&style.digest())?
            .iter()
            .find(|entry| StyleRef::ptr_eq(&entry.style, style))
    }

    fn start_timer(&self) -> Option<Duration> {
        self.options.track_timing.then(|| self.clock.now())
    }

    fn elapsed_since(&self, started: Option<Duration>) -> Duration {
        started.map_or(Duration::ZERO, |start| self.clock.now().saturating_sub(start))
    }
}

impl<C: Clock> fmt::Debug for StyleCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleCache")
            .field("len", &self.len)
            .field("bucket_count", &self.buckets.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::descriptor::ColorSpec;
    use pretty_assertions::assert_eq;

    /// Advances by a fixed step every time it is read.
    struct SteppingClock {
        now: Cell<Duration>,
        step: Duration,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Duration {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    fn bold() -> StyleDescriptor {
        StyleDescriptor {
            bold: Some(true),
            ..Default::default()
        }
    }

    /// Bucket contents and bookkeeping agree.
    fn assert_consistent<C: Clock>(cache: &StyleCache<C>) {
        let mut live = 0;
        for (digest, bucket) in cache.buckets.iter() {
            assert!(!bucket.is_empty(), "empty bucket {digest:#x} left behind");
            for entry in bucket {
                assert!(entry.refs > 0);
                assert_eq!(entry.style.digest(), *digest);
                assert_eq!(crate::hash::digest(&entry.style), *digest);
            }
            live += bucket.len();
        }
        assert_eq!(live, cache.len());
    }

    #[test]
    fn ref_counts_track_intern_and_release() {
        let mut cache = StyleCache::new();
        let a = cache.intern(&bold());
        let b = cache.intern(&bold());
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(&a), 2);
        assert_consistent(&cache);

        cache.release(&a);
        assert_eq!(cache.ref_count(&a), 1);
        assert_eq!(cache.len(), 1);

        cache.release(&b);
        assert_eq!(cache.ref_count(&a), 0);
        assert!(!cache.contains(&a));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.bucket_count(), 0);
        assert_eq!(cache.metrics().evictions, 1);
        assert_consistent(&cache);
    }

    #[test]
    fn release_after_eviction_is_a_noop() {
        let mut cache = StyleCache::new();
        let a = cache.intern(&bold());
        cache.release(&a);
        cache.release(&a);
        cache.release(&a);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.metrics().evictions, 1);

        // A later intern builds a fresh representative.
        let b = cache.intern(&bold());
        assert_ne!(a, b);
        assert_eq!(*a, *b);
        cache.release(&a);
        assert_eq!(cache.ref_count(&b), 1);
    }

    #[test]
    fn handles_from_another_cache_are_unknown() {
        let mut first = StyleCache::new();
        let mut second = StyleCache::new();
        let a = first.intern(&bold());
        let b = second.intern(&bold());
        assert_ne!(a, b);
        assert_eq!(a.digest(), b.digest());

        second.release(&a);
        assert_eq!(second.ref_count(&b), 1);
        assert_eq!(first.ref_count(&a), 1);
    }

    #[test]
    fn clear_ignores_outstanding_holders() {
        let mut cache = StyleCache::new();
        let a = cache.intern(&bold());
        cache.intern(&bold());
        cache.intern(&StyleDescriptor::default());
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.bucket_count(), 0);
        assert_eq!(cache.metrics(), CacheMetrics::default());

        cache.release(&a);
        assert!(cache.is_empty());
        assert!(a.has(crate::StyleFlags::BOLD));
    }

    #[test]
    fn intern_canonical_returns_live_representative() {
        let mut cache = StyleCache::new();
        let a = cache.intern(&bold());
        let captured = a.canonical().clone();
        let b = cache.intern_canonical(&captured);
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(&a), 2);

        let c = cache.intern_canonical(&a);
        assert_eq!(a, c);
        assert_eq!(cache.ref_count(&a), 3);
    }

    #[test]
    fn timing_uses_injected_clock() {
        let clock = SteppingClock {
            now: Cell::new(Duration::ZERO),
            step: Duration::from_micros(5),
        };
        let mut cache = StyleCache::with_clock(StyleCacheOptions::default(), clock);
        cache.intern(&bold());
        cache.intern(&bold());

        let metrics = cache.metrics();
        assert_eq!(metrics.total_intern_time, Duration::from_micros(10));
        assert_eq!(cache.avg_intern_time(), Duration::from_micros(5));
    }

    #[test]
    fn timing_can_be_disabled() {
        let clock = SteppingClock {
            now: Cell::new(Duration::ZERO),
            step: Duration::from_secs(1),
        };
        let options = StyleCacheOptions {
            track_timing: false,
            ..Default::default()
        };
        let mut cache = StyleCache::with_clock(options, clock);
        cache.intern(&bold());
        assert_eq!(cache.metrics().total_intern_time, Duration::ZERO);
        assert_eq!(cache.clock.now.get(), Duration::ZERO);
    }

    #[test]
    fn hit_and_miss_counters() {
        let mut cache = StyleCache::new();
        let red = StyleDescriptor {
            color: Some(ColorSpec::from("#FF0000")),
            ..Default::default()
        };
        cache.intern(&red);
        cache.intern(&red);
        cache.intern(&bold());

        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 2);
        assert_eq!(metrics.size, 2);
        assert_eq!(metrics.bucket_count, 2);
        assert_eq!(metrics.max_bucket_depth, 1);
        assert_eq!(cache.hit_rate(), 1.0 / 3.0);
    }

    fn family(n: u32) -> StyleDescriptor {
        StyleDescriptor {
            font_family: Some(format!("Font{n}")),
            ..Default::default()
        }
    }

    /// Two distinct styles whose digests collide, found by a birthday search over font names.
    ///
    /// A single numeric field cannot be used: each hashing step is a bijection, so styles that
    /// differ in one number never collide.
    fn colliding_pair() -> (StyleDescriptor, StyleDescriptor) {
        let mut seen: std::collections::HashMap<u32, u32> = std::collections::HashMap::new();
        for n in 0..2_000_000 {
            let key = crate::hash::digest(&canonicalize(&family(n)));
            if let Some(&earlier) = seen.get(&key) {
                return (family(earlier), family(n));
            }
            seen.insert(key, n);
        }
        panic!("no digest collision among 2M font names");
    }

    #[test]
    fn releasing_from_shared_bucket_keeps_neighbour() {
        let (first, second) = colliding_pair();
        let mut cache = StyleCache::new();
        let a = cache.intern(&first);
        let b = cache.intern(&second);
        assert_ne!(a, b);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bucket_count(), 1);

        let metrics = cache.metrics();
        assert_eq!(metrics.collisions, 1);
        assert_eq!(metrics.max_bucket_depth, 2);
        assert_consistent(&cache);

        // `a` sits in front of `b`, so its removal moves `b` within the bucket.
        cache.release(&a);
        assert!(!cache.contains(&a));
        assert_eq!(cache.bucket_count(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.ref_count(&b), 1);
        assert_consistent(&cache);

        // The survivor is still found by equality.
        let again = cache.intern(&second);
        assert_eq!(again, b);
        assert_eq!(cache.ref_count(&b), 2);

        cache.release(&b);
        cache.release(&again);
        assert!(cache.is_empty());
        assert_eq!(cache.bucket_count(), 0);
        assert_eq!(cache.metrics().evictions, 2);
        assert_consistent(&cache);
    }

    #[test]
    fn iter_yields_each_live_representative_once() {
        let mut cache = StyleCache::new();
        let a = cache.intern(&bold());
        let b = cache.intern(&StyleDescriptor::default());
        cache.intern(&bold());

        let mut seen: Vec<&StyleRef> = cache.iter().collect();
        seen.sort_by_key(|style| style.field_count());
        assert_eq!(seen, vec![&b, &a]);
    }
}
