//! Development-only integrity tag for cache representatives.
//!
//! Every representative built by a [`StyleCache`](crate::StyleCache) carries a [`StoreMark`]
//! naming the cache that built it. The mark is not part of the canonical form: hashing,
//! equality and serialization never look at it, and it cannot be changed after construction.
//! Copies made outside the cache (`CanonicalStyle::clone`, a fresh
//! [`canonicalize`](crate::canonicalize)) are untagged.
//!
//! In builds without `debug_assertions` the mark is zero-sized, every value is considered
//! authentic, and [`assert_authentic`] compiles to nothing.

use thiserror::Error;

use crate::canonical::CanonicalStyle;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error(
        "{context}: style was not produced by a StyleCache (built or copied outside the cache); \
         intern the descriptor instead"
    )]
    Untracked { context: String },
}

#[cfg(debug_assertions)]
mod mark {
    use std::num::NonZeroU64;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Identity of one cache instance.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct StoreId(NonZeroU64);

    impl StoreId {
        pub(crate) fn next() -> Self {
            static NEXT: AtomicU64 = AtomicU64::new(1);
            let id = NEXT.fetch_add(1, Ordering::Relaxed);
            StoreId(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
        }
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct StoreMark(Option<StoreId>);

    impl StoreMark {
        pub(crate) const fn untagged() -> Self {
            StoreMark(None)
        }

        pub(crate) fn tagged(store: StoreId) -> Self {
            StoreMark(Some(store))
        }

        pub(crate) fn is_tagged(self) -> bool {
            self.0.is_some()
        }
    }
}

#[cfg(not(debug_assertions))]
mod mark {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct StoreId;

    impl StoreId {
        #[inline]
        pub(crate) fn next() -> Self {
            StoreId
        }
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct StoreMark;

    impl StoreMark {
        #[inline]
        pub(crate) const fn untagged() -> Self {
            StoreMark
        }

        #[inline]
        pub(crate) fn tagged(_store: StoreId) -> Self {
            StoreMark
        }

        #[inline]
        pub(crate) fn is_tagged(self) -> bool {
            true
        }
    }
}

pub(crate) use mark::{StoreId, StoreMark};

/// `true` for "no style" and for any value built by a cache.
pub fn is_authentic(style: Option<&CanonicalStyle>) -> bool {
    style.map_or(true, |style| style.mark.is_tagged())
}

/// Check a value at an integration boundary, naming the call site on failure.
pub fn check_authentic(
    style: Option<&CanonicalStyle>,
    context: &str,
) -> Result<(), IntegrityError> {
    if is_authentic(style) {
        Ok(())
    } else {
        Err(IntegrityError::Untracked {
            context: context.to_string(),
        })
    }
}

/// Panic if `style` bypassed the cache. No-op without `debug_assertions`.
#[inline]
#[track_caller]
pub fn assert_authentic(style: Option<&CanonicalStyle>, context: &str) {
    #[cfg(debug_assertions)]
    {
        if let Err(err) = check_authentic(style, context) {
            panic!("{err}");
        }
    }
    #[cfg(not(debug_assertions))]
    let _ = (style, context);
}
