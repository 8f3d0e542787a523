//! `formula-style-cache` deduplicates cell formatting for a Formula document.
//!
//! A sheet holds millions of cells but only a handful of distinct formats. Every format request
//! ([`StyleDescriptor`]) is normalized into a [`CanonicalStyle`] and mapped by a per-document
//! [`StyleCache`] onto one shared, immutable representative ([`StyleRef`]). Structurally equal
//! requests always resolve to the *same* handle while it is live, which lets layout and render
//! code decide "same style?" with a pointer comparison.
//!
//! The pieces, leaves first:
//! - [`canonicalize`]: drops defaults and `false` flags, resolves exclusive flags, recurses into
//!   colors and borders with identical rules;
//! - [`digest`]: deterministic 32-bit hash of a canonical form;
//! - [`styles_equal`]: deep comparison used on digest matches;
//! - [`StyleCache`]: digest buckets plus explicit reference counts, with [`CacheMetrics`];
//! - [`assert_authentic`]: debug-build check that a value came out of a cache;
//! - [`SheetStyles`]: a document's cell-to-style map built on the cache.
//!
//! The cache is single-threaded and owned by exactly one document; there is no global instance.

mod cache;
mod canonical;
mod descriptor;
mod equality;
mod hash;
mod metrics;
mod normalize;
mod options;
mod safeguard;
mod sheet;

pub use cache::{StyleCache, StyleRef};
pub use canonical::{
    CanonicalBorder, CanonicalColor, CanonicalStructuredColor, CanonicalStyle, StyleFlags,
};
pub use descriptor::{
    BorderSide, BorderSpec, ColorSpec, HorizontalAlignment, StructuredColor, StyleDescriptor,
    TextOverflow, VerticalAlignment,
};
pub use equality::{borders_equal, colors_equal, styles_equal};
pub use hash::digest;
pub use metrics::{CacheMetrics, Clock, MonotonicClock};
pub use normalize::{canonicalize, resolve_exclusive_flags, EXCLUSIVE_FLAG_GROUPS};
pub use options::StyleCacheOptions;
pub use safeguard::{assert_authentic, check_authentic, is_authentic, IntegrityError};
pub use sheet::{CellRef, SheetStyles};
