use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::{StyleCache, StyleRef};
use crate::canonical::CanonicalStyle;
use crate::descriptor::StyleDescriptor;
use crate::metrics::{Clock, MonotonicClock};
use crate::safeguard::assert_authentic;

/// Zero-based cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Per-document cell formatting.
///
/// Owns the document's [`StyleCache`] and holds one cache reference per styled cell. Unstyled
/// cells are not stored. Dropping the document (or calling [`close`](Self::close)) discards
/// every identity it created; nothing is shared with other documents.
#[derive(Debug)]
pub struct SheetStyles<C: Clock = MonotonicClock> {
    cache: StyleCache<C>,
    cells: HashMap<CellRef, StyleRef>,
}

impl SheetStyles {
    pub fn new() -> Self {
        Self::with_cache(StyleCache::new())
    }
}

impl Default for SheetStyles {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SheetStyles<C> {
    /// Build on an existing (normally fresh) cache.
    pub fn with_cache(cache: StyleCache<C>) -> Self {
        Self {
            cache,
            cells: HashMap::new(),
        }
    }

    pub fn cache(&self) -> &StyleCache<C> {
        &self.cache
    }

    /// Apply `descriptor` to `cell`, replacing (and releasing) whatever was there.
    ///
    /// A descriptor that canonicalizes to the default style clears the cell and returns `None`.
    pub fn set_style(&mut self, cell: CellRef, descriptor: &StyleDescriptor) -> Option<StyleRef> {
        let style = self.cache.intern(descriptor);
        if style.is_empty() {
            self.cache.release(&style);
            self.clear_style(cell);
            return None;
        }
        self.install(cell, style.clone());
        Some(style)
    }

    /// Reinstall a style captured earlier (undo/redo).
    ///
    /// `style` must have come out of a cache: a [`StyleRef`] derefs to one, and undo stacks may
    /// hold the canonical value directly. Values built or copied outside a cache trip
    /// [`assert_authentic`] in debug builds. Re-interning returns the original representative if
    /// it is still live anywhere in the document, so layout caches keyed on identity stay valid.
    pub fn restore_style(
        &mut self,
        cell: CellRef,
        style: Option<&CanonicalStyle>,
    ) -> Option<StyleRef> {
        assert_authentic(style, "SheetStyles::restore_style");
        match style {
            Some(style) if !style.is_empty() => {
                let style = self.cache.intern_canonical(style);
                self.install(cell, style.clone());
                Some(style)
            }
            _ => {
                self.clear_style(cell);
                None
            }
        }
    }

    /// Remove any formatting from `cell`.
    pub fn clear_style(&mut self, cell: CellRef) {
        if let Some(previous) = self.cells.remove(&cell) {
            self.cache.release(&previous);
        }
    }

    pub fn style_at(&self, cell: CellRef) -> Option<&StyleRef> {
        self.cells.get(&cell)
    }

    /// Whether two cells render with the same formatting. Identity comparison only.
    pub fn same_style(&self, a: CellRef, b: CellRef) -> bool {
        match (self.cells.get(&a), self.cells.get(&b)) {
            (None, None) => true,
            (Some(a), Some(b)) => StyleRef::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn styled_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Drop all cell formatting and every cached representative.
    pub fn close(&mut self) {
        self.cells.clear();
        self.cache.clear();
    }

    fn install(&mut self, cell: CellRef, style: StyleRef) {
        if let Some(previous) = self.cells.insert(cell, style) {
            self.cache.release(&previous);
        }
    }
}
