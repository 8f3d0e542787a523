use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

use crate::descriptor::{
    BorderSide, BorderSpec, ColorSpec, HorizontalAlignment, StructuredColor, StyleDescriptor,
    TextOverflow, VerticalAlignment,
};
use crate::safeguard::StoreMark;

/// Boolean formatting flags packed into one word.
///
/// Bit order is the canonical flag order; it is also the declaration order used to resolve
/// mutually exclusive groups.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleFlags(u16);

impl StyleFlags {
    pub const BOLD: StyleFlags = StyleFlags(1 << 0);
    pub const ITALIC: StyleFlags = StyleFlags(1 << 1);
    pub const UNDERLINE: StyleFlags = StyleFlags(1 << 2);
    pub const DOUBLE_UNDERLINE: StyleFlags = StyleFlags(1 << 3);
    pub const STRIKE: StyleFlags = StyleFlags(1 << 4);
    pub const SUPERSCRIPT: StyleFlags = StyleFlags(1 << 5);
    pub const SUBSCRIPT: StyleFlags = StyleFlags(1 << 6);
    pub const WRAP_TEXT: StyleFlags = StyleFlags(1 << 7);
    pub const SHRINK_TO_FIT: StyleFlags = StyleFlags(1 << 8);

    pub const fn empty() -> Self {
        StyleFlags(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: StyleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: StyleFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: StyleFlags) {
        self.0 &= !other.0;
    }

    /// Number of set flags.
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }
}

/// Canonical color.
#[derive(Clone, Debug)]
pub enum CanonicalColor {
    Plain(Box<str>),
    Structured(CanonicalStructuredColor),
}

/// Canonical structured color. Never empty; at least one member is present.
#[derive(Clone, Debug, Default)]
pub struct CanonicalStructuredColor {
    pub(crate) rgb: Option<Box<str>>,
    pub(crate) theme: Option<u32>,
    pub(crate) tint: Option<OrderedFloat<f64>>,
    pub(crate) indexed: Option<u32>,
    pub(crate) auto: bool,
}

impl CanonicalStructuredColor {
    pub fn rgb(&self) -> Option<&str> {
        self.rgb.as_deref()
    }

    pub fn theme(&self) -> Option<u32> {
        self.theme
    }

    pub fn tint(&self) -> Option<f64> {
        self.tint.map(OrderedFloat::into_inner)
    }

    pub fn indexed(&self) -> Option<u32> {
        self.indexed
    }

    pub fn auto(&self) -> bool {
        self.auto
    }

    pub fn field_count(&self) -> usize {
        usize::from(self.rgb.is_some())
            + usize::from(self.theme.is_some())
            + usize::from(self.tint.is_some())
            + usize::from(self.indexed.is_some())
            + usize::from(self.auto)
    }

    fn to_spec(&self) -> StructuredColor {
        StructuredColor {
            rgb: self.rgb.as_deref().map(str::to_string),
            theme: self.theme,
            tint: self.tint(),
            indexed: self.indexed,
            auto: self.auto.then_some(true),
        }
    }
}

impl CanonicalColor {
    pub fn to_spec(&self) -> ColorSpec {
        match self {
            CanonicalColor::Plain(s) => ColorSpec::Plain(s.to_string()),
            CanonicalColor::Structured(c) => ColorSpec::Structured(c.to_spec()),
        }
    }
}

/// Canonical border: one optional color per [`BorderSide`]. Never empty.
#[derive(Clone, Debug, Default)]
pub struct CanonicalBorder {
    pub(crate) sides: [Option<CanonicalColor>; 6],
}

impl CanonicalBorder {
    pub fn side(&self, side: BorderSide) -> Option<&CanonicalColor> {
        self.sides[side.index()].as_ref()
    }

    /// Present sides in canonical order.
    pub fn sides(&self) -> impl Iterator<Item = (BorderSide, &CanonicalColor)> + '_ {
        BorderSide::ALL
            .into_iter()
            .filter_map(|side| self.side(side).map(|color| (side, color)))
    }

    pub fn field_count(&self) -> usize {
        self.sides.iter().filter(|s| s.is_some()).count()
    }

    fn to_spec(&self) -> BorderSpec {
        let mut spec = BorderSpec::default();
        for (side, color) in self.sides() {
            *spec.side_mut(side) = Some(color.to_spec());
        }
        spec
    }
}

/// A style descriptor in canonical form.
///
/// Only [`canonicalize`](crate::canonicalize) builds these, so every value obeys the
/// canonical rules: no explicit defaults, no empty composites, at most one flag per
/// mutually exclusive group. Fields are held in the canonical order.
///
/// Equality ([`PartialEq`]) is structural and ignores the integrity tag. Cloning produces an
/// untagged copy: a clone is a value that did not come out of a [`StyleCache`](crate::StyleCache).
#[derive(Debug)]
pub struct CanonicalStyle {
    pub(crate) flags: StyleFlags,
    pub(crate) font_family: Option<Box<str>>,
    pub(crate) font_size: Option<OrderedFloat<f64>>,
    pub(crate) indent: Option<i32>,
    pub(crate) text_rotation: Option<i32>,
    pub(crate) color: Option<CanonicalColor>,
    pub(crate) fill: Option<CanonicalColor>,
    pub(crate) horizontal_align: Option<HorizontalAlignment>,
    pub(crate) vertical_align: Option<VerticalAlignment>,
    pub(crate) overflow: Option<TextOverflow>,
    pub(crate) number_format: Option<Box<str>>,
    pub(crate) border: Option<CanonicalBorder>,
    pub(crate) mark: StoreMark,
}

impl Default for CanonicalStyle {
    fn default() -> Self {
        Self {
            flags: StyleFlags::empty(),
            font_family: None,
            font_size: None,
            indent: None,
            text_rotation: None,
            color: None,
            fill: None,
            horizontal_align: None,
            vertical_align: None,
            overflow: None,
            number_format: None,
            border: None,
            mark: StoreMark::untagged(),
        }
    }
}

impl Clone for CanonicalStyle {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            indent: self.indent,
            text_rotation: self.text_rotation,
            color: self.color.clone(),
            fill: self.fill.clone(),
            horizontal_align: self.horizontal_align.clone(),
            vertical_align: self.vertical_align.clone(),
            overflow: self.overflow.clone(),
            number_format: self.number_format.clone(),
            border: self.border.clone(),
            mark: StoreMark::untagged(),
        }
    }
}

impl CanonicalStyle {
    pub fn flags(&self) -> StyleFlags {
        self.flags
    }

    pub fn has(&self, flag: StyleFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    pub fn font_size(&self) -> Option<f64> {
        self.font_size.map(OrderedFloat::into_inner)
    }

    pub fn indent(&self) -> Option<i32> {
        self.indent
    }

    pub fn text_rotation(&self) -> Option<i32> {
        self.text_rotation
    }

    pub fn color(&self) -> Option<&CanonicalColor> {
        self.color.as_ref()
    }

    pub fn fill(&self) -> Option<&CanonicalColor> {
        self.fill.as_ref()
    }

    pub fn horizontal_align(&self) -> Option<&HorizontalAlignment> {
        self.horizontal_align.as_ref()
    }

    pub fn vertical_align(&self) -> Option<&VerticalAlignment> {
        self.vertical_align.as_ref()
    }

    pub fn overflow(&self) -> Option<&TextOverflow> {
        self.overflow.as_ref()
    }

    pub fn number_format(&self) -> Option<&str> {
        self.number_format.as_deref()
    }

    pub fn border(&self) -> Option<&CanonicalBorder> {
        self.border.as_ref()
    }

    /// Number of present fields. Each set flag counts as one field.
    pub fn field_count(&self) -> usize {
        self.flags.count()
            + usize::from(self.font_family.is_some())
            + usize::from(self.font_size.is_some())
            + usize::from(self.indent.is_some())
            + usize::from(self.text_rotation.is_some())
            + usize::from(self.color.is_some())
            + usize::from(self.fill.is_some())
            + usize::from(self.horizontal_align.is_some())
            + usize::from(self.vertical_align.is_some())
            + usize::from(self.overflow.is_some())
            + usize::from(self.number_format.is_some())
            + usize::from(self.border.is_some())
    }

    /// `true` for the default (no formatting) style.
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Convert back into a descriptor. Canonicalizing the result yields an equal value.
    pub fn to_descriptor(&self) -> StyleDescriptor {
        let flag = |f: StyleFlags| self.flags.contains(f).then_some(true);
        StyleDescriptor {
            bold: flag(StyleFlags::BOLD),
            italic: flag(StyleFlags::ITALIC),
            underline: flag(StyleFlags::UNDERLINE),
            double_underline: flag(StyleFlags::DOUBLE_UNDERLINE),
            strike: flag(StyleFlags::STRIKE),
            superscript: flag(StyleFlags::SUPERSCRIPT),
            subscript: flag(StyleFlags::SUBSCRIPT),
            wrap_text: flag(StyleFlags::WRAP_TEXT),
            shrink_to_fit: flag(StyleFlags::SHRINK_TO_FIT),
            font_family: self.font_family.as_deref().map(str::to_string),
            font_size: self.font_size(),
            indent: self.indent,
            text_rotation: self.text_rotation,
            color: self.color.as_ref().map(CanonicalColor::to_spec),
            fill: self.fill.as_ref().map(CanonicalColor::to_spec),
            horizontal_align: self.horizontal_align.clone(),
            vertical_align: self.vertical_align.clone(),
            overflow: self.overflow.clone(),
            number_format: self.number_format.as_deref().map(str::to_string),
            border: self.border.as_ref().map(CanonicalBorder::to_spec),
        }
    }

    /// Attach the integrity tag. Only the cache calls this, once, at construction.
    pub(crate) fn tagged(mut self, mark: StoreMark) -> Self {
        self.mark = mark;
        self
    }
}

impl PartialEq for CanonicalStyle {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::styles_equal(self, other)
    }
}

impl Eq for CanonicalStyle {}

impl PartialEq for CanonicalColor {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::colors_equal(self, other)
    }
}

impl Eq for CanonicalColor {}

impl PartialEq for CanonicalBorder {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::borders_equal(self, other)
    }
}

impl Eq for CanonicalBorder {}

impl Serialize for CanonicalStyle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_descriptor().serialize(serializer)
    }
}
