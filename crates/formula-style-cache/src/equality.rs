//! Deep structural comparison of canonical forms.
//!
//! Every level uses the same three tiers: reference identity, then field count, then a
//! field-by-field comparison. Only consulted by the cache after a digest match.

use std::ptr;

use crate::canonical::{CanonicalBorder, CanonicalColor, CanonicalStructuredColor, CanonicalStyle};

pub fn styles_equal(a: &CanonicalStyle, b: &CanonicalStyle) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    if a.field_count() != b.field_count() {
        return false;
    }

    a.flags == b.flags
        && a.font_size == b.font_size
        && a.indent == b.indent
        && a.text_rotation == b.text_rotation
        && a.font_family == b.font_family
        && a.number_format == b.number_format
        && a.horizontal_align == b.horizontal_align
        && a.vertical_align == b.vertical_align
        && a.overflow == b.overflow
        && option_eq(a.color.as_ref(), b.color.as_ref(), colors_equal)
        && option_eq(a.fill.as_ref(), b.fill.as_ref(), colors_equal)
        && option_eq(a.border.as_ref(), b.border.as_ref(), borders_equal)
}

pub fn colors_equal(a: &CanonicalColor, b: &CanonicalColor) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (CanonicalColor::Plain(a), CanonicalColor::Plain(b)) => a == b,
        (CanonicalColor::Structured(a), CanonicalColor::Structured(b)) => {
            structured_colors_equal(a, b)
        }
        _ => false,
    }
}

fn structured_colors_equal(a: &CanonicalStructuredColor, b: &CanonicalStructuredColor) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    if a.field_count() != b.field_count() {
        return false;
    }
    a.theme == b.theme
        && a.indexed == b.indexed
        && a.tint == b.tint
        && a.auto == b.auto
        && a.rgb == b.rgb
}

pub fn borders_equal(a: &CanonicalBorder, b: &CanonicalBorder) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    if a.field_count() != b.field_count() {
        return false;
    }
    a.sides
        .iter()
        .zip(b.sides.iter())
        .all(|(a, b)| option_eq(a.as_ref(), b.as_ref(), colors_equal))
}

fn option_eq<T>(a: Option<&T>, b: Option<&T>, eq: impl Fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => eq(a, b),
        _ => false,
    }
}
