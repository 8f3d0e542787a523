use ordered_float::OrderedFloat;

use crate::canonical::{
    CanonicalBorder, CanonicalColor, CanonicalStructuredColor, CanonicalStyle, StyleFlags,
};
use crate::descriptor::{
    BorderSide, BorderSpec, ColorSpec, HorizontalAlignment, StyleDescriptor, TextOverflow,
    VerticalAlignment,
};

/// Mutually exclusive flag groups. Within a group, the first declared flag that is set wins
/// and the rest are dropped.
///
/// The precedence is a product rule, not something inferred from the values.
pub const EXCLUSIVE_FLAG_GROUPS: &[&[StyleFlags]] = &[
    &[StyleFlags::SUPERSCRIPT, StyleFlags::SUBSCRIPT],
    &[StyleFlags::UNDERLINE, StyleFlags::DOUBLE_UNDERLINE],
    &[StyleFlags::WRAP_TEXT, StyleFlags::SHRINK_TO_FIT],
];

const GENERAL_NUMBER_FORMAT: &str = "General";

/// Normalize a descriptor into its canonical form.
///
/// Total and pure. Rules, applied the same way at every nesting level:
/// - absent and `false` flags are indistinguishable (both dropped);
/// - no-op values (`indent: 0`, `textRotation: 0`, `tint: 0`, default alignments, the
///   `General` number format) are dropped;
/// - only the first flag of each exclusive group survives;
/// - composites (structured colors, borders) that end up with no members are dropped.
pub fn canonicalize(descriptor: &StyleDescriptor) -> CanonicalStyle {
    let mut flags = StyleFlags::empty();
    for (flag, value) in [
        (StyleFlags::BOLD, descriptor.bold),
        (StyleFlags::ITALIC, descriptor.italic),
        (StyleFlags::UNDERLINE, descriptor.underline),
        (StyleFlags::DOUBLE_UNDERLINE, descriptor.double_underline),
        (StyleFlags::STRIKE, descriptor.strike),
        (StyleFlags::SUPERSCRIPT, descriptor.superscript),
        (StyleFlags::SUBSCRIPT, descriptor.subscript),
        (StyleFlags::WRAP_TEXT, descriptor.wrap_text),
        (StyleFlags::SHRINK_TO_FIT, descriptor.shrink_to_fit),
    ] {
        if value == Some(true) {
            flags.insert(flag);
        }
    }

    CanonicalStyle {
        flags: resolve_exclusive_flags(flags),
        font_family: descriptor.font_family.as_deref().map(Box::from),
        font_size: descriptor.font_size.map(canonical_f64),
        indent: descriptor.indent.filter(|v| *v != 0),
        text_rotation: descriptor.text_rotation.filter(|v| *v != 0),
        color: descriptor.color.as_ref().and_then(canonical_color),
        fill: descriptor.fill.as_ref().and_then(canonical_color),
        horizontal_align: descriptor
            .horizontal_align
            .as_ref()
            .map(|a| a.as_str())
            .map(HorizontalAlignment::parse)
            .filter(|a| !a.is_default()),
        vertical_align: descriptor
            .vertical_align
            .as_ref()
            .map(|a| a.as_str())
            .map(VerticalAlignment::parse)
            .filter(|a| !a.is_default()),
        overflow: descriptor
            .overflow
            .as_ref()
            .map(|o| o.as_str())
            .map(TextOverflow::parse)
            .filter(|o| !o.is_default()),
        number_format: descriptor
            .number_format
            .as_deref()
            .filter(|fmt| !fmt.eq_ignore_ascii_case(GENERAL_NUMBER_FORMAT))
            .map(Box::from),
        border: descriptor.border.as_ref().and_then(canonical_border),
        ..CanonicalStyle::default()
    }
}

/// Keep only the first set flag of every exclusive group.
pub fn resolve_exclusive_flags(mut flags: StyleFlags) -> StyleFlags {
    for group in EXCLUSIVE_FLAG_GROUPS {
        let mut winner_seen = false;
        for &flag in group.iter() {
            if !flags.contains(flag) {
                continue;
            }
            if winner_seen {
                flags.remove(flag);
            } else {
                winner_seen = true;
            }
        }
    }
    flags
}

/// `-0.0` folds into `0.0` and every NaN payload into one NaN, so equal-looking numbers hash
/// identically.
fn canonical_f64(value: f64) -> OrderedFloat<f64> {
    if value == 0.0 {
        OrderedFloat(0.0)
    } else if value.is_nan() {
        OrderedFloat(f64::NAN)
    } else {
        OrderedFloat(value)
    }
}

fn canonical_color(spec: &ColorSpec) -> Option<CanonicalColor> {
    match spec {
        ColorSpec::Plain(s) => Some(CanonicalColor::Plain(Box::from(s.as_str()))),
        ColorSpec::Structured(c) => {
            let color = CanonicalStructuredColor {
                rgb: c.rgb.as_deref().map(Box::from),
                theme: c.theme,
                tint: c.tint.map(canonical_f64).filter(|t| t.0 != 0.0),
                indexed: c.indexed,
                auto: c.auto == Some(true),
            };
            (color.field_count() > 0).then_some(CanonicalColor::Structured(color))
        }
    }
}

fn canonical_border(spec: &BorderSpec) -> Option<CanonicalBorder> {
    let mut border = CanonicalBorder::default();
    for side in BorderSide::ALL {
        border.sides[side.index()] = spec.side(side).and_then(canonical_color);
    }
    (border.field_count() > 0).then_some(border)
}
