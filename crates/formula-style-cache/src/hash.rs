//! Deterministic 32-bit digest over canonical forms.
//!
//! The digest is a multiplicative (FNV-style) fold: every step is `state ^= input` followed by
//! a multiply by an odd constant. Both operations are bijections on `u32`, so two forms with the
//! same shape that differ in one numeric field always produce different states. Numeric fields are
//! preceded by a field tag and pre-multiplied by a per-field prime, so equal numbers (zero
//! included) in different fields land far apart. Strings and composites are tagged the same way.
//!
//! The finisher is the murmur3 `fmix32` avalanche, which pushes entropy into the low bits used
//! for bucket indexing.

use ordered_float::OrderedFloat;

use crate::canonical::{CanonicalBorder, CanonicalColor, CanonicalStyle};

const SEED: u32 = 0x811C_9DC5;
const MIX: u32 = 0x0100_0193;

const PRIME_FONT_SIZE: u32 = 0x9E37_79B1;
const PRIME_INDENT: u32 = 0x85EB_CA77;
const PRIME_TEXT_ROTATION: u32 = 0xC2B2_AE3D;
const PRIME_THEME: u32 = 0x27D4_EB2F;
const PRIME_TINT: u32 = 0x1656_67B1;
const PRIME_INDEXED: u32 = 0x7FFF_FFFF;
const PRIME_BORDER_SIDE: u32 = 0xFFFF_FFFB;

// Field-name tags (ASCII mnemonics).
const TAG_FONT_FAMILY: u32 = u32::from_be_bytes(*b"FAML");
const TAG_NUMBER_FORMAT: u32 = u32::from_be_bytes(*b"NFMT");
const TAG_HALIGN: u32 = u32::from_be_bytes(*b"HALN");
const TAG_VALIGN: u32 = u32::from_be_bytes(*b"VALN");
const TAG_OVERFLOW: u32 = u32::from_be_bytes(*b"OVFL");
const TAG_COLOR: u32 = u32::from_be_bytes(*b"COLR");
const TAG_FILL: u32 = u32::from_be_bytes(*b"FILL");
const TAG_BORDER: u32 = u32::from_be_bytes(*b"BRDR");
const TAG_PLAIN: u32 = u32::from_be_bytes(*b"PLAN");
const TAG_STRUCTURED: u32 = u32::from_be_bytes(*b"STRC");
const TAG_RGB: u32 = u32::from_be_bytes(*b"RGB ");
const TAG_AUTO: u32 = u32::from_be_bytes(*b"AUTO");
const TAG_FONT_SIZE: u32 = u32::from_be_bytes(*b"FSIZ");
const TAG_INDENT: u32 = u32::from_be_bytes(*b"INDT");
const TAG_TEXT_ROTATION: u32 = u32::from_be_bytes(*b"ROTN");
const TAG_THEME: u32 = u32::from_be_bytes(*b"THEM");
const TAG_TINT: u32 = u32::from_be_bytes(*b"TINT");
const TAG_INDEXED: u32 = u32::from_be_bytes(*b"INDX");
const TAG_BORDER_SIDE: u32 = u32::from_be_bytes(*b"SIDE");

/// Compute the digest of a canonical form.
pub fn digest(style: &CanonicalStyle) -> u32 {
    let mut h = StyleHasher::new();

    h.mix(u32::from(style.flags.bits()));

    if let Some(size) = style.font_size {
        h.number(TAG_FONT_SIZE, PRIME_FONT_SIZE, fold_f64(size));
    }
    if let Some(indent) = style.indent {
        h.number(TAG_INDENT, PRIME_INDENT, indent as u32);
    }
    if let Some(rotation) = style.text_rotation {
        h.number(TAG_TEXT_ROTATION, PRIME_TEXT_ROTATION, rotation as u32);
    }

    if let Some(family) = &style.font_family {
        h.string(TAG_FONT_FAMILY, family);
    }
    if let Some(format) = &style.number_format {
        h.string(TAG_NUMBER_FORMAT, format);
    }
    if let Some(align) = &style.horizontal_align {
        h.string(TAG_HALIGN, align.as_str());
    }
    if let Some(align) = &style.vertical_align {
        h.string(TAG_VALIGN, align.as_str());
    }
    if let Some(overflow) = &style.overflow {
        h.string(TAG_OVERFLOW, overflow.as_str());
    }

    if let Some(color) = &style.color {
        h.mix(TAG_COLOR);
        hash_color(&mut h, color);
    }
    if let Some(fill) = &style.fill {
        h.mix(TAG_FILL);
        hash_color(&mut h, fill);
    }
    if let Some(border) = &style.border {
        h.mix(TAG_BORDER);
        hash_border(&mut h, border);
    }

    h.finish()
}

fn hash_color(h: &mut StyleHasher, color: &CanonicalColor) {
    match color {
        CanonicalColor::Plain(s) => h.string(TAG_PLAIN, s),
        CanonicalColor::Structured(c) => {
            h.mix(TAG_STRUCTURED);
            if let Some(rgb) = &c.rgb {
                h.string(TAG_RGB, rgb);
            }
            if let Some(theme) = c.theme {
                h.number(TAG_THEME, PRIME_THEME, theme);
            }
            if let Some(tint) = c.tint {
                h.number(TAG_TINT, PRIME_TINT, fold_f64(tint));
            }
            if let Some(indexed) = c.indexed {
                h.number(TAG_INDEXED, PRIME_INDEXED, indexed);
            }
            if c.auto {
                h.mix(TAG_AUTO);
            }
        }
    }
}

fn hash_border(h: &mut StyleHasher, border: &CanonicalBorder) {
    for (side, color) in border.sides() {
        h.number(TAG_BORDER_SIDE, PRIME_BORDER_SIDE, side.index() as u32 + 1);
        hash_color(h, color);
    }
}

fn fold_f64(value: OrderedFloat<f64>) -> u32 {
    let bits = value.0.to_bits();
    (bits as u32) ^ ((bits >> 32) as u32)
}

struct StyleHasher {
    state: u32,
}

impl StyleHasher {
    fn new() -> Self {
        Self { state: SEED }
    }

    #[inline]
    fn mix(&mut self, value: u32) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(MIX);
    }

    #[inline]
    fn number(&mut self, tag: u32, prime: u32, value: u32) {
        self.mix(tag);
        self.mix(value.wrapping_mul(prime));
    }

    fn string(&mut self, tag: u32, value: &str) {
        self.mix(tag);
        for byte in value.bytes() {
            self.mix(u32::from(byte));
        }
        // Length terminator: keeps adjacent strings from sliding into each other.
        self.mix(value.len() as u32);
    }

    fn finish(self) -> u32 {
        let mut h = self.state;
        h ^= h >> 16;
        h = h.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 13;
        h = h.wrapping_mul(0xC2B2_AE35);
        h ^= h >> 16;
        h
    }
}
