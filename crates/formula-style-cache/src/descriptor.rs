use core::fmt;

use serde::{Deserialize, Serialize};

/// A raw formatting request, as produced by the formatting layer.
///
/// Descriptors rely on **property presence** semantics: a missing key means "inherit / default".
/// Nothing here is validated; out-of-range sizes and unknown enumeration strings are carried
/// verbatim into the canonical form.
///
/// Descriptors are never stored directly. Pass them to
/// [`StyleCache::intern`](crate::StyleCache::intern) to obtain the shared representative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superscript: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscript: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink_to_fit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Indent level. `0` is the same as no indent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<i32>,
    /// Text rotation in degrees. `0` is horizontal text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_rotation: Option<i32>,

    /// Font color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    /// Background fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<ColorSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<TextOverflow>,

    /// Excel-style number format code (e.g. `0.00%`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderSpec>,
}

/// A color value: either a plain CSS-ish string (`#FF0000`, `red`) or a structured
/// theme/indexed reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Plain(String),
    Structured(StructuredColor),
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        ColorSpec::Plain(value.to_string())
    }
}

impl From<StructuredColor> for ColorSpec {
    fn from(value: StructuredColor) -> Self {
        ColorSpec::Structured(value)
    }
}

/// Multi-field color reference (mirrors the XLSX `CT_Color` attributes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<u32>,
    /// Tint applied to `theme`/`rgb` in `-1.0..=1.0`. `0.0` means no tint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,
}

/// One side of a [`BorderSpec`].
///
/// Edges and diagonals are peers: every operation treats all six sides alike.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BorderSide {
    Top,
    Right,
    Bottom,
    Left,
    DiagonalUp,
    DiagonalDown,
}

impl BorderSide {
    /// All sides in canonical order.
    pub const ALL: [BorderSide; 6] = [
        BorderSide::Top,
        BorderSide::Right,
        BorderSide::Bottom,
        BorderSide::Left,
        BorderSide::DiagonalUp,
        BorderSide::DiagonalDown,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BorderSide::Top => "top",
            BorderSide::Right => "right",
            BorderSide::Bottom => "bottom",
            BorderSide::Left => "left",
            BorderSide::DiagonalUp => "diagonalUp",
            BorderSide::DiagonalDown => "diagonalDown",
        }
    }
}

/// Border formatting: a color per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal_up: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal_down: Option<ColorSpec>,
}

impl BorderSpec {
    pub fn side(&self, side: BorderSide) -> Option<&ColorSpec> {
        match side {
            BorderSide::Top => self.top.as_ref(),
            BorderSide::Right => self.right.as_ref(),
            BorderSide::Bottom => self.bottom.as_ref(),
            BorderSide::Left => self.left.as_ref(),
            BorderSide::DiagonalUp => self.diagonal_up.as_ref(),
            BorderSide::DiagonalDown => self.diagonal_down.as_ref(),
        }
    }

    pub fn side_mut(&mut self, side: BorderSide) -> &mut Option<ColorSpec> {
        match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Right => &mut self.right,
            BorderSide::Bottom => &mut self.bottom,
            BorderSide::Left => &mut self.left,
            BorderSide::DiagonalUp => &mut self.diagonal_up,
            BorderSide::DiagonalDown => &mut self.diagonal_down,
        }
    }
}

/// Declares a string-backed enumeration that keeps unrecognized values verbatim.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A value this crate does not recognize, kept as-is.
            Other(String),
        }

        impl $name {
            /// The no-op value, dropped during canonicalization.
            pub const DEFAULT: $name = $name::$default;

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(s) => s.as_str(),
                }
            }

            /// Parse a value, mapping known names (ASCII case-insensitive) onto variants.
            pub fn parse(value: &str) -> Self {
                $(
                    if value.eq_ignore_ascii_case($text) {
                        return $name::$variant;
                    }
                )+
                $name::Other(value.to_string())
            }

            pub fn is_default(&self) -> bool {
                *self == Self::DEFAULT
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match Self::parse(&value) {
                    $name::Other(_) => $name::Other(value),
                    known => known,
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(s) => s,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum! {
    /// Horizontal alignment.
    HorizontalAlignment, default = General {
        General => "general",
        Left => "left",
        Center => "center",
        Right => "right",
        Fill => "fill",
        Justify => "justify",
        CenterContinuous => "centerContinuous",
        Distributed => "distributed",
    }
}

open_enum! {
    /// Vertical alignment.
    VerticalAlignment, default = Bottom {
        Top => "top",
        Center => "center",
        Bottom => "bottom",
        Justify => "justify",
        Distributed => "distributed",
    }
}

open_enum! {
    /// What happens to text wider than its cell.
    TextOverflow, default = Visible {
        Visible => "visible",
        Clip => "clip",
        Ellipsis => "ellipsis",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_strings_round_trip_verbatim() {
        let align: HorizontalAlignment = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(align, HorizontalAlignment::Other("sideways".to_string()));
        assert_eq!(serde_json::to_string(&align).unwrap(), "\"sideways\"");

        let align: HorizontalAlignment = serde_json::from_str("\"CENTER\"").unwrap();
        assert_eq!(align, HorizontalAlignment::Center);
    }

    #[test]
    fn color_spec_accepts_plain_and_structured() {
        let plain: ColorSpec = serde_json::from_str("\"#FF0000\"").unwrap();
        assert_eq!(plain, ColorSpec::Plain("#FF0000".to_string()));

        let structured: ColorSpec = serde_json::from_str(r#"{"theme":4,"tint":0.4}"#).unwrap();
        assert_eq!(
            structured,
            ColorSpec::Structured(StructuredColor {
                theme: Some(4),
                tint: Some(0.4),
                ..Default::default()
            })
        );
    }

    #[test]
    fn border_sides_are_addressable_uniformly() {
        let mut border = BorderSpec::default();
        for side in BorderSide::ALL {
            *border.side_mut(side) = Some(ColorSpec::from(side.as_str()));
        }
        for side in BorderSide::ALL {
            assert_eq!(border.side(side), Some(&ColorSpec::from(side.as_str())));
        }
        assert_eq!(border.diagonal_up, Some(ColorSpec::from("diagonalUp")));
    }
}
