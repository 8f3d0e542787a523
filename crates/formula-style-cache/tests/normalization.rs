use formula_style_cache::{
    canonicalize, BorderSide, BorderSpec, ColorSpec, HorizontalAlignment, StructuredColor,
    StyleCache, StyleDescriptor, StyleFlags, TextOverflow, VerticalAlignment,
};
use pretty_assertions::assert_eq;

fn parse(json: &str) -> StyleDescriptor {
    serde_json::from_str(json).unwrap()
}

#[test]
fn false_flags_collapse_to_absent() {
    let mut cache = StyleCache::new();
    let empty = cache.intern(&StyleDescriptor::default());

    for field in [
        "bold",
        "italic",
        "underline",
        "doubleUnderline",
        "strike",
        "superscript",
        "subscript",
        "wrapText",
        "shrinkToFit",
    ] {
        let style = cache.intern(&parse(&format!(r#"{{"{field}":false}}"#)));
        assert_eq!(style, empty, "{field}: false should equal absent");
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn strike_false_absent_and_empty_are_one_style() {
    let mut cache = StyleCache::new();
    let a = cache.intern(&parse(r#"{"strike":false}"#));
    let b = cache.intern(&parse("{}"));
    let c = cache.intern(&StyleDescriptor {
        strike: None,
        ..Default::default()
    });
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn zero_ordinals_collapse_to_absent() {
    let mut cache = StyleCache::new();
    let empty = cache.intern(&StyleDescriptor::default());
    assert_eq!(cache.intern(&parse(r#"{"indent":0}"#)), empty);
    assert_eq!(cache.intern(&parse(r#"{"textRotation":0}"#)), empty);
    assert_ne!(cache.intern(&parse(r#"{"indent":1}"#)), empty);
    // Semantically odd values are kept verbatim.
    let negative = cache.intern(&parse(r#"{"indent":-2}"#));
    assert_eq!(negative.indent(), Some(-2));
}

#[test]
fn default_enumerations_and_general_format_collapse() {
    let mut cache = StyleCache::new();
    let empty = cache.intern(&StyleDescriptor::default());
    for json in [
        r#"{"horizontalAlign":"general"}"#,
        r#"{"verticalAlign":"bottom"}"#,
        r#"{"overflow":"visible"}"#,
        r#"{"numberFormat":"General"}"#,
        r#"{"numberFormat":"GENERAL"}"#,
    ] {
        assert_eq!(cache.intern(&parse(json)), empty, "{json}");
    }

    let centered = canonicalize(&parse(r#"{"horizontalAlign":"center"}"#));
    assert_eq!(centered.horizontal_align(), Some(&HorizontalAlignment::Center));
}

#[test]
fn unknown_enumeration_strings_are_kept() {
    let style = canonicalize(&parse(
        r#"{"horizontalAlign":"sideways","verticalAlign":"middle","overflow":"fade"}"#,
    ));
    assert_eq!(
        style.horizontal_align(),
        Some(&HorizontalAlignment::Other("sideways".to_string()))
    );
    assert_eq!(
        style.vertical_align(),
        Some(&VerticalAlignment::Other("middle".to_string()))
    );
    assert_eq!(style.overflow(), Some(&TextOverflow::Other("fade".to_string())));
}

#[test]
fn other_variant_spelling_a_known_value_is_recognized() {
    let a = canonicalize(&StyleDescriptor {
        horizontal_align: Some(HorizontalAlignment::Other("Left".to_string())),
        ..Default::default()
    });
    let b = canonicalize(&StyleDescriptor {
        horizontal_align: Some(HorizontalAlignment::Left),
        ..Default::default()
    });
    assert_eq!(a, b);
}

#[test]
fn exclusive_flags_keep_first_declared() {
    let mut cache = StyleCache::new();
    let both = cache.intern(&parse(r#"{"superscript":true,"subscript":true}"#));
    let first = cache.intern(&parse(r#"{"superscript":true}"#));
    assert_eq!(both, first);
    assert!(!both.has(StyleFlags::SUBSCRIPT));

    let underline = cache.intern(&parse(r#"{"doubleUnderline":true,"underline":true}"#));
    assert_eq!(underline, cache.intern(&parse(r#"{"underline":true}"#)));

    let wrap = cache.intern(&parse(r#"{"shrinkToFit":true,"wrapText":true}"#));
    assert_eq!(wrap, cache.intern(&parse(r#"{"wrapText":true}"#)));

    // A group member alone is untouched.
    let sub = cache.intern(&parse(r#"{"subscript":true}"#));
    assert!(sub.has(StyleFlags::SUBSCRIPT));
    assert_ne!(sub, first);
}

#[test]
fn empty_border_is_no_border() {
    let mut cache = StyleCache::new();
    let empty = cache.intern(&parse("{}"));
    assert_eq!(cache.intern(&parse(r#"{"border":{}}"#)), empty);
    assert_eq!(
        cache.intern(&StyleDescriptor {
            border: Some(BorderSpec {
                top: None,
                ..Default::default()
            }),
            ..Default::default()
        }),
        empty
    );
    assert_eq!(
        cache.intern(&parse(r#"{"border":{"diagonalUp":null}}"#)),
        cache.intern(&parse(r#"{"border":{}}"#))
    );
}

#[test]
fn diagonal_sides_normalize_like_edges() {
    let vacuous = ColorSpec::Structured(StructuredColor {
        tint: Some(0.0),
        auto: Some(false),
        ..Default::default()
    });
    let padded = ColorSpec::Structured(StructuredColor {
        theme: Some(3),
        tint: Some(0.0),
        ..Default::default()
    });
    let plain = ColorSpec::Structured(StructuredColor {
        theme: Some(3),
        ..Default::default()
    });

    let mut cache = StyleCache::new();
    let empty = cache.intern(&StyleDescriptor::default());
    for side in BorderSide::ALL {
        let with = |color: &ColorSpec| {
            let mut border = BorderSpec::default();
            *border.side_mut(side) = Some(color.clone());
            StyleDescriptor {
                border: Some(border),
                ..Default::default()
            }
        };

        assert_eq!(cache.intern(&with(&vacuous)), empty, "{side:?}");
        let a = cache.intern(&with(&padded));
        let b = cache.intern(&with(&plain));
        assert_eq!(a, b, "{side:?}");
        assert!(a.border().and_then(|b| b.side(side)).is_some());
    }
    // One representative per side plus the empty style.
    assert_eq!(cache.len(), 7);
}

#[test]
fn colors_are_normalized_inside_color_and_fill() {
    let a = canonicalize(&parse(r#"{"fill":{"theme":4,"tint":0,"auto":false}}"#));
    let b = canonicalize(&parse(r#"{"fill":{"theme":4}}"#));
    assert_eq!(a, b);

    let c = canonicalize(&parse(r#"{"color":{"tint":0}}"#));
    assert!(c.is_empty());
}

#[test]
fn negative_zero_font_size_equals_zero() {
    let mut cache = StyleCache::new();
    let a = cache.intern(&StyleDescriptor {
        font_size: Some(-0.0),
        ..Default::default()
    });
    let b = cache.intern(&StyleDescriptor {
        font_size: Some(0.0),
        ..Default::default()
    });
    assert_eq!(a, b);

    let nan_a = cache.intern(&StyleDescriptor {
        font_size: Some(f64::NAN),
        ..Default::default()
    });
    let nan_b = cache.intern(&StyleDescriptor {
        font_size: Some(-f64::NAN),
        ..Default::default()
    });
    assert_eq!(nan_a, nan_b);
}

#[test]
fn canonical_form_serializes_without_defaults() {
    let style = canonicalize(&parse(
        r##"{"bold":true,"italic":false,"indent":0,"color":"#FF0000","border":{"top":{"tint":0}}}"##,
    ));
    assert_eq!(
        serde_json::to_value(&style).unwrap(),
        serde_json::json!({"bold": true, "color": "#FF0000"})
    );
}
