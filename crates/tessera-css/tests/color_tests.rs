//! Integration tests for color parsing.

use tessera_css::ColorValue;

#[test]
fn test_color_from_hex_6() {
    assert_eq!(ColorValue::from_hex("#ff0000"), Some(ColorValue::rgb(255, 0, 0)));
}

#[test]
fn test_color_from_hex_3() {
    assert_eq!(ColorValue::from_hex("#f00"), Some(ColorValue::rgb(255, 0, 0)));
}

#[test]
fn test_color_from_hex_mixed_case() {
    assert_eq!(ColorValue::from_hex("#FfA500"), Some(ColorValue::rgb(255, 165, 0)));
}

#[test]
fn test_color_from_hex_rejects_garbage() {
    assert_eq!(ColorValue::from_hex("#ggg"), None);
    assert_eq!(ColorValue::from_hex("#12345"), None);
    assert_eq!(ColorValue::from_hex("#é00"), None);
}

#[test]
fn test_parse_presentational_bare_hex() {
    assert_eq!(ColorValue::parse("00ff00"), Some(ColorValue::rgb(0, 255, 0)));
}

#[test]
fn test_parse_named() {
    assert_eq!(ColorValue::parse("Red"), Some(ColorValue::rgb(255, 0, 0)));
    assert_eq!(ColorValue::parse("navy"), Some(ColorValue::rgb(0, 0, 128)));
    assert_eq!(ColorValue::parse("transparent").map(|c| c.a), Some(0));
    assert_eq!(ColorValue::parse("notacolor"), None);
}

#[test]
fn test_parse_rgb_functions() {
    assert_eq!(ColorValue::parse("rgb(10, 20, 30)"), Some(ColorValue::rgb(10, 20, 30)));
    assert_eq!(ColorValue::parse("rgb(100% 0% 0%)"), Some(ColorValue::rgb(255, 0, 0)));
    assert_eq!(
        ColorValue::parse("rgba(0, 0, 0, 0.5)"),
        Some(ColorValue { r: 0, g: 0, b: 0, a: 128 })
    );
    assert_eq!(ColorValue::parse("rgb(1, 2)"), None);
}

#[test]
fn test_parse_hsl_function() {
    assert_eq!(ColorValue::parse("hsl(0, 100%, 50%)"), Some(ColorValue::rgb(255, 0, 0)));
    assert_eq!(ColorValue::parse("hsl(120deg 100% 25%)"), Some(ColorValue::rgb(0, 128, 0)));
}

#[test]
fn test_hex_string_round_trip_notation() {
    assert_eq!(ColorValue::rgb(255, 0, 16).to_hex_string(), "#ff0010");
}

#[test]
fn test_lightness_extremes() {
    assert!(ColorValue::BLACK.lightness().abs() < 0.01);
    assert!((ColorValue::WHITE.lightness() - 100.0).abs() < 0.01);
}

#[test]
fn test_lightness_of_near_black_is_linear() {
    // below the L* knee the curve is a straight line through the origin
    let lightness = ColorValue::rgb(1, 1, 1).lightness();
    assert!((lightness - 0.274).abs() < 0.01, "{lightness}");
}
