//! Inline `style` attribute parsing.
//!
//! [CSS Style Attributes § 2](https://www.w3.org/TR/css-style-attr/#syntax)
//!
//! "The value of the style attribute must match the syntax of the contents of
//! a CSS declaration block."
//!
//! Only `color`, `background-color` and the color part of the `background`
//! shorthand are kept; every other declaration is dropped without comment.

use tessera_common::warning::warn_once;

use crate::color::ColorValue;

/// The two properties the renderer honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProperty {
    /// `color`
    Foreground,
    /// `background-color` (or the color inside `background`)
    Background,
}

/// One kept declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDeclaration {
    /// Which color this sets.
    pub property: ColorProperty,
    /// The parsed value.
    pub value: ColorValue,
    /// [§ 6.4.2 Important Declarations](https://www.w3.org/TR/css-cascade-4/#importance)
    /// "A declaration is important if it has a !important annotation"
    pub important: bool,
}

/// Parse a `style` attribute value into its color declarations.
///
/// Later declarations of the same property replace earlier ones, unless the
/// earlier one is important and the later one is not.
#[must_use]
pub fn parse_inline_style(style: &str) -> Vec<ColorDeclaration> {
    let mut out: Vec<ColorDeclaration> = Vec::new();
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let (value, important) = split_important(value);

        let parsed = match name.as_str() {
            "color" => ColorValue::parse(value).map(|v| (ColorProperty::Foreground, v)),
            "background-color" => ColorValue::parse(value).map(|v| (ColorProperty::Background, v)),
            // [§ 3.10 background shorthand](https://www.w3.org/TR/css-backgrounds-3/#background)
            // "<final-bg-layer> = ... || <'background-color'>"
            "background" => match background_shorthand_color(value) {
                Some(v) => Some((ColorProperty::Background, v)),
                None => continue,
            },
            _ => continue,
        };

        let Some((property, value)) = parsed else {
            warn_once("Style", &format!("unparseable color in '{}'", declaration.trim()));
            continue;
        };

        let new = ColorDeclaration {
            property,
            value,
            important,
        };
        match out.iter_mut().find(|d| d.property == property) {
            Some(existing) if existing.important && !important => {}
            Some(existing) => *existing = new,
            None => out.push(new),
        }
    }
    out
}

fn split_important(value: &str) -> (&str, bool) {
    let value = value.trim();
    match value.rfind('!') {
        Some(bang) if value[bang + 1..].trim().eq_ignore_ascii_case("important") => {
            (value[..bang].trim_end(), true)
        }
        _ => (value, false),
    }
}

/// The first component of a `background` value that parses as a color.
fn background_shorthand_color(value: &str) -> Option<ColorValue> {
    let mut depth = 0_usize;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
        .into_iter()
        .filter(|p| !p.is_empty() && !p.starts_with("url("))
        .find_map(ColorValue::parse)
}
