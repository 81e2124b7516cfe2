//! CSS Color values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! Colors reach the renderer as raw attribute or declaration text, so parsing
//! works on `&str` directly rather than on a token stream.

use serde::Serialize;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The sixteen basic keywords plus the extended keywords most often seen in
/// mail and news markup.
const NAMED_COLORS: &[(&str, u8, u8, u8)] = &[
    ("black", 0, 0, 0),
    ("silver", 192, 192, 192),
    ("gray", 128, 128, 128),
    ("grey", 128, 128, 128),
    ("white", 255, 255, 255),
    ("maroon", 128, 0, 0),
    ("red", 255, 0, 0),
    ("purple", 128, 0, 128),
    ("fuchsia", 255, 0, 255),
    ("magenta", 255, 0, 255),
    ("green", 0, 128, 0),
    ("lime", 0, 255, 0),
    ("olive", 128, 128, 0),
    ("yellow", 255, 255, 0),
    ("navy", 0, 0, 128),
    ("blue", 0, 0, 255),
    ("teal", 0, 128, 128),
    ("aqua", 0, 255, 255),
    ("cyan", 0, 255, 255),
    ("orange", 255, 165, 0),
    ("brown", 165, 42, 42),
    ("pink", 255, 192, 203),
    ("gold", 255, 215, 0),
    ("beige", 245, 245, 220),
    ("ivory", 255, 255, 240),
    ("khaki", 240, 230, 140),
    ("lavender", 230, 230, 250),
    ("indigo", 75, 0, 130),
    ("violet", 238, 130, 238),
    ("coral", 255, 127, 80),
    ("salmon", 250, 128, 114),
    ("tomato", 255, 99, 71),
    ("crimson", 220, 20, 60),
    ("darkred", 139, 0, 0),
    ("darkblue", 0, 0, 139),
    ("darkgreen", 0, 100, 0),
    ("darkgray", 169, 169, 169),
    ("darkgrey", 169, 169, 169),
    ("lightgray", 211, 211, 211),
    ("lightgrey", 211, 211, 211),
    ("lightblue", 173, 216, 230),
    ("lightgreen", 144, 238, 144),
    ("lightyellow", 255, 255, 224),
    ("whitesmoke", 245, 245, 245),
    ("gainsboro", 220, 220, 220),
    ("dimgray", 105, 105, 105),
    ("dimgrey", 105, 105, 105),
    ("steelblue", 70, 130, 180),
    ("skyblue", 135, 206, 235),
    ("royalblue", 65, 105, 225),
    ("midnightblue", 25, 25, 112),
    ("forestgreen", 34, 139, 34),
    ("seagreen", 46, 139, 87),
    ("chocolate", 210, 105, 30),
    ("tan", 210, 180, 140),
    ("wheat", 245, 222, 179),
    ("snow", 255, 250, 250),
    ("linen", 250, 240, 230),
    ("aliceblue", 240, 248, 255),
    ("antiquewhite", 250, 235, 215),
];

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse any supported color notation: hex, keyword, `rgb()`/`rgba()`,
    /// `hsl()`/`hsla()`.
    ///
    /// HTML presentational attributes (`bgcolor="ff0000"`) omit the `#`, so a
    /// bare run of hex digits is accepted as well.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(open) = text.find('(') {
            let name = text[..open].trim();
            let args = text[open + 1..].trim_end().strip_suffix(')')?;
            return parse_color_function(name, args);
        }
        if text.starts_with('#') {
            return Self::from_hex(text);
        }
        Self::from_named(text).or_else(|| Self::from_hex(text))
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // [§ 4.2.1]
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    /// "CSS defines a large set of named colors..."
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("transparent") {
            return Some(Self { r: 0, g: 0, b: 0, a: 0 });
        }
        NAMED_COLORS
            .iter()
            .find(|(n, ..)| n.eq_ignore_ascii_case(name))
            .map(|&(_, r, g, b)| Self::rgb(r, g, b))
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    ///
    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// [WCAG 2.1 relative luminance](https://www.w3.org/TR/WCAG21/#dfn-relative-luminance)
    ///
    /// "the relative brightness of any point in a colorspace, normalized to 0
    /// for darkest black and 1 for lightest white"
    #[must_use]
    pub fn relative_luminance(&self) -> f64 {
        let linear = |channel: u8| {
            let c = f64::from(channel) / 255.0;
            if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.0722_f64.mul_add(
            linear(self.b),
            0.2126_f64.mul_add(linear(self.r), 0.7152 * linear(self.g)),
        )
    }

    /// CIE L* lightness (0 = black, 100 = white).
    #[must_use]
    pub fn lightness(&self) -> f64 {
        let y = self.relative_luminance();
        let f = if y > 216.0 / 24389.0 {
            y.cbrt()
        } else {
            (24389.0_f64 / 27.0).mul_add(y, 16.0) / 116.0
        };
        116.0_f64.mul_add(f, -16.0)
    }

    /// Linear blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn mix(&self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| {
            (f64::from(b) - f64::from(a))
                .mul_add(t, f64::from(a))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a,
        }
    }
}

/// [§ 4.1 The RGB Functions: rgb() and rgba()](https://www.w3.org/TR/css-color-4/#rgb-functions)
/// [§ 4.1 The HSL Functions: hsl() and hsla()](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
///
/// Per CSS Color 4, rgb()/rgba() and hsl()/hsla() are aliases.
fn parse_color_function(name: &str, args: &str) -> Option<ColorValue> {
    let vals = extract_color_args(args)?;
    match name.to_ascii_lowercase().as_str() {
        "rgb" | "rgba" => parse_rgb_function(&vals),
        "hsl" | "hsla" => parse_hsl_function(&vals),
        _ => None,
    }
}

/// A numeric value extracted from a color function argument.
#[derive(Debug, Clone, Copy)]
enum ColorArg {
    Number(f64),
    Percentage(f64),
}

/// Split a color function's argument text on commas, whitespace and the
/// alpha slash.
///
/// Handles both modern syntax (space-separated with optional `/ alpha`)
/// and legacy syntax (comma-separated). Any argument that is not a number
/// or percentage rejects the whole function.
fn extract_color_args(args: &str) -> Option<Vec<ColorArg>> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Some(pct) = part.strip_suffix('%') {
                pct.parse().ok().map(ColorArg::Percentage)
            } else {
                part.trim_end_matches("deg").parse().ok().map(ColorArg::Number)
            }
        })
        .collect()
}

/// [§ 4.1 The RGB Functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
///
/// "Values outside these ranges are not invalid, but are clamped to the
/// ranges defined here at parsed-value time."
fn parse_rgb_function(vals: &[ColorArg]) -> Option<ColorValue> {
    if vals.len() < 3 {
        return None;
    }
    Some(ColorValue {
        r: color_channel_to_u8(vals[0]),
        g: color_channel_to_u8(vals[1]),
        b: color_channel_to_u8(vals[2]),
        // "If omitted, it defaults to 100%."
        a: vals.get(3).map_or(255, |&v| alpha_to_u8(v)),
    })
}

/// [§ 4.1 The HSL Functions](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
///
/// "<hue> is a <number> or <angle>, interpreted as degrees."
fn parse_hsl_function(vals: &[ColorArg]) -> Option<ColorValue> {
    if vals.len() < 3 {
        return None;
    }
    let hue = match vals[0] {
        ColorArg::Number(v) => v,
        ColorArg::Percentage(v) => v * 3.6,
    };
    let fraction = |arg: ColorArg| match arg {
        ColorArg::Percentage(v) | ColorArg::Number(v) => v / 100.0,
    };
    let (r, g, b) = hsl_to_rgb(hue, fraction(vals[1]), fraction(vals[2]));
    Some(ColorValue {
        r,
        g,
        b,
        a: vals.get(3).map_or(255, |&v| alpha_to_u8(v)),
    })
}

/// Numbers are clamped to 0-255; percentages map 0%-100% to 0-255.
fn color_channel_to_u8(arg: ColorArg) -> u8 {
    let v = match arg {
        ColorArg::Number(n) => n,
        ColorArg::Percentage(p) => p * 255.0 / 100.0,
    };
    v.round().clamp(0.0, 255.0) as u8
}

/// "The <alpha-value> can be a <number> (clamped to [0, 1]) or a
/// <percentage> (clamped to [0%, 100%])."
fn alpha_to_u8(arg: ColorArg) -> u8 {
    let v = match arg {
        ColorArg::Number(n) => n * 255.0,
        ColorArg::Percentage(p) => p * 255.0 / 100.0,
    };
    v.round().clamp(0.0, 255.0) as u8
}

/// [§ 4.2.4 HSL-to-RGB](https://www.w3.org/TR/css-color-4/#hsl-to-rgb)
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let h = ((hue % 360.0) + 360.0) % 360.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let c = (1.0 - 2.0_f64.mul_add(l, -1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        5 => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };

    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    (to_u8(r1), to_u8(g1), to_u8(b1))
}
