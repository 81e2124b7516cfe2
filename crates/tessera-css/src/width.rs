//! Percentage width hints.
//!
//! [HTML 4.01 § 6.6 Lengths](https://www.w3.org/TR/html401/types.html#type-length)
//!
//! "Percentage: ... 20% means twenty percent of the available horizontal
//! space." The renderer only uses percentage hints, as relative column
//! weights; pixel widths carry no meaning on a character grid.

/// Parse `"30%"` (or `" 30.5 % "`) into the fraction `0.3`.
///
/// Returns `None` for anything that is not a positive percentage.
#[must_use]
pub fn parse_percentage(text: &str) -> Option<f64> {
    let number = text.trim().strip_suffix('%')?.trim();
    let value: f64 = number.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value / 100.0)
}
