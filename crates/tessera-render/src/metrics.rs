//! Character-cell measurement.
//!
//! [UAX #11 East Asian Width](https://www.unicode.org/reports/tr11/)
//!
//! "In a broad sense, wide characters include W, F, and A (when in East
//! Asian context), and narrow characters include N, Na, H, and A (when not in
//! East Asian context)."
//!
//! Wide characters occupy two cells of the grid, everything else one.
//! Control characters occupy none.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells occupied by one character.
#[must_use]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Cells occupied by a string.
#[must_use]
pub fn text_width(text: &str) -> usize {
    text.width()
}
