//! The display surface the rendered text is destined for.

use tessera_css::ColorValue;

/// What the renderer needs to know about the host display.
pub trait Surface {
    /// Width in character cells, consulted when the target width is
    /// [`TargetWidth::Full`](crate::TargetWidth::Full).
    fn display_width(&self) -> usize;

    /// Foreground used where the markup declares none.
    fn default_foreground(&self) -> ColorValue;

    /// Background used where the markup declares none.
    fn default_background(&self) -> ColorValue;
}

/// A fixed-size surface with fixed default colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainSurface {
    /// Width in cells.
    pub width: usize,
    /// Default foreground.
    pub foreground: ColorValue,
    /// Default background.
    pub background: ColorValue,
}

impl PlainSurface {
    /// A surface of the given width, black on white.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            foreground: ColorValue::BLACK,
            background: ColorValue::WHITE,
        }
    }

    /// Swap in other default colors.
    #[must_use]
    pub const fn with_colors(mut self, foreground: ColorValue, background: ColorValue) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }
}

impl Default for PlainSurface {
    fn default() -> Self {
        Self::new(80)
    }
}

impl Surface for PlainSurface {
    fn display_width(&self) -> usize {
        self.width
    }

    fn default_foreground(&self) -> ColorValue {
        self.foreground
    }

    fn default_background(&self) -> ColorValue {
        self.background
    }
}
