//! Keeping a foreground readable on its background.
//!
//! Markup authors pick colors for a white page; the display may be dark.
//! Before a region's colors are applied they pass through a
//! [`ContrastChecker`], which may substitute the foreground.

use crate::color::ColorValue;
use crate::stack::ResolvedColors;

/// Decides whether two colors are distinguishable and repairs them if not.
pub trait ContrastChecker: Send + Sync {
    /// Return a readable `(foreground, background)` pair. The background is
    /// treated as fixed; implementations adjust the foreground.
    fn ensure_visible(&self, foreground: ColorValue, background: ColorValue) -> (ColorValue, ColorValue);
}

/// Requires a minimum CIE L* distance between foreground and background.
#[derive(Debug, Clone, Copy)]
pub struct LightnessContrast {
    /// Smallest acceptable `|L*(fg) - L*(bg)|`.
    pub min_difference: f64,
}

impl Default for LightnessContrast {
    fn default() -> Self {
        Self {
            min_difference: 40.0,
        }
    }
}

/// Blend step used while searching for a readable foreground.
const MIX_STEP: f64 = 0.05;

impl ContrastChecker for LightnessContrast {
    fn ensure_visible(&self, foreground: ColorValue, background: ColorValue) -> (ColorValue, ColorValue) {
        let bg_l = background.lightness();
        let readable = |c: &ColorValue| (c.lightness() - bg_l).abs() >= self.min_difference;
        if readable(&foreground) {
            return (foreground, background);
        }

        // Push away from the background's side of the lightness scale first.
        let (first, second) = if bg_l >= 50.0 {
            (ColorValue::BLACK, ColorValue::WHITE)
        } else {
            (ColorValue::WHITE, ColorValue::BLACK)
        };
        for target in [first, second] {
            let mut t = MIX_STEP;
            while t <= 1.0 {
                let candidate = foreground.mix(target, t);
                if readable(&candidate) {
                    return (candidate, background);
                }
                t += MIX_STEP;
            }
        }
        (first, background)
    }
}

/// Turn the colors declared for a region into the colors to apply.
///
/// A side that was not declared starts from the display default so the
/// contrast check has a concrete pair to compare. A side ends up set in the
/// result only if it was declared or the checker changed it.
#[must_use]
pub fn resolve_visible(
    declared: ResolvedColors,
    default_foreground: ColorValue,
    default_background: ColorValue,
    checker: &dyn ContrastChecker,
) -> ResolvedColors {
    if declared.is_empty() {
        return declared;
    }
    let fg = declared.foreground.unwrap_or(default_foreground);
    let bg = declared.background.unwrap_or(default_background);
    let (new_fg, new_bg) = checker.ensure_visible(fg, bg);
    ResolvedColors {
        foreground: (declared.foreground.is_some() || new_fg != fg).then_some(new_fg),
        background: (declared.background.is_some() || new_bg != bg).then_some(new_bg),
    }
}
