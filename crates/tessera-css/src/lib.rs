//! Color handling for the Tessera renderer.
//!
//! # Scope
//!
//! The renderer understands exactly two style properties, `color` and
//! `background-color`, plus the HTML presentational color attributes. This
//! crate implements:
//! - **Color Values** ([CSS Color Level 4](https://www.w3.org/TR/css-color-4/))
//!   - Hex notations, the basic and extended named colors, `rgb()`/`hsl()`
//! - **Inline Declarations** ([CSS Style Attributes](https://www.w3.org/TR/css-style-attr/))
//!   - `style="..."` parsing restricted to color properties, `!important`
//! - **Style Stack** - inheriting frames with innermost-wins lookup
//! - **Contrast** - keeping a foreground readable on its background
//! - **Width Hints** - percentage widths used as table column weights
//!
//! # Not Yet Implemented
//!
//! - Any property other than the two colors
//! - Selectors and stylesheets (no cascade beyond inheritance)

/// Color values per [CSS Color Level 4](https://www.w3.org/TR/css-color-4/).
pub mod color;
/// Contrast checking between foreground and background.
pub mod contrast;
/// Inline `style` attribute parsing.
pub mod declaration;
/// The inheriting stack of color frames.
pub mod stack;
/// Percentage width hints.
pub mod width;

pub use color::ColorValue;
pub use contrast::{ContrastChecker, LightnessContrast, resolve_visible};
pub use declaration::{ColorDeclaration, ColorProperty, parse_inline_style};
pub use stack::{Declared, ResolvedColors, StyleFrame, StyleStack};
pub use width::parse_percentage;
