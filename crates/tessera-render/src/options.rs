//! Render configuration.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use strum_macros::{Display, EnumString};
use tessera_css::{ContrastChecker, LightnessContrast};
use thiserror::Error;

use crate::breaking::{KinsokuTable, LineBreakRules};
use crate::surface::Surface;

/// Errors building [`RenderOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    /// A blocked-image pattern is not a valid regular expression.
    #[error("invalid blocked-image pattern `{pattern}`")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// What the regex compiler said.
        #[source]
        source: regex::Error,
    },
}

/// Column count the text is wrapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetWidth {
    /// Exactly this many columns.
    Fixed(usize),
    /// Whatever the [`Surface`] reports.
    #[default]
    Full,
}

/// How the host presents the result. The renderer only carries this along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    /// Shown in a window.
    #[default]
    Visible,
    /// Read out by a speech interface.
    Audible,
    /// Echoed as a one-line message.
    Echo,
}

/// Everything that tunes one render call.
#[derive(Clone)]
pub struct RenderOptions {
    /// Target width.
    pub width: TargetWidth,
    /// Largest fraction of the window an image may take; passed through to
    /// image requests for the fetcher's fitting step.
    pub max_image_proportion: f64,
    /// Image sources matching any of these render as their alt text.
    pub blocked_images: Vec<Regex>,
    /// Presentation mode, for callers.
    pub display_mode: DisplayMode,
    /// Character classification for line breaking.
    pub break_rules: Arc<dyn LineBreakRules>,
    /// Keeps declared colors readable against each other.
    pub contrast: Arc<dyn ContrastChecker>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: TargetWidth::Full,
            max_image_proportion: 0.9,
            blocked_images: Vec::new(),
            display_mode: DisplayMode::Visible,
            break_rules: Arc::new(KinsokuTable::new()),
            contrast: Arc::new(LightnessContrast::default()),
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("width", &self.width)
            .field("max_image_proportion", &self.max_image_proportion)
            .field(
                "blocked_images",
                &self.blocked_images.iter().map(Regex::as_str).collect::<Vec<_>>(),
            )
            .field("display_mode", &self.display_mode)
            .finish_non_exhaustive()
    }
}

impl RenderOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width.
    #[must_use]
    pub const fn with_width(mut self, width: TargetWidth) -> Self {
        self.width = width;
        self
    }

    /// Shorthand for [`TargetWidth::Fixed`].
    #[must_use]
    pub const fn with_fixed_width(self, columns: usize) -> Self {
        self.with_width(TargetWidth::Fixed(columns))
    }

    /// Set the image-to-window proportion, clamped to `(0, 1]`.
    #[must_use]
    pub fn with_image_proportion(mut self, proportion: f64) -> Self {
        if proportion.is_finite() && proportion > 0.0 {
            self.max_image_proportion = proportion.min(1.0);
        }
        self
    }

    /// Add blocked-image patterns.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn block_images<I, S>(mut self, patterns: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|source| OptionsError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.blocked_images.push(regex);
        }
        Ok(self)
    }

    /// Set the display mode.
    #[must_use]
    pub const fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    /// Replace the line breaking classification.
    #[must_use]
    pub fn with_break_rules(mut self, rules: Arc<dyn LineBreakRules>) -> Self {
        self.break_rules = rules;
        self
    }

    /// Replace the contrast checker.
    #[must_use]
    pub fn with_contrast(mut self, checker: Arc<dyn ContrastChecker>) -> Self {
        self.contrast = checker;
        self
    }

    /// True when an image source matches a blocked pattern.
    #[must_use]
    pub fn is_blocked(&self, source: &str) -> bool {
        self.blocked_images.iter().any(|re| re.is_match(source))
    }

    /// The concrete wrap width for a surface. Never less than one column.
    #[must_use]
    pub fn resolve_width(&self, surface: &dyn Surface) -> usize {
        match self.width {
            TargetWidth::Fixed(columns) => columns,
            TargetWidth::Full => surface.display_width(),
        }
        .max(1)
    }
}
