//! The inheriting stack of color frames.
//!
//! [CSS Cascading Level 4 § 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
//!
//! "Inheritance propagates property values from parent elements to their
//! children."
//!
//! A frame is pushed for every element that declares a color and popped when
//! its subtree is done. Lookup walks from the innermost frame outward.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::color::ColorValue;
use crate::declaration::{ColorDeclaration, ColorProperty};

/// A color as declared on one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Declared {
    /// The declared value.
    pub color: ColorValue,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// The colors one element declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleFrame {
    /// `color`
    pub foreground: Option<Declared>,
    /// `background-color`
    pub background: Option<Declared>,
}

impl StyleFrame {
    /// Build a frame from parsed inline declarations.
    #[must_use]
    pub fn from_declarations(declarations: &[ColorDeclaration]) -> Self {
        let mut frame = Self::default();
        frame.apply(declarations);
        frame
    }

    /// Layer declarations over what the frame already holds.
    ///
    /// Used to let an inline `style` override presentational attributes such
    /// as `<font color>` on the same element.
    pub fn apply(&mut self, declarations: &[ColorDeclaration]) {
        for decl in declarations {
            let declared = Some(Declared {
                color: decl.value,
                important: decl.important,
            });
            match decl.property {
                ColorProperty::Foreground => self.foreground = declared,
                ColorProperty::Background => self.background = declared,
            }
        }
    }

    /// Set the foreground from a presentational attribute.
    #[must_use]
    pub const fn with_foreground(mut self, color: ColorValue) -> Self {
        self.foreground = Some(Declared {
            color,
            important: false,
        });
        self
    }

    /// Set the background from a presentational attribute.
    #[must_use]
    pub const fn with_background(mut self, color: ColorValue) -> Self {
        self.background = Some(Declared {
            color,
            important: false,
        });
        self
    }

    /// True when the frame declares nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }

    fn get(&self, property: ColorProperty) -> Option<Declared> {
        match property {
            ColorProperty::Foreground => self.foreground,
            ColorProperty::Background => self.background,
        }
    }
}

/// Final colors for a region; `None` means "leave the display default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResolvedColors {
    /// Resolved foreground.
    pub foreground: Option<ColorValue>,
    /// Resolved background.
    pub background: Option<ColorValue>,
}

impl ResolvedColors {
    /// True when neither color is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }
}

/// Stack of frames for the elements currently being rendered.
#[derive(Debug, Clone, Default)]
pub struct StyleStack {
    frames: Vec<StyleFrame>,
}

impl StyleStack {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Enter an element's subtree.
    pub fn push(&mut self, frame: StyleFrame) {
        self.frames.push(frame);
    }

    /// Leave the innermost subtree.
    pub fn pop(&mut self) -> Option<StyleFrame> {
        self.frames.pop()
    }

    /// Number of frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// The innermost declaration wins, except that an important declaration
    /// anywhere outward beats every normal one. Among important declarations
    /// the innermost wins.
    #[must_use]
    pub fn lookup(&self, property: ColorProperty) -> Option<ColorValue> {
        let mut normal = None;
        for frame in self.frames.iter().rev() {
            if let Some(declared) = frame.get(property) {
                if declared.important {
                    return Some(declared.color);
                }
                if normal.is_none() {
                    normal = Some(declared.color);
                }
            }
        }
        normal
    }

    /// Resolve both colors for the current position.
    ///
    /// A fully transparent background counts as unset.
    #[must_use]
    pub fn resolve(&self) -> ResolvedColors {
        ResolvedColors {
            foreground: self.lookup(ColorProperty::Foreground),
            background: self
                .lookup(ColorProperty::Background)
                .filter(|c| c.a != 0),
        }
    }

    /// Hash of the whole stack, for keying cached renders that inherit it.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frames.hash(&mut hasher);
        hasher.finish()
    }
}
