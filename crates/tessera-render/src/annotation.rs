//! Metadata attached to spans of rendered text.
//!
//! The rendered text is plain characters; everything a display surface needs
//! beyond that (faces, colors, link targets, image placeholders, rulers)
//! travels as [`Annotation`]s over byte ranges of that text.

use serde::Serialize;
use strum_macros::{Display, EnumString};
use tessera_common::image::ImageRequest;
use tessera_css::ColorValue;

/// A typographic face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Face {
    /// `b`, `strong`, headings, `th`
    Bold,
    /// `i`, `em`, `cite`, `var`
    Italic,
    /// `u`, `ins`
    Underline,
    /// `s`, `strike`, `del`
    Strikethrough,
    /// `code`, `tt`, `kbd`, `samp`, `pre`
    Monospace,
}

/// What an annotation says about its span.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Render the span in a face.
    Face {
        /// The face.
        face: Face,
    },
    /// Render the span in these colors; `None` keeps the display default.
    Colors {
        /// Foreground color.
        foreground: Option<ColorValue>,
        /// Background color.
        background: Option<ColorValue>,
    },
    /// The span is a hyperlink.
    Link {
        /// Link target, verbatim.
        href: String,
    },
    /// The span is a placeholder awaiting image data.
    Image {
        /// What to fetch, and the token to answer with.
        request: ImageRequest,
    },
    /// The span is a thematic break ruler.
    Break,
}

impl AnnotationKind {
    /// True for [`AnnotationKind::Colors`].
    #[must_use]
    pub const fn is_colors(&self) -> bool {
        matches!(self, Self::Colors { .. })
    }
}

/// A `[start, end)` byte range of the rendered text plus what it means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// First byte of the span.
    pub start: usize,
    /// One past the last byte of the span.
    pub end: usize,
    /// Meaning of the span.
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create an annotation.
    #[must_use]
    pub const fn new(start: usize, end: usize, kind: AnnotationKind) -> Self {
        Self { start, end, kind }
    }

    /// The same annotation moved right by `offset` bytes.
    #[must_use]
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            kind: self.kind.clone(),
        }
    }
}

/// Position update for the start of a span after `removed` bytes at `pos`
/// were replaced by `inserted` bytes. A start at or inside the edit moves
/// past the inserted text.
pub(crate) const fn shift_start(p: usize, pos: usize, removed: usize, inserted: usize) -> usize {
    if p < pos {
        p
    } else if p >= pos + removed {
        p - removed + inserted
    } else {
        pos + inserted
    }
}

/// Position update for the end of a span. An end at or inside the edit stays
/// in front of the inserted text.
pub(crate) const fn shift_end(p: usize, pos: usize, removed: usize, inserted: usize) -> usize {
    if p <= pos {
        p
    } else if p > pos + removed {
        p - removed + inserted
    } else {
        pos
    }
}

/// Apply [`shift_start`]/[`shift_end`] to a set of annotations.
pub(crate) fn shift_annotations(
    annotations: &mut [Annotation],
    pos: usize,
    removed: usize,
    inserted: usize,
) {
    for ann in annotations {
        ann.start = shift_start(ann.start, pos, removed, inserted);
        ann.end = shift_end(ann.end, pos, removed, inserted);
    }
}
