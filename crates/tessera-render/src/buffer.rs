//! The output text and its annotations.
//!
//! [`TextBuffer`] is the sink the flow engine and the tag rules write into:
//! append text, ask for the current column, mark spans. Every edit goes
//! through [`TextBuffer::splice`], which keeps annotation spans and open
//! region markers pointing at the same characters.
//!
//! [`Rendered`] is what a render call hands back, and the place where image
//! fills arrive later.

use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;

use serde::Serialize;
use tessera_common::image::{ImageFill, ImageRequest, PendingImage};
use thiserror::Error;

use crate::annotation::{Annotation, AnnotationKind, shift_annotations, shift_end, shift_start};
use crate::metrics::text_width;

/// Growable output text with annotations.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    annotations: Vec<Annotation>,
    markers: Vec<usize>,
    /// End of a list marker just written; the line counts as fresh there.
    prefix_end: Option<usize>,
}

impl TextBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The text so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True when nothing was written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Annotations recorded so far.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Append text verbatim.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append one character verbatim.
    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Append a list marker. A line holding only the marker still counts as
    /// fresh for [`Self::ensure_newline`] and [`Self::ensure_paragraph`].
    pub fn push_prefix(&mut self, prefix: &str) {
        self.text.push_str(prefix);
        self.prefix_end = Some(self.text.len());
    }

    /// Record an annotation over `[start, end)`. Empty spans are dropped.
    pub fn annotate(&mut self, start: usize, end: usize, kind: AnnotationKind) {
        if start < end && end <= self.text.len() {
            self.annotations.push(Annotation::new(start, end, kind));
        }
    }

    /// Add an already positioned annotation.
    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotate(annotation.start, annotation.end, annotation.kind);
    }

    /// Remember the current end of the text; the position follows later
    /// edits. Markers nest.
    pub fn open_marker(&mut self) {
        self.markers.push(self.text.len());
    }

    /// Position of the innermost open marker, which is closed.
    pub fn close_marker(&mut self) -> usize {
        self.markers.pop().unwrap_or(self.text.len()).min(self.text.len())
    }

    /// Replace `removed` bytes at `pos` with `insert`.
    pub fn splice(&mut self, pos: usize, removed: usize, insert: &str) {
        let end = (pos + removed).min(self.text.len());
        let removed = end - pos;
        self.text.replace_range(pos..end, insert);
        shift_annotations(&mut self.annotations, pos, removed, insert.len());
        for marker in &mut self.markers {
            *marker = shift_start(*marker, pos, removed, insert.len());
        }
        self.prefix_end = self
            .prefix_end
            .map(|p| shift_end(p, pos, removed, insert.len()));
    }

    /// Byte offset where the current line starts.
    #[must_use]
    pub fn line_start(&self) -> usize {
        self.text.rfind('\n').map_or(0, |i| i + 1)
    }

    /// The current (last) line.
    #[must_use]
    pub fn current_line(&self) -> &str {
        &self.text[self.line_start()..]
    }

    /// Column of the write position.
    #[must_use]
    pub fn column(&self) -> usize {
        text_width(self.current_line())
    }

    /// True when the current line holds nothing but spaces.
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.current_line().bytes().all(|b| b == b' ')
    }

    fn at_fresh_line(&self) -> bool {
        self.at_line_start() || self.prefix_end == Some(self.text.len())
    }

    /// The last character written.
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    /// Drop spaces at the end of the current line.
    pub fn trim_trailing_spaces(&mut self) {
        let line = self.current_line();
        let kept = line.trim_end_matches(' ').len();
        let removed = line.len() - kept;
        if removed > 0 {
            self.splice(self.text.len() - removed, removed, "");
        }
    }

    /// End the current line.
    pub fn newline(&mut self) {
        self.trim_trailing_spaces();
        self.text.push('\n');
    }

    /// Start a new line unless already at the start of one.
    pub fn ensure_newline(&mut self) {
        if self.at_fresh_line() {
            if self.prefix_end != Some(self.text.len()) {
                self.trim_trailing_spaces();
            }
            return;
        }
        self.newline();
    }

    /// Leave exactly one blank line before what follows, unless at the very
    /// start of the text or right after a list marker.
    pub fn ensure_paragraph(&mut self) {
        if self.prefix_end == Some(self.text.len()) {
            return;
        }
        if self.at_line_start() {
            self.trim_trailing_spaces();
        } else {
            self.newline();
        }
        if !self.text.is_empty() && !self.text.ends_with("\n\n") {
            self.text.push('\n');
        }
    }

    /// Finish the buffer: trailing whitespace is dropped and every
    /// annotation is clamped to the text.
    #[must_use]
    pub fn finish(mut self) -> (String, Vec<Annotation>) {
        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        let len = self.text.len();
        self.annotations.retain_mut(|ann| {
            ann.end = ann.end.min(len);
            ann.start < ann.end
        });
        (self.text, self.annotations)
    }
}

/// Errors applying an image fill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    /// No placeholder carries this token.
    #[error("no image placeholder for token {0:?}")]
    UnknownToken(PendingImage),
    /// The placeholder was already replaced.
    #[error("image placeholder {0:?} was already filled")]
    AlreadyFilled(PendingImage),
}

/// The result of a render call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rendered {
    /// The produced text, one `\n` per line end.
    pub text: String,
    /// Spans over `text`, in byte offsets.
    pub annotations: Vec<Annotation>,
    /// Image placeholders waiting for a fetcher, in document order.
    pub images: Vec<ImageRequest>,
    #[serde(skip)]
    filled: BTreeSet<PendingImage>,
}

impl Rendered {
    pub(crate) fn new(text: String, annotations: Vec<Annotation>, images: Vec<ImageRequest>) -> Self {
        Self {
            text,
            annotations,
            images,
            filled: BTreeSet::new(),
        }
    }

    /// Iterate over the produced lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Text covered by an annotation.
    #[must_use]
    pub fn span_text(&self, annotation: &Annotation) -> &str {
        self.text.get(annotation.start..annotation.end).unwrap_or("")
    }

    /// Span of the placeholder carrying `token`.
    fn placeholder(&self, token: PendingImage) -> Option<(usize, usize)> {
        self.annotations.iter().find_map(|ann| match &ann.kind {
            AnnotationKind::Image { request } if request.token == token => Some((ann.start, ann.end)),
            _ => None,
        })
    }

    /// Replace the placeholder of `fill.token` with its replacement text.
    ///
    /// Spans covering only the placeholder cover the replacement afterwards;
    /// every other span keeps pointing at the same characters. Nothing is
    /// re-flowed.
    ///
    /// # Errors
    ///
    /// [`FillError::UnknownToken`] when no placeholder carries the token,
    /// [`FillError::AlreadyFilled`] when it was replaced before.
    #[allow(clippy::needless_pass_by_value)]
    pub fn apply_fill(&mut self, fill: ImageFill) -> Result<(), FillError> {
        if self.filled.contains(&fill.token) {
            return Err(FillError::AlreadyFilled(fill.token));
        }
        let (start, end) = self
            .placeholder(fill.token)
            .ok_or(FillError::UnknownToken(fill.token))?;
        let inserted = fill.replacement.len();
        self.text.replace_range(start..end, &fill.replacement);
        for ann in &mut self.annotations {
            if ann.start >= start && ann.end <= end {
                ann.start = start;
                ann.end = start + inserted;
            } else {
                ann.start = shift_start(ann.start, start, end - start, inserted);
                ann.end = shift_end(ann.end, start, end - start, inserted);
            }
        }
        let _ = self.filled.insert(fill.token);
        Ok(())
    }

    /// Apply every fill waiting on `fills` without blocking. Returns how
    /// many were applied; stops at the first bad fill.
    ///
    /// # Errors
    ///
    /// The first [`FillError`] met.
    pub fn drain_fills(&mut self, fills: &Receiver<ImageFill>) -> Result<usize, FillError> {
        let mut applied = 0;
        while let Ok(fill) = fills.try_recv() {
            self.apply_fill(fill)?;
            applied += 1;
        }
        Ok(applied)
    }
}
