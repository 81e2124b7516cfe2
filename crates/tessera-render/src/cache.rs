//! Memoized table cell renders.
//!
//! A table renders each cell up to three times (sketch, natural width,
//! final) and nested tables multiply that. Within one top-level call a cell
//! with the same content, width and inherited style always renders to the
//! same lines, so the result is kept and handed out again.

use std::collections::HashMap;
use std::rc::Rc;

use tessera_css::ColorValue;

use crate::annotation::{Annotation, AnnotationKind};
use crate::metrics::text_width;

/// Identity of one cell render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    /// Structural hash of the cell subtree; `0` for a missing cell.
    pub content: u64,
    /// Column width rendered at.
    pub width: usize,
    /// Whether lines were padded to `width`.
    pub fill: bool,
    /// Whether the cell sits in verbatim text.
    pub verbatim: bool,
    /// Fingerprint of the inherited style stack.
    pub style: u64,
}

/// A cell rendered at one width.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRender {
    /// Widest line of this render. At the natural trial width this is the
    /// cell's natural width.
    pub natural_width: usize,
    /// The wrapped lines; padded to the width when rendered with fill.
    pub lines: Vec<String>,
    /// Annotations of each line, relative to the line start.
    pub line_annotations: Vec<Vec<Annotation>>,
    /// Background the cell resolved to, painted over padding.
    pub background: Option<ColorValue>,
}

impl CellRender {
    /// Cut finished cell text into lines, splitting annotations at line
    /// ends, and pad to `width` when `fill` is set.
    #[must_use]
    pub fn from_text(
        text: &str,
        annotations: &[Annotation],
        width: usize,
        fill: bool,
        background: Option<ColorValue>,
    ) -> Self {
        let mut lines = Vec::new();
        let mut line_annotations = Vec::new();
        if !text.is_empty() {
            let mut line_start = 0;
            for line in text.split('\n') {
                let line_end = line_start + line.len();
                let fragments: Vec<Annotation> = annotations
                    .iter()
                    .filter(|ann| ann.start < line_end && ann.end > line_start)
                    .map(|ann| {
                        Annotation::new(
                            ann.start.max(line_start) - line_start,
                            ann.end.min(line_end) - line_start,
                            ann.kind.clone(),
                        )
                    })
                    .collect();
                lines.push(line.to_string());
                line_annotations.push(fragments);
                line_start = line_end + 1;
            }
        }

        let natural_width = lines.iter().map(|l| text_width(l)).max().unwrap_or(0);

        if fill {
            for (line, fragments) in lines.iter_mut().zip(&mut line_annotations) {
                let pad = width.saturating_sub(text_width(line));
                if pad == 0 {
                    continue;
                }
                let start = line.len();
                line.push_str(&" ".repeat(pad));
                if let Some(bg) = background {
                    fragments.push(Annotation::new(
                        start,
                        line.len(),
                        AnnotationKind::Colors {
                            foreground: None,
                            background: Some(bg),
                        },
                    ));
                }
            }
        }

        Self {
            natural_width,
            lines,
            line_annotations,
            background,
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Cell renders of one top-level call.
#[derive(Debug, Default)]
pub struct CellCache {
    entries: HashMap<CellKey, Rc<CellRender>>,
    hits: usize,
    misses: usize,
}

impl CellCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Look a render up, counting the hit or miss.
    pub fn lookup(&mut self, key: &CellKey) -> Option<Rc<CellRender>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Keep a render.
    pub fn store(&mut self, key: CellKey, render: Rc<CellRender>) {
        let _ = self.entries.insert(key, render);
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to render.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Number of cached renders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
