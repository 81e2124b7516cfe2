//! Per-call render state.
//!
//! One [`RenderState`] is threaded through a descent. Block rules change a
//! field, render their children, and put the old value back; a table cell
//! gets its own copy.

/// Whether text is wrapped or kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldMode {
    /// Collapse whitespace and wrap at the target width.
    #[default]
    Wrap,
    /// Keep whitespace and newlines, never wrap (`pre`).
    Verbatim,
}

/// The marker the next list item gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    /// Not inside a list.
    #[default]
    None,
    /// `ul`: every item gets `* `.
    Bullet,
    /// `ol`: the next item gets this number.
    Numbered(u32),
}

/// What the flow emitted last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowKind {
    /// Ordinary text.
    #[default]
    Text,
    /// An image placeholder; following text starts a new line.
    Image,
}

/// Mutable state of one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    /// Wrap width in columns.
    pub width: usize,
    /// Columns of indentation for new lines.
    pub indentation: usize,
    /// Folding mode.
    pub fold: FoldMode,
    /// Active list marker.
    pub list: ListState,
    /// Number of enclosing tables.
    pub table_depth: usize,
    /// Images are not emitted (table cells).
    pub inhibit_images: bool,
    /// Kind of the last emitted item.
    pub kind: FlowKind,
}

impl RenderState {
    /// State for a top-level render at `width` columns.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            indentation: 0,
            fold: FoldMode::Wrap,
            list: ListState::None,
            table_depth: 0,
            inhibit_images: false,
            kind: FlowKind::Text,
        }
    }

    /// State for rendering one table cell at `width` columns.
    ///
    /// Folding mode carries over (a table inside `pre` stays verbatim);
    /// everything else starts fresh.
    #[must_use]
    pub const fn for_cell(&self, width: usize) -> Self {
        Self {
            width,
            indentation: 0,
            fold: self.fold,
            list: ListState::None,
            table_depth: self.table_depth + 1,
            inhibit_images: true,
            kind: FlowKind::Text,
        }
    }
}
