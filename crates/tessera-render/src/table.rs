//! Table layout on a character grid.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! A cell's height and real width are only known after its text has been
//! wrapped, so column widths are negotiated with trial renders:
//!
//! 1. weights from `NN%` width hints, 1 for everything else;
//! 2. suggested widths: the available width pro-rated by weight;
//! 3. sketch: every cell rendered at its suggested width, and once more at
//!    an unconstrained width for its natural width;
//! 4. reconcile: each column shrinks to what it used, and unused width goes
//!    to columns whose natural width was cut short;
//! 5. final: every cell rendered at its column width, padded to it.
//!
//! The grid is drawn with `+`, `-` and `|`. A row group boundary gets no
//! special ruler; every row is separated from the next.
//!
//! Not supported: `colspan`, `rowspan` (each cell spans one column and one
//! row), images inside cells (they are rendered after the table).

use std::collections::HashSet;
use std::rc::Rc;

use tessera_common::warning::warn_once;
use tessera_css::parse_percentage;
use tessera_dom::{DomTree, NodeId, Tag};

use crate::annotation::AnnotationKind;
use crate::cache::{CellKey, CellRender};
use crate::dispatch::{Renderer, presentational_frame};
use crate::state::{FlowKind, FoldMode};

/// No column is narrower than this, even if the table then overflows.
pub const MIN_COLUMN_WIDTH: usize = 3;

/// Width used to measure a cell's natural width.
pub const NATURAL_WIDTH: usize = 10_000;

/// Rounds of widening when a final render still overflows its column.
const MAX_FINAL_PASSES: usize = 3;

/// The rows of one table, cells padded to a common column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableGrid {
    pub caption: Option<NodeId>,
    /// `(tr, cells)`; a `None` cell is an implicit empty one.
    pub rows: Vec<(Option<NodeId>, Vec<Option<NodeId>>)>,
    pub columns: usize,
}

impl TableGrid {
    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// Rows are taken from `thead` first, then `tbody` and bare `tr`
    /// children in document order, then `tfoot`. "missing cells are
    /// rendered as if an anonymous table-cell box occupied their position".
    pub(crate) fn collect(tree: &DomTree, table: NodeId) -> Self {
        let mut caption = None;
        let mut head = Vec::new();
        let mut body = Vec::new();
        let mut foot = Vec::new();

        for &child in tree.children(table) {
            match tree.tag(child) {
                Some(Tag::Caption) if caption.is_none() => caption = Some(child),
                Some(Tag::Tr) => body.push(child),
                Some(group @ (Tag::Thead | Tag::Tbody | Tag::Tfoot)) => {
                    let rows = tree
                        .children(child)
                        .iter()
                        .copied()
                        .filter(|&row| tree.tag(row) == Some(Tag::Tr));
                    match group {
                        Tag::Thead => head.extend(rows),
                        Tag::Tfoot => foot.extend(rows),
                        _ => body.extend(rows),
                    }
                }
                _ => {}
            }
        }

        let mut rows: Vec<(Option<NodeId>, Vec<Option<NodeId>>)> = head
            .into_iter()
            .chain(body)
            .chain(foot)
            .map(|tr| (Some(tr), row_cells(tree, tr)))
            .collect();

        let columns = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0).max(1);
        if rows.is_empty() {
            rows.push((None, Vec::new()));
        }
        for (_, cells) in &mut rows {
            cells.resize(columns, None);
        }

        Self {
            caption,
            rows,
            columns,
        }
    }

    /// Relative width of each column: the first `NN%` width hint found in
    /// the column, else 1.
    pub(crate) fn column_weights(&self, tree: &DomTree) -> Vec<f64> {
        (0..self.columns)
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|(_, cells)| cells[col])
                    .filter_map(|cell| tree.as_element(cell)?.attr("width"))
                    .find_map(parse_percentage)
                    .unwrap_or(1.0)
            })
            .collect()
    }
}

fn row_cells(tree: &DomTree, tr: NodeId) -> Vec<Option<NodeId>> {
    tree.children(tr)
        .iter()
        .copied()
        .filter(|&cell| tree.tag(cell).is_some_and(Tag::is_cell))
        .inspect(|&cell| {
            if let Some(el) = tree.as_element(cell) {
                for span in ["colspan", "rowspan"] {
                    if el.attr(span).is_some_and(|v| v.trim() != "1") {
                        warn_once("Table", &format!("{span} is not supported; cell spans one"));
                    }
                }
            }
        })
        .map(Some)
        .collect()
}

/// Split the width left after indentation and `columns + 1` separators
/// across columns by weight.
///
/// Shares are floored, the columns with the largest remainders get the
/// leftover columns, then every column is raised to [`MIN_COLUMN_WIDTH`].
#[must_use]
pub fn pro_rate(weights: &[f64], width: usize, indentation: usize) -> Vec<usize> {
    let columns = weights.len();
    let available = width.saturating_sub(indentation + columns + 1);
    let total: f64 = weights.iter().sum();
    if columns == 0 || total <= 0.0 {
        return vec![MIN_COLUMN_WIDTH; columns];
    }

    let shares: Vec<f64> = weights.iter().map(|w| w / total * available as f64).collect();
    let mut widths: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
    let leftover = available.saturating_sub(widths.iter().sum());

    let mut order: Vec<usize> = (0..columns).collect();
    order.sort_by(|&a, &b| {
        let rem = |i: usize| shares[i] - shares[i].floor();
        rem(b).total_cmp(&rem(a)).then(a.cmp(&b))
    });
    for &i in order.iter().take(leftover) {
        widths[i] += 1;
    }

    widths.iter().map(|&w| w.max(MIN_COLUMN_WIDTH)).collect()
}

/// Final column widths from the trial renders.
///
/// Every column starts at the width its cells actually used, raised to
/// [`MIN_COLUMN_WIDTH`]. When the suggestion left more room than that, the
/// surplus goes to columns whose natural width is larger than their width,
/// in proportion to how much they are short, never past one more than their
/// natural width.
#[must_use]
pub fn reconcile(suggested: &[usize], used: &[usize], natural: &[usize]) -> Vec<usize> {
    let start: Vec<usize> = used.iter().map(|&w| w.max(MIN_COLUMN_WIDTH)).collect();
    let mut widths = start.clone();
    let suggested_total: usize = suggested.iter().sum();
    let used_total: usize = start.iter().sum();
    if suggested_total <= used_total {
        return widths;
    }

    let extra = suggested_total - used_total;
    let room: Vec<usize> = start
        .iter()
        .zip(natural)
        .map(|(&w, &n)| if n > w { n + 1 - w } else { 0 })
        .collect();
    let demand: usize = room.iter().sum();
    if demand == 0 {
        return widths;
    }

    let mut granted = 0;
    for (w, &r) in widths.iter_mut().zip(&room) {
        let share = (extra * r / demand).min(r);
        *w += share;
        granted += share;
    }
    // Rounding leftovers, left to right.
    let mut remaining = extra.saturating_sub(granted);
    for (i, &r) in room.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let cap = start[i] + r;
        if widths[i] < cap {
            let add = (cap - widths[i]).min(remaining);
            widths[i] += add;
            remaining -= add;
        }
    }
    widths
}

/// Width of one grid ruler line, separators included.
#[must_use]
pub fn grid_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + widths.len() + 1
}

fn ruler(indentation: usize, widths: &[usize]) -> String {
    let mut line = " ".repeat(indentation);
    line.push('+');
    for &w in widths {
        line.push_str(&"-".repeat(w));
        line.push('+');
    }
    line
}

impl Renderer<'_> {
    /// Lay out and emit a table, then any images its cells held back.
    pub(crate) fn render_table(&mut self, table: NodeId) {
        let tree = self.tree;
        let grid = TableGrid::collect(tree, table);

        if let Some(caption) = grid.caption {
            self.buf.ensure_newline();
            self.render_children(caption);
        }
        self.buf.ensure_newline();

        let indentation = self.state.indentation;
        let weights = grid.column_weights(tree);
        let suggested = pro_rate(&weights, self.state.width, indentation);
        let used = self.column_extents(&grid, &suggested);
        let natural = self.column_extents(&grid, &vec![NATURAL_WIDTH; grid.columns]);
        let mut widths = reconcile(&suggested, &used, &natural);

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[TABLE] columns={} weights={weights:?} suggested={suggested:?} used={used:?} natural={natural:?} reconciled={widths:?}",
            grid.columns
        );

        let mut rows = self.final_rows(&grid, &widths);
        for _ in 0..MAX_FINAL_PASSES {
            let overflow: Vec<usize> = (0..grid.columns)
                .map(|col| {
                    rows.iter()
                        .map(|(_, cells)| cells[col].natural_width)
                        .max()
                        .unwrap_or(0)
                })
                .collect();
            if overflow.iter().zip(&widths).all(|(o, w)| o <= w) {
                break;
            }
            widths = widths.iter().zip(&overflow).map(|(&w, &o)| w.max(o)).collect();
            #[cfg(feature = "layout-trace")]
            eprintln!("[TABLE] widened to {widths:?}");
            rows = self.final_rows(&grid, &widths);
        }

        self.emit_grid(&grid, &widths, &rows);
        self.state.kind = FlowKind::Text;

        if self.state.table_depth == 0 {
            self.render_deferred_images(&grid);
        }
    }

    /// Widest line per column when every cell is rendered at `widths`.
    fn column_extents(&mut self, grid: &TableGrid, widths: &[usize]) -> Vec<usize> {
        let mut extents = vec![0; grid.columns];
        for (tr, cells) in &grid.rows {
            let pushed = self.push_row_style(*tr);
            for (col, &cell) in cells.iter().enumerate() {
                let render = self.render_cell(cell, widths[col], false);
                extents[col] = extents[col].max(render.natural_width);
            }
            if pushed {
                let _ = self.styles.pop();
            }
        }
        extents
    }

    fn final_rows(&mut self, grid: &TableGrid, widths: &[usize]) -> Vec<(Option<NodeId>, Vec<Rc<CellRender>>)> {
        let mut rows = Vec::with_capacity(grid.rows.len());
        for (tr, cells) in &grid.rows {
            let pushed = self.push_row_style(*tr);
            let mut rendered = Vec::with_capacity(cells.len());
            for (col, &cell) in cells.iter().enumerate() {
                rendered.push(self.render_cell(cell, widths[col], true));
            }
            if pushed {
                let _ = self.styles.pop();
            }
            rows.push((*tr, rendered));
        }
        rows
    }

    fn push_row_style(&mut self, tr: Option<NodeId>) -> bool {
        let tree = self.tree;
        let Some(el) = tr.and_then(|tr| tree.as_element(tr)) else {
            return false;
        };
        let frame = presentational_frame(el);
        if frame.is_empty() {
            return false;
        }
        self.styles.push(frame);
        true
    }

    /// Render one cell in a child renderer, through the cache.
    fn render_cell(&mut self, cell: Option<NodeId>, width: usize, fill: bool) -> Rc<CellRender> {
        let tree = self.tree;
        let key = CellKey {
            content: cell.map_or(0, |c| tree.subtree_hash(c)),
            width,
            fill,
            verbatim: self.state.fold == FoldMode::Verbatim,
            style: self.styles.fingerprint(),
        };
        if let Some(hit) = self.cache.lookup(&key) {
            return hit;
        }

        let mut styles = self.styles.clone();
        if let Some(el) = cell.and_then(|c| tree.as_element(c)) {
            styles.push(presentational_frame(el));
        }
        let background = styles.resolve().background;

        let state = self.state.for_cell(width);
        let mut child = self.child(state);
        if let Some(cell) = cell {
            child.render_node(cell);
        }
        let (text, annotations) = child.buf.finish();
        let render = Rc::new(CellRender::from_text(&text, &annotations, width, fill, background));
        self.cache.store(key, Rc::clone(&render));
        render
    }

    fn emit_grid(
        &mut self,
        grid: &TableGrid,
        widths: &[usize],
        rows: &[(Option<NodeId>, Vec<Rc<CellRender>>)],
    ) {
        debug_assert_eq!(grid.columns, widths.len());
        let indentation = self.state.indentation;
        let rule = ruler(indentation, widths);
        let indent = " ".repeat(indentation);

        for (tr, cells) in rows {
            self.buf.push_str(&rule);
            self.buf.push('\n');

            let pushed = self.push_row_style(*tr);
            let row_start = self.buf.len();
            let height = cells.iter().map(|c| c.line_count()).max().unwrap_or(0).max(1);
            for line in 0..height {
                self.buf.push_str(&indent);
                self.buf.push('|');
                for (cell, &width) in cells.iter().zip(widths) {
                    let base = self.buf.len();
                    if let Some(text) = cell.lines.get(line) {
                        self.buf.push_str(text);
                        for ann in &cell.line_annotations[line] {
                            self.buf.push_annotation(ann.shifted(base));
                        }
                    } else {
                        self.buf.push_str(&" ".repeat(width));
                        if let Some(bg) = cell.background {
                            self.buf.annotate(
                                base,
                                self.buf.len(),
                                AnnotationKind::Colors {
                                    foreground: None,
                                    background: Some(bg),
                                },
                            );
                        }
                    }
                    self.buf.push('|');
                }
                self.buf.push('\n');
            }
            if pushed {
                let colors = self.styles.resolve();
                let _ = self.styles.pop();
                self.colorize(row_start, colors);
            }
        }
        self.buf.push_str(&rule);
        self.buf.push('\n');
    }

    /// Images held back by the cells. The caption was rendered in place and
    /// is not searched.
    fn render_deferred_images(&mut self, grid: &TableGrid) {
        let tree = self.tree;
        let mut seen = HashSet::new();
        let images: Vec<NodeId> = grid
            .rows
            .iter()
            .flat_map(|(_, cells)| cells.iter().flatten().copied())
            .flat_map(|cell| tree.descendants(cell))
            .filter(|&node| seen.insert(node))
            .filter(|&node| {
                tree.as_element(node)
                    .is_some_and(|el| el.tag == Tag::Img && self.fetchable_source(el).is_some())
            })
            .collect();
        for image in images {
            self.render_node(image);
        }
    }
}
