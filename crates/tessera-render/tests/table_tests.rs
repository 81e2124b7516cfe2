//! Integration tests for table layout.

use tessera_css::ColorValue;
use tessera_dom::{DomTree, NodeId};
use tessera_render::metrics::text_width;
use tessera_render::table::{grid_width, pro_rate};
use tessera_render::{
    AnnotationKind, CellCache, PlainSurface, RenderOptions, Rendered, render, render_with_cache,
};

fn render_at(tree: &DomTree, width: usize) -> Rendered {
    let options = RenderOptions::new().with_fixed_width(width);
    render(tree, &options, &PlainSurface::default())
}

/// Append `<tr>` with one `<td>` per entry; each entry is `(attrs, text)`.
fn row(tree: &mut DomTree, parent: NodeId, cells: &[(&[(&str, &str)], &str)]) -> NodeId {
    let tr = tree.append_element(parent, "tr", &[]);
    for (attrs, text) in cells {
        let td = tree.append_element(tr, "td", attrs);
        let _ = tree.append_text(td, text);
    }
    tr
}

fn lines(out: &Rendered) -> Vec<&str> {
    out.lines().collect()
}

#[test]
fn test_missing_cells_are_padded() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(&mut tree, table, &[(&[], "a"), (&[], "bb")]);
    let _ = row(&mut tree, table, &[(&[], "ccc")]);

    let out = render_at(&tree, 80);
    assert_eq!(
        lines(&out),
        ["+---+---+", "|a  |bb |", "+---+---+", "|ccc|   |", "+---+---+"]
    );
}

#[test]
fn test_empty_table_draws_one_blank_row() {
    let mut tree = DomTree::new();
    let _ = tree.append_element(tree.root(), "table", &[]);

    assert_eq!(lines(&render_at(&tree, 80)), ["+---+", "|   |", "+---+"]);
}

#[test]
fn test_percentage_hints_set_suggested_widths() {
    assert_eq!(pro_rate(&[0.3, 0.7], 20, 0), vec![5, 12]);
    assert!(grid_width(&[5, 12]) <= 20);
}

#[test]
fn test_cut_column_grows_to_natural_width() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(
        &mut tree,
        table,
        &[(&[("width", "30%")], "aaaa bbbb"), (&[("width", "70%")], "cc")],
    );

    // suggested [5, 12]: the first cell wraps at 5 but fits in 10
    let out = render_at(&tree, 20);
    assert_eq!(lines(&out), ["+----------+---+", "|aaaa bbbb |cc |", "+----------+---+"]);
}

#[test]
fn test_every_row_line_matches_ruler_width() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(
        &mut tree,
        table,
        &[(&[], "a fairly long cell that must wrap"), (&[], "short")],
    );
    let _ = row(&mut tree, table, &[(&[], "x"), (&[], "y"), (&[], "z")]);

    let out = render_at(&tree, 30);
    let all = lines(&out);
    let width = text_width(all[0]);
    assert!(width <= 30);
    for line in &all {
        assert_eq!(text_width(line), width, "line {line:?}");
        assert!(line.starts_with('+') || line.starts_with('|'));
    }
    let separators = all[1].matches('|').count();
    assert_eq!(separators, 4, "three columns need four separators");
}

#[test]
fn test_row_height_is_tallest_cell() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let tr = tree.append_element(table, "tr", &[]);
    let td = tree.append_element(tr, "td", &[]);
    let _ = tree.append_text(td, "one");
    let _ = tree.append_element(td, "br", &[]);
    let _ = tree.append_text(td, "two");
    let td = tree.append_element(tr, "td", &[]);
    let _ = tree.append_text(td, "x");

    let out = render_at(&tree, 40);
    assert_eq!(
        lines(&out),
        ["+---+---+", "|one|x  |", "|two|   |", "+---+---+"]
    );
}

#[test]
fn test_row_groups_are_ordered_head_body_foot() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let tfoot = tree.append_element(table, "tfoot", &[]);
    let _ = row(&mut tree, tfoot, &[(&[], "foot")]);
    let tbody = tree.append_element(table, "tbody", &[]);
    let _ = row(&mut tree, tbody, &[(&[], "body")]);
    let thead = tree.append_element(table, "thead", &[]);
    let _ = row(&mut tree, thead, &[(&[], "head")]);

    let out = render_at(&tree, 40);
    let cells: Vec<&str> = lines(&out)
        .into_iter()
        .filter(|l| l.starts_with('|'))
        .collect();
    assert_eq!(cells, ["|head|", "|body|", "|foot|"]);
}

#[test]
fn test_caption_renders_above_table() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let caption = tree.append_element(table, "caption", &[]);
    let _ = tree.append_text(caption, "Totals");
    let _ = row(&mut tree, table, &[(&[], "1")]);

    assert_eq!(lines(&render_at(&tree, 40)), ["Totals", "+---+", "|1  |", "+---+"]);
}

#[test]
fn test_th_cells_are_bold() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let tr = tree.append_element(table, "tr", &[]);
    let th = tree.append_element(tr, "th", &[]);
    let _ = tree.append_text(th, "Name");

    let out = render_at(&tree, 40);
    let bold: Vec<&str> = out
        .annotations
        .iter()
        .filter(|ann| matches!(ann.kind, AnnotationKind::Face { .. }))
        .map(|ann| out.span_text(ann))
        .collect();
    assert_eq!(bold, ["Name"]);
}

#[test]
fn test_cell_background_covers_padding() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(&mut tree, table, &[(&[("bgcolor", "#ffff00")], "a"), (&[], "bbbbb")]);

    let out = render_at(&tree, 40);
    assert_eq!(lines(&out)[1], "|a  |bbbbb|");
    let yellow = Some(ColorValue::rgb(255, 255, 0));
    let painted: String = out
        .annotations
        .iter()
        .filter(|ann| matches!(ann.kind, AnnotationKind::Colors { background, .. } if background == yellow))
        .map(|ann| out.span_text(ann))
        .collect();
    assert_eq!(painted, "a  ");
}

#[test]
fn test_nested_table_renders_inside_cell() {
    let mut tree = DomTree::new();
    let outer = tree.append_element(tree.root(), "table", &[]);
    let tr = tree.append_element(outer, "tr", &[]);
    let td = tree.append_element(tr, "td", &[]);
    let inner = tree.append_element(td, "table", &[]);
    let _ = row(&mut tree, inner, &[(&[], "in")]);

    let out = render_at(&tree, 40);
    assert_eq!(
        lines(&out),
        ["+-----+", "|+---+|", "||in ||", "|+---+|", "+-----+"]
    );
}

#[test]
fn test_identical_cells_are_rendered_once_per_width() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(&mut tree, table, &[(&[], "x")]);
    let _ = row(&mut tree, table, &[(&[], "x")]);

    let options = RenderOptions::new().with_fixed_width(80);
    let mut cache = CellCache::new();
    let out = render_with_cache(&tree, tree.root(), &options, &PlainSurface::default(), &mut cache);

    assert_eq!(lines(&out), ["+---+", "|x  |", "+---+", "|x  |", "+---+"]);
    // sketch, natural and final pass each render once and reuse once
    assert_eq!(cache.misses(), 3);
    assert_eq!(cache.hits(), 3);
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_cache_is_cleared_per_render() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(&mut tree, table, &[(&[], "x")]);

    let options = RenderOptions::new().with_fixed_width(80);
    let mut cache = CellCache::new();
    let first = render_with_cache(&tree, tree.root(), &options, &PlainSurface::default(), &mut cache);
    let second = render_with_cache(&tree, tree.root(), &options, &PlainSurface::default(), &mut cache);

    assert_eq!(first.text, second.text);
    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.misses(), 3);
}

#[test]
fn test_narrow_width_clamps_columns_to_minimum() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let _ = row(&mut tree, table, &[(&[], "a"), (&[], "b"), (&[], "c")]);

    let out = render_at(&tree, 4);
    assert_eq!(lines(&out)[0], "+---+---+---+");
}

#[test]
fn test_indented_table_keeps_indent_on_every_line() {
    let mut tree = DomTree::new();
    let quote = tree.append_element(tree.root(), "blockquote", &[]);
    let table = tree.append_element(quote, "table", &[]);
    let _ = row(&mut tree, table, &[(&[], "q")]);

    assert_eq!(
        lines(&render_at(&tree, 40)),
        ["    +---+", "    |q  |", "    +---+"]
    );
}
