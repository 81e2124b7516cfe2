//! Property tests for the flow engine.

use quickcheck_macros::quickcheck;
use tessera_dom::DomTree;
use tessera_render::metrics::text_width;
use tessera_render::{PlainSurface, RenderOptions, Rendered, render};

fn paragraph(leaves: &[String]) -> DomTree {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[]);
    for leaf in leaves {
        let _ = tree.append_text(p, leaf);
    }
    tree
}

fn render_at(tree: &DomTree, width: usize) -> Rendered {
    render(tree, &RenderOptions::new().with_fixed_width(width), &PlainSurface::default())
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Words of ASCII letters, lengths taken from the generated numbers.
fn words(lengths: &[u8]) -> String {
    lengths
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let letter = char::from(b'a' + (i % 26) as u8);
            letter.to_string().repeat(usize::from(n % 15) + 1)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[quickcheck]
fn prop_render_is_deterministic(leaves: Vec<String>, width: u8) -> bool {
    let tree = paragraph(&leaves);
    let width = usize::from(width % 70) + 1;
    let first = render_at(&tree, width);
    let second = render_at(&tree, width);
    first.text == second.text && first.annotations == second.annotations
}

#[quickcheck]
fn prop_no_content_is_lost(leaves: Vec<String>, width: u8) -> bool {
    let tree = paragraph(&leaves);
    let out = render_at(&tree, usize::from(width % 70) + 1);
    without_whitespace(&out.text) == without_whitespace(&leaves.concat())
}

#[quickcheck]
fn prop_lines_fit_unless_single_word(lengths: Vec<u8>, width: u8) -> bool {
    let width = usize::from(width % 50) + 10;
    let tree = paragraph(&[words(&lengths)]);
    let out = render_at(&tree, width);
    out.lines()
        .all(|line| text_width(line) <= width || !line.trim().contains(' '))
}

#[quickcheck]
fn prop_refolding_output_is_stable(lengths: Vec<u8>, width: u8) -> bool {
    let width = usize::from(width % 50) + 10;
    let once = render_at(&paragraph(&[words(&lengths)]), width);
    let twice = render_at(&paragraph(&[once.text.clone()]), width);
    once.text == twice.text
}

#[quickcheck]
fn prop_annotations_stay_in_bounds(leaves: Vec<String>, width: u8) -> bool {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[]);
    for (i, leaf) in leaves.iter().enumerate() {
        let parent = if i % 2 == 0 {
            tree.append_element(p, "b", &[])
        } else {
            tree.append_element(p, "span", &[("style", "color: red")])
        };
        let _ = tree.append_text(parent, leaf);
    }
    let out = render_at(&tree, usize::from(width % 70) + 1);
    out.annotations.iter().all(|ann| {
        ann.start < ann.end
            && ann.end <= out.text.len()
            && out.text.is_char_boundary(ann.start)
            && out.text.is_char_boundary(ann.end)
    })
}
