//! Integration tests for image placeholders, deferral and fills.

use std::sync::mpsc;

use tessera_common::image::{ImageFill, PendingImage};
use tessera_dom::DomTree;
use tessera_render::{AnnotationKind, FillError, PlainSurface, RenderOptions, Rendered, render};

fn image_spans(out: &Rendered) -> Vec<(PendingImage, &str)> {
    out.annotations
        .iter()
        .filter_map(|ann| match &ann.kind {
            AnnotationKind::Image { request } => Some((request.token, out.span_text(ann))),
            _ => None,
        })
        .collect()
}

fn paragraph_with_image(src: &str, alt: &str) -> DomTree {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[]);
    let _ = tree.append_text(p, "before ");
    let _ = tree.append_element(p, "img", &[("src", src), ("alt", alt), ("width", "64")]);
    let _ = tree.append_text(p, " after");
    tree
}

#[test]
fn test_image_emits_placeholder_and_request() {
    let tree = paragraph_with_image("cat.png", "cat");
    let options = RenderOptions::new().with_fixed_width(40).with_image_proportion(0.5);
    let out = render(&tree, &options, &PlainSurface::default());

    // text right after an image starts a new line
    assert_eq!(out.lines().collect::<Vec<_>>(), ["before cat", "after"]);
    assert_eq!(image_spans(&out), [(PendingImage(0), "cat")]);

    let request = &out.images[0];
    assert_eq!(request.source, "cat.png");
    assert_eq!(request.alt, "cat");
    assert_eq!(request.width_hint, Some(64));
    assert_eq!(request.height_hint, None);
    assert!((request.max_proportion - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_image_without_alt_uses_star() {
    let mut tree = DomTree::new();
    let _ = tree.append_element(tree.root(), "img", &[("src", "x.png")]);
    let out = render(&tree, &RenderOptions::new(), &PlainSurface::default());
    assert_eq!(out.text, "*\n");
    assert_eq!(out.images.len(), 1);
}

#[test]
fn test_blocked_image_renders_alt_text_only() {
    let tree = paragraph_with_image("http://ads.example/banner.png", "ad");
    let options = RenderOptions::new()
        .with_fixed_width(40)
        .block_images(["^https?://ads\\."])
        .unwrap();
    let out = render(&tree, &options, &PlainSurface::default());

    assert_eq!(out.text, "before ad after\n");
    assert!(out.images.is_empty());
    assert!(image_spans(&out).is_empty());
}

#[test]
fn test_invalid_block_pattern_is_an_error() {
    let err = RenderOptions::new().block_images(["("]).unwrap_err();
    assert!(err.to_string().contains("invalid blocked-image pattern"));
}

#[test]
fn test_image_without_source_renders_alt() {
    let mut tree = DomTree::new();
    let _ = tree.append_element(tree.root(), "img", &[("alt", "missing")]);
    let out = render(&tree, &RenderOptions::new(), &PlainSurface::default());
    assert_eq!(out.text, "missing\n");
    assert!(out.images.is_empty());
}

#[test]
fn test_images_in_table_are_rendered_after_it() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let tr = tree.append_element(table, "tr", &[]);
    let td = tree.append_element(tr, "td", &[]);
    let _ = tree.append_text(td, "cell");
    let _ = tree.append_element(td, "img", &[("src", "chart.png"), ("alt", "chart")]);

    let out = render(&tree, &RenderOptions::new().with_fixed_width(40), &PlainSurface::default());
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        ["+----+", "|cell|", "+----+", "chart"]
    );
    assert_eq!(image_spans(&out), [(PendingImage(0), "chart")]);
}

#[test]
fn test_caption_image_is_emitted_once() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let caption = tree.append_element(table, "caption", &[]);
    let _ = tree.append_element(caption, "img", &[("src", "logo.png"), ("alt", "logo")]);
    let tr = tree.append_element(table, "tr", &[]);
    let td = tree.append_element(tr, "td", &[]);
    let _ = tree.append_text(td, "cell");

    let out = render(&tree, &RenderOptions::new().with_fixed_width(40), &PlainSurface::default());
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        ["logo", "+----+", "|cell|", "+----+"]
    );
    assert_eq!(out.images.len(), 1);
    assert_eq!(image_spans(&out), [(PendingImage(0), "logo")]);
}

#[test]
fn test_blocked_image_in_table_stays_in_cell() {
    let mut tree = DomTree::new();
    let table = tree.append_element(tree.root(), "table", &[]);
    let tr = tree.append_element(table, "tr", &[]);
    let td = tree.append_element(tr, "td", &[]);
    let _ = tree.append_element(td, "img", &[("src", "http://ads.example/x"), ("alt", "ad")]);

    let options = RenderOptions::new()
        .with_fixed_width(40)
        .block_images(["ads"])
        .unwrap();
    let out = render(&tree, &options, &PlainSurface::default());
    assert_eq!(out.lines().collect::<Vec<_>>(), ["+---+", "|ad |", "+---+"]);
    assert!(out.images.is_empty());
}

#[test]
fn test_fill_replaces_only_the_placeholder() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[]);
    let a = tree.append_element(p, "a", &[("href", "big.png")]);
    let _ = tree.append_element(a, "img", &[("src", "cat.png"), ("alt", "cat")]);
    let b = tree.append_element(p, "b", &[]);
    let _ = tree.append_text(b, " tail");

    let mut out = render(&tree, &RenderOptions::new().with_fixed_width(40), &PlainSurface::default());
    assert_eq!(out.text, "cat\ntail\n");

    out.apply_fill(ImageFill::new(PendingImage(0), "[IMAGE 8x2]")).unwrap();
    assert_eq!(out.text, "[IMAGE 8x2]\ntail\n");
    assert_eq!(image_spans(&out), [(PendingImage(0), "[IMAGE 8x2]")]);

    let texts: Vec<&str> = out.annotations.iter().map(|ann| out.span_text(ann)).collect();
    assert!(texts.contains(&"tail"), "later spans move with the text: {texts:?}");
    assert!(
        out.annotations
            .iter()
            .filter(|ann| matches!(ann.kind, AnnotationKind::Link { .. }))
            .all(|ann| out.span_text(ann) == "[IMAGE 8x2]")
    );
}

#[test]
fn test_fill_errors() {
    let tree = paragraph_with_image("cat.png", "cat");
    let mut out = render(&tree, &RenderOptions::new(), &PlainSurface::default());

    assert_eq!(
        out.apply_fill(ImageFill::new(PendingImage(7), "x")),
        Err(FillError::UnknownToken(PendingImage(7)))
    );
    out.apply_fill(ImageFill::new(PendingImage(0), "x")).unwrap();
    assert_eq!(
        out.apply_fill(ImageFill::new(PendingImage(0), "y")),
        Err(FillError::AlreadyFilled(PendingImage(0)))
    );
}

#[test]
fn test_fills_arrive_out_of_order_through_channel() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[]);
    for (src, alt) in [("1.png", "one"), ("2.png", "two"), ("3.png", "three")] {
        let _ = tree.append_element(p, "img", &[("src", src), ("alt", alt)]);
    }
    let mut out = render(&tree, &RenderOptions::new().with_fixed_width(40), &PlainSurface::default());
    assert_eq!(out.text, "one\ntwo\nthree\n");

    let (tx, rx) = mpsc::channel();
    let fetcher = std::thread::spawn(move || {
        for (token, replacement) in [(2, "C"), (0, "A"), (1, "B")] {
            tx.send(ImageFill::new(PendingImage(token), replacement)).unwrap();
        }
    });
    fetcher.join().unwrap();

    assert_eq!(out.drain_fills(&rx), Ok(3));
    assert_eq!(out.text, "A\nB\nC\n");
}
