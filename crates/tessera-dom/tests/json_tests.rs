//! Tests for the JSON interchange loader.

use tessera_dom::{NodeId, NodeType, Tag, parse_json_tree};

#[test]
fn test_parse_single_element() {
    let tree = parse_json_tree(
        r#"{"tag": "p", "attrs": {"style": "color: red"}, "children": ["Hello ", {"tag": "b", "children": [{"text": "world"}]}]}"#,
    )
    .unwrap();

    let p = tree.children(NodeId::ROOT)[0];
    assert_eq!(tree.tag(p), Some(Tag::P));
    assert_eq!(tree.as_element(p).unwrap().attr("style"), Some("color: red"));
    assert_eq!(tree.children(p).len(), 2);
    assert_eq!(tree.text_content(p), "Hello world");
}

#[test]
fn test_parse_top_level_array() {
    let tree = parse_json_tree(r#"["a", {"comment": "skip"}, {"tag": "br"}]"#).unwrap();
    let top = tree.children(NodeId::ROOT);
    assert_eq!(top.len(), 3);
    assert_eq!(tree.as_text(top[0]), Some("a"));
    assert!(matches!(
        tree.get(top[1]).map(|n| &n.node_type),
        Some(NodeType::Comment(_))
    ));
    assert_eq!(tree.tag(top[2]), Some(Tag::Br));
}

#[test]
fn test_scalar_attributes_are_stringified() {
    let tree = parse_json_tree(
        r#"{"tag": "img", "attrs": {"width": 40, "hidden": true, "data": {"x": 1}}}"#,
    )
    .unwrap();
    let img = tree.as_element(tree.children(NodeId::ROOT)[0]).unwrap();
    assert_eq!(img.attr("width"), Some("40"));
    assert_eq!(img.attr("hidden"), Some("true"));
    assert_eq!(img.attr("data"), None);
}

#[test]
fn test_unknown_tag_is_kept() {
    let tree = parse_json_tree(r#"{"tag": "blink", "children": ["x"]}"#).unwrap();
    let el = tree.children(NodeId::ROOT)[0];
    assert_eq!(tree.tag(el), Some(Tag::Unknown));
    assert_eq!(tree.as_element(el).unwrap().tag_name, "blink");
}

#[test]
fn test_malformed_json_is_an_error() {
    assert!(parse_json_tree("{not json").is_err());
    assert!(parse_json_tree("42").is_err());
}
