//! Loading a node tree from its JSON interchange form.
//!
//! The renderer does not parse markup. An external parser hands over a tree,
//! and the JSON form is how that tree crosses a process boundary:
//!
//! ```json
//! {"tag": "p", "attrs": {"style": "color: red"}, "children": ["Hello ", {"tag": "b", "children": ["world"]}]}
//! ```
//!
//! - a JSON string, or an object with a `text` key, is a text leaf;
//! - an object with a `tag` key is an element (`attrs` and `children` optional);
//! - an object with a `comment` key is a comment;
//! - the document root may be one node or an array of nodes.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tessera_common::warning::warn_once;
use thiserror::Error;

use crate::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

/// Failure to turn JSON text into a [`DomTree`].
#[derive(Debug, Error)]
pub enum TreeError {
    /// The input is not JSON, or no node shape matched.
    #[error("malformed node tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// One node as it appears in the interchange form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, Value>,
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    TextLeaf {
        text: String,
    },
    Comment {
        comment: String,
    },
}

/// The document root: a single node or a list of top-level nodes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonRoot {
    Many(Vec<JsonNode>),
    One(JsonNode),
}

/// Parse the JSON interchange form into a tree whose document node holds the
/// top-level nodes.
///
/// # Errors
///
/// Returns [`TreeError::Json`] when the text is not JSON or a value matches
/// none of the node shapes.
pub fn parse_json_tree(source: &str) -> Result<DomTree, TreeError> {
    let root: JsonRoot = serde_json::from_str(source)?;
    let mut tree = DomTree::new();
    match root {
        JsonRoot::Many(nodes) => {
            for node in nodes {
                insert(&mut tree, NodeId::ROOT, node);
            }
        }
        JsonRoot::One(node) => insert(&mut tree, NodeId::ROOT, node),
    }
    Ok(tree)
}

fn insert(tree: &mut DomTree, parent: NodeId, node: JsonNode) {
    match node {
        JsonNode::Text(text) | JsonNode::TextLeaf { text } => {
            let _ = tree.append_text(parent, &text);
        }
        JsonNode::Comment { comment } => {
            let id = tree.alloc(NodeType::Comment(comment));
            tree.append_child(parent, id);
        }
        JsonNode::Element {
            tag,
            attrs,
            children,
        } => {
            let attrs = convert_attributes(&tag, attrs);
            let id = tree.alloc(NodeType::Element(ElementData::new(&tag, attrs)));
            tree.append_child(parent, id);
            for child in children {
                insert(tree, id, child);
            }
        }
    }
}

/// Attribute values are strings; scalars are stringified and anything
/// structured is dropped.
fn convert_attributes(tag: &str, attrs: BTreeMap<String, Value>) -> AttributesMap {
    attrs
        .into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    warn_once(
                        "DOM",
                        &format!("ignoring structured value of attribute '{name}' on <{tag}>"),
                    );
                    return None;
                }
            };
            Some((name.to_ascii_lowercase(), value))
        })
        .collect()
}
