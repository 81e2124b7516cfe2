//! The Tessera rendering core.
//!
//! Turns a markup tree into fixed-width text plus a list of annotations
//! (faces, colors, links, image placeholders, rulers) over byte ranges of
//! that text. Nothing is parsed, fetched or drawn here: the tree comes from
//! [`tessera_dom`], images are left to a fetcher that answers with
//! [`ImageFill`](tessera_common::image::ImageFill) messages, and a display
//! surface interprets the annotations.
//!
//! # Pipeline
//!
//! ```text
//! DomTree -> Renderer (tag rules) -> InlineFlow -> TextBuffer -> Rendered
//!                  |                                  ^
//!                  +-> table layout -> cell renders --+
//! ```
//!
//! # Example
//!
//! ```
//! use tessera_dom::DomTree;
//! use tessera_render::{PlainSurface, RenderOptions, render};
//!
//! let mut tree = DomTree::new();
//! let p = tree.append_element(tree.root(), "p", &[]);
//! let _ = tree.append_text(p, "The quick brown fox jumps");
//!
//! let options = RenderOptions::new().with_fixed_width(10);
//! let out = render(&tree, &options, &PlainSurface::default());
//! assert_eq!(out.lines().collect::<Vec<_>>(), ["The quick", "brown fox", "jumps"]);
//! ```

/// Annotation records.
pub mod annotation;
/// Line breaking classification and break search.
pub mod breaking;
/// Output text buffer and render results.
pub mod buffer;
/// Memoized cell renders.
pub mod cache;
mod dispatch;
/// Inline flow engine.
pub mod flow;
/// Character-cell widths.
pub mod metrics;
/// Render configuration.
pub mod options;
/// Per-call render state.
pub mod state;
/// Display surface description.
pub mod surface;
/// Table layout.
pub mod table;

pub use annotation::{Annotation, AnnotationKind, Face};
pub use breaking::{KINSOKU_SCAN_LIMIT, KinsokuTable, LineBreakRules};
pub use buffer::{FillError, Rendered, TextBuffer};
pub use cache::{CellCache, CellKey, CellRender};
pub use options::{DisplayMode, OptionsError, RenderOptions, TargetWidth};
pub use surface::{PlainSurface, Surface};
pub use table::{MIN_COLUMN_WIDTH, NATURAL_WIDTH};

use tessera_common::warning::clear_warnings;
use tessera_dom::{DomTree, NodeId};

use crate::dispatch::Renderer;

/// Render a whole tree.
#[must_use]
pub fn render(tree: &DomTree, options: &RenderOptions, surface: &dyn Surface) -> Rendered {
    render_node(tree, tree.root(), options, surface)
}

/// Render the subtree rooted at `node`.
#[must_use]
pub fn render_node(tree: &DomTree, node: NodeId, options: &RenderOptions, surface: &dyn Surface) -> Rendered {
    let mut cache = CellCache::new();
    render_with_cache(tree, node, options, surface, &mut cache)
}

/// Render the subtree rooted at `node` through a caller-owned cell cache.
///
/// The cache is cleared first; afterwards its counters tell how many cell
/// renders were reused.
pub fn render_with_cache(
    tree: &DomTree,
    node: NodeId,
    options: &RenderOptions,
    surface: &dyn Surface,
    cache: &mut CellCache,
) -> Rendered {
    clear_warnings();
    cache.clear();
    let mut renderer = Renderer::new(tree, options, surface, cache);
    renderer.render_node(node);
    renderer.finish()
}
