//! Image hand-off types shared between the renderer and an image fetcher.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! The renderer never fetches or decodes image data. It emits a placeholder
//! for every `<img>` and tags that placeholder with a [`PendingImage`] token.
//! An external fetcher later answers with an [`ImageFill`] message naming the
//! same token; the output side swaps the placeholder for the replacement
//! without re-flowing anything else. Fills may arrive in any order.

use serde::Serialize;

/// Opaque token identifying one image placeholder within one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PendingImage(pub u32);

/// Everything a fetcher needs to satisfy one placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    /// Token to quote back in the matching [`ImageFill`].
    pub token: PendingImage,
    /// The `src` attribute, verbatim.
    pub source: String,
    /// The `alt` attribute, or an empty string.
    pub alt: String,
    /// Declared `width` attribute, when it parses as a whole number.
    pub width_hint: Option<u32>,
    /// Declared `height` attribute, when it parses as a whole number.
    pub height_hint: Option<u32>,
    /// Largest fraction of the window the decoded image may occupy.
    ///
    /// Only the fetcher's image-fit step reads this.
    pub max_proportion: f64,
}

/// A fetcher's answer for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFill {
    /// The token from the originating [`ImageRequest`].
    pub token: PendingImage,
    /// Text that replaces the placeholder span.
    pub replacement: String,
}

impl ImageFill {
    /// Create a fill message.
    #[must_use]
    pub fn new(token: PendingImage, replacement: impl Into<String>) -> Self {
        Self {
            token,
            replacement: replacement.into(),
        }
    }
}
