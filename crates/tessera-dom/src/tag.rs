//! The closed tag vocabulary understood by the renderer.
//!
//! [§ 4 The elements of HTML](https://html.spec.whatwg.org/multipage/#toc-semantics)
//!
//! Every element name resolves to exactly one [`Tag`]. Names outside the
//! vocabulary resolve to [`Tag::Unknown`], which the renderer treats with its
//! generic "render the children" rule, so no input tag is ever an error.

use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumString};

/// Element names the renderer has a rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum Tag {
    A,
    Article,
    Aside,
    Audio,
    B,
    Blockquote,
    Body,
    Br,
    Caption,
    Center,
    Cite,
    Code,
    Dd,
    Del,
    Div,
    Dl,
    Dt,
    Em,
    Figure,
    Font,
    Footer,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hr,
    Html,
    I,
    Img,
    Ins,
    Kbd,
    Li,
    Main,
    Nav,
    Ol,
    P,
    Pre,
    S,
    Samp,
    Script,
    Section,
    Span,
    Strike,
    Strong,
    Style,
    Table,
    Tbody,
    Td,
    Template,
    Tfoot,
    Th,
    Thead,
    Title,
    Tr,
    Tt,
    U,
    Ul,
    Var,
    Video,
    /// Any element name outside the vocabulary.
    #[strum(serialize = "#unknown")]
    Unknown,
}

impl Tag {
    /// Resolve an element name, falling back to [`Tag::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name).unwrap_or(Self::Unknown)
    }

    /// Heading level for `h1`..`h6`.
    #[must_use]
    pub const fn heading_level(self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }

    /// `thead`, `tbody` and `tfoot`.
    ///
    /// [§ 17.2.1](https://www.w3.org/TR/CSS2/tables.html#table-display)
    /// "These elements specify that an element groups one or more rows."
    #[must_use]
    pub const fn is_row_group(self) -> bool {
        matches!(self, Self::Thead | Self::Tbody | Self::Tfoot)
    }

    /// `td` and `th`.
    #[must_use]
    pub const fn is_cell(self) -> bool {
        matches!(self, Self::Td | Self::Th)
    }
}
