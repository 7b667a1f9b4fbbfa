//! Content categories.

use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// A named boolean classification of an element.
///
/// Content models refer to categories with an `@` prefix (`@flow`,
/// `@phrasing`, ...); see [`Category::from_reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, EnumCount)]
#[strum(serialize_all = "camelCase")]
pub enum Category {
    /// Metadata content (`@meta`).
    Metadata,
    /// Flow content (`@flow`).
    Flow,
    /// Sectioning content (`@sectioning`).
    Sectioning,
    /// Heading content (`@heading`).
    Heading,
    /// Phrasing content (`@phrasing`).
    Phrasing,
    /// Embedded content (`@embedded`).
    Embedded,
    /// Interactive content (`@interactive`).
    Interactive,
    /// Script-supporting elements (`@script`).
    ScriptSupporting,
    /// Form-associated elements (`@form`).
    Form,
}

impl Category {
    /// Resolve an `@category` token used in content models.
    ///
    /// Returns `None` for unknown names and for tokens without the `@` sigil.
    #[must_use]
    pub fn from_reference(token: &str) -> Option<Self> {
        let category = match token.strip_prefix('@')? {
            "meta" => Self::Metadata,
            "flow" => Self::Flow,
            "sectioning" => Self::Sectioning,
            "heading" => Self::Heading,
            "phrasing" => Self::Phrasing,
            "embedded" => Self::Embedded,
            "interactive" => Self::Interactive,
            "script" => Self::ScriptSupporting,
            "form" => Self::Form,
            _ => return None,
        };
        Some(category)
    }

    /// The `@token` form of this category.
    #[must_use]
    pub const fn reference(self) -> &'static str {
        match self {
            Self::Metadata => "@meta",
            Self::Flow => "@flow",
            Self::Sectioning => "@sectioning",
            Self::Heading => "@heading",
            Self::Phrasing => "@phrasing",
            Self::Embedded => "@embedded",
            Self::Interactive => "@interactive",
            Self::ScriptSupporting => "@script",
            Self::Form => "@form",
        }
    }

    /// Dense index, usable for per-category arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}
