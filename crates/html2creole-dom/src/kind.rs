//! The closed vocabulary of document node kinds.

use std::fmt;

/// HTML tags that open a block-level element.
///
/// An end tag for one of these moves the builder's cursor up to the nearest
/// block-level ancestor instead of the immediate parent, which recovers from
/// inline tags left open inside a block.
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "blockquote",
    "center",
    "del",
    "dir",
    "div",
    "dl",
    "fieldset",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "ins",
    "isindex",
    "menu",
    "noframes",
    "noscript",
    "ul",
    "ol",
    "li",
    "table",
    "p",
    "pre",
];

/// Returns true if `tag` is in [`BLOCK_TAGS`].
#[must_use]
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// The category of a [`DocNode`](crate::DocNode).
///
/// Every kind except [`NodeKind::Other`] has an emission rule. `Other`
/// carries tag names outside the vocabulary so the emitter can name them in
/// its error instead of silently dropping content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The root of every tree.
    Document,
    /// `<p>`
    Paragraph,
    /// `<br>`
    LineBreak,
    /// `<h1>` .. `<h6>`; the depth is stored in the node's level.
    Headline,
    /// `<strong>`
    Strong,
    /// `<b>`
    Bold,
    /// `<i>`
    Italic,
    /// `<em>`
    Emphasis,
    /// `<hr>`
    HorizontalRule,
    /// `<a>`
    Link,
    /// `<img>`
    Image,
    /// `<ul>`
    UnorderedList,
    /// `<ol>`
    OrderedList,
    /// `<li>`
    ListItem,
    /// `<table>`
    Table,
    /// `<tr>`
    TableRow,
    /// `<th>`
    TableHeader,
    /// `<td>`
    TableCell,
    /// Literal text.
    Data,
    /// A numeric character reference, stored without `&#` and `;`.
    CharRef,
    /// A named entity reference, stored without `&` and `;`.
    EntityRef,
    /// A preformatted block cut out before tokenizing.
    PreBlock,
    /// A template block passed through untouched.
    PassBlock,
    /// An inline code span cut out before tokenizing.
    InlinePre,
    /// Any tag outside the vocabulary.
    Other(String),
}

impl NodeKind {
    /// Map an (already lowercased) HTML tag name to its node kind.
    ///
    /// Synthetic kinds (`data`, `charref`, `blockdata_pre`, ...) are never
    /// produced from tag names; a literal `<data>` tag becomes `Other`.
    #[must_use]
    pub fn from_tag_name(tag: &str) -> Self {
        match tag {
            "p" => Self::Paragraph,
            "br" => Self::LineBreak,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Self::Headline,
            "strong" => Self::Strong,
            "b" => Self::Bold,
            "i" => Self::Italic,
            "em" => Self::Emphasis,
            "hr" => Self::HorizontalRule,
            "a" => Self::Link,
            "img" => Self::Image,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "li" => Self::ListItem,
            "table" => Self::Table,
            "tr" => Self::TableRow,
            "th" => Self::TableHeader,
            "td" => Self::TableCell,
            other => Self::Other(other.to_string()),
        }
    }

    /// The kind's name as used in tree dumps and error messages.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::Paragraph => "p",
            Self::LineBreak => "br",
            Self::Headline => "headline",
            Self::Strong => "strong",
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Emphasis => "em",
            Self::HorizontalRule => "hr",
            Self::Link => "a",
            Self::Image => "img",
            Self::UnorderedList => "ul",
            Self::OrderedList => "ol",
            Self::ListItem => "li",
            Self::Table => "table",
            Self::TableRow => "tr",
            Self::TableHeader => "th",
            Self::TableCell => "td",
            Self::Data => "data",
            Self::CharRef => "charref",
            Self::EntityRef => "entityref",
            Self::PreBlock => "blockdata_pre",
            Self::PassBlock => "blockdata_pass",
            Self::InlinePre => "inlinedata_pre",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Text-like kinds carry `content` and never have children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Data
                | Self::CharRef
                | Self::EntityRef
                | Self::PreBlock
                | Self::PassBlock
                | Self::InlinePre
        )
    }

    /// Kinds whose nodes carry a `level`.
    #[must_use]
    pub const fn has_level(&self) -> bool {
        matches!(
            self,
            Self::Headline | Self::UnorderedList | Self::OrderedList | Self::ListItem
        )
    }

    /// `ul` or `ol`.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList)
    }

    /// Whether a node of this kind stops the cursor's climb on a block end tag.
    ///
    /// The document root always does, as do headlines (opened by `h1`..`h6`).
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        matches!(self, Self::Document | Self::Headline) || is_block_tag(self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_round_trip_through_as_str() {
        for tag in ["p", "br", "strong", "b", "i", "em", "hr", "a", "img", "ul", "ol", "li"] {
            assert_eq!(NodeKind::from_tag_name(tag).as_str(), tag);
        }
    }

    #[test]
    fn test_synthetic_names_are_not_tags() {
        assert_eq!(
            NodeKind::from_tag_name("data"),
            NodeKind::Other("data".to_string())
        );
        assert_eq!(
            NodeKind::from_tag_name("blockdata_pre"),
            NodeKind::Other("blockdata_pre".to_string())
        );
    }

    #[test]
    fn test_block_level_kinds() {
        assert!(NodeKind::Document.is_block_level());
        assert!(NodeKind::Headline.is_block_level());
        assert!(NodeKind::ListItem.is_block_level());
        assert!(NodeKind::Other("blockquote".to_string()).is_block_level());
        assert!(!NodeKind::Strong.is_block_level());
        assert!(!NodeKind::TableCell.is_block_level());
    }
}
