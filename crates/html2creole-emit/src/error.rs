use html2creole_dom::{NodeId, NodeKind};
use thiserror::Error;

/// Reasons a document tree cannot be written as Creole.
///
/// A failed emission never returns partial markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// An image without `src` or `alt`, or a link without `href`.
    #[error("<{kind}> is missing the required attribute '{attribute}'")]
    MissingRequiredAttribute {
        /// Kind of the offending node.
        kind: NodeKind,
        /// The missing attribute.
        attribute: &'static str,
    },

    /// A node whose kind has no emission rule.
    #[error("don't know how to emit <{kind}>")]
    UnknownNodeKind {
        /// The tag name the node was built from.
        kind: String,
    },

    /// A text leaf without text, or a container carrying text.
    #[error("invalid content on {kind} node: {reason}")]
    InvalidContentType {
        /// Kind of the offending node.
        kind: NodeKind,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A character or entity reference with no known character.
    #[error("unresolved reference '{name}'")]
    UnresolvedEntityReference {
        /// The reference name, e.g. `nbspx` or `x110000`.
        name: String,
    },

    /// A child index that does not point into the tree.
    #[error("node {0:?} is not in the tree")]
    MissingNode(NodeId),
}
