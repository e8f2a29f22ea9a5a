//! Creole markup emitter.
//!
//! Walks a [`DocTree`] depth-first and writes Creole 1.0 markup. Every node
//! kind has exactly one rule; the only state carried between calls is the
//! list marker prefix, threaded through the walk as a [`ListContext`].

mod entity;
mod error;
mod table;

use std::borrow::Cow;

use serde::Deserialize;

use html2creole_common::trace::Trace;
use html2creole_dom::{DocNode, DocTree, NodeId, NodeKind};

pub use entity::{resolve_charref, resolve_entityref};
pub use error::EmitError;
pub use table::{align_table, split_cells};

/// Options for the emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterOptions {
    /// Decode entities such as `&amp;` inside `<pre>` and inline code
    /// content. Off by default: verbatim text is written as captured.
    pub decode_verbatim_entities: bool,
}

/// The list markers of the enclosing lists, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListContext {
    prefix: String,
}

impl ListContext {
    /// The marker prefix for an item at the current depth, e.g. `*#`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the walk is inside a list.
    #[must_use]
    pub fn in_list(&self) -> bool {
        !self.prefix.is_empty()
    }

    fn enter(&mut self, marker: char) {
        self.prefix.push(marker);
    }

    fn leave(&mut self) {
        let _ = self.prefix.pop();
    }
}

/// Writes a document tree as Creole markup.
///
/// ```
/// use html2creole_dom::{AttributesMap, DocNode, DocTree, NodeKind};
/// use html2creole_emit::{Emitter, EmitterOptions};
///
/// let mut tree = DocTree::new();
/// let p = tree.create_child(tree.root(), DocNode::element(NodeKind::Paragraph, AttributesMap::new()));
/// let strong = tree.create_child(p, DocNode::element(NodeKind::Strong, AttributesMap::new()));
/// let _ = tree.create_child(strong, DocNode::leaf(NodeKind::Data, "bold"));
///
/// let creole = Emitter::new(&tree, EmitterOptions::default()).emit().unwrap();
/// assert_eq!(creole, "**bold**");
/// ```
pub struct Emitter<'t> {
    tree: &'t DocTree,
    options: EmitterOptions,
    trace: Trace,
}

impl<'t> Emitter<'t> {
    /// Create an emitter for `tree`.
    #[must_use]
    pub const fn new(tree: &'t DocTree, options: EmitterOptions) -> Self {
        Self {
            tree,
            options,
            trace: Trace::disabled(),
        }
    }

    /// Trace every node as it is emitted.
    #[must_use]
    pub const fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    /// Emit the whole document, trimmed of surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmitError`] met in document order; no partial
    /// output is produced.
    pub fn emit(&self) -> Result<String, EmitError> {
        let mut context = ListContext::default();
        let markup = self.emit_node(self.tree.root(), &mut context)?;
        Ok(markup.trim().to_string())
    }

    /// Emit one node and its subtree.
    ///
    /// # Errors
    ///
    /// See [`Emitter::emit`].
    pub fn emit_node(&self, id: NodeId, context: &mut ListContext) -> Result<String, EmitError> {
        let node = self.tree.get(id).ok_or(EmitError::MissingNode(id))?;
        self.trace.event(id.0, "emit", &node.kind);

        match &node.kind {
            NodeKind::Document => self.emit_children(node, context),
            NodeKind::Paragraph => Ok(format!("{}\n\n", self.emit_children(node, context)?)),
            NodeKind::Headline => {
                let level = node.level.ok_or(EmitError::InvalidContentType {
                    kind: NodeKind::Headline,
                    reason: "headline without a level",
                })?;
                let content = self.emit_children(node, context)?;
                Ok(format!("{} {content}\n\n", "=".repeat(level)))
            }
            NodeKind::Strong | NodeKind::Bold => {
                Ok(format!("**{}**", self.emit_children(node, context)?))
            }
            NodeKind::Italic | NodeKind::Emphasis => {
                Ok(format!("//{}//", self.emit_children(node, context)?))
            }
            NodeKind::LineBreak => {
                expect_no_content(node)?;
                Ok(if context.in_list() { "\\\\" } else { "\n" }.to_string())
            }
            NodeKind::HorizontalRule => {
                expect_no_content(node)?;
                Ok("----\n\n".to_string())
            }
            NodeKind::Link => self.emit_link(node, context),
            NodeKind::Image => {
                expect_no_content(node)?;
                let src = required_attr(node, "src")?;
                let alt = required_attr(node, "alt")?;
                Ok(format!("{{{{{src}|{alt}}}}}"))
            }
            NodeKind::UnorderedList => self.emit_list(node, '*', context),
            NodeKind::OrderedList => self.emit_list(node, '#', context),
            NodeKind::ListItem => {
                let content = self.emit_children(node, context)?;
                Ok(format!(
                    "\n{} {}",
                    context.prefix(),
                    content.trim_start_matches(' ').trim_end()
                ))
            }
            NodeKind::Table => {
                let rows = self.emit_children(node, context)?;
                Ok(format!("{}\n\n", align_table(&rows)))
            }
            NodeKind::TableRow => Ok(format!("{}|\n", self.emit_children(node, context)?)),
            NodeKind::TableHeader => {
                let content = self.emit_children(node, context)?;
                Ok(format!("|= {}", escape_linebreaks(&content)))
            }
            NodeKind::TableCell => {
                let content = self.emit_children(node, context)?;
                Ok(format!("| {}", escape_linebreaks(&content)))
            }
            NodeKind::Data => Ok(leaf_content(node)?.to_string()),
            NodeKind::CharRef => Ok(resolve_charref(leaf_content(node)?)?.to_string()),
            NodeKind::EntityRef => resolve_entityref(leaf_content(node)?),
            NodeKind::PreBlock => {
                let content = self.verbatim(leaf_content(node)?);
                if content.contains('\n') {
                    Ok(format!("{{{{{{\n{content}\n}}}}}}\n\n"))
                } else {
                    Ok(format!("{{{{{{{content}}}}}}}\n\n"))
                }
            }
            NodeKind::InlinePre => {
                let content = self.verbatim(leaf_content(node)?);
                Ok(format!("{{{{{{ {content} }}}}}}"))
            }
            NodeKind::PassBlock => Ok(format!("{}\n\n", leaf_content(node)?)),
            NodeKind::Other(name) => Err(EmitError::UnknownNodeKind { kind: name.clone() }),
        }
    }

    fn emit_children(&self, node: &DocNode, context: &mut ListContext) -> Result<String, EmitError> {
        expect_no_content(node)?;
        let mut out = String::new();
        for &child in &node.children {
            out.push_str(&self.emit_node(child, context)?);
        }
        Ok(out)
    }

    fn emit_link(&self, node: &DocNode, context: &mut ListContext) -> Result<String, EmitError> {
        let href = required_attr(node, "href")?;
        let label = self.emit_children(node, context)?;
        if label == href {
            Ok(format!("[[{href}]]"))
        } else {
            Ok(format!("[[{href}|{label}]]"))
        }
    }

    /// Outermost lists are trimmed and end the block; nested lists are
    /// returned as-is so their items continue the enclosing item.
    fn emit_list(
        &self,
        node: &DocNode,
        marker: char,
        context: &mut ListContext,
    ) -> Result<String, EmitError> {
        context.enter(marker);
        let content = self.emit_children(node, context);
        context.leave();
        let content = content?;

        if context.in_list() {
            Ok(content)
        } else {
            Ok(format!("{}\n\n", content.trim()))
        }
    }

    fn verbatim<'c>(&self, content: &'c str) -> Cow<'c, str> {
        if self.options.decode_verbatim_entities {
            html_escape::decode_html_entities(content)
        } else {
            Cow::Borrowed(content)
        }
    }
}

fn expect_no_content(node: &DocNode) -> Result<(), EmitError> {
    if node.content.is_some() {
        return Err(EmitError::InvalidContentType {
            kind: node.kind.clone(),
            reason: "container node carries text",
        });
    }
    Ok(())
}

fn leaf_content(node: &DocNode) -> Result<&str, EmitError> {
    if !node.children.is_empty() {
        return Err(EmitError::InvalidContentType {
            kind: node.kind.clone(),
            reason: "text node has children",
        });
    }
    node.content
        .as_deref()
        .ok_or_else(|| EmitError::InvalidContentType {
            kind: node.kind.clone(),
            reason: "text node without text",
        })
}

fn required_attr<'n>(node: &'n DocNode, attribute: &'static str) -> Result<&'n str, EmitError> {
    node.attr(attribute)
        .ok_or_else(|| EmitError::MissingRequiredAttribute {
            kind: node.kind.clone(),
            attribute,
        })
}

/// Trim a table cell and turn its line breaks into forced breaks.
fn escape_linebreaks(content: &str) -> String {
    content
        .trim()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\\\\")
}
