//! Tree builder: turns the token stream into a [`DocTree`].
//!
//! The builder keeps a single insertion point (`cursor`) and a list nesting
//! counter. There is no stack of open elements; end tags move the cursor
//! upwards without checking that they match what was opened, so malformed
//! input still produces a tree.

use std::collections::HashSet;

use serde::Deserialize;
use strum_macros::Display;

use html2creole_common::trace::Trace;
use html2creole_dom::{AttributesMap, DocNode, DocTree, NodeId, NodeKind, dump_tree, is_block_tag};

use crate::tokenizer::{Attribute, Token};
use crate::verbatim::{RegionKind, VerbatimTable};

/// Tags that never produce a node. Their content is attached to the
/// enclosing node instead.
pub const DEFAULT_IGNORE_TAGS: &[&str] = &[
    "html", "head", "body", "thead", "tbody", "tfoot", "div", "span", "font",
];

/// Tags read as leaves even when written without `/>`.
const VOID_TAGS: &[&str] = &["img", "br", "hr"];

/// Options for the tree builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Tag names to ignore on top of [`DEFAULT_IGNORE_TAGS`].
    pub ignore_tags: Vec<String>,
}

/// A recoverable problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong.
    pub message: String,
    /// Index into the token stream where this issue was encountered.
    pub token_index: usize,
}

/// What the builder did with a token, for the debug trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum BuilderEvent {
    Open,
    Leaf,
    Close,
    Text,
    Reference,
    Placeholder,
    Skip,
}

/// Builds a [`DocTree`] from tokens.
///
/// ```
/// use html2creole_html::{Tokenizer, TreeBuilder, BuilderOptions, VerbatimTable};
/// use html2creole_dom::NodeKind;
///
/// let mut tokenizer = Tokenizer::new("<p>Hi</p>".to_string());
/// tokenizer.run();
/// let table = VerbatimTable::new();
/// let tree = TreeBuilder::new(tokenizer.into_tokens(), &table, &BuilderOptions::default()).run();
/// let p = tree.children(tree.root())[0];
/// assert_eq!(tree.kind(p), Some(&NodeKind::Paragraph));
/// ```
pub struct TreeBuilder<'a> {
    tokens: Vec<Token>,
    token_index: usize,
    tree: DocTree,
    /// The current insertion point.
    cursor: NodeId,
    /// Nesting depth of open lists. Lives outside the tree so it carries
    /// across sibling lists.
    list_depth: usize,
    ignore_tags: HashSet<String>,
    verbatim: &'a VerbatimTable,
    issues: Vec<ParseIssue>,
    trace: Trace,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over `tokens`. Placeholders are resolved against
    /// `verbatim`.
    #[must_use]
    pub fn new(tokens: Vec<Token>, verbatim: &'a VerbatimTable, options: &BuilderOptions) -> Self {
        let ignore_tags = DEFAULT_IGNORE_TAGS
            .iter()
            .map(|tag| (*tag).to_string())
            .chain(options.ignore_tags.iter().map(|tag| tag.to_ascii_lowercase()))
            .collect();
        Self {
            tokens,
            token_index: 0,
            tree: DocTree::new(),
            cursor: NodeId::ROOT,
            list_depth: 0,
            ignore_tags,
            verbatim,
            issues: Vec::new(),
            trace: Trace::disabled(),
        }
    }

    /// Trace every token and dump the finished tree.
    #[must_use]
    pub const fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    /// Current insertion point.
    #[must_use]
    pub const fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Current list nesting depth.
    #[must_use]
    pub const fn list_depth(&self) -> usize {
        self.list_depth
    }

    /// Issues recorded so far.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Build the tree, discarding parse issues.
    #[must_use]
    pub fn run(self) -> DocTree {
        self.run_with_issues().0
    }

    /// Build the tree and return it together with the issues found.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DocTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.iter().enumerate() {
            self.token_index = index;
            self.process_token(token);
        }
        self.finish()
    }

    /// Feed one token.
    pub fn process_token(&mut self, token: &Token) {
        let event = match token {
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_start_tag(name, *self_closing, attributes),
            Token::EndTag { name } => self.handle_end_tag(name),
            Token::Text { data } => self.handle_text(data),
            Token::CharRef { name } => {
                self.insert_leaf(NodeKind::CharRef, name);
                BuilderEvent::Reference
            }
            Token::EntityRef { name } => {
                self.insert_leaf(NodeKind::EntityRef, name);
                BuilderEvent::Reference
            }
            Token::Comment { .. } | Token::Declaration { .. } | Token::ProcessingInstruction { .. } => {
                BuilderEvent::Skip
            }
            Token::EndOfFile => {
                self.handle_eof();
                BuilderEvent::Skip
            }
        };
        self.trace.event(self.token_index, &event.to_string(), token);
    }

    /// Stop building and hand out the tree.
    #[must_use]
    pub fn finish(mut self) -> (DocTree, Vec<ParseIssue>) {
        if self.trace.is_enabled() {
            self.trace
                .block("document tree", &dump_tree(&self.tree, NodeId::ROOT));
        }
        let issues = std::mem::take(&mut self.issues);
        (self.tree, issues)
    }

    fn handle_start_tag(
        &mut self,
        name: &str,
        self_closing: bool,
        attributes: &[Attribute],
    ) -> BuilderEvent {
        if self.ignore_tags.contains(name) {
            return BuilderEvent::Skip;
        }
        if RegionKind::is_placeholder_tag(name) {
            self.insert_placeholder(name, attributes);
            return BuilderEvent::Placeholder;
        }

        let kind = NodeKind::from_tag_name(name);
        let attrs = collect_attributes(attributes);

        if self_closing || VOID_TAGS.contains(&name) {
            let level = match kind {
                NodeKind::Headline => headline_level(name),
                NodeKind::UnorderedList | NodeKind::OrderedList => Some(self.list_depth + 1),
                NodeKind::ListItem => Some(self.list_depth),
                _ => None,
            };
            let _ = self.insert_element(kind, attrs, level);
            return BuilderEvent::Leaf;
        }

        let level = match kind {
            NodeKind::Headline => headline_level(name),
            NodeKind::UnorderedList | NodeKind::OrderedList => {
                self.open_list();
                Some(self.list_depth)
            }
            NodeKind::ListItem => Some(self.list_depth),
            _ => None,
        };
        self.cursor = self.insert_element(kind, attrs, level);
        BuilderEvent::Open
    }

    fn handle_end_tag(&mut self, name: &str) -> BuilderEvent {
        if self.ignore_tags.contains(name) || VOID_TAGS.contains(&name) {
            return BuilderEvent::Skip;
        }

        if name == "ul" || name == "ol" {
            self.close_list(name);
        }

        if is_block_tag(name) {
            self.cursor = self.nearest_block_ancestor();
        } else {
            self.cursor = self.tree.parent(self.cursor).unwrap_or(NodeId::ROOT);
        }
        BuilderEvent::Close
    }

    fn handle_text(&mut self, data: &str) -> BuilderEvent {
        let trimmed = data.trim();
        if trimmed.starts_with("{%") && trimmed.ends_with("%}") {
            self.insert_leaf(NodeKind::PassBlock, trimmed);
            return BuilderEvent::Placeholder;
        }
        if trimmed.is_empty() && self.cursor_is_container() {
            return BuilderEvent::Skip;
        }
        self.insert_leaf(NodeKind::Data, data);
        BuilderEvent::Text
    }

    fn handle_eof(&mut self) {
        if self.cursor != NodeId::ROOT {
            let kind = self
                .tree
                .kind(self.cursor)
                .map_or_else(String::new, ToString::to_string);
            self.parse_issue(&format!("unclosed <{kind}> at end of input"));
        }
        if self.list_depth != 0 {
            let depth = self.list_depth;
            self.parse_issue(&format!("{depth} list(s) still open at end of input"));
        }
    }

    /// Resolve a `<blockdata>`/`<inlinedata>` marker to its verbatim leaf.
    fn insert_placeholder(&mut self, tag: &str, attributes: &[Attribute]) {
        let type_tag = find_attribute(attributes, "type").unwrap_or_default();
        let Some(region) = RegionKind::from_marker(tag, type_tag) else {
            self.parse_issue(&format!("<{tag}> placeholder with unknown type '{type_tag}'"));
            return;
        };

        let id = find_attribute(attributes, "id").and_then(|id| id.parse::<usize>().ok());
        let Some(content) = id.and_then(|id| self.verbatim.get(id)) else {
            self.parse_issue(&format!("<{tag}> placeholder with invalid id {id:?}"));
            return;
        };

        let kind = match region {
            RegionKind::PreBlock => NodeKind::PreBlock,
            RegionKind::PassBlock => NodeKind::PassBlock,
            RegionKind::InlineCode => NodeKind::InlinePre,
        };
        let content = content.to_string();
        self.insert_leaf(kind, content);
    }

    fn insert_element(&mut self, kind: NodeKind, attrs: AttributesMap, level: Option<usize>) -> NodeId {
        let mut node = DocNode::element(kind, attrs);
        node.level = level;
        self.tree.create_child(self.cursor, node)
    }

    fn insert_leaf(&mut self, kind: NodeKind, content: impl Into<String>) {
        let _ = self
            .tree
            .create_child(self.cursor, DocNode::leaf(kind, content));
    }

    const fn open_list(&mut self) {
        self.list_depth += 1;
    }

    fn close_list(&mut self, name: &str) {
        if self.list_depth == 0 {
            self.parse_issue(&format!("</{name}> without an open list"));
        } else {
            self.list_depth -= 1;
        }
    }

    /// Climb at least one step from the cursor, then on to the first
    /// block-level node. The root is block-level, so the climb always ends.
    fn nearest_block_ancestor(&self) -> NodeId {
        self.tree
            .ancestors(self.cursor)
            .find(|&id| self.tree.kind(id).is_some_and(NodeKind::is_block_level))
            .unwrap_or(NodeId::ROOT)
    }

    fn cursor_is_container(&self) -> bool {
        matches!(
            self.tree.kind(self.cursor),
            Some(
                NodeKind::Document
                    | NodeKind::UnorderedList
                    | NodeKind::OrderedList
                    | NodeKind::Table
                    | NodeKind::TableRow
            )
        )
    }

    fn parse_issue(&mut self, message: &str) {
        if !self.issues.iter().any(|issue| issue.message == message) {
            self.trace.warn("tree builder", message);
        }
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }
}

fn collect_attributes(attributes: &[Attribute]) -> AttributesMap {
    let mut attrs = AttributesMap::new();
    for attr in attributes {
        let _ = attrs
            .entry(attr.name.clone())
            .or_insert_with(|| attr.value.clone());
    }
    attrs
}

fn find_attribute<'t>(attributes: &'t [Attribute], name: &str) -> Option<&'t str> {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

/// `h1`..`h6` to 1..6.
fn headline_level(name: &str) -> Option<usize> {
    name.strip_prefix('h')
        .and_then(|digit| digit.parse::<usize>().ok())
        .filter(|level| (1..=6).contains(level))
}
