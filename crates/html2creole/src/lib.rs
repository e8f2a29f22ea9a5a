//! Convert HTML documents into Creole wiki markup.
//!
//! # Scope
//!
//! This crate ties the pipeline together:
//! - **Verbatim extraction** of `<pre>`, `<tt>`/`<code>` and `{% %}` blocks
//! - **Whitespace normalization** of the remaining markup
//! - **Tokenizing and tree building** into a [`DocTree`]
//! - **Creole emission** of the tree
//!
//! ```
//! let creole = html2creole::html2creole("<p>Hello <strong>world</strong></p>").unwrap();
//! assert_eq!(creole, "Hello **world**");
//! ```
//!
//! # Not Implemented
//!
//! - Creole to HTML
//! - Streaming input; documents are converted as a whole

pub use html2creole_dom as dom;
pub use html2creole_emit as emit;
pub use html2creole_html as html;

pub use html2creole_emit::{EmitError, EmitterOptions};
pub use html2creole_html::{BuilderOptions, ParseIssue};

use serde::Deserialize;
use thiserror::Error;

use html2creole_common::trace::Trace;
use html2creole_dom::DocTree;
use html2creole_emit::Emitter;
use html2creole_html::{Token, Tokenizer, TreeBuilder, VerbatimTable, extract, normalize_whitespace};

/// Conversion settings.
///
/// Every field has a default, so a partial JSON object such as
/// `{"debug": true}` is a complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trace builder and emitter events and dump the tree to stderr.
    pub debug: bool,
    /// Tree builder settings.
    pub builder: BuilderOptions,
    /// Emitter settings.
    pub emitter: EmitterOptions,
}

/// Error type for a failed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The document tree could not be written as Creole.
    #[error("cannot emit Creole markup: {0}")]
    Emit(#[from] EmitError),
}

/// A document taken through every stage before emission.
///
/// Useful for inspecting what the converter made of its input.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The text handed to the tokenizer: placeholders in, whitespace
    /// collapsed.
    pub cleaned: String,
    /// The token stream.
    pub tokens: Vec<Token>,
    /// Captured verbatim regions, indexed by placeholder id.
    pub verbatim: VerbatimTable,
    /// The document tree.
    pub tree: DocTree,
    /// Recoverable problems met while building the tree.
    pub issues: Vec<ParseIssue>,
    trace: Trace,
}

impl ParsedDocument {
    /// Emit the tree as Creole markup.
    ///
    /// # Errors
    ///
    /// Returns an [`EmitError`] if the tree holds a node that cannot be
    /// written, such as an image without `alt`.
    pub fn emit(&self, options: &EmitterOptions) -> Result<String, EmitError> {
        Emitter::new(&self.tree, *options)
            .with_trace(self.trace)
            .emit()
    }
}

/// Run every stage up to the finished tree.
#[must_use]
pub fn parse_document(html: &str, config: &Config) -> ParsedDocument {
    let trace = Trace::new(config.debug);

    let (extracted, verbatim) = extract(html);
    let cleaned = normalize_whitespace(&extracted);
    trace.block("cleaned data", &cleaned);

    let mut tokenizer = Tokenizer::new(cleaned.clone()).with_trace(trace);
    tokenizer.run();
    let tokens = tokenizer.into_tokens();

    let (tree, issues) = TreeBuilder::new(tokens.clone(), &verbatim, &config.builder)
        .with_trace(trace)
        .run_with_issues();

    ParsedDocument {
        cleaned,
        tokens,
        verbatim,
        tree,
        issues,
        trace,
    }
}

/// Convert HTML to Creole with the default configuration.
///
/// # Errors
///
/// See [`html2creole_with_config`].
pub fn html2creole(html: &str) -> Result<String, ConvertError> {
    html2creole_with_config(html, &Config::default())
}

/// Convert HTML to Creole.
///
/// Malformed HTML never fails a conversion; only a tree that cannot be
/// written does.
///
/// # Errors
///
/// Returns [`ConvertError::Emit`] naming the offending node kind or attribute.
pub fn html2creole_with_config(html: &str, config: &Config) -> Result<String, ConvertError> {
    let document = parse_document(html, config);
    Ok(document.emit(&config.emitter)?)
}
