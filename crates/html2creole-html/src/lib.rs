//! HTML front end of the html2creole converter.
//!
//! # Scope
//!
//! This crate implements:
//! - **Verbatim extraction**: `<pre>`, `<tt>`/`<code>` and `{% %}` template
//!   blocks are cut out before parsing and replaced by placeholder tags
//! - **Whitespace normalization** of the remaining markup
//! - **Tokenizer**: a lenient SGML-style scanner that never fails
//! - **Tree builder**: a cursor-driven builder producing a `DocTree`
//!
//! # Not Implemented
//!
//! - HTML5 insertion modes and implied end tags
//! - Foster parenting and the adoption agency algorithm

/// Token stream to document tree.
pub mod builder;
/// Lenient tokenizer for converting input into tokens.
pub mod tokenizer;
/// Verbatim region extraction and whitespace cleanup.
pub mod verbatim;

pub use builder::{BuilderOptions, DEFAULT_IGNORE_TAGS, ParseIssue, TreeBuilder};
pub use tokenizer::{Attribute, Token, Tokenizer, TokenizerState};
pub use verbatim::{RegionKind, VerbatimTable, extract, normalize_whitespace};
