//! Lenient HTML tokenizer.
//!
//! Reads start tags, end tags, text and references the way an SGML scanner
//! does, without the HTML5 error-recovery rules. The tree builder decides
//! what the tokens mean.

/// Tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{Tokenizer, TokenizerState};
pub use token::{Attribute, Token};
