//! Helper functions for the tokenizer.
//!
//! - State transitions ("switch to", "reconsume in")
//! - Input handling and lookahead
//! - Token emission and EOF recovery
//! - Character and entity references
//! - Attribute helpers for duplicate detection

use super::core::{Tokenizer, TokenizerState};
use super::token::{Attribute, Token};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl Tokenizer {
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state without consuming the current character.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl Tokenizer {
    /// Returns the character at the current position and advances the position.
    /// Returns None at the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Byte offset of the current input character.
    pub(super) fn current_char_start(&self) -> usize {
        self.current_pos - self.current_input_character.map_or(0, char::len_utf8)
    }

    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// Read from byte offset `start` up to `delimiter` and move past it.
    ///
    /// Returns `None`, without moving, when the delimiter never appears.
    pub(super) fn consume_until_from(&mut self, start: usize, delimiter: &str) -> Option<String> {
        let offset = self.input.get(start..)?.find(delimiter)?;
        let data = self.input[start..start + offset].to_string();
        self.current_pos = start + offset + delimiter.len();
        Some(data)
    }

    /// Read the content of a `<script>` or `<style>` element as one text
    /// token, stopping in front of its end tag.
    pub(super) fn consume_raw_text(&mut self, name: &str) {
        let rest = &self.input[self.current_pos..];
        let needle = format!("</{name}");
        let end = rest
            .to_ascii_lowercase()
            .find(&needle)
            .unwrap_or(rest.len());
        self.text_buffer.push_str(&rest[..end]);
        self.current_pos += end;
        self.flush_text();
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl Tokenizer {
    /// Add a token to the output stream, flushing pending text first.
    pub(super) fn emit_token(&mut self, token: Token) {
        self.flush_text();
        self.token_stream.push(token);
    }

    fn flush_text(&mut self) {
        if !self.text_buffer.is_empty() {
            let data = std::mem::take(&mut self.text_buffer);
            self.token_stream.push(Token::Text { data });
        }
    }

    /// Emit the end-of-file token and stop the main loop.
    pub(super) fn emit_eof_token(&mut self) {
        self.flush_text();
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }

    /// EOF inside a tag, comment or declaration: everything from the opening
    /// `<` is reported as text.
    pub(super) fn emit_unterminated_markup_as_text(&mut self) {
        let rest = self.input[self.markup_start..].to_string();
        self.text_buffer.push_str(&rest);
        self.current_tag = None;
        self.current_pos = self.input.len();
        self.emit_eof_token();
    }
}

// =============================================================================
// Reference Helpers
// =============================================================================

impl Tokenizer {
    /// Read a reference after `&`.
    ///
    /// `&#65;` and `&#x41;` become [`Token::CharRef`] (the `;` is optional),
    /// `&name;` becomes [`Token::EntityRef`]. A named reference without its
    /// `;` is not a reference; the caller keeps the `&` as text.
    pub(super) fn consume_reference(&mut self) -> Option<Token> {
        let rest = &self.input[self.current_pos..];

        if let Some(number) = rest.strip_prefix('#') {
            let hex = number.starts_with(['x', 'X']);
            let digits = if hex { &number[1..] } else { number };
            let len = digits
                .find(|c: char| if hex { !c.is_ascii_hexdigit() } else { !c.is_ascii_digit() })
                .unwrap_or(digits.len());
            if len == 0 {
                return None;
            }
            let name_len = len + usize::from(hex);
            let name = number[..name_len].to_string();
            let terminated = number[name_len..].starts_with(';');
            self.current_pos += 1 + name_len + usize::from(terminated);
            return Some(Token::CharRef { name });
        }

        if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '.'))
            .unwrap_or(rest.len());
        if !rest[len..].starts_with(';') {
            return None;
        }
        let name = rest[..len].to_string();
        self.current_pos += len + 1;
        Some(Token::EntityRef { name })
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl Tokenizer {
    /// Begin a new, empty attribute on the current tag.
    pub(super) fn start_new_attribute(&mut self) {
        if let Some(tag) = self.current_tag.as_mut() {
            tag.attributes
                .push(Attribute::new(String::new(), String::new()));
        }
    }

    pub(super) fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attr) = self
            .current_tag
            .as_mut()
            .and_then(|tag| tag.attributes.last_mut())
        {
            attr.name.push(c);
        }
    }

    pub(super) fn append_to_current_attribute_value(&mut self, c: char) {
        if let Some(attr) = self
            .current_tag
            .as_mut()
            .and_then(|tag| tag.attributes.last_mut())
        {
            attr.value.push(c);
        }
    }

    /// Drop duplicate attributes (the first one wins) and decode character
    /// references in values.
    pub(super) fn finish_attributes(&self, attributes: Vec<Attribute>) -> Vec<Attribute> {
        let mut finished: Vec<Attribute> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            if finished.iter().any(|seen| seen.name == attr.name) {
                self.trace.warn(
                    "tokenizer",
                    &format!("duplicate attribute '{}' ignored", attr.name),
                );
                continue;
            }
            let value = html_escape::decode_html_entities(&attr.value).into_owned();
            finished.push(Attribute::new(attr.name, value));
        }
        finished
    }
}
