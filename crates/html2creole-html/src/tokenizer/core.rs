use strum_macros::Display;

use html2creole_common::trace::Trace;

use super::token::{Attribute, Token};

/// The tokenizer state machine.
///
/// Only the states needed to read tags, attributes and text are modelled.
/// Comments, declarations, processing instructions and raw text are read in
/// one step from the state that recognises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Reading text; `<` and `&` are the only special characters.
    Data,
    /// After `<`.
    TagOpen,
    /// After `</`.
    EndTagOpen,
    /// Inside a tag name.
    TagName,
    /// Whitespace before an attribute name.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// Whitespace after an attribute name.
    AfterAttributeName,
    /// After `=`.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// Right after a closing quote.
    AfterAttributeValueQuoted,
    /// After `/` inside a tag.
    SelfClosingStartTag,
    /// After `<!`.
    MarkupDeclarationOpen,
    /// After `<?`.
    ProcessingInstruction,
    /// After `</` followed by something that is not a tag name.
    BogusComment,
}

/// The tag token under construction.
#[derive(Debug, Clone, Default)]
pub(super) struct TagBuilder {
    pub(super) name: String,
    pub(super) is_end: bool,
    pub(super) self_closing: bool,
    pub(super) attributes: Vec<Attribute>,
}

/// Lenient SGML-style tokenizer.
///
/// Reports start tags, end tags, text, character references, entity
/// references and self-closing tags. Input that cannot be read as markup is
/// passed on as text; the tokenizer never fails.
///
/// ```
/// use html2creole_html::{Token, Tokenizer};
///
/// let mut tokenizer = Tokenizer::new("<p>a &amp; b</p>".to_string());
/// tokenizer.run();
/// let tokens = tokenizer.into_tokens();
/// assert_eq!(tokens[2], Token::EntityRef { name: "amp".to_string() });
/// ```
pub struct Tokenizer {
    pub(super) state: TokenizerState,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    pub(super) current_tag: Option<TagBuilder>,
    /// Byte offset of the `<` that opened the markup being read, so an
    /// unterminated tag at EOF can be handed back as text.
    pub(super) markup_start: usize,
    pub(super) text_buffer: String,
    pub(super) token_stream: Vec<Token>,
    // When true, the next iteration of the main loop will not consume a new character.
    pub(super) reconsume: bool,
    pub(super) at_eof: bool,
    pub(super) trace: Trace,
}

/// Elements whose content is read as plain text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Tokenizer {
    /// Create a new tokenizer for the given input.
    #[must_use]
    pub const fn new(input: String) -> Self {
        Self {
            state: TokenizerState::Data,
            input,
            current_pos: 0,
            current_input_character: None,
            current_tag: None,
            markup_start: 0,
            text_buffer: String::new(),
            token_stream: Vec::new(),
            reconsume: false,
            at_eof: false,
            trace: Trace::disabled(),
        }
    }

    /// Report tolerated input, such as duplicate attributes, through `trace`.
    #[must_use]
    pub const fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after `run()` to get the tokens for the builder.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Tokenize the whole input. The stream always ends with [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while !self.at_eof {
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current_input_character = self.consume();
            }

            match self.state {
                TokenizerState::Data => self.handle_data_state(),
                TokenizerState::TagOpen => self.handle_tag_open_state(),
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
                TokenizerState::TagName => self.handle_tag_name_state(),
                TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
                TokenizerState::AttributeName => self.handle_attribute_name_state(),
                TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
                TokenizerState::BeforeAttributeValue => {
                    self.handle_before_attribute_value_state();
                }
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.handle_attribute_value_quoted_state('"');
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.handle_attribute_value_quoted_state('\'');
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.handle_attribute_value_unquoted_state();
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.handle_after_attribute_value_quoted_state();
                }
                TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
                TokenizerState::MarkupDeclarationOpen => {
                    self.handle_markup_declaration_open_state();
                }
                TokenizerState::ProcessingInstruction => {
                    self.handle_processing_instruction_state();
                }
                TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            }
        }
    }

    fn handle_data_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.markup_start = self.current_pos - 1;
                self.switch_to(TokenizerState::TagOpen);
            }
            Some('&') => {
                if let Some(token) = self.consume_reference() {
                    self.emit_token(token);
                } else {
                    self.text_buffer.push('&');
                }
            }
            Some(c) => self.text_buffer.push(c),
            None => self.emit_eof_token(),
        }
    }

    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(TagBuilder::default());
                self.reconsume_in(TokenizerState::TagName);
            }
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            Some('?') => self.switch_to(TokenizerState::ProcessingInstruction),
            // "a < b": not markup, keep the `<` as text.
            _ => {
                self.text_buffer.push('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(TagBuilder {
                    is_end: true,
                    ..TagBuilder::default()
                });
                self.reconsume_in(TokenizerState::TagName);
            }
            // `</>` is dropped.
            Some('>') => self.switch_to(TokenizerState::Data),
            None => self.emit_unterminated_markup_as_text(),
            Some(_) => self.reconsume_in(TokenizerState::BogusComment),
        }
    }

    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.name.push(c.to_ascii_lowercase());
                }
            }
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            Some(c) => self.append_to_current_attribute_name(c.to_ascii_lowercase()),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            Some('>') => self.emit_current_tag(),
            Some(_) => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some(c) => self.append_to_current_attribute_value(c),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => self.emit_current_tag(),
            Some(c) => self.append_to_current_attribute_value(c),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_whitespace() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            // `<a href="x"title="y">`: tolerate the missing space.
            Some(_) => self.reconsume_in(TokenizerState::BeforeAttributeName),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.self_closing = !tag.is_end;
                }
                self.emit_current_tag();
            }
            Some(_) => self.reconsume_in(TokenizerState::BeforeAttributeName),
            None => self.emit_unterminated_markup_as_text(),
        }
    }

    fn handle_markup_declaration_open_state(&mut self) {
        // The character after `<!` has already been consumed.
        let start = self.current_char_start();
        if self.current_input_character == Some('-') && self.next_few_characters_are("-") {
            match self.consume_until_from(start + 2, "-->") {
                Some(data) => self.emit_token(Token::Comment { data }),
                None => self.emit_unterminated_markup_as_text(),
            }
        } else {
            match self.consume_until_from(start, ">") {
                Some(data) => self.emit_token(Token::Declaration { data }),
                None => self.emit_unterminated_markup_as_text(),
            }
        }
        self.switch_to(TokenizerState::Data);
    }

    fn handle_processing_instruction_state(&mut self) {
        let start = self.current_char_start();
        match self.consume_until_from(start, ">") {
            Some(data) => self.emit_token(Token::ProcessingInstruction { data }),
            None => self.emit_unterminated_markup_as_text(),
        }
        self.switch_to(TokenizerState::Data);
    }

    fn handle_bogus_comment_state(&mut self) {
        let start = self.current_char_start();
        match self.consume_until_from(start, ">") {
            Some(data) => self.emit_token(Token::Comment { data }),
            None => self.emit_unterminated_markup_as_text(),
        }
        self.switch_to(TokenizerState::Data);
    }

    /// Emit the finished tag. After a raw text start tag (`<script>`,
    /// `<style>`) everything up to the matching end tag is read as text.
    fn emit_current_tag(&mut self) {
        let Some(tag) = self.current_tag.take() else {
            self.switch_to(TokenizerState::Data);
            return;
        };
        self.switch_to(TokenizerState::Data);

        if tag.is_end {
            self.emit_token(Token::EndTag { name: tag.name });
            return;
        }

        let raw_text = !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str());
        let name = tag.name.clone();
        let attributes = self.finish_attributes(tag.attributes);
        self.emit_token(Token::StartTag {
            name: tag.name,
            self_closing: tag.self_closing,
            attributes,
        });
        if raw_text {
            self.consume_raw_text(&name);
        }
    }
}
