use core::fmt;

/// An attribute on a start tag.
///
/// Names are lowercased; values have their character references decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value, empty for a bare attribute like `<td nowrap>`.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// The events reported by the tokenizer.
///
/// Malformed markup never produces an error: anything that cannot be read as
/// a tag or reference is reported as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="value">` or, with `self_closing` set, `<name />`.
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Set when the tag ended in `/>`.
        self_closing: bool,
        /// Attributes in source order, duplicates dropped.
        attributes: Vec<Attribute>,
    },

    /// `</name>`
    EndTag {
        /// Lowercased tag name.
        name: String,
    },

    /// A run of literal text between tags and references.
    Text {
        /// The text, exactly as written.
        data: String,
    },

    /// `&#65;` or `&#x41;`, reported as `65` or `x41`.
    CharRef {
        /// The reference without `&#` and `;`.
        name: String,
    },

    /// `&amp;`, reported as `amp`.
    EntityRef {
        /// The reference without `&` and `;`.
        name: String,
    },

    /// `<!-- ... -->`
    Comment {
        /// The text between the delimiters.
        data: String,
    },

    /// `<!DOCTYPE ...>` and other `<!...>` declarations.
    Declaration {
        /// The text between `<!` and `>`.
        data: String,
    },

    /// `<?...>`
    ProcessingInstruction {
        /// The text between `<?` and `>`.
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Look up an attribute of a start tag.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } => attributes
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::CharRef { name } => write!(f, "&#{name};"),
            Self::EntityRef { name } => write!(f, "&{name};"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Declaration { data } => write!(f, "<!{data}>"),
            Self::ProcessingInstruction { data } => write!(f, "<?{data}>"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
