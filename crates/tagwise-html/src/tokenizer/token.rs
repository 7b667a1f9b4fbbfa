use strum_macros::Display;
use tagwise_common::Location;

/// The kind of a token, as printed in token dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// `U+FEFF` at the very start of the input.
    UnicodeBom,
    /// Whitespace between tags or attributes.
    Whitespace,
    /// `<!DOCTYPE` and the whitespace after it.
    DoctypeOpen,
    /// Everything between the doctype keyword and `>`.
    DoctypeValue,
    /// `>` ending a doctype.
    DoctypeClose,
    /// `<name` or `</name`.
    TagOpen,
    /// `>` or `/>`.
    TagClose,
    /// Attribute name.
    AttrName,
    /// `=` followed by the (possibly quoted) value.
    AttrValue,
    /// Character data.
    Text,
    /// Contents of a `<script>` element.
    Script,
    /// Contents of a `<style>` element.
    Style,
    /// `<!-- ... -->`
    Comment,
    /// `<!--[if ...]>`, `<![endif]-->` and friends.
    Conditional,
    /// `<!-- [html-validate-action data] -->`
    Directive,
    /// End of input.
    Eof,
}

/// Elements whose content is scanned verbatim up to the matching end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RawTextKind {
    /// `<script>`
    Script,
    /// `<style>`
    Style,
}

impl RawTextKind {
    /// The raw-text kind for a start tag, if it opens one.
    #[must_use]
    pub fn for_tag(tag_name: &str) -> Option<Self> {
        if tag_name.eq_ignore_ascii_case("script") {
            Some(Self::Script)
        } else if tag_name.eq_ignore_ascii_case("style") {
            Some(Self::Style)
        } else {
            None
        }
    }

    /// Lowercase prefix of the end tag that terminates the content.
    #[must_use]
    pub const fn end_tag(self) -> &'static str {
        match self {
            Self::Script => "</script",
            Self::Style => "</style",
        }
    }
}

/// Token payload, parsed out of the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Byte-order mark.
    UnicodeBom,
    /// Whitespace; the text is [`Token::raw`].
    Whitespace,
    /// Opening of a doctype declaration.
    DoctypeOpen {
        /// The keyword as written, e.g. `DOCTYPE` or `doctype`.
        tag: String,
    },
    /// The doctype value, e.g. `html`.
    DoctypeValue {
        /// Trimmed value.
        value: String,
    },
    /// `>` ending a doctype.
    DoctypeClose,
    /// Start of a start or end tag.
    TagOpen {
        /// Tag name as written.
        name: String,
        /// `</name` rather than `<name`.
        is_end: bool,
    },
    /// End of a tag.
    TagClose {
        /// Written as `/>`.
        self_closing: bool,
    },
    /// Attribute name.
    AttrName {
        /// Name as written.
        name: String,
    },
    /// Attribute value, including the `=`.
    AttrValue {
        /// The value without quotes.
        value: String,
        /// Quote character, if quoted.
        quote: Option<char>,
        /// Location of the value without `=` and quotes.
        value_location: Location,
    },
    /// Character data; the text is [`Token::raw`].
    Text,
    /// Script content; the text is [`Token::raw`].
    Script,
    /// Style content; the text is [`Token::raw`].
    Style,
    /// A comment.
    Comment {
        /// Text between `<!--` and `-->`.
        text: String,
    },
    /// A conditional comment.
    Conditional {
        /// The condition between the brackets, e.g. `if IE` or `endif`.
        condition: String,
    },
    /// A directive comment.
    Directive {
        /// Word after `html-validate-`, e.g. `disable-next`.
        action: String,
        /// Everything after the action, trimmed.
        data: String,
        /// The directive text between the brackets.
        text: String,
    },
    /// End of input.
    Eof,
}

impl TokenKind {
    /// The dump name of this kind.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        match self {
            Self::UnicodeBom => TokenType::UnicodeBom,
            Self::Whitespace => TokenType::Whitespace,
            Self::DoctypeOpen { .. } => TokenType::DoctypeOpen,
            Self::DoctypeValue { .. } => TokenType::DoctypeValue,
            Self::DoctypeClose => TokenType::DoctypeClose,
            Self::TagOpen { .. } => TokenType::TagOpen,
            Self::TagClose { .. } => TokenType::TagClose,
            Self::AttrName { .. } => TokenType::AttrName,
            Self::AttrValue { .. } => TokenType::AttrValue,
            Self::Text => TokenType::Text,
            Self::Script => TokenType::Script,
            Self::Style => TokenType::Style,
            Self::Comment { .. } => TokenType::Comment,
            Self::Conditional { .. } => TokenType::Conditional,
            Self::Directive { .. } => TokenType::Directive,
            Self::Eof => TokenType::Eof,
        }
    }
}

/// A lexical unit with the exact source text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Parsed payload.
    pub kind: TokenKind,
    /// Source text of the token. Concatenating the raw text of every token
    /// reproduces the input.
    pub raw: String,
    /// Where the token starts; `size` is the byte length of `raw`.
    pub location: Location,
}

impl Token {
    /// The dump name of this token.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        self.kind.token_type()
    }

    /// Whether this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Debug dump in the form
    ///
    /// ```text
    /// TOKEN: TAG_OPEN
    ///   Data: "<div"
    ///   Location: inline:1:1
    /// ```
    #[must_use]
    pub fn dump(&self) -> String {
        let data = if self.is_eof() {
            "null".to_string()
        } else {
            serde_json::to_string(&self.raw).unwrap_or_default()
        };
        format!(
            "TOKEN: {}\n  Data: {}\n  Location: {}",
            self.token_type(),
            data,
            self.location
        )
    }
}
