//! Token classifications for the PIPE DSL
//!
//!     The editor widget styles text by class name, so every [TokenKind] maps to the dotted
//!     string the widget's themes already know (`keyword`, `number.float`, `string.escape`...).
//!     Tokens are spans into a single line; the tokenizer never produces a token that crosses a
//!     line boundary.
//!
//!     Brackets carry an extra [Bracket] annotation so the widget can match `{`/`}` pairs and
//!     the quote/comment openers that behave like brackets.

use std::fmt;
use std::ops::Range;

/// The syntax class assigned to a span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TokenKind {
    /// Reserved operation names and literals (`grayscale`, `true`, ...)
    Keyword,
    /// Built-in functions and fields (`width`, `rgb`, `r`, ...)
    Predefined,
    Identifier,
    /// Integer literal
    Number,
    /// Literal with a fractional part or an exponent
    NumberFloat,
    /// String body text
    String,
    /// A string left open at the end of its line
    StringInvalid,
    StringEscape,
    /// A backslash followed by a character that is not a known escape
    StringEscapeInvalid,
    /// The `"` that opens or closes a string
    StringQuote,
    Comment,
    /// The `/*` and `*/` block comment markers
    CommentQuote,
    Operator,
    /// `;` and `,`
    Delimiter,
    DelimiterCurly,
    DelimiterSquare,
    DelimiterParenthesis,
    /// Spaces, tabs and stray carriage returns
    White,
    /// A symbol run that is not in the operator set (`||`, `>`, `==`)
    Unclassified,
    /// A character no rule recognizes
    Invalid,
}

/// Every kind, in a stable order. Used by the exporters and by tests.
pub const TOKEN_KINDS: &[TokenKind] = &[
    TokenKind::Keyword,
    TokenKind::Predefined,
    TokenKind::Identifier,
    TokenKind::Number,
    TokenKind::NumberFloat,
    TokenKind::String,
    TokenKind::StringInvalid,
    TokenKind::StringEscape,
    TokenKind::StringEscapeInvalid,
    TokenKind::StringQuote,
    TokenKind::Comment,
    TokenKind::CommentQuote,
    TokenKind::Operator,
    TokenKind::Delimiter,
    TokenKind::DelimiterCurly,
    TokenKind::DelimiterSquare,
    TokenKind::DelimiterParenthesis,
    TokenKind::White,
    TokenKind::Unclassified,
    TokenKind::Invalid,
];

impl TokenKind {
    /// Returns the class name the editor widget uses for this kind.
    ///
    /// The unclassified kind maps to the empty string, which the widget renders as plain text.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Predefined => "predefined",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::NumberFloat => "number.float",
            TokenKind::String => "string",
            TokenKind::StringInvalid => "string.invalid",
            TokenKind::StringEscape => "string.escape",
            TokenKind::StringEscapeInvalid => "string.escape.invalid",
            TokenKind::StringQuote => "string.quote",
            TokenKind::Comment => "comment",
            TokenKind::CommentQuote => "comment.quote",
            TokenKind::Operator => "operator",
            TokenKind::Delimiter => "delimiter",
            TokenKind::DelimiterCurly => "delimiter.curly",
            TokenKind::DelimiterSquare => "delimiter.square",
            TokenKind::DelimiterParenthesis => "delimiter.parenthesis",
            TokenKind::White => "white",
            TokenKind::Unclassified => "",
            TokenKind::Invalid => "invalid",
        }
    }

    /// Looks a kind up by its class name.
    pub fn from_class(class: &str) -> Option<Self> {
        TOKEN_KINDS.iter().copied().find(|kind| kind.as_str() == class)
    }

    /// True for the classifications that flag malformed input.
    pub fn is_invalid(self) -> bool {
        matches!(
            self,
            TokenKind::StringInvalid | TokenKind::StringEscapeInvalid | TokenKind::Invalid
        )
    }

    /// True for kinds that belong to a string literal, including its quotes.
    ///
    /// Auto-closing pairs with `notIn: ["string"]` consult this.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::StringInvalid
                | TokenKind::StringEscape
                | TokenKind::StringEscapeInvalid
                | TokenKind::StringQuote
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::CommentQuote)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TokenKind> for String {
    fn from(kind: TokenKind) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for TokenKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TokenKind::from_class(&value).ok_or_else(|| format!("unknown token class '{}'", value))
    }
}

/// Structural role of a token for bracket matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bracket {
    Open,
    Close,
}

impl Bracket {
    /// The widget's spelling (`@open` / `@close`).
    pub fn as_str(self) -> &'static str {
        match self {
            Bracket::Open => "@open",
            Bracket::Close => "@close",
        }
    }
}

/// A classified span of one line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range within the line the token was read from
    pub span: Range<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket: Option<Bracket>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self {
            kind,
            span,
            bracket: None,
        }
    }

    pub fn with_bracket(mut self, bracket: Option<Bracket>) -> Self {
        self.bracket = bracket;
        self
    }

    /// The token's text, given the line it was produced from.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.span.clone()]
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_are_unique() {
        for (i, a) in TOKEN_KINDS.iter().enumerate() {
            for b in &TOKEN_KINDS[i + 1..] {
                assert_ne!(a.as_str(), b.as_str(), "{:?} and {:?} collide", a, b);
            }
        }
    }

    #[test]
    fn test_from_class_roundtrips_every_kind() {
        for kind in TOKEN_KINDS {
            assert_eq!(TokenKind::from_class(kind.as_str()), Some(*kind));
        }
        assert_eq!(TokenKind::from_class("keyword.control"), None);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(TokenKind::StringInvalid.is_invalid());
        assert!(TokenKind::StringEscapeInvalid.is_invalid());
        assert!(TokenKind::Invalid.is_invalid());
        assert!(!TokenKind::Unclassified.is_invalid());

        assert!(TokenKind::StringQuote.is_string());
        assert!(!TokenKind::CommentQuote.is_string());
        assert!(TokenKind::CommentQuote.is_comment());
    }

    #[test]
    fn test_token_serializes_with_class_name() {
        let token = Token::new(TokenKind::NumberFloat, 0..3);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#"{"kind":"number.float","span":{"start":0,"end":3}}"#);

        let quote = Token::new(TokenKind::StringQuote, 0..1).with_bracket(Some(Bracket::Open));
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains(r#""bracket":"open""#));
    }

    #[test]
    fn test_token_text() {
        let line = "img | sobel";
        let token = Token::new(TokenKind::Operator, 4..5);
        assert_eq!(token.text(line), "|");
        assert_eq!(token.len(), 1);
    }
}
