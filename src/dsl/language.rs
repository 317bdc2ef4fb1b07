//! Language configuration for editor affordances
//!
//!     Separate from the tokenizer rules: this is what the editor uses for comment toggling,
//!     bracket matching, auto-closing and wrap-selection. Serializes to the widget's JSON shape.

use crate::dsl::token::TokenKind;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRule {
    pub line_comment: String,
    pub block_comment: (String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoClosingPair {
    pub open: String,
    pub close: String,
    /// Token scopes in which the pair is not auto-closed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_in: Vec<String>,
}

impl AutoClosingPair {
    fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            not_in: Vec::new(),
        }
    }

    fn not_in(mut self, scope: &str) -> Self {
        self.not_in.push(scope.to_string());
        self
    }

    /// Whether typing `open` inside a token of `kind` should insert `close`.
    pub fn closes_in(&self, kind: TokenKind) -> bool {
        !self.not_in.iter().any(|scope| match scope.as_str() {
            "string" => kind.is_string(),
            "comment" => kind.is_comment(),
            other => kind.as_str() == other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurroundingPair {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfiguration {
    pub comments: CommentRule,
    pub brackets: Vec<(String, String)>,
    pub auto_closing_pairs: Vec<AutoClosingPair>,
    pub surrounding_pairs: Vec<SurroundingPair>,
}

impl LanguageConfiguration {
    /// Configuration of the PIPE DSL.
    pub fn imagedsl() -> Self {
        let brackets = [("{", "}"), ("[", "]"), ("(", ")")];

        let mut auto_closing_pairs: Vec<AutoClosingPair> = brackets
            .iter()
            .map(|(open, close)| AutoClosingPair::new(open, close))
            .collect();
        auto_closing_pairs.push(AutoClosingPair::new("\"", "\"").not_in("string"));

        let surrounding_pairs = brackets
            .iter()
            .chain(std::iter::once(&("\"", "\"")))
            .map(|(open, close)| SurroundingPair {
                open: open.to_string(),
                close: close.to_string(),
            })
            .collect();

        Self {
            comments: CommentRule {
                line_comment: "//".to_string(),
                block_comment: ("/*".to_string(), "*/".to_string()),
            },
            brackets: brackets
                .iter()
                .map(|(open, close)| (open.to_string(), close.to_string()))
                .collect(),
            auto_closing_pairs,
            surrounding_pairs,
        }
    }

    /// The auto-closing pair opened by `open`, if any.
    pub fn auto_close(&self, open: &str) -> Option<&AutoClosingPair> {
        self.auto_closing_pairs.iter().find(|pair| pair.open == open)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for LanguageConfiguration {
    fn default() -> Self {
        Self::imagedsl()
    }
}
