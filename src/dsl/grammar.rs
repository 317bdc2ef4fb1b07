//! The lexical grammar of the PIPE DSL
//!
//!     The grammar is data, not code: word tables, a handful of named regex attributes and one
//!     ordered rule list per lexer mode. The tokenizer interprets it the same way the browser
//!     editor's declarative rule interpreter does, and the Monarch exporter serializes it for
//!     that interpreter, so both sides highlight from a single definition.
//!
//! Rule order
//!
//!     Rules are tried in declaration order at the current position and the first match wins.
//!     Order is significant: both float patterns sit before the bare integer pattern, otherwise
//!     `1e10` would split into `1` and `e10`. The unterminated-string rule sits before the
//!     opening-quote rule so that a string left open at the end of a line is flagged as a whole.
//!
//! Identifier cases
//!
//!     Identifier-shaped matches are re-classified through a fixed three-tier lookup: keyword,
//!     then built-in, then plain identifier. A word present in both tables is a keyword.
//!
//!     Patterns reference attributes with `@name` (e.g. `(@digits)`); the references are
//!     expanded once when the grammar is built.

use crate::dsl::mode::{Mode, Transition};
use crate::dsl::token::{Bracket, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// Identifier for the language in the editor's registry.
pub const LANGUAGE_ID: &str = "imageDsl";

/// File extensions of DSL sources.
pub const FILE_EXTENSIONS: &[&str] = &["dsl"];

/// Operation names and literals reserved by the DSL.
pub const KEYWORDS: &[&str] = &[
    "grayscale",
    "sobel",
    "sobel_x",
    "sobel_y",
    "gradient_magnitude",
    "gradient_direction",
    "non_max_suppression",
    "double_threshold",
    "hysteresis_tracking",
    "gaussian_blur",
    "brightness",
    "contrast",
    "threshold",
    "bilateral_filter",
    "canny_edge",
    "pixel_op",
    "stencil_op",
    "true",
    "false",
    "null",
];

/// Predefined functions and the pixel channel fields (`p.r`).
pub const BUILTINS: &[&str] = &[
    "width", "height", "path", "value", "pixel", "rgb", "rgba", "r", "g", "b",
];

/// Arithmetic, pipeline, assignment, lambda arrow and member access.
pub const OPERATORS: &[&str] = &["+", "-", "*", "/", "|", "=", "=>", "."];

/// Named patterns that rules reference as `@name`.
pub const ATTRIBUTES: &[(&str, &str)] = &[
    ("symbols", r"[+\-*/|=.>]+"),
    (
        "escapes",
        r#"\\(?:[abfnrtv\\"']|x[0-9A-Fa-f]{1,4}|u[0-9A-Fa-f]{4}|U[0-9A-Fa-f]{8})"#,
    ),
    ("digits", r"[0-9]+(_+[0-9]*)*"),
    ("octaldigits", r"[0-7]+(_+[0-7]+)*"),
    ("hexdigits", r"[0-9a-fA-F]+(_+[0-9a-fA-F]+)*"),
    ("binarydigits", r"[0-1]+(_+[0-1]+)*"),
];

/// Word tables a grammar is built from.
#[derive(Debug, Clone, Copy)]
pub struct GrammarTables<'a> {
    pub keywords: &'a [&'a str],
    pub builtins: &'a [&'a str],
    pub operators: &'a [&'a str],
}

/// The tables of the PIPE DSL.
pub const IMAGE_DSL_TABLES: GrammarTables<'static> = GrammarTables {
    keywords: KEYWORDS,
    builtins: BUILTINS,
    operators: OPERATORS,
};

/// What happens when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Emit one token of a fixed kind, then apply the transition
    Emit {
        kind: TokenKind,
        bracket: Option<Bracket>,
        transition: Transition,
    },
    /// Keyword, then built-in, then identifier
    Words,
    /// Operator when the whole run is in the operator set, unclassified otherwise
    Symbols,
    /// Look the character up in the bracket table
    Brackets,
}

/// One entry of a mode's rule list, before compilation.
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub pattern: &'static str,
    pub action: Action,
}

impl RuleDef {
    const fn token(pattern: &'static str, kind: TokenKind) -> Self {
        Self {
            pattern,
            action: Action::Emit {
                kind,
                bracket: None,
                transition: Transition::Stay,
            },
        }
    }

    const fn enter(pattern: &'static str, kind: TokenKind, mode: Mode) -> Self {
        Self {
            pattern,
            action: Action::Emit {
                kind,
                bracket: Some(Bracket::Open),
                transition: Transition::Next(mode),
            },
        }
    }

    const fn nest(pattern: &'static str, kind: TokenKind) -> Self {
        Self {
            pattern,
            action: Action::Emit {
                kind,
                bracket: Some(Bracket::Open),
                transition: Transition::Push,
            },
        }
    }

    const fn leave(pattern: &'static str, kind: TokenKind) -> Self {
        Self {
            pattern,
            action: Action::Emit {
                kind,
                bracket: Some(Bracket::Close),
                transition: Transition::Pop,
            },
        }
    }

    const fn with(pattern: &'static str, action: Action) -> Self {
        Self { pattern, action }
    }
}

const ROOT_RULES: &[RuleDef] = &[
    RuleDef::with(r"[a-zA-Z_][a-zA-Z0-9_]*", Action::Words),
    RuleDef::token(r"(@digits)[eE]([-+]?(@digits))?", TokenKind::NumberFloat),
    RuleDef::token(
        r"(@digits)\.(@digits)([eE]([-+]?(@digits))?)?",
        TokenKind::NumberFloat,
    ),
    RuleDef::token(r"(@digits)", TokenKind::Number),
    RuleDef::token(r#""([^"\\]|\\.)*$"#, TokenKind::StringInvalid),
    RuleDef::enter(r#"""#, TokenKind::StringQuote, Mode::String),
    RuleDef::token(r"//.*$", TokenKind::Comment),
    RuleDef::enter(r"/\*", TokenKind::CommentQuote, Mode::Comment),
    RuleDef::with(r"@symbols", Action::Symbols),
    RuleDef::with(r"[{}()\[\]]", Action::Brackets),
    RuleDef::token(r"[;,]", TokenKind::Delimiter),
    RuleDef::token(r"[ \t\r\n]+", TokenKind::White),
    RuleDef::token(r".", TokenKind::Invalid),
];

const STRING_RULES: &[RuleDef] = &[
    RuleDef::token(r#"[^\\"]+"#, TokenKind::String),
    RuleDef::token(r"@escapes", TokenKind::StringEscape),
    RuleDef::token(r"\\.", TokenKind::StringEscapeInvalid),
    RuleDef::leave(r#"""#, TokenKind::StringQuote),
    // backslash as the last character of a line
    RuleDef::token(r"\\", TokenKind::StringEscapeInvalid),
];

const COMMENT_RULES: &[RuleDef] = &[
    RuleDef::token(r"[^/*]+", TokenKind::Comment),
    RuleDef::nest(r"/\*", TokenKind::CommentQuote),
    RuleDef::leave(r"\*/", TokenKind::CommentQuote),
    RuleDef::token(r"[/*]", TokenKind::Comment),
];

/// Rule definitions for a mode, in priority order.
pub fn rule_defs(mode: Mode) -> &'static [RuleDef] {
    match mode {
        Mode::Root => ROOT_RULES,
        Mode::String => STRING_RULES,
        Mode::Comment => COMMENT_RULES,
    }
}

/// A matching delimiter pair and the class both halves get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    pub open: char,
    pub close: char,
    pub kind: TokenKind,
}

pub const BRACKET_PAIRS: &[BracketPair] = &[
    BracketPair {
        open: '{',
        close: '}',
        kind: TokenKind::DelimiterCurly,
    },
    BracketPair {
        open: '[',
        close: ']',
        kind: TokenKind::DelimiterSquare,
    },
    BracketPair {
        open: '(',
        close: ')',
        kind: TokenKind::DelimiterParenthesis,
    },
];

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    source: &'static str,
    regex: Regex,
    action: Action,
}

impl Rule {
    /// The pattern as written, with `@name` references intact.
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Length of the match at the start of `rest`, if any.
    pub fn match_len(&self, rest: &str) -> Option<usize> {
        self.regex.find(rest).map(|m| m.end())
    }
}

static ATTRIBUTE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Za-z]+)").unwrap());

/// Replaces `@name` references with the attribute pattern.
fn expand_attributes(pattern: &str) -> String {
    ATTRIBUTE_REF
        .replace_all(pattern, |caps: &regex::Captures| {
            let name = &caps[1];
            ATTRIBUTES
                .iter()
                .find(|(attr, _)| *attr == name)
                .map(|(_, source)| format!("(?:{})", source))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn compile(def: &RuleDef) -> Rule {
    let anchored = format!("^(?:{})", expand_attributes(def.pattern));
    Rule {
        source: def.pattern,
        regex: Regex::new(&anchored).unwrap(),
        action: def.action,
    }
}

/// The complete, immutable lexical definition of the DSL.
#[derive(Debug, Clone)]
pub struct LexicalGrammar {
    keywords: Vec<String>,
    keyword_set: HashSet<String>,
    builtins: Vec<String>,
    builtin_set: HashSet<String>,
    operators: Vec<String>,
    operator_set: HashSet<String>,
    root: Vec<Rule>,
    string: Vec<Rule>,
    comment: Vec<Rule>,
}

impl LexicalGrammar {
    /// Builds a grammar over custom word tables. The rule lists are always the DSL's.
    pub fn from_tables(tables: &GrammarTables<'_>) -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let set = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<HashSet<_>>();
        let rules = |mode: Mode| rule_defs(mode).iter().map(compile).collect::<Vec<_>>();

        Self {
            keywords: owned(tables.keywords),
            keyword_set: set(tables.keywords),
            builtins: owned(tables.builtins),
            builtin_set: set(tables.builtins),
            operators: owned(tables.operators),
            operator_set: set(tables.operators),
            root: rules(Mode::Root),
            string: rules(Mode::String),
            comment: rules(Mode::Comment),
        }
    }

    pub fn language_id(&self) -> &'static str {
        LANGUAGE_ID
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn builtins(&self) -> &[String] {
        &self.builtins
    }

    pub fn operators(&self) -> &[String] {
        &self.operators
    }

    pub fn attributes(&self) -> &'static [(&'static str, &'static str)] {
        ATTRIBUTES
    }

    pub fn brackets(&self) -> &'static [BracketPair] {
        BRACKET_PAIRS
    }

    /// Compiled rules of a mode, in priority order.
    pub fn rules(&self, mode: Mode) -> &[Rule] {
        match mode {
            Mode::Root => &self.root,
            Mode::String => &self.string,
            Mode::Comment => &self.comment,
        }
    }

    /// Classifies an identifier-shaped word.
    pub fn classify_word(&self, word: &str) -> TokenKind {
        if self.keyword_set.contains(word) {
            TokenKind::Keyword
        } else if self.builtin_set.contains(word) {
            TokenKind::Predefined
        } else {
            TokenKind::Identifier
        }
    }

    /// Classifies a maximal run of symbol characters.
    pub fn classify_symbol(&self, run: &str) -> TokenKind {
        if self.operator_set.contains(run) {
            TokenKind::Operator
        } else {
            TokenKind::Unclassified
        }
    }

    /// Class and role of a bracket character.
    pub fn classify_bracket(&self, ch: char) -> Option<(TokenKind, Bracket)> {
        BRACKET_PAIRS.iter().find_map(|pair| {
            if pair.open == ch {
                Some((pair.kind, Bracket::Open))
            } else if pair.close == ch {
                Some((pair.kind, Bracket::Close))
            } else {
                None
            }
        })
    }
}

impl Default for LexicalGrammar {
    fn default() -> Self {
        build_grammar()
    }
}

/// Builds the grammar of the PIPE DSL.
pub fn build_grammar() -> LexicalGrammar {
    LexicalGrammar::from_tables(&IMAGE_DSL_TABLES)
}

static GRAMMAR: Lazy<Arc<LexicalGrammar>> = Lazy::new(|| Arc::new(build_grammar()));

/// The process-wide grammar instance, shared read-only by every editor surface.
pub fn grammar() -> Arc<LexicalGrammar> {
    Arc::clone(&GRAMMAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        let grammar = build_grammar();
        for mode in Mode::ALL {
            assert_eq!(grammar.rules(mode).len(), rule_defs(mode).len());
        }
    }

    #[test]
    fn test_attribute_expansion() {
        assert_eq!(
            expand_attributes("(@digits)"),
            "((?:[0-9]+(_+[0-9]*)*))".to_string()
        );
        assert_eq!(expand_attributes("@unknown"), "@unknown");
    }

    #[test]
    fn test_word_tables_do_not_overlap() {
        for keyword in KEYWORDS {
            assert!(!BUILTINS.contains(keyword), "{} is in both tables", keyword);
        }
    }

    #[test]
    fn test_classify_word_tiers() {
        let grammar = build_grammar();
        assert_eq!(grammar.classify_word("canny_edge"), TokenKind::Keyword);
        assert_eq!(grammar.classify_word("null"), TokenKind::Keyword);
        assert_eq!(grammar.classify_word("rgba"), TokenKind::Predefined);
        assert_eq!(grammar.classify_word("r"), TokenKind::Predefined);
        assert_eq!(grammar.classify_word("red"), TokenKind::Identifier);
        assert_eq!(grammar.classify_word("Grayscale"), TokenKind::Identifier);
    }

    #[test]
    fn test_keyword_wins_over_builtin() {
        let grammar = LexicalGrammar::from_tables(&GrammarTables {
            keywords: &["pixel", "blur"],
            builtins: &["pixel", "width"],
            operators: OPERATORS,
        });
        assert_eq!(grammar.classify_word("pixel"), TokenKind::Keyword);
        assert_eq!(grammar.classify_word("width"), TokenKind::Predefined);
    }

    #[test]
    fn test_classify_symbol() {
        let grammar = build_grammar();
        assert_eq!(grammar.classify_symbol("=>"), TokenKind::Operator);
        assert_eq!(grammar.classify_symbol("|"), TokenKind::Operator);
        assert_eq!(grammar.classify_symbol("||"), TokenKind::Unclassified);
        assert_eq!(grammar.classify_symbol(">"), TokenKind::Unclassified);
    }

    #[test]
    fn test_classify_bracket() {
        let grammar = build_grammar();
        assert_eq!(
            grammar.classify_bracket('{'),
            Some((TokenKind::DelimiterCurly, Bracket::Open))
        );
        assert_eq!(
            grammar.classify_bracket(')'),
            Some((TokenKind::DelimiterParenthesis, Bracket::Close))
        );
        assert_eq!(grammar.classify_bracket('<'), None);
    }

    #[test]
    fn test_float_rules_precede_integer_rule() {
        let position = |kind: TokenKind| {
            ROOT_RULES.iter().position(|def| {
                matches!(def.action, Action::Emit { kind: k, .. } if k == kind)
            })
        };
        let first_float = position(TokenKind::NumberFloat).unwrap();
        let integer = position(TokenKind::Number).unwrap();
        assert!(first_float < integer);
        assert!(matches!(ROOT_RULES[first_float + 1].action, Action::Emit { kind: TokenKind::NumberFloat, .. }));
    }

    #[test]
    fn test_shared_grammar_is_one_instance() {
        assert!(Arc::ptr_eq(&grammar(), &grammar()));
    }
}
