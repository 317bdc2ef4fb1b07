//! Lexical support for the PIPE image-processing DSL
//!
//! Structure:
//!     The grammar ([grammar]) is a static table: word sets, named patterns and one ordered
//!     rule list per lexer mode ([mode]). The [tokenizer] interprets it line by line into
//!     classified spans ([token]). [language] holds the editing affordances (comments,
//!     bracket and auto-closing pairs), [registry] installs both into an editor host, and
//!     [monarch] exports the grammar for the browser editor.
//!
//!     Nothing here parses the DSL. Highlighting only mirrors the surface syntax the compiler
//!     accepts, and malformed text is classified, never rejected.

pub mod grammar;
pub mod language;
pub mod mode;
pub mod monarch;
pub mod registry;
pub mod token;
pub mod tokenizer;

pub use grammar::{build_grammar, grammar, LexicalGrammar, LANGUAGE_ID};
pub use language::LanguageConfiguration;
pub use mode::{Mode, ModeStack};
pub use monarch::MonarchDefinition;
pub use registry::{register, EditorHost, LanguageRegistry, RegistrationError};
pub use token::{Bracket, Token, TokenKind};
pub use tokenizer::{tokenize, tokenize_line, TokenizedLine, Tokenizer};
