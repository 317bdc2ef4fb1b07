//! Line-oriented tokenizer
//!
//!     Interprets a [LexicalGrammar] one line at a time, left to right. At each position the
//!     rules of the current mode are tried in order; the first non-empty match consumes its
//!     prefix and emits exactly one token. The mode stack is the only state carried between
//!     lines, which is what lets an editor re-tokenize a single edited line.
//!
//!     Tokenizing cannot fail. Every rule list ends in rules that together accept any
//!     character, and malformed input only ever shows up as one of the invalid classes
//!     (`string.invalid`, `string.escape.invalid`, `invalid`).
//!
//!     The core is [Tokenizer::step], a pure function from (mode stack, line, position) to
//!     (token, new mode stack, consumed length). Everything else is a loop around it.

use crate::dsl::grammar::{self, Action, LexicalGrammar};
use crate::dsl::mode::{ModeStack, Transition};
use crate::dsl::token::{Token, TokenKind};
use tracing::warn;

/// Deepest mode stack the tokenizer builds, matching the editor widget's own limit.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 100;

/// Smallest usable limit: root plus one string or comment mode.
pub const MIN_STACK_DEPTH: usize = 2;

/// Outcome of a single scan step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub token: Token,
    pub stack: ModeStack,
    /// Bytes consumed; zero only when scanning at the end of the line
    pub consumed: usize,
}

/// The tokens of one line and the state the next line starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    pub tokens: Vec<Token>,
    pub end_state: ModeStack,
}

#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'g> {
    grammar: &'g LexicalGrammar,
    max_stack_depth: usize,
}

impl<'g> Tokenizer<'g> {
    pub fn new(grammar: &'g LexicalGrammar) -> Self {
        Self {
            grammar,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }

    /// Limits the mode stack, never below [MIN_STACK_DEPTH] so strings and comments still open.
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth.max(MIN_STACK_DEPTH);
        self
    }

    pub fn grammar(&self) -> &'g LexicalGrammar {
        self.grammar
    }

    /// Scans one token starting at byte `pos` of `line`.
    ///
    /// `pos` must be a char boundary. At the end of the line nothing is consumed and the
    /// token is empty.
    pub fn step(&self, stack: &ModeStack, line: &str, pos: usize) -> Step {
        let rest = &line[pos..];
        let mut next = stack.clone();

        for rule in self.grammar.rules(stack.current()) {
            let len = match rule.match_len(rest) {
                Some(len) if len > 0 => len,
                _ => continue,
            };
            let text = &rest[..len];
            let (kind, bracket, transition) = match rule.action() {
                Action::Emit {
                    kind,
                    bracket,
                    transition,
                } => (kind, bracket, transition),
                Action::Words => (self.grammar.classify_word(text), None, Transition::Stay),
                Action::Symbols => (self.grammar.classify_symbol(text), None, Transition::Stay),
                Action::Brackets => {
                    match text.chars().next().and_then(|ch| self.grammar.classify_bracket(ch)) {
                        Some((kind, bracket)) => (kind, Some(bracket), Transition::Stay),
                        None => (TokenKind::Invalid, None, Transition::Stay),
                    }
                }
            };

            if !next.apply(transition, self.max_stack_depth) {
                warn!(
                    depth = next.depth(),
                    mode = %next.current(),
                    "mode stack limit reached, ignoring nested opener"
                );
            }

            return Step {
                token: Token::new(kind, pos..pos + len).with_bracket(bracket),
                stack: next,
                consumed: len,
            };
        }

        // Only reachable with a rule list that is not total, or at end of line.
        let len = rest.chars().next().map(char::len_utf8).unwrap_or(0);
        Step {
            token: Token::new(TokenKind::Invalid, pos..pos + len),
            stack: next,
            consumed: len,
        }
    }

    /// Tokenizes one line (without its line terminator) starting in `state`.
    pub fn tokenize_line(&self, line: &str, state: &ModeStack) -> TokenizedLine {
        let mut tokens = Vec::new();
        let mut stack = state.clone();
        let mut pos = 0;

        while pos < line.len() {
            let step = self.step(&stack, line, pos);
            pos += step.consumed;
            stack = step.stack;
            tokens.push(step.token);
        }

        TokenizedLine {
            tokens,
            end_state: stack,
        }
    }

    /// Tokenizes a whole buffer, threading the mode stack from line to line.
    pub fn tokenize(&self, source: &str) -> Vec<TokenizedLine> {
        let mut state = ModeStack::new();
        let mut lines = Vec::new();
        for line in source.lines() {
            let tokenized = self.tokenize_line(line, &state);
            state = tokenized.end_state.clone();
            lines.push(tokenized);
        }
        lines
    }
}

/// Tokenizes a buffer with the shared grammar.
pub fn tokenize(source: &str) -> Vec<TokenizedLine> {
    let grammar = grammar::grammar();
    Tokenizer::new(&grammar).tokenize(source)
}

/// Tokenizes one line with the shared grammar.
pub fn tokenize_line(line: &str, state: &ModeStack) -> TokenizedLine {
    let grammar = grammar::grammar();
    Tokenizer::new(&grammar).tokenize_line(line, state)
}
