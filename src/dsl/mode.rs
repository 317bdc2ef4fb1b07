//! Lexer modes and the mode stack
//!
//!     The tokenizer is line oriented, so anything that must survive a line break lives here:
//!     an open string or an open (possibly nested) block comment. The stack always has `Root`
//!     at the bottom; popping the last `Root` is a no-op so stray closers can never leave the
//!     tokenizer without a mode.

use std::fmt;

/// The scanning context that selects which rule list is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Root,
    String,
    Comment,
}

impl Mode {
    /// All modes, in the order their rule lists are declared.
    pub const ALL: [Mode; 3] = [Mode::Root, Mode::String, Mode::Comment];

    /// State name as the editor widget spells it.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Root => "root",
            Mode::String => "string",
            Mode::Comment => "comment",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a matched rule does to the mode stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current mode
    Stay,
    /// Enter a new mode on top of the current one
    Next(Mode),
    /// Re-enter the current mode (nesting)
    Push,
    /// Return to the mode below
    Pop,
}

/// Stack of active modes. Carried from one line to the next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModeStack {
    modes: Vec<Mode>,
}

impl ModeStack {
    pub fn new() -> Self {
        Self {
            modes: vec![Mode::Root],
        }
    }

    pub fn current(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Root)
    }

    /// Number of modes on the stack, `Root` included.
    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    pub fn is_root(&self) -> bool {
        self.modes.len() == 1
    }

    /// Applies a transition. Returns false when a push was refused because the stack already
    /// holds `max_depth` modes; the stack is left unchanged in that case.
    pub fn apply(&mut self, transition: Transition, max_depth: usize) -> bool {
        match transition {
            Transition::Stay => true,
            Transition::Next(mode) => self.push(mode, max_depth),
            Transition::Push => {
                let mode = self.current();
                self.push(mode, max_depth)
            }
            Transition::Pop => {
                if self.modes.len() > 1 {
                    self.modes.pop();
                }
                true
            }
        }
    }

    fn push(&mut self, mode: Mode, max_depth: usize) -> bool {
        if self.modes.len() >= max_depth {
            return false;
        }
        self.modes.push(mode);
        true
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modes.iter().map(|m| m.name()).collect();
        write!(f, "{}", names.join("."))
    }
}
