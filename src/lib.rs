//! # pipe-syntax
//!
//! Lexical definition of the PIPE image-processing DSL: the grammar, a line-oriented
//! tokenizer that follows it, the editor language configuration, and exporters for the
//! browser editor.
//!
//! The `pipe` binary wraps the library for the command line.

pub mod config;
pub mod dsl;
