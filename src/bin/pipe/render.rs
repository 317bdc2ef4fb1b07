//! Output formatting for the pipe binary

use crossterm::style::{ContentStyle, Stylize};
use pipe_syntax::config::OutputFormat;
use pipe_syntax::dsl::{Bracket, TokenKind, TokenizedLine};
use serde::Serialize;

/// A token flattened for listing, with document coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord<'a> {
    /// 1-based line number
    pub line: usize,
    /// 0-based byte offsets within the line
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<Bracket>,
}

pub fn records<'a>(
    source: &'a str,
    lines: &[TokenizedLine],
    show_whitespace: bool,
) -> Vec<TokenRecord<'a>> {
    source
        .lines()
        .zip(lines)
        .enumerate()
        .flat_map(|(index, (text, tokenized))| {
            tokenized
                .tokens
                .iter()
                .filter(move |token| show_whitespace || token.kind != TokenKind::White)
                .map(move |token| TokenRecord {
                    line: index + 1,
                    start: token.span.start,
                    end: token.span.end,
                    kind: token.kind,
                    text: token.text(text),
                    bracket: token.bracket,
                })
        })
        .collect()
}

fn kind_label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Unclassified => "<none>",
        other => other.as_str(),
    }
}

pub fn format_records(records: &[TokenRecord<'_>], format: OutputFormat) -> anyhow::Result<String> {
    let out = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for record in records {
                out.push_str(&format!(
                    "{}:{} {} {:?}\n",
                    record.line,
                    record.start + 1,
                    kind_label(record.kind),
                    record.text
                ));
            }
            out
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yaml::to_string(records)?,
    };
    Ok(out)
}

fn style_for(kind: TokenKind) -> ContentStyle {
    let style = ContentStyle::new();
    match kind {
        TokenKind::Keyword => style.magenta().bold(),
        TokenKind::Predefined => style.cyan(),
        TokenKind::Number | TokenKind::NumberFloat => style.yellow(),
        TokenKind::String | TokenKind::StringQuote => style.green(),
        TokenKind::StringEscape => style.dark_green().bold(),
        TokenKind::StringInvalid | TokenKind::StringEscapeInvalid | TokenKind::Invalid => {
            style.red().underlined()
        }
        TokenKind::Comment | TokenKind::CommentQuote => style.dark_grey().italic(),
        TokenKind::Operator => style.bold(),
        _ => style,
    }
}

/// Splits a raw line into the text the tokenizer sees and its terminator.
///
/// Mirrors `str::lines`: `\r` only counts when it precedes `\n`.
fn split_terminator(raw: &str) -> (&str, &str) {
    let body = match raw.strip_suffix('\n') {
        Some(body) => body.strip_suffix('\r').unwrap_or(body),
        None => raw,
    };
    raw.split_at(body.len())
}

/// Renders the source with one ANSI style per token, keeping its line terminators.
pub fn highlight(source: &str, lines: &[TokenizedLine], color: bool) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    for (raw, tokenized) in source.split_inclusive('\n').zip(lines) {
        let (text, terminator) = split_terminator(raw);
        for token in &tokenized.tokens {
            let piece = token.text(text);
            if color {
                out.push_str(&style_for(token.kind).apply(piece).to_string());
            } else {
                out.push_str(piece);
            }
        }
        out.push_str(terminator);
    }
    out
}
