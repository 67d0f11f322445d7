//! Canonical inter-token spacing.
//!
//! Most decisions are fixed by the two tokens involved. Where C# uses the
//! same punctuation in spaced and unspaced positions (`a < b` versus
//! `List<int>`, `-x` versus `a - b`, casts, ternaries) the source's own
//! spacing decides. Printing preserves exactly that bit, which keeps
//! formatting idempotent.

use crate::token::{Token, TokenKind};

/// Keywords that are followed by a space before `(` or `[`.
const SPACED_KEYWORDS: &[&str] = &[
    "if", "while", "for", "foreach", "switch", "catch", "using", "lock", "fixed", "return",
    "await", "in", "is", "as", "and", "or", "not", "when", "throw", "yield", "case", "else",
    "var", "async", "static", "delegate", "out", "ref", "params", "where", "from", "select",
    "let", "on", "equals", "by", "into",
];

/// Punctuation whose spacing follows the source.
const SOURCE_SPACED: &[&str] = &[
    "<", ">", "-", "+", "*", "&", "!", "?", "^", "++", "--", "..", ":", "|", "~",
];

/// Keywords that begin a statement; always spaced after a `)`.
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "throw", "break", "continue", "goto", "yield", "if", "while", "for", "foreach",
    "do", "switch", "try", "lock", "using", "await",
];

const NO_SPACE_BEFORE: &[&str] = &[",", ";", ")", "]", ".", "?.", "::", "->"];
const NO_SPACE_AFTER: &[&str] = &["(", "[", ".", "?.", "::", "->"];

fn punct(token: &Token, set: &[&str]) -> bool {
    token.kind == TokenKind::Punct && set.contains(&token.text.as_str())
}

fn is_value(token: &Token) -> bool {
    token.kind != TokenKind::Punct
}

/// Whether a space separates `prev` and `next`.
pub fn needs_space(prev: &Token, next: &Token) -> bool {
    if punct(next, NO_SPACE_BEFORE) || punct(prev, NO_SPACE_AFTER) {
        return false;
    }
    if next.is("(") || next.is("[") {
        if prev.is_ident() {
            return SPACED_KEYWORDS.contains(&prev.text.as_str());
        }
        if prev.is(")") || prev.is("]") {
            return next.is("(") && next.spaced;
        }
    }
    if prev.is(")") && is_value(next) {
        return next.spaced || STATEMENT_KEYWORDS.contains(&next.text.as_str());
    }
    if punct(prev, SOURCE_SPACED) || punct(next, SOURCE_SPACED) {
        return next.spaced;
    }
    true
}

/// Render tokens on one line with canonical spacing, ignoring trivia.
pub fn render_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if prev.is_some_and(|p| needs_space(p, token)) {
            out.push(' ');
        }
        out.push_str(&token.text);
        prev = Some(token);
    }
    out
}
