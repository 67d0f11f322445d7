//! Token stream over the leaves of a tree-sitter tree.
//!
//! Literals are kept whole even where the grammar splits them. Comments and
//! preprocessor lines never become tokens: they are gathered as [`Trivia`]
//! and attached to the token that follows them.

use std::collections::{BTreeSet, HashSet};

use tree_sitter::Node;

use crate::token::{Span, Token, TokenKind, Trivia};

/// Node kinds taken as one token, children included.
const ATOMIC: &[&str] = &[
    "character_literal",
    "comment",
    "interpolated_string_expression",
    "raw_string_literal",
    "string_literal",
    "verbatim_string_literal",
];

pub(super) struct Tokens {
    pub tokens: Vec<Token>,
    /// Trivia after the last token.
    pub trailing: Vec<Trivia>,
    /// Zero-based rows holding a preprocessor line.
    pub directive_rows: BTreeSet<usize>,
}

pub(super) fn collect(src: &str, root: Node<'_>) -> Tokens {
    let leaves = leaves(root);
    let lines: Vec<&str> = src.lines().collect();
    let directive_rows = directive_rows(&lines, &leaves);

    let mut directives = directive_rows.iter().copied().peekable();
    let mut tokens = Vec::new();
    let mut pending = Vec::new();
    let mut last_end = 0;

    for leaf in leaves {
        let row = leaf.start_position().row;
        while let Some(directive) = directives.next_if(|&d| d <= row) {
            pending.push(directive_trivia(&lines, directive));
        }
        if directive_rows.contains(&row) {
            continue;
        }

        let text = leaf.utf8_text(src.as_bytes()).unwrap_or_default();
        if leaf.kind() == "comment" {
            pending.push(comment(text));
            continue;
        }

        let start = leaf.start_byte();
        tokens.push(Token {
            kind: token_kind(leaf.kind(), text),
            text: text.to_string(),
            span: Span::new(start, leaf.end_byte(), row + 1),
            spaced: start > last_end || !pending.is_empty(),
            leading: std::mem::take(&mut pending),
        });
        last_end = leaf.end_byte();
    }

    pending.extend(directives.map(|d| directive_trivia(&lines, d)));
    Tokens {
        tokens,
        trailing: pending,
        directive_rows,
    }
}

/// Leaves and atomic nodes in source order, zero-width nodes dropped.
fn leaves(root: Node<'_>) -> Vec<Node<'_>> {
    let mut leaves = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let atomic = node.child_count() == 0 || ATOMIC.contains(&node.kind());
        if !atomic && cursor.goto_first_child() {
            continue;
        }
        if atomic && node.id() != root.id() && node.end_byte() > node.start_byte() {
            leaves.push(node);
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return leaves;
            }
        }
    }
}

/// Rows whose first non-blank character is `#`, outside multi-line literals
/// and comments.
fn directive_rows(lines: &[&str], leaves: &[Node<'_>]) -> BTreeSet<usize> {
    let covered: HashSet<usize> = leaves
        .iter()
        .flat_map(|leaf| leaf.start_position().row + 1..=leaf.end_position().row)
        .collect();
    lines
        .iter()
        .enumerate()
        .filter(|(row, line)| line.trim_start().starts_with('#') && !covered.contains(row))
        .map(|(row, _)| row)
        .collect()
}

fn directive_trivia(lines: &[&str], row: usize) -> Trivia {
    let text = lines.get(row).map(|line| line.trim()).unwrap_or_default();
    Trivia::Directive(text.to_string())
}

fn comment(text: &str) -> Trivia {
    if text.starts_with("//") {
        Trivia::LineComment(text.trim_end().to_string())
    } else {
        Trivia::BlockComment(text.to_string())
    }
}

fn token_kind(node_kind: &str, text: &str) -> TokenKind {
    match node_kind {
        "integer_literal" | "real_literal" => TokenKind::Number,
        "string_literal"
        | "verbatim_string_literal"
        | "raw_string_literal"
        | "interpolated_string_expression" => TokenKind::String,
        "character_literal" => TokenKind::Char,
        _ if text.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '@') => {
            TokenKind::Ident
        }
        _ => TokenKind::Punct,
    }
}
