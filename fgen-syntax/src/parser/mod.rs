//! Structural parser over the tree-sitter C# grammar.
//!
//! tree-sitter produces the concrete syntax tree. Its leaves become
//! [`Token`]s carrying comments and preprocessor lines as trivia, and its
//! declaration and statement nodes are folded into the immutable tree in
//! [`crate::tree`]. Expressions stay flat token runs.

mod items;
mod statements;
mod tokens;

use std::collections::BTreeSet;

use tree_sitter::{Node, Tree};

use crate::{
    error::{ErrorKind, ParseError},
    token::{Span, Token},
    tree::{CompilationUnit, Item, Member, Parameter, Statement, TypeBody},
};

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a whole file.
pub fn parse(src: &str) -> Result<CompilationUnit> {
    let tree = syntax_tree(src)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error(src, root));
    }
    let tokens::Tokens {
        tokens,
        trailing,
        directive_rows,
    } = tokens::collect(src, root);
    let builder = Builder {
        tokens,
        directive_rows,
    };
    let mut unit = builder.compilation_unit(root)?;
    unit.trailing = trailing;
    Ok(unit)
}

/// Parse a sequence of statements, as found inside a method body.
pub fn parse_statements(src: &str) -> Result<Vec<Statement>> {
    let unit = parse(src)?;
    unit.items
        .into_iter()
        .map(|item| match item {
            Item::Statement(statement) => Ok(statement),
            other => {
                let span = item_span(&other);
                Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    "expected a statement, found a declaration",
                    span,
                ))
            }
        })
        .collect()
}

/// Parse one method parameter, attributes and modifiers included.
pub fn parse_parameter(src: &str) -> Result<Parameter> {
    let unit = parse(&format!("class __Parameter {{ void __Method({src}) {{ }} }}"))?;
    let parameter = match unit.items.into_iter().next() {
        Some(Item::Member(Member::Type(decl))) => match decl.body {
            TypeBody::Members { members, .. } => match members.into_iter().next() {
                Some(Member::Method(method)) => method.params.params.into_iter().next(),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    };
    parameter.ok_or_else(|| {
        ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected exactly one parameter in `{src}`"),
            Span::default(),
        )
    })
}

pub(crate) fn syntax_tree(src: &str) -> Result<Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .map_err(|e| ParseError::new(ErrorKind::Grammar, e.to_string(), Span::default()))?;
    parser.parse(src, None).ok_or_else(|| {
        ParseError::new(ErrorKind::Grammar, "parser produced no tree", Span::default())
    })
}

fn node_span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte(), node.start_position().row + 1)
}

fn item_span(item: &Item) -> Span {
    let first = match item {
        Item::Namespace(ns) => Some(&ns.keyword),
        Item::Member(Member::Type(decl)) => Some(decl.first_token()),
        Item::Member(Member::Method(method)) => method.first_token(),
        Item::Member(Member::Other(other)) => other.tokens.first(),
        Item::GlobalAttribute(list) => list.tokens.first(),
        Item::Statement(statement) => statement.first_token(),
    };
    first.map(|t| t.span).unwrap_or_default()
}

/// First error or missing node, in source order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Classify the first syntax error tree-sitter recovered from.
fn syntax_error(src: &str, root: Node<'_>) -> ParseError {
    let Some(node) = first_error(root) else {
        return ParseError::new(ErrorKind::UnexpectedToken, "malformed source", node_span(root));
    };
    let span = node_span(node);
    let at_end = node.start_byte() >= src.trim_end().len();

    if node.is_missing() {
        let expected = node.kind();
        let kind = match expected {
            "\"" => ErrorKind::UnterminatedString,
            "'" => ErrorKind::UnterminatedChar,
            _ if at_end => ErrorKind::UnexpectedEof,
            _ => ErrorKind::UnexpectedToken,
        };
        return ParseError::new(kind, format!("expected `{expected}`"), span);
    }

    let text = node.utf8_text(src.as_bytes()).unwrap_or_default().trim_start();
    let first_line = text.lines().next().unwrap_or_default();
    let kind = if text.starts_with("/*") {
        ErrorKind::UnterminatedComment
    } else if text.starts_with(['"', '@', '$']) && first_line.matches('"').count() == 1 {
        ErrorKind::UnterminatedString
    } else if text.starts_with('\'') && first_line.matches('\'').count() == 1 {
        ErrorKind::UnterminatedChar
    } else if text.starts_with(['}', ')', ']']) {
        ErrorKind::UnbalancedDelimiter
    } else if text.is_empty() || at_end {
        ErrorKind::UnexpectedEof
    } else {
        ErrorKind::UnexpectedToken
    };
    let shown: String = first_line.chars().take(40).collect();
    ParseError::new(kind, format!("unexpected `{shown}`"), span)
}

/// Folds syntax nodes into tree items over a shared token stream.
pub(crate) struct Builder {
    tokens: Vec<Token>,
    directive_rows: BTreeSet<usize>,
}

impl Builder {
    /// Tokens starting inside `start..end`.
    fn slice(&self, start: usize, end: usize) -> Vec<Token> {
        let from = self.tokens.partition_point(|t| t.span.start < start);
        let to = self.tokens.partition_point(|t| t.span.start < end);
        self.tokens[from..to.max(from)].to_vec()
    }

    fn tokens_of(&self, node: Node<'_>) -> Vec<Token> {
        self.slice(node.start_byte(), node.end_byte())
    }

    fn first_token(&self, node: Node<'_>) -> Result<Token> {
        self.tokens_of(node)
            .into_iter()
            .next()
            .ok_or_else(|| malformed(node, "no tokens"))
    }

    fn last_token(&self, node: Node<'_>) -> Result<Token> {
        self.tokens_of(node)
            .pop()
            .ok_or_else(|| malformed(node, "no tokens"))
    }

    /// Named children with preprocessor blocks flattened away; comments
    /// and the nodes of preprocessor lines are skipped.
    fn children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind().starts_with("preproc_") {
                children.extend(self.children(child));
            } else if child.kind() != "comment"
                && !self.directive_rows.contains(&child.start_position().row)
            {
                children.push(child);
            }
        }
        children
    }

    fn child_of_kind<'t>(&self, node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
        self.children(node)
            .into_iter()
            .find(|child| kinds.contains(&child.kind()))
    }
}

fn malformed(node: Node<'_>, what: &str) -> ParseError {
    ParseError::new(
        ErrorKind::UnexpectedToken,
        format!("unsupported `{}`: {what}", node.kind()),
        node_span(node),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::render_tokens;

    #[test]
    fn test_parse_parameter() {
        let parameter = parse_parameter("[Service]ILogger<Q> __logger").unwrap();
        assert_eq!(render_tokens(&parameter.tokens), "[Service] ILogger<Q> __logger");
        assert_eq!(parameter.name(), Some("__logger"));
    }

    #[test]
    fn test_parse_statements_rejects_declarations() {
        assert!(parse_statements("A();\nclass C {}").is_err());
    }

    #[test]
    fn test_unterminated_block_is_eof() {
        let err = parse("class A { void M() { }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_errors_are_reported() {
        for src in [
            "class A { } }",
            "class A { void M() { ) } }",
            "class A { void M() { var s = \"open; } }",
        ] {
            assert!(parse(src).is_err(), "{src}");
        }
    }
}
