//! Statements inside method bodies and at the top level.

use tree_sitter::Node;

use super::{Builder, Result, malformed};
use crate::{
    token::Token,
    tree::{
        Block, Clause, CompoundStatement, SimpleStatement, Statement, SwitchSection,
        SwitchStatement,
    },
};

/// Clauses whose embedded statements belong to the enclosing statement.
const CLAUSES: &[&str] = &["catch_clause", "finally_clause", "else_clause"];

fn is_statement(node: Node<'_>) -> bool {
    node.kind() == "block" || node.kind().ends_with("_statement")
}

impl Builder {
    pub(super) fn block(&self, node: Node<'_>) -> Result<Block> {
        Ok(Block {
            open: self.first_token(node)?,
            statements: self
                .children(node)
                .into_iter()
                .map(|statement| self.statement(statement))
                .collect::<Result<_>>()?,
            close: self.last_token(node)?,
        })
    }

    pub(crate) fn statement(&self, node: Node<'_>) -> Result<Statement> {
        match node.kind() {
            "block" => Ok(Statement::Block(self.block(node)?)),
            "return_statement" => Ok(Statement::Return(SimpleStatement {
                tokens: self.tokens_of(node),
            })),
            "local_function_statement" => Ok(Statement::LocalFunction(self.method(node)?)),
            "switch_statement" => self.switch_statement(node),
            "if_statement" => self.if_statement(node),
            _ => {
                let bodies = self.bodies(node);
                if bodies.is_empty() {
                    return Ok(Statement::Simple(SimpleStatement {
                        tokens: self.tokens_of(node),
                    }));
                }
                let mut clauses = Vec::with_capacity(bodies.len());
                let mut header_start = node.start_byte();
                for body in bodies {
                    clauses.push(Clause {
                        header: self.slice(header_start, body.start_byte()),
                        body: Box::new(self.statement(body)?),
                    });
                    header_start = body.end_byte();
                }
                Ok(Statement::Compound(CompoundStatement {
                    clauses,
                    trailer: self.slice(header_start, node.end_byte()),
                }))
            }
        }
    }

    /// Embedded statements of a compound statement, in source order.
    fn bodies<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut bodies = Vec::new();
        for child in self.children(node) {
            if is_statement(child) {
                bodies.push(child);
            } else if CLAUSES.contains(&child.kind()) {
                bodies.extend(self.bodies(child));
            }
        }
        bodies
    }

    /// `if`, with `else if` links folded into one flat clause list.
    fn if_statement(&self, node: Node<'_>) -> Result<Statement> {
        let mut clauses = Vec::new();
        let mut current = node;
        let mut header_start = node.start_byte();
        loop {
            let bodies = self.bodies(current);
            let Some(consequence) = bodies.first() else {
                return Err(malformed(current, "expected a statement"));
            };
            clauses.push(Clause {
                header: self.slice(header_start, consequence.start_byte()),
                body: Box::new(self.statement(*consequence)?),
            });
            match bodies.get(1) {
                Some(alternative) if alternative.kind() == "if_statement" => {
                    header_start = consequence.end_byte();
                    current = *alternative;
                }
                Some(alternative) => {
                    clauses.push(Clause {
                        header: self.slice(consequence.end_byte(), alternative.start_byte()),
                        body: Box::new(self.statement(*alternative)?),
                    });
                    break;
                }
                None => break,
            }
        }
        Ok(Statement::Compound(CompoundStatement {
            clauses,
            trailer: Vec::new(),
        }))
    }

    fn switch_statement(&self, node: Node<'_>) -> Result<Statement> {
        let body = node
            .child_by_field_name("body")
            .or_else(|| self.child_of_kind(node, &["switch_body"]))
            .ok_or_else(|| malformed(node, "expected `{`"))?;
        let mut sections = Vec::new();
        for section in self.children(body) {
            let statements: Vec<Node<'_>> = self
                .children(section)
                .into_iter()
                .filter(|child| is_statement(*child))
                .collect();
            let labels_end = statements
                .first()
                .map_or(section.end_byte(), |s| s.start_byte());
            sections.push(SwitchSection {
                labels: split_labels(self.slice(section.start_byte(), labels_end)),
                statements: statements
                    .into_iter()
                    .map(|statement| self.statement(statement))
                    .collect::<Result<_>>()?,
            });
        }
        Ok(Statement::Switch(SwitchStatement {
            header: self.slice(node.start_byte(), body.start_byte()),
            open: self.first_token(body)?,
            sections,
            close: self.last_token(body)?,
        }))
    }
}

/// Split a section's label tokens at each `case` or `default` outside
/// nested delimiters.
fn split_labels(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut labels: Vec<Vec<Token>> = Vec::new();
    let mut depth = 0usize;
    for token in tokens {
        let starts_label = depth == 0 && (token.is("case") || token.is("default"));
        match token.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            _ => {}
        }
        match labels.last_mut() {
            Some(label) if !starts_label => label.push(token),
            _ => labels.push(vec![token]),
        }
    }
    labels
}
