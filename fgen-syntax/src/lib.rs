//! Structural C# syntax for fgen.
//!
//! This crate turns C# source text into an immutable tree, walks it, and
//! prints it back in one canonical layout:
//!
//! - [`parse`] / [`parse_statements`] - Declarations and statement structure,
//!   read from the tree-sitter C# grammar, with comments and preprocessor
//!   lines attached to tokens as trivia
//! - [`walk`] - Deterministic pre-order traversal with enclosing [`Scope`]
//! - [`format`] / [`print`] - Canonical, idempotent printing
//!
//! The parser is structural, not semantic: expressions are kept as token
//! runs, and nothing is resolved against types or symbols.

mod error;
mod parser;
mod printer;
mod token;
mod tree;
mod walk;

pub use error::{ErrorKind, ParseError};
pub use parser::{parse, parse_parameter, parse_statements};
pub use printer::{
    CodeBuilder, format, needs_space, print, print_member, print_statements,
    render_tokens,
};
pub use token::{Span, Token, TokenKind, Trivia, is_predefined_type, is_reserved};
pub use tree::{
    AttributeList, Block, Clause, CompilationUnit, CompoundStatement, Item, Member, MethodBody,
    MethodDecl, NamespaceBody, NamespaceDecl, OtherMember, Parameter, ParameterList,
    SimpleStatement, Statement, SwitchSection, SwitchStatement, TypeBody, TypeDecl, TypeKind,
    UsingDirective,
};
pub use walk::{Scope, SyntaxNode, walk};
