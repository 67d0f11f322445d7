//! Immutable structural parse tree.
//!
//! The tree keeps every token of the source (commas separating parameters
//! and enum values aside), so printing it back yields equivalent code. No
//! node exposes a mutating API; transformations build new nodes.

use crate::token::{Token, Trivia};

/// Root of one parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub items: Vec<Item>,
    /// Comments after the last token of the file.
    pub trailing: Vec<Trivia>,
}

/// `using X;`, `using static X;`, `using A = B;`, `global using X;`, `extern alias X;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub tokens: Vec<Token>,
}

impl UsingDirective {
    /// The directive text with canonical spacing, e.g. `using System.Linq;`.
    pub fn text(&self) -> String {
        crate::printer::render_tokens(self.tokens.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Namespace(NamespaceDecl),
    Member(Member),
    /// `[assembly: ...]` and friends.
    GlobalAttribute(AttributeList),
    /// Top-level statement.
    Statement(Statement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceBody {
    /// `namespace A.B;` covering the rest of the file.
    FileScoped { semicolon: Token },
    Block { open: Token, close: Token },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub keyword: Token,
    pub name_tokens: Vec<Token>,
    pub body: NamespaceBody,
    pub usings: Vec<UsingDirective>,
    pub items: Vec<Item>,
}

impl NamespaceDecl {
    /// Qualified name as written, e.g. `Reality.Services.UPx.Types`.
    pub fn name(&self) -> String {
        self.name_tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn is_file_scoped(&self) -> bool {
        matches!(self.body, NamespaceBody::FileScoped { .. })
    }
}

/// `[Attr, Other(1)]` including the brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeList {
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Type(TypeDecl),
    Method(MethodDecl),
    /// Fields, properties, events, indexers: kept as a token run.
    Other(OtherMember),
}

impl Member {
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            Member::Type(t) => Some(t.first_token()),
            Member::Method(m) => m.first_token(),
            Member::Other(o) => o.first_token(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    RecordStruct,
}

impl TypeKind {
    /// Kinds whose members carry executable bodies.
    pub fn has_implementation(self) -> bool {
        matches!(
            self,
            TypeKind::Class | TypeKind::Struct | TypeKind::Record | TypeKind::RecordStruct
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Token>,
    /// `class`, `struct`, `interface`, `enum`, `record`, `record struct`, ...
    pub keyword: Vec<Token>,
    pub kind: TypeKind,
    pub name: Token,
    /// Type parameters, primary constructor, base list and constraints.
    pub header: Vec<Token>,
    pub body: TypeBody,
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// The first token of the declaration; it carries the leading comments.
    pub fn first_token(&self) -> &Token {
        self.attributes
            .first()
            .and_then(|a| a.tokens.first())
            .or_else(|| self.modifiers.first())
            .or_else(|| self.keyword.first())
            .unwrap_or(&self.name)
    }

    /// Comments preceding the declaration.
    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.first_token().leading
    }

    pub fn members(&self) -> &[Member] {
        match &self.body {
            TypeBody::Members { members, .. } => members,
            _ => &[],
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members().iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.is(modifier))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody {
    Members {
        open: Token,
        members: Vec<Member>,
        close: Token,
    },
    Enum {
        open: Token,
        /// One token run per enum value, without separating commas.
        values: Vec<Vec<Token>>,
        close: Token,
    },
    /// `record R(int X);`
    Semicolon(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    pub open: Token,
    pub params: Vec<Parameter>,
    pub close: Token,
}

/// One parameter, attributes and default value included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub tokens: Vec<Token>,
}

impl Parameter {
    /// Parameter name: the last identifier before any default value.
    pub fn name(&self) -> Option<&str> {
        let end = self
            .tokens
            .iter()
            .position(|t| t.is("="))
            .unwrap_or(self.tokens.len());
        self.tokens[..end]
            .iter()
            .rev()
            .find(|t| t.is_ident())
            .map(|t| t.text.as_str())
    }
}

/// Methods, constructors, finalizers, operators, delegates and local functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Token>,
    /// Return type, name and type parameters (just the name for constructors).
    pub head: Vec<Token>,
    pub name: String,
    pub params: ParameterList,
    /// Constraints or a constructor initializer.
    pub tail: Vec<Token>,
    pub body: MethodBody,
}

impl MethodDecl {
    pub fn first_token(&self) -> Option<&Token> {
        self.attributes
            .first()
            .and_then(|a| a.tokens.first())
            .or_else(|| self.modifiers.first())
            .or_else(|| self.head.first())
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.is(modifier))
    }

    /// Tokens of the return type, if any (constructors have none).
    ///
    /// An explicit interface qualifier (`IFoo.`) is not part of it.
    pub fn return_type(&self) -> &[Token] {
        let mut end = self
            .head
            .iter()
            .rposition(|t| t.text == self.name || t.is("operator"))
            .unwrap_or(0);
        while end >= 2 && self.head[end - 1].is(".") && self.head[end - 2].is_ident() {
            end -= 2;
        }
        &self.head[..end]
    }

    /// Whether the method produces no value: `void`, or a bare `Task`/`ValueTask`.
    pub fn returns_nothing(&self) -> bool {
        let ret: Vec<&str> = self
            .return_type()
            .iter()
            .map(|t| t.text.as_str())
            .filter(|t| !matches!(*t, "System" | "Threading" | "Tasks" | "."))
            .collect();
        matches!(ret.as_slice(), ["void"] | ["Task"] | ["ValueTask"])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    Block(Block),
    /// `=> expr;`
    Expression {
        arrow: Token,
        expr: Vec<Token>,
        semicolon: Token,
    },
    /// Declaration only: `;`
    None(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherMember {
    pub attributes: Vec<AttributeList>,
    pub tokens: Vec<Token>,
}

impl OtherMember {
    pub fn first_token(&self) -> Option<&Token> {
        self.attributes
            .first()
            .and_then(|a| a.tokens.first())
            .or_else(|| self.tokens.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub open: Token,
    pub statements: Vec<Statement>,
    pub close: Token,
}

impl Block {
    /// The last statement when it is a `return`.
    pub fn trailing_return(&self) -> Option<&Statement> {
        self.statements
            .last()
            .filter(|s| matches!(s, Statement::Return(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    /// `return ...;`
    Return(SimpleStatement),
    /// Any other `;`-terminated statement, including the empty statement.
    Simple(SimpleStatement),
    Compound(CompoundStatement),
    Switch(SwitchStatement),
    LocalFunction(MethodDecl),
}

impl Statement {
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            Statement::Block(b) => Some(&b.open),
            Statement::Return(s) | Statement::Simple(s) => s.tokens.first(),
            Statement::Compound(c) => c.clauses.first().and_then(|c| c.header.first()),
            Statement::Switch(s) => s.header.first(),
            Statement::LocalFunction(m) => m.first_token(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleStatement {
    pub tokens: Vec<Token>,
}

/// `if`/`else`, loops, `try`/`catch`/`finally`, `using (...)`, `lock`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundStatement {
    pub clauses: Vec<Clause>,
    /// `while (...);` closing a `do` loop.
    pub trailer: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// e.g. `if (x)`, `else`, `catch (Exception e) when (f)`.
    pub header: Vec<Token>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStatement {
    pub header: Vec<Token>,
    pub open: Token,
    pub sections: Vec<SwitchSection>,
    pub close: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchSection {
    /// `case X:` / `default:` labels, each including its colon.
    pub labels: Vec<Vec<Token>>,
    pub statements: Vec<Statement>,
}
