//! Deterministic pre-order traversal of a parse tree.

use crate::tree::{
    CompilationUnit, Item, Member, MethodBody, MethodDecl, NamespaceDecl, OtherMember, Statement,
    TypeDecl, UsingDirective,
};

/// A node handed to a visitor.
#[derive(Debug, Clone, Copy)]
pub enum SyntaxNode<'a> {
    Unit(&'a CompilationUnit),
    Using(&'a UsingDirective),
    Namespace(&'a NamespaceDecl),
    Type(&'a TypeDecl),
    Method(&'a MethodDecl),
    OtherMember(&'a OtherMember),
    Statement(&'a Statement),
}

/// Declarations enclosing a visited node, outermost first.
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    namespaces: Vec<&'a NamespaceDecl>,
    types: Vec<&'a TypeDecl>,
}

impl<'a> Scope<'a> {
    /// Fully qualified name of the enclosing namespace, `None` for the
    /// global namespace.
    pub fn namespace(&self) -> Option<String> {
        if self.namespaces.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.namespaces.iter().map(|ns| ns.name()).collect();
        Some(parts.join("."))
    }

    /// Enclosing types, outermost first.
    pub fn types(&self) -> &[&'a TypeDecl] {
        &self.types
    }

    /// Innermost enclosing type.
    pub fn declaring_type(&self) -> Option<&'a TypeDecl> {
        self.types.last().copied()
    }

    /// `name` qualified by the enclosing namespace and types.
    pub fn qualified_name(&self, name: &str) -> String {
        let mut parts: Vec<String> = self.namespace().into_iter().collect();
        parts.extend(self.types.iter().map(|t| t.name().to_string()));
        parts.push(name.to_string());
        parts.join(".")
    }
}

/// Visit every node of `unit` in source order, parents before children.
pub fn walk<'a, F>(unit: &'a CompilationUnit, visit: &mut F)
where
    F: FnMut(SyntaxNode<'a>, &Scope<'a>),
{
    let mut scope = Scope::default();
    visit(SyntaxNode::Unit(unit), &scope);
    for using in &unit.usings {
        visit(SyntaxNode::Using(using), &scope);
    }
    walk_items(&unit.items, &mut scope, visit);
}

fn walk_items<'a, F>(items: &'a [Item], scope: &mut Scope<'a>, visit: &mut F)
where
    F: FnMut(SyntaxNode<'a>, &Scope<'a>),
{
    for item in items {
        match item {
            Item::Namespace(ns) => {
                visit(SyntaxNode::Namespace(ns), scope);
                scope.namespaces.push(ns);
                for using in &ns.usings {
                    visit(SyntaxNode::Using(using), scope);
                }
                walk_items(&ns.items, scope, visit);
                scope.namespaces.pop();
            }
            Item::Member(member) => walk_member(member, scope, visit),
            Item::Statement(statement) => walk_statement(statement, scope, visit),
            Item::GlobalAttribute(_) => {}
        }
    }
}

fn walk_member<'a, F>(member: &'a Member, scope: &mut Scope<'a>, visit: &mut F)
where
    F: FnMut(SyntaxNode<'a>, &Scope<'a>),
{
    match member {
        Member::Type(decl) => {
            visit(SyntaxNode::Type(decl), scope);
            scope.types.push(decl);
            for member in decl.members() {
                walk_member(member, scope, visit);
            }
            scope.types.pop();
        }
        Member::Method(method) => walk_method(method, scope, visit),
        Member::Other(other) => visit(SyntaxNode::OtherMember(other), scope),
    }
}

fn walk_method<'a, F>(method: &'a MethodDecl, scope: &mut Scope<'a>, visit: &mut F)
where
    F: FnMut(SyntaxNode<'a>, &Scope<'a>),
{
    visit(SyntaxNode::Method(method), scope);
    if let MethodBody::Block(block) = &method.body {
        for statement in &block.statements {
            walk_statement(statement, scope, visit);
        }
    }
}

fn walk_statement<'a, F>(statement: &'a Statement, scope: &mut Scope<'a>, visit: &mut F)
where
    F: FnMut(SyntaxNode<'a>, &Scope<'a>),
{
    visit(SyntaxNode::Statement(statement), scope);
    match statement {
        Statement::Block(block) => {
            for inner in &block.statements {
                walk_statement(inner, scope, visit);
            }
        }
        Statement::Compound(compound) => {
            for clause in &compound.clauses {
                walk_statement(&clause.body, scope, visit);
            }
        }
        Statement::Switch(switch) => {
            for section in &switch.sections {
                for inner in &section.statements {
                    walk_statement(inner, scope, visit);
                }
            }
        }
        Statement::LocalFunction(method) => {
            if let MethodBody::Block(block) = &method.body {
                for inner in &block.statements {
                    walk_statement(inner, scope, visit);
                }
            }
        }
        Statement::Return(_) | Statement::Simple(_) => {}
    }
}
