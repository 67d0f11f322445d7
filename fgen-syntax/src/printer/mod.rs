//! Canonical printer.
//!
//! Prints a tree in one fixed layout: four-space indentation, braces on
//! their own lines, one blank line between declarations, comments kept on
//! the lines above the construct they precede. Printing a tree parsed from
//! printed output gives the same text again.

mod builder;
mod spacing;

use std::iter::once;

pub use builder::CodeBuilder;
pub use spacing::{needs_space, render_tokens};

use crate::{
    error::ParseError,
    parser::parse,
    token::{Token, Trivia},
    tree::{
        Block, CompilationUnit, Item, Member, MethodBody, MethodDecl, NamespaceBody, NamespaceDecl,
        Statement, TypeBody, TypeDecl, UsingDirective,
    },
};

/// Parse and re-print `src` in canonical layout.
pub fn format(src: &str) -> Result<String, ParseError> {
    parse(src).map(|unit| print(&unit))
}

/// Print a whole compilation unit.
pub fn print(unit: &CompilationUnit) -> String {
    let mut printer = Printer::default();
    printer.unit(unit);
    printer.out.build()
}

/// Print one member at indentation level zero.
pub fn print_member(member: &Member) -> String {
    let mut printer = Printer::default();
    printer.member(member);
    printer.out.build()
}

/// Print statements at indentation level zero.
pub fn print_statements(statements: &[Statement]) -> String {
    let mut printer = Printer::default();
    for statement in statements {
        printer.statement(statement);
    }
    printer.out.build()
}

fn refs(tokens: &[Token]) -> Vec<&Token> {
    tokens.iter().collect()
}

#[derive(Default)]
struct Printer {
    out: CodeBuilder,
}

impl Printer {
    fn trivia_lines(&mut self, trivia: &[Trivia]) {
        for t in trivia {
            self.out.push_line(t.text());
        }
    }

    /// Print a token run as one line, comments on its first token above it.
    fn run(&mut self, tokens: &[&Token]) {
        let Some(first) = tokens.first() else {
            return;
        };
        self.trivia_lines(&first.leading);
        let text = self.inline(tokens);
        self.out.push_line(&text);
    }

    /// Join tokens on one line; comments inside the run break it and
    /// continue one level deeper.
    fn inline(&self, tokens: &[&Token]) -> String {
        let continuation = self.out.indent_text(self.out.current_indent() + 1);
        let mut text = String::new();
        let mut prev: Option<&Token> = None;
        for &token in tokens {
            if let Some(prev) = prev {
                if token.leading.is_empty() {
                    if needs_space(prev, token) {
                        text.push(' ');
                    }
                } else {
                    for trivia in &token.leading {
                        match trivia {
                            Trivia::LineComment(comment) => {
                                text.push(' ');
                                text.push_str(comment);
                                text.push('\n');
                                text.push_str(&continuation);
                            }
                            Trivia::BlockComment(comment) => {
                                text.push(' ');
                                text.push_str(comment);
                                text.push(' ');
                            }
                            Trivia::Directive(directive) => {
                                text.push('\n');
                                text.push_str(directive);
                                text.push('\n');
                                text.push_str(&continuation);
                            }
                        }
                    }
                }
            }
            text.push_str(&token.text);
            prev = Some(token);
        }
        text
    }

    fn open_brace(&mut self, open: &Token) {
        self.trivia_lines(&open.leading);
        self.out.push_line("{");
        self.out.push_indent();
    }

    fn close_brace(&mut self, close: &Token) {
        self.trivia_lines(&close.leading);
        self.out.push_dedent();
        self.out.push_line("}");
    }

    fn unit(&mut self, unit: &CompilationUnit) {
        self.usings(&unit.usings);
        if !unit.usings.is_empty() && !unit.items.is_empty() {
            self.out.push_blank();
        }
        self.items(&unit.items);
        self.trivia_lines(&unit.trailing);
    }

    fn usings(&mut self, usings: &[UsingDirective]) {
        for using in usings {
            self.run(&refs(&using.tokens));
        }
    }

    fn items(&mut self, items: &[Item]) {
        let mut prev: Option<&Item> = None;
        for item in items {
            let consecutive_statements =
                matches!(prev, Some(Item::Statement(_))) && matches!(item, Item::Statement(_));
            if prev.is_some() && !consecutive_statements {
                self.out.push_blank();
            }
            match item {
                Item::Namespace(ns) => self.namespace(ns),
                Item::Member(member) => self.member(member),
                Item::GlobalAttribute(attribute) => self.run(&refs(&attribute.tokens)),
                Item::Statement(statement) => self.statement(statement),
            }
            prev = Some(item);
        }
    }

    fn namespace(&mut self, ns: &NamespaceDecl) {
        let mut head: Vec<&Token> = once(&ns.keyword).chain(&ns.name_tokens).collect();
        match &ns.body {
            NamespaceBody::FileScoped { semicolon } => {
                head.push(semicolon);
                self.run(&head);
                if !ns.usings.is_empty() || !ns.items.is_empty() {
                    self.out.push_blank();
                }
                self.namespace_body(ns);
            }
            NamespaceBody::Block { open, close } => {
                self.run(&head);
                self.open_brace(open);
                self.namespace_body(ns);
                self.close_brace(close);
            }
        }
    }

    fn namespace_body(&mut self, ns: &NamespaceDecl) {
        self.usings(&ns.usings);
        if !ns.usings.is_empty() && !ns.items.is_empty() {
            self.out.push_blank();
        }
        self.items(&ns.items);
    }

    fn attributes(&mut self, lists: &[crate::tree::AttributeList]) {
        for list in lists {
            self.run(&refs(&list.tokens));
        }
    }

    fn member(&mut self, member: &Member) {
        match member {
            Member::Type(decl) => self.type_decl(decl),
            Member::Method(method) => self.method(method),
            Member::Other(other) => {
                self.attributes(&other.attributes);
                self.run(&refs(&other.tokens));
            }
        }
    }

    fn members(&mut self, members: &[Member]) {
        let mut prev: Option<&Member> = None;
        for member in members {
            let consecutive_fields =
                matches!(prev, Some(Member::Other(_))) && matches!(member, Member::Other(_));
            if prev.is_some() && !consecutive_fields {
                self.out.push_blank();
            }
            self.member(member);
            prev = Some(member);
        }
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        self.attributes(&decl.attributes);
        let mut head: Vec<&Token> = decl
            .modifiers
            .iter()
            .chain(&decl.keyword)
            .chain(once(&decl.name))
            .chain(&decl.header)
            .collect();
        match &decl.body {
            TypeBody::Semicolon(semicolon) => {
                head.push(semicolon);
                self.run(&head);
            }
            TypeBody::Members {
                open,
                members,
                close,
            } => {
                self.run(&head);
                self.open_brace(open);
                self.members(members);
                self.close_brace(close);
            }
            TypeBody::Enum {
                open,
                values,
                close,
            } => {
                self.run(&head);
                self.open_brace(open);
                let comma = Token::punct(",");
                for (i, value) in values.iter().enumerate() {
                    let mut tokens = refs(value);
                    if i + 1 < values.len() {
                        tokens.push(&comma);
                    }
                    self.run(&tokens);
                }
                self.close_brace(close);
            }
        }
    }

    fn method(&mut self, method: &MethodDecl) {
        self.attributes(&method.attributes);
        let comma = Token::punct(",");
        let mut head: Vec<&Token> = method.modifiers.iter().chain(&method.head).collect();
        head.push(&method.params.open);
        for (i, param) in method.params.params.iter().enumerate() {
            if i > 0 {
                head.push(&comma);
            }
            head.extend(&param.tokens);
        }
        head.push(&method.params.close);
        head.extend(&method.tail);

        match &method.body {
            MethodBody::Block(block) => {
                self.run(&head);
                self.block(block);
            }
            MethodBody::Expression {
                arrow,
                expr,
                semicolon,
            } => {
                head.push(arrow);
                head.extend(expr);
                head.push(semicolon);
                self.run(&head);
            }
            MethodBody::None(semicolon) => {
                head.push(semicolon);
                self.run(&head);
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.open_brace(&block.open);
        for statement in &block.statements {
            self.statement(statement);
        }
        self.close_brace(&block.close);
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Block(block) => self.block(block),
            Statement::Return(simple) | Statement::Simple(simple) => {
                self.run(&refs(&simple.tokens))
            }
            Statement::Compound(compound) => {
                for clause in &compound.clauses {
                    self.run(&refs(&clause.header));
                    self.embedded(&clause.body);
                }
                self.run(&refs(&compound.trailer));
            }
            Statement::Switch(switch) => {
                self.run(&refs(&switch.header));
                self.open_brace(&switch.open);
                for section in &switch.sections {
                    for label in &section.labels {
                        self.run(&refs(label));
                    }
                    self.out.push_indent();
                    for inner in &section.statements {
                        self.statement(inner);
                    }
                    self.out.push_dedent();
                }
                self.close_brace(&switch.close);
            }
            Statement::LocalFunction(method) => self.method(method),
        }
    }

    /// Body of an `if`, loop or similar: blocks stay level, anything else
    /// is indented one step.
    fn embedded(&mut self, body: &Statement) {
        match body {
            Statement::Block(block) => self.block(block),
            other => {
                self.out.push_indent();
                self.statement(other);
                self.out.push_dedent();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_class_layout() {
        let out = format("using System;namespace A{public class Q{int x;int y;public int GetX(){return x;}}}").unwrap();
        assert_eq!(
            out,
            "using System;\n\nnamespace A\n{\n    public class Q\n    {\n        int x;\n        int y;\n\n        public int GetX()\n        {\n            return x;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_format_keeps_comments() {
        let out = format("// generate query\nclass Q {\n  // leading\n  void M() { a(); /* inline */ b(); }\n  // closing\n}\n// end").unwrap();
        assert_eq!(
            out,
            "// generate query\nclass Q\n{\n    // leading\n    void M()\n    {\n        a();\n        /* inline */\n        b();\n    }\n    // closing\n}\n// end\n"
        );
    }

    #[test]
    fn test_format_statements() {
        let out = format(
            "class Q { int M(int a) { if (a > 0) return 1; else { a++; } switch (a) { case 1: break; default: return 2; } do a--; while (a > 0); return a; } }",
        )
        .unwrap();
        let expected = "\
class Q
{
    int M(int a)
    {
        if (a > 0)
            return 1;
        else
        {
            a++;
        }
        switch (a)
        {
            case 1:
                break;
            default:
                return 2;
        }
        do
            a--;
        while (a > 0);
        return a;
    }
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_format_enum_drops_trailing_comma() {
        let out = format("enum E { A, B = 2, }").unwrap();
        assert_eq!(out, "enum E\n{\n    A,\n    B = 2\n}\n");
    }

    #[test]
    fn test_format_expression_bodied_and_parameters() {
        let out = format("class Q { public int Add(int a,int b=1)=>a+b; }").unwrap();
        assert_eq!(
            out,
            "class Q\n{\n    public int Add(int a, int b = 1) => a+b;\n}\n"
        );
    }

    #[test]
    fn test_format_line_comment_inside_run() {
        let src = "class Q { void M() { F(a, // first\n b); } }";
        let once = format(src).unwrap();
        assert!(once.contains("F(a, // first\n            b);"), "{once}");
        assert_eq!(format(&once).unwrap(), once);
    }

    #[test]
    fn test_format_file_scoped_namespace() {
        let out = format("namespace A.B;\nusing X;\nclass Q {}").unwrap();
        assert_eq!(out, "namespace A.B;\n\nusing X;\n\nclass Q\n{\n}\n");
    }

    #[test]
    fn test_print_member() {
        let unit = parse("class Q { [Obsolete] public void M() => Run(); }").unwrap();
        let Item::Member(Member::Type(decl)) = &unit.items[0] else {
            panic!("expected type");
        };
        assert_eq!(
            print_member(&decl.members()[0]),
            "[Obsolete]\npublic void M() => Run();\n"
        );
    }

    #[test]
    fn test_top_level_statements_are_not_separated() {
        let out = format("A();\nB();\nclass C {}").unwrap();
        assert_eq!(out, "A();\nB();\n\nclass C\n{\n}\n");
    }
}
