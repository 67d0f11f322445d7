//! Compilation units, namespaces, type declarations and members.

use tree_sitter::Node;

use super::{Builder, Result, malformed};
use crate::{
    token::Token,
    tree::{
        AttributeList, CompilationUnit, Item, Member, MethodBody, MethodDecl, NamespaceBody,
        NamespaceDecl, OtherMember, Parameter, ParameterList, TypeBody, TypeDecl, TypeKind,
        UsingDirective,
    },
};

/// Modifiers split off the front of a declaration's head.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "readonly", "virtual", "override",
    "abstract", "sealed", "async", "extern", "unsafe", "new", "partial", "const", "volatile",
    "required", "file", "fixed",
];

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "record_struct_declaration",
];

const METHOD_DECLARATIONS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "delegate_declaration",
    "local_function_statement",
];

const USING_DIRECTIVES: &[&str] = &["using_directive", "extern_alias_directive"];

impl Builder {
    pub(super) fn compilation_unit(&self, root: Node<'_>) -> Result<CompilationUnit> {
        let mut usings = Vec::new();
        let mut items = Vec::new();
        let children = self.children(root);
        for (i, child) in children.iter().enumerate() {
            match child.kind() {
                kind if USING_DIRECTIVES.contains(&kind) => usings.push(self.using(*child)),
                "file_scoped_namespace_declaration" => {
                    let rest = &children[i + 1..];
                    items.push(Item::Namespace(self.file_scoped_namespace(*child, rest)?));
                    break;
                }
                _ => items.push(self.item(*child)?),
            }
        }
        Ok(CompilationUnit {
            usings,
            items,
            trailing: Vec::new(),
        })
    }

    fn using(&self, node: Node<'_>) -> UsingDirective {
        UsingDirective {
            tokens: self.tokens_of(node),
        }
    }

    fn item(&self, node: Node<'_>) -> Result<Item> {
        match node.kind() {
            "namespace_declaration" => Ok(Item::Namespace(self.block_namespace(node)?)),
            "global_attribute" | "global_attribute_list" => {
                Ok(Item::GlobalAttribute(AttributeList {
                    tokens: self.tokens_of(node),
                }))
            }
            "global_statement" => {
                let statement = self
                    .children(node)
                    .into_iter()
                    .next()
                    .ok_or_else(|| malformed(node, "empty statement"))?;
                Ok(Item::Statement(self.statement(statement)?))
            }
            _ => Ok(Item::Member(self.member(node)?)),
        }
    }

    /// Usings and items of a namespace body.
    fn namespace_items(&self, nodes: &[Node<'_>]) -> Result<(Vec<UsingDirective>, Vec<Item>)> {
        let mut usings = Vec::new();
        let mut items = Vec::new();
        for node in nodes {
            if USING_DIRECTIVES.contains(&node.kind()) {
                usings.push(self.using(*node));
            } else {
                items.push(self.item(*node)?);
            }
        }
        Ok((usings, items))
    }

    fn namespace_name<'t>(&self, node: Node<'t>) -> Result<(Token, Node<'t>)> {
        let keyword = self.first_token(node)?;
        let name = node
            .child_by_field_name("name")
            .ok_or_else(|| malformed(node, "expected a namespace name"))?;
        Ok((keyword, name))
    }

    fn block_namespace(&self, node: Node<'_>) -> Result<NamespaceDecl> {
        let (keyword, name) = self.namespace_name(node)?;
        let body = node
            .child_by_field_name("body")
            .or_else(|| self.child_of_kind(node, &["declaration_list"]))
            .ok_or_else(|| malformed(node, "expected `{`"))?;
        let (usings, items) = self.namespace_items(&self.children(body))?;
        Ok(NamespaceDecl {
            keyword,
            name_tokens: self.tokens_of(name),
            body: NamespaceBody::Block {
                open: self.first_token(body)?,
                close: self.last_token(body)?,
            },
            usings,
            items,
        })
    }

    /// `namespace A.B;` owns its own members and every declaration after it.
    fn file_scoped_namespace(&self, node: Node<'_>, rest: &[Node<'_>]) -> Result<NamespaceDecl> {
        let (keyword, name) = self.namespace_name(node)?;
        let semicolon = self
            .slice(name.end_byte(), node.end_byte())
            .into_iter()
            .find(|t| t.is(";"))
            .ok_or_else(|| malformed(node, "expected `;`"))?;
        let mut members: Vec<Node<'_>> = self
            .children(node)
            .into_iter()
            .filter(|child| child.start_byte() >= semicolon.span.end)
            .collect();
        members.extend_from_slice(rest);
        let (usings, items) = self.namespace_items(&members)?;
        Ok(NamespaceDecl {
            keyword,
            name_tokens: self.tokens_of(name),
            body: NamespaceBody::FileScoped { semicolon },
            usings,
            items,
        })
    }

    fn attribute_lists(&self, node: Node<'_>) -> Vec<AttributeList> {
        self.children(node)
            .into_iter()
            .filter(|child| child.kind() == "attribute_list")
            .map(|child| AttributeList {
                tokens: self.tokens_of(child),
            })
            .collect()
    }

    /// Byte offset just past the declaration's attribute lists.
    fn after_attributes(&self, node: Node<'_>, attributes: &[AttributeList]) -> usize {
        attributes
            .last()
            .and_then(|list| list.tokens.last())
            .map_or(node.start_byte(), |t| t.span.end)
    }

    pub(super) fn member(&self, node: Node<'_>) -> Result<Member> {
        let kind = node.kind();
        if TYPE_DECLARATIONS.contains(&kind) {
            return Ok(Member::Type(self.type_decl(node)?));
        }
        if METHOD_DECLARATIONS.contains(&kind) {
            return Ok(Member::Method(self.method(node)?));
        }
        let attributes = self.attribute_lists(node);
        let start = self.after_attributes(node, &attributes);
        Ok(Member::Other(OtherMember {
            attributes,
            tokens: self.slice(start, node.end_byte()),
        }))
    }

    fn type_decl(&self, node: Node<'_>) -> Result<TypeDecl> {
        let attributes = self.attribute_lists(node);
        let start = self.after_attributes(node, &attributes);
        let body_node = node.child_by_field_name("body").or_else(|| {
            self.child_of_kind(node, &["declaration_list", "enum_member_declaration_list"])
        });
        let head_end = body_node.map_or(node.end_byte(), |b| b.start_byte());

        let mut tokens = self.slice(start, head_end).into_iter().peekable();
        let modifiers = take_modifiers(&mut tokens);
        let Some(first) = tokens.next() else {
            return Err(malformed(node, "expected a type keyword"));
        };
        let mut keyword = vec![first];
        let kind = match node.kind() {
            "class_declaration" => TypeKind::Class,
            "struct_declaration" => TypeKind::Struct,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            _ => match tokens.next_if(|t| t.is("struct") || t.is("class")) {
                Some(second) => {
                    let kind = if second.is("struct") {
                        TypeKind::RecordStruct
                    } else {
                        TypeKind::Record
                    };
                    keyword.push(second);
                    kind
                }
                None => TypeKind::Record,
            },
        };
        let Some(name) = tokens.next() else {
            return Err(malformed(node, "expected a type name"));
        };
        let mut header: Vec<Token> = tokens.collect();

        let body = match body_node {
            Some(body) if kind == TypeKind::Enum => self.enum_body(body)?,
            Some(body) => TypeBody::Members {
                open: self.first_token(body)?,
                members: self
                    .children(body)
                    .into_iter()
                    .map(|member| self.member(member))
                    .collect::<Result<_>>()?,
                close: self.last_token(body)?,
            },
            None => match header.pop() {
                Some(semicolon) if semicolon.is(";") => TypeBody::Semicolon(semicolon),
                _ => return Err(malformed(node, "expected `{` or `;`")),
            },
        };

        Ok(TypeDecl {
            attributes,
            modifiers,
            keyword,
            kind,
            name,
            header,
            body,
        })
    }

    fn enum_body(&self, body: Node<'_>) -> Result<TypeBody> {
        Ok(TypeBody::Enum {
            open: self.first_token(body)?,
            values: self
                .children(body)
                .into_iter()
                .map(|value| self.tokens_of(value))
                .collect(),
            close: self.last_token(body)?,
        })
    }

    pub(super) fn method(&self, node: Node<'_>) -> Result<MethodDecl> {
        let attributes = self.attribute_lists(node);
        let start = self.after_attributes(node, &attributes);
        let params_node = node
            .child_by_field_name("parameters")
            .or_else(|| self.child_of_kind(node, &["parameter_list"]))
            .ok_or_else(|| malformed(node, "expected a parameter list"))?;

        let mut head = self
            .slice(start, params_node.start_byte())
            .into_iter()
            .peekable();
        let modifiers = take_modifiers(&mut head);
        let head: Vec<Token> = head.collect();
        let name = method_name(&head);
        let params = self.parameter_list(params_node)?;

        let body_node = node
            .child_by_field_name("body")
            .or_else(|| self.child_of_kind(node, &["block", "arrow_expression_clause"]));
        let (tail_end, body) = match body_node {
            Some(block) if block.kind() == "block" => {
                (block.start_byte(), MethodBody::Block(self.block(block)?))
            }
            Some(clause) => {
                let mut expr = self.tokens_of(clause);
                if expr.is_empty() {
                    return Err(malformed(clause, "expected `=>`"));
                }
                let arrow = expr.remove(0);
                let semicolon = self
                    .slice(clause.end_byte(), node.end_byte())
                    .into_iter()
                    .find(|t| t.is(";"))
                    .ok_or_else(|| malformed(node, "expected `;`"))?;
                (
                    clause.start_byte(),
                    MethodBody::Expression {
                        arrow,
                        expr,
                        semicolon,
                    },
                )
            }
            None => {
                let semicolon = self.last_token(node)?;
                if !semicolon.is(";") {
                    return Err(malformed(node, "expected a method body"));
                }
                (semicolon.span.start, MethodBody::None(semicolon))
            }
        };

        Ok(MethodDecl {
            attributes,
            modifiers,
            head,
            name,
            params,
            tail: self.slice(params_node.end_byte(), tail_end),
            body,
        })
    }

    fn parameter_list(&self, node: Node<'_>) -> Result<ParameterList> {
        Ok(ParameterList {
            open: self.first_token(node)?,
            params: self
                .children(node)
                .into_iter()
                .map(|param| Parameter {
                    tokens: self.tokens_of(param),
                })
                .collect(),
            close: self.last_token(node)?,
        })
    }
}

fn take_modifiers(tokens: &mut std::iter::Peekable<impl Iterator<Item = Token>>) -> Vec<Token> {
    let mut modifiers = Vec::new();
    while let Some(token) = tokens.next_if(|t| t.is_ident() && MODIFIERS.contains(&t.text.as_str()))
    {
        modifiers.push(token);
    }
    modifiers
}

fn method_name(head: &[Token]) -> String {
    if let Some(at) = head.iter().position(|t| t.is("operator")) {
        let symbol = crate::printer::render_tokens(head[at + 1..].iter());
        return format!("operator {symbol}");
    }
    let mut angle = 0usize;
    let mut name = None;
    for token in head {
        match token.text.as_str() {
            "<" => angle += 1,
            ">" => angle = angle.saturating_sub(1),
            _ if angle == 0 && token.is_ident() => name = Some(token.text.clone()),
            _ => {}
        }
    }
    name.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::{parse, tree::*};

    fn only_type(src: &str) -> TypeDecl {
        let unit = parse(src).unwrap();
        match unit.items.into_iter().next() {
            Some(Item::Member(Member::Type(t))) => t,
            Some(Item::Namespace(ns)) => match ns.items.into_iter().next() {
                Some(Item::Member(Member::Type(t))) => t,
                other => panic!("expected a type, got {other:?}"),
            },
            other => panic!("expected a type, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_usings() {
        let unit = parse(
            "using System;\nusing static System.Math;\nusing IO = System.IO;\nglobal using global::System.Linq;\nclass A {}",
        )
        .unwrap();
        assert_eq!(unit.usings.len(), 4);
        assert_eq!(unit.usings[1].text(), "using static System.Math;");
        assert_eq!(unit.usings[3].text(), "global using global::System.Linq;");
        assert_eq!(unit.items.len(), 1);
    }

    #[test]
    fn test_parse_file_scoped_namespace() {
        let unit = parse("namespace Reality.Services.UPx;\nusing System;\npublic class A {}").unwrap();
        let Some(Item::Namespace(ns)) = unit.items.first() else {
            panic!("expected namespace");
        };
        assert!(ns.is_file_scoped());
        assert_eq!(ns.name(), "Reality.Services.UPx");
        assert_eq!(ns.usings.len(), 1);
        assert_eq!(ns.items.len(), 1);
    }

    #[test]
    fn test_parse_nested_block_namespaces() {
        let unit = parse("namespace A { namespace B.C { class X {} } class Y {} }").unwrap();
        let Some(Item::Namespace(outer)) = unit.items.first() else {
            panic!("expected namespace");
        };
        assert_eq!(outer.items.len(), 2);
        let Item::Namespace(inner) = &outer.items[0] else {
            panic!("expected nested namespace");
        };
        assert_eq!(inner.name(), "B.C");
    }

    #[test]
    fn test_parse_type_header() {
        let decl = only_type(
            "[Serializable]\npublic sealed partial class Repo<T> : Base<T>, IDisposable where T : class, new()\n{\n}",
        );
        assert_eq!(decl.name(), "Repo");
        assert_eq!(decl.kind, TypeKind::Class);
        assert_eq!(decl.attributes.len(), 1);
        assert!(decl.has_modifier("partial"));
        assert_eq!(decl.header.first().map(|t| t.text.as_str()), Some("<"));
    }

    #[test]
    fn test_parse_records() {
        let decl = only_type("public record struct Point(int X, int Y);");
        assert_eq!(decl.kind, TypeKind::RecordStruct);
        assert!(matches!(decl.body, TypeBody::Semicolon(_)));

        let decl = only_type("public record Person(string Name) { public int Age { get; init; } }");
        assert_eq!(decl.kind, TypeKind::Record);
        assert_eq!(decl.members().len(), 1);
    }

    #[test]
    fn test_parse_enum_values() {
        let decl = only_type("enum Color { Red = 1, Green = 1 << 1, [Obsolete] Blue, }");
        let TypeBody::Enum { values, .. } = &decl.body else {
            panic!("expected enum body");
        };
        assert_eq!(values.len(), 3);
        assert_eq!(values[2].last().map(|t| t.text.as_str()), Some("Blue"));
    }

    #[test]
    fn test_parse_method_shapes() {
        let decl = only_type(
            r#"class Q {
                public Q(int x) : base(x) { }
                ~Q() { }
                public async Task<List<int>> Load<T>(int id, CancellationToken ct = default) where T : new() { return null; }
                public (int, string) Pair() => (1, "a");
                public abstract void Nothing();
                public static Q operator +(Q a, Q b) => a;
                public static implicit operator int(Q q) => 0;
                void IDisposable.Dispose() { }
            }"#,
        );
        let names: Vec<&str> = decl.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            ["Q", "Q", "Load", "Pair", "Nothing", "operator +", "operator int", "Dispose"]
        );

        let ctor = decl.methods().next().unwrap();
        assert_eq!(ctor.tail.first().map(|t| t.text.as_str()), Some(":"));

        let load = decl.methods().nth(2).unwrap();
        assert!(load.has_modifier("async"));
        assert_eq!(load.params.params.len(), 2);
        assert_eq!(load.params.params[1].name(), Some("ct"));
        assert_eq!(load.tail.first().map(|t| t.text.as_str()), Some("where"));
        assert!(matches!(load.body, MethodBody::Block(_)));

        let pair = decl.methods().nth(3).unwrap();
        assert!(matches!(pair.body, MethodBody::Expression { .. }));
        assert_eq!(pair.return_type().len(), 5);

        let nothing = decl.methods().nth(4).unwrap();
        assert!(matches!(nothing.body, MethodBody::None(_)));

        let dispose = decl.methods().nth(7).unwrap();
        assert_eq!(dispose.return_type().len(), 1);
    }

    #[test]
    fn test_parse_other_members() {
        let decl = only_type(
            r#"class Q {
                private readonly int _x = 1;
                public int X { get; set; } = 5;
                public int Y => _x;
                public int[] Z = { 1, 2 };
                public event EventHandler<(int, int)> Changed;
                public int this[int i] { get { return i; } }
                public Func<int, int> F = x => x * 2;
            }"#,
        );
        assert_eq!(decl.members().len(), 7);
        assert!(decl.members().iter().all(|m| matches!(m, Member::Other(_))));
    }

    #[test]
    fn test_parse_nested_types() {
        let decl = only_type("class Outer { class Inner { void M() {} } struct S {}; interface I { void N(); } }");
        assert_eq!(decl.members().len(), 3);
        let Member::Type(inner) = &decl.members()[0] else {
            panic!("expected nested type");
        };
        assert_eq!(inner.methods().count(), 1);
    }

    #[test]
    fn test_parse_leading_trivia_on_declaration() {
        let decl = only_type("// generate query\n/// <summary>Doc</summary>\n[Attr]\npublic class Q {}");
        let comments: Vec<&str> = decl.leading_trivia().iter().map(|t| t.text()).collect();
        assert_eq!(comments, ["// generate query", "/// <summary>Doc</summary>"]);
    }

    #[test]
    fn test_parse_members_under_directives() {
        let decl = only_type(
            "class Q\n{\n#region Queries\n    int A() => 1;\n#endregion\n#if DEBUG\n    int B() => 2;\n#else\n    int C() => 3;\n#endif\n}",
        );
        let names: Vec<&str> = decl.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_parse_global_attribute_and_top_level_statements() {
        let unit = parse(
            "using System;\n[assembly: InternalsVisibleTo(\"Tests\")]\nConsole.WriteLine(1);\nint Add(int a, int b) => a + b;\nclass C {}",
        )
        .unwrap();
        assert!(matches!(unit.items[0], Item::GlobalAttribute(_)));
        assert!(matches!(unit.items[1], Item::Statement(Statement::Simple(_))));
        assert!(matches!(unit.items[2], Item::Statement(Statement::LocalFunction(_))));
        assert!(matches!(unit.items[3], Item::Member(Member::Type(_))));
    }

    #[test]
    fn test_parse_delegate() {
        let unit = parse("namespace N { public delegate void Handler(object sender, int x); }").unwrap();
        let Some(Item::Namespace(ns)) = unit.items.first() else {
            panic!("expected namespace");
        };
        let Item::Member(Member::Method(method)) = &ns.items[0] else {
            panic!("expected delegate");
        };
        assert_eq!(method.name, "Handler");
        assert!(matches!(method.body, MethodBody::None(_)));
    }
}
