//! Aggregates the methods of `query`-tagged declarations into one
//! `QueryType` class, instrumenting each with timing.

use std::collections::HashSet;

use eyre::Result;
use fgen_syntax::{
    Block, CodeBuilder, Member, MethodBody, MethodDecl, Scope, SimpleStatement,
    Statement, SyntaxNode, Token, Trivia, TypeDecl, UsingDirective, parse_parameter,
    parse_statements, print_member,
};
use indexmap::IndexMap;
use log::{debug, warn};

use crate::{
    directive::{DeclarationId, DeclarationIndexer},
    generator::{GenerationContext, GenerationResult, Generated, Generator},
    pipeline::{Diagnostic, Phase},
};

/// Directive tag selecting declarations for aggregation.
pub const QUERY_TAG: &str = "query";

/// Name of the generated class and of the artifact.
pub const QUERY_TYPE_NAME: &str = "QueryType";

const LOGGING_USING: &str = "using Microsoft.Extensions.Logging;";

const LOGGER: &str = "__fgen_logger";

const PROLOGUE: &str = "float __fgen_time = 0;
int __fgen_calls = 0;
var __fgen_sw = System.Diagnostics.Stopwatch.StartNew();";

const EPILOGUE: &str = "__fgen_sw.Stop();
__fgen_time = __fgen_sw.ElapsedMilliseconds;
__fgen_logger.LogDebug(\"{Elapsed}ms, {Calls} calls\", __fgen_time, __fgen_calls);";

struct Candidate {
    namespace: Option<String>,
    decl: TypeDecl,
}

/// Generator behind the `query` tag.
#[derive(Default)]
pub struct QueryTypeGenerator {
    indexer: Option<DeclarationIndexer>,
    tagged: HashSet<DeclarationId>,
    usings: Vec<UsingDirective>,
    candidates: Vec<Candidate>,
}

impl QueryTypeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Box<dyn Generator> {
        Box::new(Self::new())
    }

    fn build(&self) -> Result<GenerationResult> {
        let mut diagnostics = Vec::new();
        let namespace = vote_namespace(&self.candidates);
        if namespace.is_none() {
            warn!("no `{QUERY_TAG}` declaration is inside a namespace; using the global namespace");
            diagnostics.push(Diagnostic::warning(
                Phase::Generate,
                format!("`{QUERY_TYPE_NAME}` is emitted into the global namespace"),
            ));
        }

        let mut methods = Vec::new();
        for candidate in &self.candidates {
            for method in candidate.decl.methods() {
                match instrument(method, candidate.decl.name())? {
                    Some(method) => methods.push(method),
                    None => debug!(
                        "skipping `{}.{}`: it has no body",
                        candidate.decl.name(),
                        method.name
                    ),
                }
            }
        }

        let mut out = CodeBuilder::csharp();
        let mut seen = HashSet::new();
        for using in &self.usings {
            let text = using.text();
            if seen.insert(text.clone()) {
                out.push_line(&text);
            }
        }
        if !seen.contains(LOGGING_USING) {
            out.push_line(LOGGING_USING);
        }
        out.push_blank();
        if let Some(namespace) = &namespace {
            out.push_line(&format!("namespace {namespace};"));
            out.push_blank();
        }

        let source = out
            .braced(&format!("public partial class {QUERY_TYPE_NAME}"), |mut body| {
                for (i, method) in methods.into_iter().enumerate() {
                    if i > 0 {
                        body.push_blank();
                    }
                    body.push_lines(&print_member(&Member::Method(method)));
                }
                body
            })
            .build();

        let mut generated = Generated::new(source).expected_name(QUERY_TYPE_NAME);
        generated.diagnostics = diagnostics;
        Ok(generated.into())
    }
}

impl Generator for QueryTypeGenerator {
    fn prepare(&mut self, cx: &GenerationContext<'_>) -> Result<()> {
        self.indexer = Some(DeclarationIndexer::new(cx.file));
        self.tagged = cx
            .directives
            .tagged(QUERY_TAG)
            .map(|d| d.declaration.clone())
            .collect();
        Ok(())
    }

    fn visit(&mut self, node: SyntaxNode<'_>, scope: &Scope<'_>) {
        match node {
            SyntaxNode::Using(using) => self.usings.push(using.clone()),
            SyntaxNode::Type(decl) => {
                let Some(indexer) = self.indexer.as_mut() else {
                    return;
                };
                let id = indexer.next(scope.qualified_name(decl.name()));
                if self.tagged.contains(&id) && decl.kind.has_implementation() {
                    self.candidates.push(Candidate {
                        namespace: scope.namespace(),
                        decl: decl.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    fn generate(&mut self) -> Result<GenerationResult> {
        if self.candidates.is_empty() {
            return Ok(GenerationResult::Skipped);
        }
        self.build()
    }
}

/// The namespace most candidates live in, first seen winning ties.
fn vote_namespace(candidates: &[Candidate]) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for namespace in candidates.iter().filter_map(|c| c.namespace.as_deref()) {
        *counts.entry(namespace).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (namespace, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((namespace, count));
        }
    }
    best.map(|(namespace, _)| namespace.to_string())
}

/// Copy of `method` taking a logger and timing its body. `None` when the
/// method has no body to instrument.
fn instrument(method: &MethodDecl, declaring: &str) -> Result<Option<MethodDecl>> {
    let Some(block) = body_block(method) else {
        return Ok(None);
    };

    let mut params = method.params.clone();
    params
        .params
        .push(parse_parameter(&format!("[Service] ILogger<{declaring}> {LOGGER}"))?);

    let mut statements = parse_statements(PROLOGUE)?;
    let mut epilogue = parse_statements(EPILOGUE)?;
    let mut tail = block.trailing_return().cloned();
    if let (Some(Statement::Return(ret)), Some(Statement::Simple(stop))) =
        (tail.as_mut(), epilogue.first_mut())
    {
        // A directive closing before the return now closes before the epilogue.
        if let (Some(from), Some(to)) = (ret.tokens.first_mut(), stop.tokens.first_mut()) {
            let (directives, rest): (Vec<Trivia>, Vec<Trivia>) = std::mem::take(&mut from.leading)
                .into_iter()
                .partition(|trivia| matches!(trivia, Trivia::Directive(_)));
            from.leading = rest;
            to.leading = directives;
        }
    }
    let end = block.statements.len() - usize::from(tail.is_some());
    statements.extend(block.statements[..end].iter().cloned());
    statements.extend(epilogue);
    statements.extend(tail);

    let mut instrumented = MethodDecl {
        params,
        body: MethodBody::Block(Block {
            statements,
            ..block
        }),
        ..method.clone()
    };
    strip_leading_directives(&mut instrumented);
    Ok(Some(instrumented))
}

/// Drop the preprocessor lines in front of a copied method. Whatever closes
/// them (`#endregion`, `#endif`) stays behind in the declaring type.
fn strip_leading_directives(method: &mut MethodDecl) {
    let first = match method.attributes.first_mut() {
        Some(list) => list.tokens.first_mut(),
        None => method.modifiers.first_mut().or(method.head.first_mut()),
    };
    if let Some(token) = first {
        token
            .leading
            .retain(|trivia| !matches!(trivia, Trivia::Directive(_)));
    }
}

/// The method body as a block, lowering `=> expr;` to `{ return expr; }`.
fn body_block(method: &MethodDecl) -> Option<Block> {
    match &method.body {
        MethodBody::Block(block) => Some(block.clone()),
        MethodBody::None(_) => None,
        MethodBody::Expression {
            arrow,
            expr,
            semicolon,
        } => {
            let mut tokens = expr.clone();
            if let Some(first) = tokens.first_mut() {
                let mut leading = arrow.leading.clone();
                leading.append(&mut first.leading);
                first.leading = leading;
            }
            tokens.push(semicolon.clone());

            let statement = if discards_value(method) {
                Statement::Simple(SimpleStatement { tokens })
            } else {
                let mut keyword = Token::ident("return");
                if let Some(first) = tokens.first_mut() {
                    keyword.leading = std::mem::take(&mut first.leading);
                    first.spaced = true;
                }
                tokens.insert(0, keyword);
                Statement::Return(SimpleStatement { tokens })
            };

            Some(Block {
                open: Token::punct("{"),
                statements: vec![statement],
                close: Token::punct("}"),
            })
        }
    }
}

/// Whether the expression body of `method` is evaluated for effect only.
fn discards_value(method: &MethodDecl) -> bool {
    let is_void = matches!(method.return_type(), [t] if t.is("void"));
    is_void || (method.returns_nothing() && method.has_modifier("async"))
}

#[cfg(test)]
mod tests {
    use fgen_syntax::{Item, parse, print_statements};

    use super::*;

    fn method(src: &str) -> MethodDecl {
        let unit = parse(&format!("class C {{ {src} }}")).unwrap();
        let Item::Member(Member::Type(decl)) = &unit.items[0] else {
            panic!("expected class");
        };
        decl.methods().next().unwrap().clone()
    }

    fn body(method: &MethodDecl) -> String {
        let MethodBody::Block(block) = &method.body else {
            panic!("expected block body");
        };
        print_statements(&block.statements)
    }

    #[test]
    fn test_epilogue_precedes_trailing_return() {
        let m = instrument(&method("int GetX() { var x = 1; return x; }"), "C")
            .unwrap()
            .unwrap();
        assert_eq!(
            body(&m),
            "float __fgen_time = 0;\n\
             int __fgen_calls = 0;\n\
             var __fgen_sw = System.Diagnostics.Stopwatch.StartNew();\n\
             var x = 1;\n\
             __fgen_sw.Stop();\n\
             __fgen_time = __fgen_sw.ElapsedMilliseconds;\n\
             __fgen_logger.LogDebug(\"{Elapsed}ms, {Calls} calls\", __fgen_time, __fgen_calls);\n\
             return x;\n"
        );
    }

    #[test]
    fn test_epilogue_appended_without_trailing_return() {
        let m = instrument(&method("void Touch() { if (x) { return; } Log(); }"), "C")
            .unwrap()
            .unwrap();
        let text = body(&m);
        assert!(text.ends_with("__fgen_time, __fgen_calls);\n"));
        assert!(text.contains("Log();\n__fgen_sw.Stop();"));
    }

    #[test]
    fn test_logger_parameter_appended() {
        let m = instrument(&method("int Add(int a, int b = 2) { return a + b; }"), "Calc")
            .unwrap()
            .unwrap();
        assert_eq!(m.params.params.len(), 3);
        assert_eq!(m.params.params[2].name(), Some(LOGGER));
        let printed = print_member(&Member::Method(m));
        assert!(printed.starts_with(
            "int Add(int a, int b = 2, [Service] ILogger<Calc> __fgen_logger)\n"
        ));
    }

    #[test]
    fn test_expression_body_lowered() {
        let value = instrument(&method("int Two() => 1 + 1;"), "C").unwrap().unwrap();
        assert!(body(&value).ends_with("calls);\nreturn 1 + 1;\n"));

        let effect = instrument(&method("void Ping() => Send();"), "C").unwrap().unwrap();
        assert!(body(&effect).contains("StartNew();\nSend();\n__fgen_sw.Stop();"));

        let task = instrument(&method("Task Later() => RunAsync();"), "C").unwrap().unwrap();
        assert!(body(&task).contains("return RunAsync();"));

        let awaited = instrument(&method("async Task Later() => await RunAsync();"), "C")
            .unwrap()
            .unwrap();
        assert!(body(&awaited).contains("\nawait RunAsync();\n"));
    }

    fn class_methods(src: &str) -> (String, Vec<MethodDecl>) {
        let unit = parse(src).unwrap();
        let Item::Member(Member::Type(decl)) = &unit.items[0] else {
            panic!("expected class");
        };
        (decl.name().to_string(), decl.methods().cloned().collect())
    }

    #[test]
    fn test_region_around_method_not_copied() {
        let (name, methods) = class_methods(
            "// generate query\npublic class Q\n{\n #region Queries\n public int X() { return 1; }\n #endregion\n}",
        );
        let m = instrument(&methods[0], &name).unwrap().unwrap();
        let printed = print_member(&Member::Method(m));
        assert!(printed.starts_with("public int X("), "{printed}");
        assert!(!printed.contains('#'), "{printed}");
    }

    #[test]
    fn test_conditional_method_directives_not_copied() {
        let (name, methods) = class_methods(
            "public class Q\n{\n#if DEBUG\n    public int X() => 1;\n#endif\n    public int Y()\n    {\n#if DEBUG\n        Trace();\n#endif\n        return 2;\n    }\n}",
        );
        let x = instrument(&methods[0], &name).unwrap().unwrap();
        let printed = print_member(&Member::Method(x));
        assert!(!printed.contains('#'), "{printed}");

        let y = instrument(&methods[1], &name).unwrap().unwrap();
        let printed = print_member(&Member::Method(y));
        assert!(printed.starts_with("public int Y("), "{printed}");
        assert_eq!(printed.matches("#if DEBUG").count(), 1, "{printed}");
        assert_eq!(printed.matches("#endif").count(), 1, "{printed}");
    }

    #[test]
    fn test_directive_before_trailing_return_stays_before_epilogue() {
        let (name, methods) = class_methods(
            "class Q\n{\n    int Y()\n    {\n#if DEBUG\n        Trace();\n#endif\n        return 2;\n    }\n}",
        );
        let y = instrument(&methods[0], &name).unwrap().unwrap();
        let text = body(&y);
        assert!(text.contains("Trace();\n#endif\n__fgen_sw.Stop();"), "{text}");
        assert!(text.ends_with("calls);\nreturn 2;\n"), "{text}");
    }

    #[test]
    fn test_comments_in_front_of_method_are_kept() {
        let (name, methods) = class_methods(
            "class Q\n{\n    #region Reads\n    /// <summary>Doc</summary>\n    int X() => 1;\n    #endregion\n}",
        );
        let m = instrument(&methods[0], &name).unwrap().unwrap();
        let printed = print_member(&Member::Method(m));
        assert!(printed.starts_with("/// <summary>Doc</summary>\nint X("), "{printed}");
    }

    #[test]
    fn test_bodiless_method_skipped() {
        assert!(instrument(&method("abstract int Get();"), "C").unwrap().is_none());
    }

    #[test]
    fn test_vote_prefers_majority_then_first_seen() {
        let candidate = |ns: Option<&str>| Candidate {
            namespace: ns.map(str::to_string),
            decl: match &parse("class Q { }").unwrap().items[0] {
                Item::Member(Member::Type(decl)) => decl.clone(),
                _ => unreachable!(),
            },
        };
        let votes = [
            candidate(Some("B")),
            candidate(Some("A")),
            candidate(Some("A")),
            candidate(None),
            candidate(Some("B")),
            candidate(Some("A")),
        ];
        assert_eq!(vote_namespace(&votes).as_deref(), Some("A"));

        let tie = [candidate(Some("B")), candidate(Some("A"))];
        assert_eq!(vote_namespace(&tie).as_deref(), Some("B"));

        assert_eq!(vote_namespace(&[candidate(None)]), None);
    }
}
