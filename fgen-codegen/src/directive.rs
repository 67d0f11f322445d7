//! Directive scanning.
//!
//! A declaration opts into generation with a line comment in its leading
//! trivia:
//!
//! ```text
//! // generate query, audit
//! public class UserQuery { ... }
//! ```
//!
//! Only the first comment that starts with `generate ` counts. When its tag
//! list is malformed the declaration has no directive at all.

use std::collections::HashMap;

use fgen_core::FileId;
use fgen_syntax::{CompilationUnit, SyntaxNode, Trivia, TypeDecl, walk};
use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::pipeline::{Diagnostic, Phase};

/// Comment body that introduces a directive.
pub const DIRECTIVE_KEYWORD: &str = "generate ";

/// Stable identity of a type declaration within a project.
///
/// `ordinal` counts earlier declarations of the same qualified name in the
/// same file (partial types), in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeclarationId {
    pub file: FileId,
    pub qualified_name: String,
    pub ordinal: usize,
}

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name)?;
        if self.ordinal > 0 {
            write!(f, "[{}]", self.ordinal)?;
        }
        write!(f, " in file {}", self.file)
    }
}

/// Assigns [`DeclarationId`]s to type declarations as a walk meets them.
///
/// Two indexers fed the same tree in walk order hand out the same ids.
#[derive(Debug, Clone)]
pub struct DeclarationIndexer {
    file: FileId,
    seen: HashMap<String, usize>,
}

impl DeclarationIndexer {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            seen: HashMap::new(),
        }
    }

    pub fn next(&mut self, qualified_name: String) -> DeclarationId {
        let count = self.seen.entry(qualified_name.clone()).or_insert(0);
        let ordinal = *count;
        *count += 1;
        DeclarationId {
            file: self.file,
            qualified_name,
            ordinal,
        }
    }
}

/// A parsed `generate` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub declaration: DeclarationId,
    /// Tags in the order written.
    pub tags: Vec<String>,
    /// Source line of the declaration name.
    pub line: usize,
}

impl Directive {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A directive comment that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedDirective {
    pub declaration: DeclarationId,
    pub comment: String,
    pub reason: String,
    pub line: usize,
}

impl MalformedDirective {
    /// Scan warning for this comment, located at `location:line`.
    pub fn to_diagnostic(&self, location: &str) -> Diagnostic {
        Diagnostic::warning(
            Phase::Scan,
            format!("ignoring `{}`: {}", self.comment, self.reason),
        )
        .at(format!("{location}:{}", self.line))
    }
}

/// Directives of one file, in source order.
#[derive(Debug, Clone, Default)]
pub struct DirectiveMap {
    directives: IndexMap<DeclarationId, Directive>,
    malformed: Vec<MalformedDirective>,
}

impl DirectiveMap {
    pub fn get(&self, id: &DeclarationId) -> Option<&Directive> {
        self.directives.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    /// Directives carrying `tag`.
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Directive> + 'a {
        self.iter().filter(move |d| d.has_tag(tag))
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn malformed(&self) -> &[MalformedDirective] {
        &self.malformed
    }
}

/// Parse one comment. `Ok(None)` when it is not a directive.
pub fn parse_directive(comment: &str) -> Result<Option<Vec<String>>, String> {
    let Some(body) = comment.strip_prefix("//") else {
        return Ok(None);
    };
    let Some(list) = body.trim_start().strip_prefix(DIRECTIVE_KEYWORD) else {
        return Ok(None);
    };

    let mut tags = Vec::new();
    for raw in list.split(',') {
        let tag = raw.trim();
        if tag.is_empty() {
            return Err("empty tag".to_string());
        }
        if let Some(bad) = tag
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(format!("invalid character `{bad}` in tag `{tag}`"));
        }
        tags.push(tag.to_string());
    }
    Ok(Some(tags))
}

fn first_directive(decl: &TypeDecl) -> Option<(String, Result<Vec<String>, String>)> {
    decl.leading_trivia().iter().find_map(|trivia| match trivia {
        Trivia::LineComment(text) => parse_directive(text)
            .transpose()
            .map(|parsed| (text.clone(), parsed)),
        _ => None,
    })
}

/// Collect the directives of every type declaration in `tree`.
pub fn scan(file: FileId, tree: &CompilationUnit) -> DirectiveMap {
    let mut map = DirectiveMap::default();
    let mut indexer = DeclarationIndexer::new(file);
    walk(tree, &mut |node, scope| {
        let SyntaxNode::Type(decl) = node else {
            return;
        };
        let id = indexer.next(scope.qualified_name(decl.name()));
        let line = decl.name.span.line;
        match first_directive(decl) {
            Some((_, Ok(tags))) => {
                map.directives.insert(
                    id.clone(),
                    Directive {
                        declaration: id,
                        tags,
                        line,
                    },
                );
            }
            Some((comment, Err(reason))) => {
                warn!("ignoring malformed directive on {id} (line {line}): {reason}");
                map.malformed.push(MalformedDirective {
                    declaration: id,
                    comment,
                    reason,
                    line,
                });
            }
            None => {}
        }
    });
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use fgen_core::Project;
    use fgen_syntax::parse;

    fn file_id() -> FileId {
        let mut project = Project::new("test", ".");
        project.add_file(fgen_core::SourceFile::new("Query.cs", ""))
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            parse_directive("// generate query"),
            Ok(Some(vec!["query".to_string()]))
        );
        assert_eq!(
            parse_directive("//generate  query , audit-log,v_2"),
            Ok(Some(vec![
                "query".to_string(),
                "audit-log".to_string(),
                "v_2".to_string()
            ]))
        );
        assert_eq!(parse_directive("// generated by hand"), Ok(None));
        assert_eq!(parse_directive("// generate"), Ok(None));
        assert_eq!(parse_directive("/// generate query"), Ok(None));
        assert!(parse_directive("// generate query,").is_err());
        assert!(parse_directive("// generate que ry").is_err());
    }

    #[test]
    fn test_scan_collects_tagged_declarations() {
        let tree = parse(
            "namespace A {\n// generate query\npublic class Q { }\npublic class Plain { }\n// note\n// generate query, audit\npublic struct S { }\n}",
        )
        .unwrap();
        let map = scan(file_id(), &tree);
        assert_eq!(map.len(), 2);
        let names: Vec<&str> = map
            .iter()
            .map(|d| d.declaration.qualified_name.as_str())
            .collect();
        assert_eq!(names, ["A.Q", "A.S"]);
        assert_eq!(map.tagged("audit").count(), 1);
        assert_eq!(map.iter().next().map(|d| d.line), Some(3));
    }

    #[test]
    fn test_scan_only_first_directive_counts() {
        let tree = parse("// generate query!\n// generate query\nclass Q { }").unwrap();
        let map = scan(file_id(), &tree);
        assert!(map.is_empty());
        assert_eq!(map.malformed().len(), 1);
        assert_eq!(map.malformed()[0].comment, "// generate query!");
    }

    #[test]
    fn test_scan_nested_and_partial_declarations() {
        let tree = parse(
            "// generate query\npartial class Q { // generate query\n class Inner { } }\n// generate query\npartial class Q { }",
        )
        .unwrap();
        let map = scan(file_id(), &tree);
        let ids: Vec<String> = map.iter().map(|d| d.declaration.to_string()).collect();
        assert_eq!(ids, ["Q in file #0", "Q.Inner in file #0", "Q[1] in file #0"]);
    }

    #[test]
    fn test_malformed_directive_diagnostic() {
        let tree = parse("namespace N;\n// generate query;\npublic class Q { }").unwrap();
        let map = scan(file_id(), &tree);
        let diagnostic = map.malformed()[0].to_diagnostic("Bad.cs");
        assert_eq!(diagnostic.phase, Phase::Scan);
        assert!(diagnostic.severity.is_warning());
        assert_eq!(diagnostic.location.as_deref(), Some("Bad.cs:3"));
        assert!(diagnostic.message.starts_with("ignoring `// generate query;`: "));
    }

    #[test]
    fn test_scan_ignores_block_comments() {
        let tree = parse("/* generate query */\nclass Q { }").unwrap();
        assert!(scan(file_id(), &tree).is_empty());
    }
}
