//! Canonical formatting over realistic service code.

use fgen_syntax::{Item, Member, format, parse};

const SERVICE: &str = r#"// Copyright (c) Reality
using System;
using System.Collections.Generic;
using HotChocolate;

#nullable enable
namespace Reality.Services.UPx.Types
{
    // generate query
    [ExtendObjectType("Query")]
    public partial class UserQuery : QueryBase<User>, IDisposable
    {
        private readonly Dictionary<string, int> _cache = new();
        public int Count { get; private set; } = 0;

        /// <summary>Find a user.</summary>
        public async Task<User?> GetUser([Service] IUserRepository repo, string id, CancellationToken ct = default)
        {
            if (string.IsNullOrEmpty(id)) throw new ArgumentException(nameof(id));
            var user = await repo.FindAsync(id, ct);   // may be null
            foreach (var (key, value) in _cache) { Count += value; }
            try { Audit($"user {id} at {DateTime.Now:O}"); }
            catch (Exception e) when (e is not OperationCanceledException) { }
            return user is null ? null : user with { Name = user.Name.Trim() };
        }

        public IEnumerable<int> Range(int n) => Enumerable.Range(0, n).Where(x => x % 2 == 0);

        public string Describe(object o) => o switch
        {
            int i when i > 0 => "positive",
            string { Length: 0 } => "empty",
            _ => @"other ""thing""",
        };

        public void Dispose() { }
    }

    public enum Role { Admin = 1, User = 1 << 1, }
}
"#;

#[test]
fn test_format_is_idempotent() {
    let once = format(SERVICE).unwrap();
    let twice = format(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_format_preserves_structure() {
    let original = parse(SERVICE).unwrap();
    let formatted = parse(&format(SERVICE).unwrap()).unwrap();

    let Item::Namespace(before) = &original.items[0] else {
        panic!("expected namespace");
    };
    let Item::Namespace(after) = &formatted.items[0] else {
        panic!("expected namespace");
    };
    assert_eq!(before.items.len(), after.items.len());

    let Item::Member(Member::Type(query)) = &after.items[0] else {
        panic!("expected class");
    };
    let methods: Vec<&str> = query.methods().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, ["GetUser", "Range", "Describe", "Dispose"]);
    assert_eq!(original.usings.len(), formatted.usings.len());
}

#[test]
fn test_format_keeps_comments_and_directives() {
    let out = format(SERVICE).unwrap();
    assert!(out.starts_with("// Copyright (c) Reality\nusing System;\n"));
    assert!(out.contains("#nullable enable\nnamespace Reality.Services.UPx.Types\n"));
    assert!(out.contains("    // generate query\n    [ExtendObjectType(\"Query\")]\n    public partial class UserQuery"));
    assert!(out.contains("// may be null"));
    assert!(out.contains("/// <summary>Find a user.</summary>"));
}

#[test]
fn test_format_keeps_literals_verbatim() {
    let out = format(SERVICE).unwrap();
    assert!(out.contains(r#"$"user {id} at {DateTime.Now:O}""#));
    assert!(out.contains(r#"@"other ""thing""""#));
}

#[test]
fn test_format_rejects_unbalanced_source() {
    assert!(format("class A { void M() { if (x { } }").is_err());
}
