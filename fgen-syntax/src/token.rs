//! Tokens and trivia cut from the leaves of a syntax tree.

/// Byte range in source, plus the 1-based line of its start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifiers and keywords alike; the parser tells them apart by text.
    Ident,
    Number,
    /// Any string literal form: regular, verbatim, interpolated, raw.
    String,
    Char,
    Punct,
}

/// Comments and preprocessor lines, attached to the token that follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trivia {
    /// `// ...` (including `///` doc comments), without the line break.
    LineComment(String),
    /// `/* ... */`, verbatim.
    BlockComment(String),
    /// `#region`, `#if`, ... up to the end of the line.
    Directive(String),
}

impl Trivia {
    pub fn text(&self) -> &str {
        match self {
            Trivia::LineComment(s) | Trivia::BlockComment(s) | Trivia::Directive(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Whether whitespace or trivia separated this token from the previous one.
    pub spaced: bool,
    pub leading: Vec<Trivia>,
}

impl Token {
    /// A synthesized punctuation token with no source position.
    pub fn punct(text: &str) -> Self {
        Self {
            kind: TokenKind::Punct,
            text: text.to_string(),
            span: Span::default(),
            spaced: false,
            leading: Vec::new(),
        }
    }

    /// A synthesized identifier or keyword, spaced from what precedes it.
    pub fn ident(text: &str) -> Self {
        Self {
            kind: TokenKind::Ident,
            text: text.to_string(),
            span: Span::default(),
            spaced: true,
            leading: Vec::new(),
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// Identifier that is not one of the reserved keywords.
    pub fn is_name(&self) -> bool {
        self.is_ident() && !is_reserved(&self.text)
    }

    /// The same token without its leading trivia.
    pub fn bare(&self) -> Self {
        Self {
            leading: Vec::new(),
            ..self.clone()
        }
    }
}

/// Reserved C# keywords that can never name a type or member.
pub fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "abstract"
            | "as"
            | "base"
            | "break"
            | "case"
            | "catch"
            | "checked"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "delegate"
            | "do"
            | "else"
            | "enum"
            | "event"
            | "explicit"
            | "extern"
            | "false"
            | "finally"
            | "fixed"
            | "for"
            | "foreach"
            | "goto"
            | "if"
            | "implicit"
            | "in"
            | "interface"
            | "internal"
            | "is"
            | "lock"
            | "namespace"
            | "new"
            | "null"
            | "operator"
            | "out"
            | "override"
            | "params"
            | "private"
            | "protected"
            | "public"
            | "readonly"
            | "ref"
            | "return"
            | "sealed"
            | "sizeof"
            | "stackalloc"
            | "static"
            | "struct"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "unchecked"
            | "unsafe"
            | "using"
            | "virtual"
            | "volatile"
            | "while"
    )
}

/// Predefined type keywords; they behave like names in type positions.
pub fn is_predefined_type(word: &str) -> bool {
    matches!(
        word,
        "bool"
            | "byte"
            | "sbyte"
            | "char"
            | "decimal"
            | "double"
            | "float"
            | "int"
            | "uint"
            | "long"
            | "ulong"
            | "short"
            | "ushort"
            | "object"
            | "string"
            | "void"
            | "dynamic"
            | "nint"
            | "nuint"
    )
}
