//! Line-oriented buffer that tracks indentation.

/// One indentation level: four spaces, the C# convention.
const INDENT: &str = "    ";

/// Fluent API for building properly indented C# text.
///
/// Supports both consuming methods (returning `Self`) for chaining and
/// mutable methods prefixed with `push_`.
///
/// # Example
///
/// ```
/// use fgen_syntax::CodeBuilder;
///
/// let code = CodeBuilder::csharp()
///     .line("public class QueryType")
///     .line("{")
///     .indent()
///     .line("public int X;")
///     .dedent()
///     .line("}")
///     .build();
///
/// assert_eq!(code, "public class QueryType\n{\n    public int X;\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    buffer: String,
}

impl CodeBuilder {
    pub fn csharp() -> Self {
        Self {
            indent_level: 0,
            buffer: String::new(),
        }
    }

    /// Add a line with current indentation (mutable).
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add every line of `text` at the current indentation, keeping blank
    /// lines empty.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            if line.is_empty() {
                self.push_blank();
            } else {
                self.push_line(line);
            }
        }
        self
    }

    /// Add a blank line (mutable).
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Increase indentation level (mutable).
    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    /// Decrease indentation level (mutable).
    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add a line of code with current indentation.
    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    /// Increase indentation level.
    pub fn indent(mut self) -> Self {
        self.push_indent();
        self
    }

    /// Decrease indentation level.
    pub fn dedent(mut self) -> Self {
        self.push_dedent();
        self
    }

    /// Add an Allman-style braced block: header line, `{`, body, `}`.
    pub fn braced<F>(self, header: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let builder = self.line(header).line("{").indent();
        f(builder).dedent().line("}")
    }

    /// Get the current indentation level.
    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    /// Indentation text for `level` levels.
    pub fn indent_text(&self, level: usize) -> String {
        INDENT.repeat(level)
    }

    pub fn build(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::csharp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_line() {
        let code = CodeBuilder::csharp().line("int x = 1;").build();
        assert_eq!(code, "int x = 1;\n");
    }

    #[test]
    fn test_braced() {
        let code = CodeBuilder::csharp()
            .braced("namespace A", |b| b.line("class B { }"))
            .build();
        assert_eq!(code, "namespace A\n{\n    class B { }\n}\n");
    }

    #[test]
    fn test_push_lines_keeps_blank_lines_empty() {
        let mut builder = CodeBuilder::csharp();
        builder.push_indent().push_lines("a();\n\nb();");
        assert_eq!(builder.build(), "    a();\n\n    b();\n");
    }

    #[test]
    fn test_indent_text() {
        let mut builder = CodeBuilder::csharp();
        builder.push_indent().push_indent();
        assert_eq!(builder.current_indent(), 2);
        assert_eq!(builder.indent_text(3), "            ");
    }

    #[test]
    fn test_dedent_saturates() {
        let code = CodeBuilder::csharp().dedent().line("x").build();
        assert_eq!(code, "x\n");
    }
}
