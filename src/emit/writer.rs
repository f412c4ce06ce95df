//! Indentation-aware output buffer.

/// Accumulates generated source text line by line.
#[derive(Debug, Default)]
pub struct CodeWriter {
    indent: usize,
    output: String,
}

impl CodeWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self {
            indent: 0,
            output: String::with_capacity(4096),
        }
    }

    /// Increases the indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decreases the indentation level.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes a line at the current indentation. Empty lines carry no
    /// trailing whitespace.
    pub fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("    ");
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }

    /// Writes every line of `lines`.
    pub fn write_lines<S: AsRef<str>>(&mut self, lines: impl IntoIterator<Item = S>) {
        for line in lines {
            self.writeln(line.as_ref());
        }
    }

    /// Writes an empty line.
    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    /// Takes the generated output.
    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_dedent() {
        let mut writer = CodeWriter::new();
        writer.writeln("a");
        writer.indent();
        writer.writeln("b");
        writer.writeln("");
        writer.dedent();
        writer.writeln("c");
        assert_eq!(writer.finish(), "a\n    b\n\nc\n");
    }
}
