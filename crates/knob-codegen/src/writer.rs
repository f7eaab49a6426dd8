//! Line-oriented header text builder bound to a dialect.

use crate::dialect::Dialect;

/// Accumulates header text, applying the dialect's indentation and line
/// ending to every line.
pub struct HeaderWriter<'d> {
    dialect: &'d dyn Dialect,
    out: String,
}

impl<'d> HeaderWriter<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            out: String::new(),
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Append one line at the given nesting depth.
    pub fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.push_str(&self.dialect.indent(depth));
            self.out.push_str(text);
        }
        self.out.push_str(self.dialect.line_ending());
    }

    pub fn blank(&mut self) {
        self.out.push_str(self.dialect.line_ending());
    }

    /// Append pre-terminated text verbatim (guards).
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// One `//` comment line per line of `text`.
    pub fn comment(&mut self, depth: usize, text: &str) {
        for line in text.lines() {
            self.line(depth, format!("// {}", line.trim_end()));
        }
    }

    /// Standard provenance block.
    pub fn provenance(&mut self, script: &str, schema_source: &str) {
        self.line(0, "// Generated Header");
        self.line(0, format!("//  Script: {script}"));
        self.line(0, format!("//  Schema: {schema_source}"));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Firmware, Generic};

    #[test]
    fn applies_indent_and_line_ending() {
        let mut w = HeaderWriter::new(&Firmware);
        w.line(0, "{");
        w.line(1, "x;");
        w.blank();
        w.line(0, "}");
        assert_eq!(w.finish(), "{\r\n  x;\r\n\r\n}\r\n");
    }

    #[test]
    fn multi_line_comments() {
        let mut w = HeaderWriter::new(&Generic);
        w.comment(1, "first\nsecond  ");
        assert_eq!(w.finish(), "    // first\n    // second\n");
    }
}
