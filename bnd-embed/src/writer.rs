//! Indented text buffer shared by the emitters.

/// Spacing to apply after a block of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewLine {
    /// Separate this block from whatever is written next with a blank line.
    BeforeNextBlock,
    /// Let the next block follow immediately.
    Never,
}

/// Buffered source text. Nothing is written to disk until the whole
/// translation unit has been emitted.
#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
    pending_blank: bool,
}

const INDENT: &str = "    ";

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Append text to the current line.
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.at_line_start {
            if self.pending_blank {
                self.out.push('\n');
                self.pending_blank = false;
            }
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.out.push_str(s);
    }

    pub fn line(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    /// Write a line one level deeper than the current indentation.
    pub fn line_indented(&mut self, s: &str) {
        self.indent();
        self.line(s);
        self.dedent();
    }

    pub fn lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        for l in lines {
            self.line(l.as_ref());
        }
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Finish the current line with `{` and indent.
    pub fn open_brace(&mut self) {
        self.line("{");
        self.indent();
    }

    pub fn close_brace(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Close a block with `};` (C aggregates).
    pub fn close_brace_semi(&mut self, trailer: &str) {
        self.dedent();
        self.line(&format!("}}{trailer};"));
    }

    pub fn end_block(&mut self, kind: NewLine) {
        self.pending_blank = kind == NewLine::BeforeNextBlock;
    }

    /// Fixed banner at the top of every generated file.
    pub fn file_preamble(&mut self) {
        self.line("/*");
        self.line(" * This is autogenerated code.");
        self.line(" * Do not edit this file or all your changes will be lost after re-generation.");
        self.line(" */");
        self.end_block(NewLine::BeforeNextBlock);
    }

    pub fn into_string(self) -> String {
        self.out
    }
}
