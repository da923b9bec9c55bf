//! Whitespace-delimited token reader for the interactive loop

use std::io::{self, BufRead};

/// Reads one whitespace-separated token at a time, line by line
pub struct Tokens<R> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    /// Next token, or `None` at end of input.
    ///
    /// Blocks on the underlying reader only when the current line is used up.
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            let rest = &self.line[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let start = self.pos + (rest.len() - trimmed.len());
                let len = trimmed
                    .find(char::is_whitespace)
                    .unwrap_or(trimmed.len());
                self.pos = start + len;
                return Ok(Some(self.line[start..self.pos].to_string()));
            }

            self.line.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }
}
