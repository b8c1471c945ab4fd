//! Iterator that drives [`crate::parse_tl_file`].

use std::str::FromStr;

use crate::errors::ParseError;
use crate::tl::{Category, Definition};

pub(crate) struct TlIterator<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    category: Category,
    /// Text of a definition spread over several lines, up to its `;`.
    pending: String,
}

impl<'a> TlIterator<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            lines: src.lines().enumerate(),
            category: Category::Types,
            pending: String::new(),
        }
    }

    fn switch_section(&mut self, line: &str) -> bool {
        match line {
            "---functions---" => self.category = Category::Functions,
            "---types---" => self.category = Category::Types,
            _ => return false,
        }
        true
    }
}

impl Iterator for TlIterator<'_> {
    type Item = Result<Definition, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            let line = line.trim();

            if line.is_empty() || line.starts_with("//") || self.switch_section(line) {
                continue;
            }

            if !self.pending.is_empty() {
                self.pending.push(' ');
            }
            self.pending.push_str(line);

            if !line.ends_with(';') {
                continue;
            }

            let raw = std::mem::take(&mut self.pending);
            let raw = raw.trim_end_matches(';').trim();
            if raw.is_empty() {
                continue;
            }

            let category = self.category;
            return Some(
                Definition::from_str(raw)
                    .map(|mut def| {
                        def.category = category;
                        def
                    })
                    .map_err(|source| ParseError { line: idx + 1, source }),
            );
        }
    }
}
