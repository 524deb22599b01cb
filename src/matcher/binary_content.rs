//! `BinaryContentSearcher`: drives a `StringExtractor` over a binary
//! file's bytes and applies a `Finder` to each extracted string (§4.4,
//! §4.3).

use crate::binary::StringExtractor;
use crate::finder::{expr_matches, leaf_finder, Finder};
use crate::model::ContentMatch;
use crate::pattern::PatternExpr;
use std::path::Path;

pub struct BinaryContentSearcher<'a> {
    pattern: &'a PatternExpr,
    case_sensitive: bool,
}

impl<'a> BinaryContentSearcher<'a> {
    pub fn new(pattern: &'a PatternExpr, case_sensitive: bool) -> Self {
        Self {
            pattern,
            case_sensitive,
        }
    }

    /// Each extracted string that contains a match becomes one
    /// `ContentMatch`: `line_number` is the string's 1-based ordinal
    /// among extracted strings (there are no real lines in binary
    /// data), `line_text` is the extracted string's value, and there is
    /// never any context.
    pub fn search(&self, path: &Path) -> std::io::Result<Vec<ContentMatch>> {
        let bytes = std::fs::read(path)?;
        let strings = StringExtractor::extract(&bytes);

        let mut out = Vec::new();
        for (idx, extracted) in strings.iter().enumerate() {
            let ranges = self.find_in(&extracted.value);
            if ranges.is_empty() {
                continue;
            }
            out.push(ContentMatch {
                line_number: (idx + 1) as u32,
                line_text: extracted.value.clone(),
                ranges,
                context_before: Vec::new(),
                context_after: Vec::new(),
            });
        }
        Ok(out)
    }

    fn find_in(&self, text: &str) -> Vec<crate::model::MatchRange> {
        match leaf_finder(self.pattern, self.case_sensitive) {
            Some(finder) => finder.find_matches(text),
            None => {
                if expr_matches(self.pattern, text, self.case_sensitive) {
                    vec![crate::model::MatchRange::new(0, text.len())]
                } else {
                    Vec::new()
                }
            }
        }
    }
}
