//! `RegexFinder`: every non-overlapping match from a left-to-right scan
//! (§4.2). No case flag - the compiled pattern is authoritative, since
//! case sensitivity is controlled entirely via inline flags like `(?i)`.

use super::Finder;
use crate::model::MatchRange;
use regex::Regex;

pub struct RegexFinder<'a> {
    regex: &'a Regex,
}

impl<'a> RegexFinder<'a> {
    pub fn new(regex: &'a Regex) -> Self {
        Self { regex }
    }
}

impl Finder for RegexFinder<'_> {
    fn find_matches(&self, text: &str) -> Vec<MatchRange> {
        self.regex
            .find_iter(text)
            .map(|m| MatchRange::new(m.start(), m.end()))
            .collect()
    }
}
