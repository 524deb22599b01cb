//! `WildcardFinder`: anchored whole-string match against a set of
//! compiled wildcard alternatives (§4.2).

use super::Finder;
use crate::model::MatchRange;
use crate::pattern::WildcardAlternative;

/// Matches the *entire* text against an ordered set of alternatives.
/// Returns at most one range (the whole string) on success, per §4.2 -
/// name matching only needs a yes/no signal, so reported ranges collapse
/// to "the whole thing matched", not per-star spans.
pub struct WildcardFinder<'a> {
    alternatives: &'a [WildcardAlternative],
    case_sensitive: bool,
}

impl<'a> WildcardFinder<'a> {
    pub fn new(alternatives: &'a [WildcardAlternative], case_sensitive: bool) -> Self {
        Self {
            alternatives,
            case_sensitive,
        }
    }
}

impl Finder for WildcardFinder<'_> {
    fn find_matches(&self, text: &str) -> Vec<MatchRange> {
        let matched = self
            .alternatives
            .iter()
            .any(|alt| crate::pattern::wildcard_matches(alt, text, self.case_sensitive));

        if matched {
            vec![MatchRange::new(0, text.len())]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{parse, PatternExpr};

    fn alts(raw: &str) -> Vec<WildcardAlternative> {
        match parse(raw).unwrap() {
            PatternExpr::Wildcard(a) => a,
            _ => panic!("expected wildcard"),
        }
    }

    #[test]
    fn matches_whole_string_only() {
        let a = alts("*.html;*.htm");
        let f = WildcardFinder::new(&a, true);
        assert_eq!(f.find_matches("index.htm").len(), 1);
        assert_eq!(f.find_matches("index.html").len(), 1);
        assert!(f.find_matches("index.html.bak").is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        let a = alts("*.txt");
        let f = WildcardFinder::new(&a, true);
        assert!(f.find_matches("readme.md").is_empty());
    }
}
