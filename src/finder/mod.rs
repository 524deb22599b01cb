//! Finders: context-free predicates over a text buffer (§4.2).

mod regex_finder;
mod wildcard_finder;

pub use regex_finder::RegexFinder;
pub use wildcard_finder::WildcardFinder;

use crate::model::MatchRange;
use crate::pattern::PatternExpr;

/// A context-free text predicate returning match ranges.
pub trait Finder {
    fn find_matches(&self, text: &str) -> Vec<MatchRange>;
}

/// Build the right `Finder` for one `PatternExpr` branch. `Alternation`
/// has no single finder (callers must iterate branches); this helper
/// only covers the two leaf kinds.
pub fn leaf_finder(expr: &PatternExpr, case_sensitive: bool) -> Option<LeafFinder<'_>> {
    match expr {
        PatternExpr::Wildcard(alts) => Some(LeafFinder::Wildcard(WildcardFinder::new(
            alts,
            case_sensitive,
        ))),
        PatternExpr::Regex(re) => Some(LeafFinder::Regex(RegexFinder::new(re))),
        PatternExpr::Alternation(_) => None,
    }
}

pub enum LeafFinder<'a> {
    Wildcard(WildcardFinder<'a>),
    Regex(RegexFinder<'a>),
}

impl Finder for LeafFinder<'_> {
    fn find_matches(&self, text: &str) -> Vec<MatchRange> {
        match self {
            LeafFinder::Wildcard(f) => f.find_matches(text),
            LeafFinder::Regex(f) => f.find_matches(text),
        }
    }
}

/// Does `expr` match `text` at all, recursing through `Alternation` as a
/// union over branches? Used by matchers that only need yes/no (name
/// matching) or that handle ranges per-branch themselves.
pub fn expr_matches(expr: &PatternExpr, text: &str, case_sensitive: bool) -> bool {
    match expr {
        PatternExpr::Alternation(parts) => parts
            .iter()
            .any(|p| expr_matches(p, text, case_sensitive)),
        _ => leaf_finder(expr, case_sensitive)
            .map(|f| !f.find_matches(text).is_empty())
            .unwrap_or(false),
    }
}
