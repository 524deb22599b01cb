//! `NameMatcher`: matches a file's basename against a `PatternExpr`.
//! Always case-insensitive, regardless of the content case toggle
//! (§4.4); regex branches honor their own inline flags.

use crate::finder::expr_matches;
use crate::pattern::PatternExpr;
use std::path::Path;

pub struct NameMatcher<'a> {
    pattern: &'a PatternExpr,
}

impl<'a> NameMatcher<'a> {
    pub fn new(pattern: &'a PatternExpr) -> Self {
        Self { pattern }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        expr_matches(self.pattern, name, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;
    use std::path::PathBuf;

    #[test]
    fn matches_basename_case_insensitively() {
        let expr = parse("*.HTML;*.htm").unwrap();
        let matcher = NameMatcher::new(&expr);
        assert!(matcher.matches(&PathBuf::from("/a/b/index.html")));
        assert!(matcher.matches(&PathBuf::from("/a/b/INDEX.HTM")));
        assert!(!matcher.matches(&PathBuf::from("/a/b/index.txt")));
    }

    #[test]
    fn regex_branch_honors_its_own_flags() {
        let expr = parse("r:^[A-Z]+\\.txt$").unwrap();
        let matcher = NameMatcher::new(&expr);
        assert!(matcher.matches(&PathBuf::from("/a/README.txt")));
        assert!(!matcher.matches(&PathBuf::from("/a/readme.txt")));
    }
}
