//! Wildcard alternative compilation and matching.
//!
//! Grammar (§4.1): a wildcard pattern is split into `;`-separated
//! alternatives. Within an alternative, `\*` -> literal `*`, `\;` ->
//! literal `;`, `\\` -> literal `\`; any other `\X` is an error. An
//! unescaped `*` means "any run of zero or more characters". Empty
//! alternatives are errors.

/// One segment of a compiled wildcard alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardSegment {
    Literal(String),
    Star,
}

/// A single `;`-separated branch, compiled into an ordered list of
/// literal-or-star segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardAlternative {
    pub segments: Vec<WildcardSegment>,
}

/// Split a wildcard pattern body on unescaped `;`, preserving escape
/// sequences in each returned chunk for `compile_alternative` to
/// process. Rejects empty alternatives.
pub(super) fn split_alternatives(body: &str) -> Result<Vec<String>, String> {
    let mut alternatives = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' => {
                alternatives.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    alternatives.push(current);

    if alternatives.iter().any(|a| a.is_empty()) {
        return Err("empty alternative".to_string());
    }

    Ok(alternatives)
}

/// Compile one alternative's escape grammar into literal/star segments.
pub(super) fn compile_alternative(raw: &str) -> Result<WildcardAlternative, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('*') => literal.push('*'),
                Some(';') => literal.push(';'),
                Some('\\') => literal.push('\\'),
                Some(other) => return Err(format!("unknown escape '\\{other}'")),
                None => return Err("trailing backslash".to_string()),
            },
            '*' => {
                if !literal.is_empty() {
                    segments.push(WildcardSegment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(WildcardSegment::Star);
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() || segments.is_empty() {
        segments.push(WildcardSegment::Literal(literal));
    }

    Ok(WildcardAlternative { segments })
}

/// Whole-string anchored match of `text` against a compiled alternative,
/// per §4.2: a single star-aware scan, Unicode simple case-folding when
/// `case_sensitive` is false.
pub fn matches_alternative(alt: &WildcardAlternative, text: &str, case_sensitive: bool) -> bool {
    let text: Vec<char> = fold(text, case_sensitive).chars().collect();
    let segs: Vec<FoldedSegment> = alt
        .segments
        .iter()
        .map(|s| match s {
            WildcardSegment::Star => FoldedSegment::Star,
            WildcardSegment::Literal(l) => {
                FoldedSegment::Literal(fold(l, case_sensitive).chars().collect())
            }
        })
        .collect();

    match_segments(&segs, &text)
}

enum FoldedSegment {
    Literal(Vec<char>),
    Star,
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        // Unicode simple case-folding approximation: lowercase both sides.
        s.to_lowercase()
    }
}

/// Classic two-pointer wildcard matcher generalized to segments instead
/// of raw `*`/literal characters, backtracking on star boundaries.
fn match_segments(segs: &[FoldedSegment], text: &[char]) -> bool {
    let mut si = 0usize; // segment index
    let mut ti = 0usize; // text index
    let mut star_seg: Option<usize> = None;
    let mut star_ti = 0usize;

    loop {
        if si < segs.len() {
            match &segs[si] {
                FoldedSegment::Literal(lit) => {
                    if ti + lit.len() <= text.len() && &text[ti..ti + lit.len()] == lit.as_slice() {
                        ti += lit.len();
                        si += 1;
                        continue;
                    }
                }
                FoldedSegment::Star => {
                    star_seg = Some(si);
                    star_ti = ti;
                    si += 1;
                    continue;
                }
            }
        } else if ti == text.len() {
            return true;
        }

        if let Some(star) = star_seg {
            star_ti += 1;
            if star_ti > text.len() {
                return false;
            }
            ti = star_ti;
            si = star + 1;
        } else {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(s: &str) -> WildcardAlternative {
        compile_alternative(s).unwrap()
    }

    #[test]
    fn star_matches_anything() {
        let alt = compile("*.txt");
        assert!(matches_alternative(&alt, "report.txt", true));
        assert!(!matches_alternative(&alt, "report.md", true));
    }

    #[test]
    fn multiple_stars() {
        let alt = compile("*foo*bar*");
        assert!(matches_alternative(&alt, "xxfooyybarzz", true));
        assert!(!matches_alternative(&alt, "xxfooyybazzz", true));
    }

    #[test]
    fn case_insensitive_fold() {
        let alt = compile("*.TXT");
        assert!(matches_alternative(&alt, "report.txt", false));
        assert!(!matches_alternative(&alt, "report.txt", true));
    }

    #[test]
    fn escapes_are_literal() {
        let alt = compile(r"a\*b\;c\\d");
        assert!(matches_alternative(&alt, "a*b;c\\d", true));
    }

    #[test]
    fn empty_alternative_is_error() {
        assert!(split_alternatives("*.txt;;*.md").is_err());
    }

    #[test]
    fn unknown_escape_is_error() {
        assert!(compile_alternative(r"foo\qbar").is_err());
    }
}
