//! `TextContentSearcher`: decoding, line indexing, multi-line regex and
//! large-file degradation, and context attachment (§4.4).

use super::LARGE_FILE_THRESHOLD_BYTES;
use crate::error::WarningReason;
use crate::model::{ContentMatch, ContextLine, MatchRange};
use crate::pattern::{wildcard_matches, PatternExpr, WildcardAlternative, WildcardSegment};
use std::path::Path;

/// Result of one file's content search: the matches found, and whether
/// the large-file regex degradation kicked in (the coordinator turns
/// that into a `Warning` event).
pub struct TextSearchOutcome {
    pub matches: Vec<ContentMatch>,
    pub warning: Option<WarningReason>,
}

pub struct TextContentSearcher<'a> {
    pattern: &'a PatternExpr,
    case_sensitive: bool,
}

impl<'a> TextContentSearcher<'a> {
    pub fn new(pattern: &'a PatternExpr, case_sensitive: bool) -> Self {
        Self {
            pattern,
            case_sensitive,
        }
    }

    pub fn search(&self, path: &Path) -> std::io::Result<TextSearchOutcome> {
        let size = std::fs::metadata(path)?.len();
        let bytes = std::fs::read(path)?;
        let (text, fell_back) = decode(&bytes);
        if fell_back {
            log::debug!(
                "{} is not valid UTF-8, falling back to Latin-1 decoding",
                path.display()
            );
        }
        let lines = LineIndex::build(&text);

        match self.pattern {
            PatternExpr::Regex(re) => {
                if size <= LARGE_FILE_THRESHOLD_BYTES {
                    Ok(TextSearchOutcome {
                        matches: whole_text_regex_matches(re, &text, &lines),
                        warning: None,
                    })
                } else {
                    log::debug!(
                        "{} ({size} bytes) exceeds the large-file threshold, degrading regex scan to line mode",
                        path.display()
                    );
                    Ok(TextSearchOutcome {
                        matches: line_mode_regex_matches(re, &text, &lines),
                        warning: Some(WarningReason::LargeFileRegexDegraded),
                    })
                }
            }
            PatternExpr::Wildcard(alts) => Ok(TextSearchOutcome {
                matches: wildcard_line_matches(alts, &text, &lines, self.case_sensitive),
                warning: None,
            }),
            PatternExpr::Alternation(parts) => {
                let mut matches = Vec::new();
                let mut warning = None;
                for part in parts {
                    let sub = TextContentSearcher::new(part, self.case_sensitive);
                    let mut outcome = sub.search_decoded(path, &text, &lines, size)?;
                    matches.append(&mut outcome.matches);
                    warning = warning.or(outcome.warning);
                }
                matches.sort_by_key(|m| m.line_number);
                Ok(TextSearchOutcome { matches, warning })
            }
        }
    }

    fn search_decoded(
        &self,
        path: &Path,
        text: &str,
        lines: &LineIndex,
        size: u64,
    ) -> std::io::Result<TextSearchOutcome> {
        match self.pattern {
            PatternExpr::Regex(re) => {
                if size <= LARGE_FILE_THRESHOLD_BYTES {
                    Ok(TextSearchOutcome {
                        matches: whole_text_regex_matches(re, text, lines),
                        warning: None,
                    })
                } else {
                    log::debug!(
                        "{} ({size} bytes) exceeds the large-file threshold, degrading regex scan to line mode",
                        path.display()
                    );
                    Ok(TextSearchOutcome {
                        matches: line_mode_regex_matches(re, text, lines),
                        warning: Some(WarningReason::LargeFileRegexDegraded),
                    })
                }
            }
            PatternExpr::Wildcard(alts) => Ok(TextSearchOutcome {
                matches: wildcard_line_matches(alts, text, lines, self.case_sensitive),
                warning: None,
            }),
            PatternExpr::Alternation(_) => {
                // Nested alternations are flattened one level; deeper
                // nesting is not produced by the parser.
                Ok(TextSearchOutcome {
                    matches: Vec::new(),
                    warning: None,
                })
            }
        }
    }
}

/// UTF-8 decode with a total Latin-1 fallback (§4.4 rule 1). Returns
/// whether the fallback was taken.
fn decode(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), true),
    }
}

struct LineIndex {
    /// `(start, end)` byte offsets of each logical line, excluding its
    /// terminator.
    spans: Vec<(usize, usize)>,
}

impl LineIndex {
    fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut spans = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    spans.push((start, i));
                    i += 1;
                    start = i;
                }
                b'\r' => {
                    let term_end = if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        i + 2
                    } else {
                        i + 1
                    };
                    spans.push((start, i));
                    i = term_end;
                    start = i;
                }
                _ => i += 1,
            }
        }
        if start < bytes.len() {
            spans.push((start, bytes.len()));
        }
        LineIndex { spans }
    }

    fn line_count(&self) -> usize {
        self.spans.len()
    }

    /// 0-based line index containing byte offset `pos`.
    fn line_at(&self, pos: usize) -> usize {
        match self.spans.binary_search_by(|&(s, e)| {
            if pos < s {
                std::cmp::Ordering::Greater
            } else if pos > e {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(idx) => idx,
            Err(idx) => idx.min(self.spans.len().saturating_sub(1)),
        }
    }

    fn text_of<'t>(&self, text: &'t str, idx: usize) -> &'t str {
        let (s, e) = self.spans[idx];
        &text[s..e]
    }

    fn context_before(&self, text: &str, idx: usize) -> Vec<ContextLine> {
        let mut out = Vec::new();
        for i in idx.saturating_sub(2)..idx {
            out.push(((i + 1) as u32, self.text_of(text, i).to_string()));
        }
        out
    }

    fn context_after(&self, text: &str, idx: usize) -> Vec<ContextLine> {
        let mut out = Vec::new();
        let last = self.line_count().saturating_sub(1);
        for i in (idx + 1)..=((idx + 2).min(last)) {
            if i > last || i == idx {
                continue;
            }
            out.push(((i + 1) as u32, self.text_of(text, i).to_string()));
        }
        out
    }
}

fn whole_text_regex_matches(re: &regex::Regex, text: &str, lines: &LineIndex) -> Vec<ContentMatch> {
    let mut out = Vec::new();
    for m in re.find_iter(text) {
        if lines.line_count() == 0 {
            continue;
        }
        let start_line = lines.line_at(m.start());
        let end_line = lines.line_at(m.end().saturating_sub(1).max(m.start()));
        let (span_start, _) = lines.spans[start_line];
        let (_, span_end) = lines.spans[end_line];
        let line_text = text[span_start..span_end].to_string();
        let ranges = vec![MatchRange::new(m.start() - span_start, m.end() - span_start)];

        out.push(ContentMatch {
            line_number: (start_line + 1) as u32,
            line_text,
            ranges,
            context_before: lines.context_before(text, start_line),
            context_after: lines.context_after(text, end_line),
        });
    }
    out
}

fn line_mode_regex_matches(re: &regex::Regex, text: &str, lines: &LineIndex) -> Vec<ContentMatch> {
    let mut out = Vec::new();
    for idx in 0..lines.line_count() {
        let line_text = lines.text_of(text, idx);
        let ranges: Vec<MatchRange> = re
            .find_iter(line_text)
            .map(|m| MatchRange::new(m.start(), m.end()))
            .collect();
        if !ranges.is_empty() {
            out.push(ContentMatch {
                line_number: (idx + 1) as u32,
                line_text: line_text.to_string(),
                ranges,
                context_before: lines.context_before(text, idx),
                context_after: lines.context_after(text, idx),
            });
        }
    }
    out
}

/// Per-line wildcard matching (§4.4 rule 3). An alternative containing
/// at least one `*` is anchored to the whole line, per the wildcard
/// contract. A pure-literal alternative (no `*` at all) is instead
/// matched as a substring search: anchoring a bare word to whole-line
/// equality would make ordinary "search for this word" queries useless,
/// so bare literals behave the way a user typing a plain word expects.
fn wildcard_line_matches(
    alts: &[WildcardAlternative],
    text: &str,
    lines: &LineIndex,
    case_sensitive: bool,
) -> Vec<ContentMatch> {
    let mut out = Vec::new();
    for idx in 0..lines.line_count() {
        let line_text = lines.text_of(text, idx);
        let mut ranges = Vec::new();

        for alt in alts {
            if alt.segments.iter().any(|s| matches!(s, WildcardSegment::Star)) {
                if wildcard_matches(alt, line_text, case_sensitive) {
                    ranges.push(MatchRange::new(0, line_text.len()));
                }
            } else if let WildcardSegment::Literal(lit) = single_literal(alt) {
                ranges.extend(find_literal(line_text, lit, case_sensitive));
            }
        }

        if ranges.is_empty() {
            continue;
        }
        ranges.sort();
        ranges.dedup();
        out.push(ContentMatch {
            line_number: (idx + 1) as u32,
            line_text: line_text.to_string(),
            ranges,
            context_before: lines.context_before(text, idx),
            context_after: lines.context_after(text, idx),
        });
    }
    out
}

fn single_literal(alt: &WildcardAlternative) -> &WildcardSegment {
    &alt.segments[0]
}

fn find_literal(line: &str, literal: &str, case_sensitive: bool) -> Vec<MatchRange> {
    if literal.is_empty() {
        return Vec::new();
    }
    if case_sensitive {
        line.match_indices(literal)
            .map(|(i, m)| MatchRange::new(i, i + m.len()))
            .collect()
    } else {
        let folded_line = line.to_lowercase();
        let folded_lit = literal.to_lowercase();
        folded_line
            .match_indices(&folded_lit)
            .map(|(i, m)| MatchRange::new(i, i + m.len()))
            .collect()
    }
}
