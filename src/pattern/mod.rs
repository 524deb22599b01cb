//! Pattern grammar and parser (§4.1).
//!
//! A user pattern string is classified before compilation:
//! - `r:...`  -> regex, remainder is the pattern.
//! - `\r:...` -> the leading backslash is consumed; the remainder
//!   (`r:...`) is a literal wildcard pattern.
//! - anything else -> wildcard pattern, split into `;`-separated
//!   alternatives.

mod wildcard;

pub use wildcard::{matches_alternative as wildcard_matches, WildcardAlternative, WildcardSegment};

use crate::error::HaybaleError;
use regex::Regex;

/// A parsed pattern, closed over the three grammar variants. No
/// open-ended extension point: the grammar is fixed by §4.1.
#[derive(Debug, Clone)]
pub enum PatternExpr {
    Wildcard(Vec<WildcardAlternative>),
    Regex(Regex),
    Alternation(Vec<PatternExpr>),
}

/// Parse a raw pattern string per the grammar above.
///
/// `case_sensitive` only affects wildcard alternatives; regex case
/// sensitivity is controlled entirely by the user via inline flags
/// (e.g. `(?i)`) and this function never touches the pattern text.
pub fn parse(raw: &str) -> Result<PatternExpr, HaybaleError> {
    if let Some(rest) = raw.strip_prefix("r:") {
        let re = Regex::new(rest).map_err(|e| HaybaleError::InvalidPattern {
            pattern: raw.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(PatternExpr::Regex(re));
    }

    if let Some(rest) = raw.strip_prefix("\\r:") {
        let literal = format!("r:{rest}");
        return parse_wildcard(&literal, raw);
    }

    parse_wildcard(raw, raw)
}

fn parse_wildcard(body: &str, original: &str) -> Result<PatternExpr, HaybaleError> {
    let alternatives = wildcard::split_alternatives(body)
        .map_err(|reason| HaybaleError::InvalidPattern {
            pattern: original.to_string(),
            reason,
        })?
        .into_iter()
        .map(|alt| wildcard::compile_alternative(&alt))
        .collect::<Result<Vec<_>, String>>()
        .map_err(|reason| HaybaleError::InvalidPattern {
            pattern: original.to_string(),
            reason,
        })?;

    Ok(PatternExpr::Wildcard(alternatives))
}
