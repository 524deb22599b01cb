//! `StringExtractor`: printable substrings from an arbitrary byte
//! stream, tagged with source byte offset and encoding (§4.3).

use crate::model::{ExtractedString, StringEncoding};
use bstr::ByteSlice;
use regex::Regex;
use std::sync::OnceLock;

const MIN_RUN_LEN: usize = 4;

pub struct StringExtractor;

impl StringExtractor {
    /// Extract printable runs from `data`, merging the ASCII/UTF-8 pass
    /// and the UTF-16LE pass by byte span: on overlap, the longer run
    /// wins; ties prefer UTF-8.
    pub fn extract(data: &[u8]) -> Vec<ExtractedString> {
        let mut candidates = ascii_utf8_runs(data);
        candidates.extend(utf16le_runs(data));

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
                .then_with(|| encoding_rank(a.encoding).cmp(&encoding_rank(b.encoding)))
        });

        let mut accepted = Vec::new();
        let mut cursor = 0usize;
        for candidate in candidates {
            if candidate.start >= cursor {
                cursor = candidate.end;
                accepted.push(ExtractedString {
                    value: candidate.value,
                    byte_offset: candidate.start as u64,
                    encoding: candidate.encoding,
                });
            }
        }
        accepted
    }
}

fn encoding_rank(e: StringEncoding) -> u8 {
    match e {
        StringEncoding::Ascii | StringEncoding::Utf8 => 0,
        StringEncoding::Utf16Le => 1,
    }
}

struct Candidate {
    start: usize,
    end: usize,
    value: String,
    encoding: StringEncoding,
}

/// Printable per the general categories L, N, P, S, Z, plus ASCII tab.
/// Excludes marks (Mn/Mc/Me), format characters (Cf, e.g. soft hyphen,
/// zero-width joiner), and unassigned/control/surrogate/private-use code
/// points, none of which belong in an extracted "string" a human would
/// read. Backed by `regex`'s Unicode property classes rather than a
/// hand-rolled category table.
fn is_printable(c: char) -> bool {
    if c == '\t' {
        return true;
    }
    let mut buf = [0u8; 4];
    printable_class().is_match(c.encode_utf8(&mut buf))
}

fn printable_class() -> &'static Regex {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    CLASS.get_or_init(|| Regex::new(r"^[\p{L}\p{N}\p{P}\p{S}\p{Z}]$").unwrap())
}

/// Pass 1: accumulate a run while bytes decode (as UTF-8, ASCII being a
/// subset) to printable code points; terminate on control bytes other
/// than tab, or on decode failure.
fn ascii_utf8_runs(data: &[u8]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut run_text = String::new();
    let mut run_is_ascii = true;
    let mut last_end = 0usize;

    let flush = |candidates: &mut Vec<Candidate>,
                 run_start: &mut Option<usize>,
                 run_text: &mut String,
                 run_is_ascii: &mut bool,
                 end: usize| {
        if let Some(start) = run_start.take() {
            if run_text.chars().count() >= MIN_RUN_LEN {
                candidates.push(Candidate {
                    start,
                    end,
                    value: std::mem::take(run_text),
                    encoding: if *run_is_ascii {
                        StringEncoding::Ascii
                    } else {
                        StringEncoding::Utf8
                    },
                });
            } else {
                run_text.clear();
            }
        }
        *run_is_ascii = true;
    };

    for (start, end, ch) in data.char_indices() {
        let is_decode_failure = ch == '\u{FFFD}' && end - start == 1 && data[start] >= 0x80;
        if is_decode_failure || !is_printable(ch) {
            flush(&mut candidates, &mut run_start, &mut run_text, &mut run_is_ascii, last_end);
        } else {
            if run_start.is_none() {
                run_start = Some(start);
            }
            if !ch.is_ascii() {
                run_is_ascii = false;
            }
            run_text.push(ch);
        }
        last_end = end;
    }
    flush(&mut candidates, &mut run_start, &mut run_text, &mut run_is_ascii, last_end);

    candidates
}

/// Pass 2: on even byte offsets, look for an alternating
/// `printable, 0x00, printable, 0x00, ...` pattern of length >= 4 code
/// units, decoding each accepted run as UTF-16LE.
fn utf16le_runs(data: &[u8]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut i = 0usize;

    while i + 1 < data.len() {
        if i % 2 != 0 {
            i += 1;
            continue;
        }

        let mut units: Vec<u16> = Vec::new();
        let mut j = i;
        while j + 1 < data.len() {
            let lo = data[j];
            let hi = data[j + 1];
            if hi != 0 {
                break;
            }
            let ch = lo as char;
            if !is_printable(ch) {
                break;
            }
            units.push(lo as u16);
            j += 2;
        }

        if units.len() >= MIN_RUN_LEN {
            if let Ok(value) = String::from_utf16(&units) {
                candidates.push(Candidate {
                    start: i,
                    end: j,
                    value,
                    encoding: StringEncoding::Utf16Le,
                });
            }
            i = j;
        } else {
            i += 2;
        }
    }

    candidates
}
