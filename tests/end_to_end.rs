//! End-to-end scenarios mirroring the crate's documented behavior:
//! name alternation ordering, content matches with context, large-file
//! regex degradation, binary string matching, symlink cycles, and
//! combined size/date filtering.

use haybale::{SearchEvent, SearchOptions, SearchQuery, WarningReason};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn write_file(path: &std::path::Path, contents: &[u8]) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(contents).unwrap();
}

fn run(query: SearchQuery) -> Vec<SearchEvent> {
    haybale::search(query).collect()
}

#[test]
fn name_alternation_returns_lexicographic_order_with_empty_matches() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.html"), b"<html></html>");
    write_file(&dir.path().join("a.htm"), b"<html></html>");
    write_file(&dir.path().join("b.txt"), b"plain text");

    let query = SearchQuery::build(
        dir.path(),
        Some("*.html;*.htm"),
        None,
        SearchOptions::default(),
    )
    .unwrap();

    let results: Vec<PathBuf> = run(query)
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => {
                assert!(r.content_matches.is_empty());
                Some(r.path)
            }
            SearchEvent::Warning(..) => None,
        })
        .collect();

    assert_eq!(
        results,
        vec![dir.path().join("a.htm"), dir.path().join("a.html")]
    );
}

#[test]
fn content_match_carries_surrounding_context() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("notes.txt"), b"one\nhello world\nthree\n");

    let query = SearchQuery::build(dir.path(), None, Some("hello"), SearchOptions::default())
        .unwrap();

    let results: Vec<_> = run(query)
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r),
            SearchEvent::Warning(..) => None,
        })
        .collect();

    assert_eq!(results.len(), 1);
    let matches = &results[0].content_matches;
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.line_number, 2);
    assert_eq!(m.line_text, "hello world");
    assert_eq!(m.ranges, vec![haybale::MatchRange::new(0, 5)]);
    assert_eq!(m.context_before, vec![(1, "one".to_string())]);
    assert_eq!(m.context_after, vec![(3, "three".to_string())]);
}

#[test]
fn large_file_regex_degrades_to_line_mode_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.log");

    // 60 MiB of filler lines with one "foo...bar" needle near the end,
    // all on one line so it would only match under whole-text scanning.
    let mut f = fs::File::create(&path).unwrap();
    let filler_line = "x".repeat(1000) + "\n";
    let target_bytes = 60 * 1024 * 1024;
    let mut written = 0usize;
    while written < target_bytes {
        f.write_all(filler_line.as_bytes()).unwrap();
        written += filler_line.len();
    }
    f.write_all(b"foo stuff bar\n").unwrap();
    drop(f);

    let query = SearchQuery::build(
        dir.path(),
        None,
        Some("r:(?s)foo.*bar"),
        SearchOptions::default(),
    )
    .unwrap();

    let events = run(query);
    let degraded = events
        .iter()
        .any(|e| matches!(e, SearchEvent::Warning(_, WarningReason::LargeFileRegexDegraded)));
    assert!(degraded, "expected a large-file regex degradation warning");

    let results: Vec<_> = events
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r),
            SearchEvent::Warning(..) => None,
        })
        .collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content_matches.len(), 1);
    assert_eq!(results[0].content_matches[0].line_text, "foo stuff bar");
}

#[test]
fn large_file_line_mode_misses_a_match_that_only_spans_two_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big_cross_line.log");

    // Same needle, but split across two lines: a whole-text scan with
    // `(?s)` would still find it, but line-mode scanning - each line
    // searched independently - genuinely cannot, since no single line
    // contains both "foo" and "bar".
    let mut f = fs::File::create(&path).unwrap();
    let filler_line = "x".repeat(1000) + "\n";
    let target_bytes = 60 * 1024 * 1024;
    let mut written = 0usize;
    while written < target_bytes {
        f.write_all(filler_line.as_bytes()).unwrap();
        written += filler_line.len();
    }
    f.write_all(b"foo stuff\nmore bar\n").unwrap();
    drop(f);

    let query = SearchQuery::build(
        dir.path(),
        None,
        Some("r:(?s)foo.*bar"),
        SearchOptions::default(),
    )
    .unwrap();

    let events = run(query);
    let degraded = events
        .iter()
        .any(|e| matches!(e, SearchEvent::Warning(_, WarningReason::LargeFileRegexDegraded)));
    assert!(degraded, "expected a large-file regex degradation warning");

    let results: Vec<_> = events
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r),
            SearchEvent::Warning(..) => None,
        })
        .collect();
    assert!(
        results.is_empty(),
        "line-mode scanning should not find a match spanning two lines"
    );
}

#[test]
fn binary_content_search_matches_extracted_strings() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("bin.dat"),
        b"\x00HELLO\x00\x00WORLD\x00",
    );

    let mut options = SearchOptions::default();
    options.search_binaries = true;
    let query = SearchQuery::build(dir.path(), None, Some("WORLD"), options).unwrap();

    let results: Vec<_> = run(query)
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r),
            SearchEvent::Warning(..) => None,
        })
        .collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content_matches.len(), 1);
    let m = &results[0].content_matches[0];
    assert_eq!(m.line_text, "WORLD");
    assert_eq!(m.line_number, 2);
}

#[cfg(unix)]
#[test]
fn symlink_cycle_is_warned_and_root_scanned_once() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("f.txt"), b"content");
    symlink(dir.path(), dir.path().join("loop")).unwrap();

    let query = SearchQuery::build(dir.path(), Some("f.txt"), None, SearchOptions::default())
        .unwrap();

    let events = run(query);
    let cycle_warnings = events
        .iter()
        .filter(|e| matches!(e, SearchEvent::Warning(_, WarningReason::SymlinkCycle)))
        .count();
    assert_eq!(cycle_warnings, 1);

    let results: Vec<_> = events
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r),
            SearchEvent::Warning(..) => None,
        })
        .collect();
    assert_eq!(results.len(), 1);
}

#[test]
fn combined_size_and_date_filter_admits_only_the_eligible_file() {
    let dir = tempdir().unwrap();

    let small = dir.path().join("small.bin");
    write_file(&small, &vec![0u8; 10 * 1024]);

    let mid = dir.path().join("mid.bin");
    write_file(&mid, &vec![0u8; 75 * 1024]);
    let two_days_ago = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
    filetime_set(&mid, two_days_ago);

    let large = dir.path().join("large.bin");
    write_file(&large, &vec![0u8; 2 * 1024 * 1024]);

    let mut options = SearchOptions::default();
    options.min_size_bytes = Some(haybale::filter::parse_size("50KB").unwrap());
    options.max_size_bytes = Some(haybale::filter::parse_size("1MB").unwrap());
    options.modified_after =
        Some(haybale::filter::parse_date("7d", chrono::Local::now()).unwrap());

    let query = SearchQuery::build(dir.path(), None, None, options).unwrap();

    let results: Vec<PathBuf> = run(query)
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Result(r) => Some(r.path),
            SearchEvent::Warning(..) => None,
        })
        .collect();

    assert_eq!(results, vec![mid]);
}

/// Sets a file's modification time without pulling in a dedicated crate
/// for one call: round-trips through `std::fs::File::set_modified`.
fn filetime_set(path: &std::path::Path, time: SystemTime) {
    let f = fs::File::options().write(true).open(path).unwrap();
    f.set_modified(time).unwrap();
}
