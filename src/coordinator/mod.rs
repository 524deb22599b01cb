//! `SearchCoordinator`: bounded-depth traversal, symlink-cycle
//! detection, per-file routing, and the lazy `SearchEvent` stream
//! (§4.6, §5).
//!
//! The core is specified as single-threaded cooperative; this
//! implementation takes the documented relaxation of §5 by running the
//! walk on one dedicated background thread rather than the calling
//! thread, pushing events into a bounded channel the consumer drains
//! via `next()`. A single producer thread trivially preserves the
//! traversal order, so no result buffering/reordering is needed.

use crate::binary::BinaryDetector;
use crate::error::WarningReason;
use crate::filter::{is_hidden, FileFilter};
use crate::matcher::{BinaryContentSearcher, NameMatcher, TextContentSearcher};
use crate::model::{SearchEvent, SearchResult};
use crate::query::SearchQuery;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

const CHANNEL_CAPACITY: usize = 64;

#[cfg(unix)]
type DirIdentity = (u64, u64);
#[cfg(not(unix))]
type DirIdentity = PathBuf;

#[cfg(unix)]
fn dir_identity(_path: &Path, metadata: &fs::Metadata) -> std::io::Result<DirIdentity> {
    use std::os::unix::fs::MetadataExt;
    Ok((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn dir_identity(path: &Path, _metadata: &fs::Metadata) -> std::io::Result<DirIdentity> {
    fs::canonicalize(path)
}

/// Pull-driven, cancellable search stream. Each `next()` call blocks
/// until the background walker has an event ready, or the walk is
/// done.
pub struct SearchStream {
    receiver: Receiver<SearchEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SearchStream {
    /// Signal the background walker to stop. The walker finishes any
    /// file it is mid-scan on, then ends the stream; no partial result
    /// is ever emitted.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

impl Iterator for SearchStream {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        self.receiver.recv().ok()
    }
}

impl Drop for SearchStream {
    fn drop(&mut self) {
        self.cancel();
        // The walker may be blocked inside a full `sync_channel` send; it
        // only observes `cancel` between sends, so a blocked send must be
        // allowed to complete before the thread can exit. Draining here
        // unblocks it, and the loop ends once the walker drops its sender.
        while self.receiver.recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Run `query` and return its lazy result stream.
pub fn search(query: SearchQuery) -> SearchStream {
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
    let worker_cancel = Arc::clone(&cancel);

    let handle = thread::spawn(move || run(query, &worker_cancel, tx));

    SearchStream {
        receiver: rx,
        cancel,
        handle: Some(handle),
    }
}

fn run(query: SearchQuery, cancel: &AtomicBool, tx: SyncSender<SearchEvent>) {
    let root = query.root.clone();
    let root_metadata = match fs::metadata(&root) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("root directory '{}' is unreadable: {e}", root.display());
            let _ = tx.send(SearchEvent::Warning(
                root,
                WarningReason::EntryUnreadable(e.to_string()),
            ));
            return;
        }
    };
    if !root_metadata.is_dir() {
        let _ = tx.send(SearchEvent::Warning(
            root,
            WarningReason::EntryUnreadable("root is not a directory".to_string()),
        ));
        return;
    }

    let filter = FileFilter {
        include_hidden: query.options.include_hidden,
        min_size_bytes: query.options.min_size_bytes,
        max_size_bytes: query.options.max_size_bytes,
        modified_after: query.options.modified_after,
        modified_before: query.options.modified_before,
    };

    let mut visited = HashSet::new();
    if let Ok(id) = dir_identity(&root, &root_metadata) {
        visited.insert(id);
    }

    log::debug!("starting search at {}", root.display());
    let mut stats = Stats::default();
    walk_dir(&root, 0, &query, &filter, &mut visited, cancel, &tx, &mut stats);
    log::info!(
        "search finished: {} result(s), {} warning(s)",
        stats.results,
        stats.warnings
    );
}

#[derive(Default)]
struct Stats {
    results: u32,
    warnings: u32,
}

struct Entry {
    path: PathBuf,
    metadata: fs::Metadata,
}

fn walk_dir(
    dir: &Path,
    depth: u32,
    query: &SearchQuery,
    filter: &FileFilter,
    visited: &mut HashSet<DirIdentity>,
    cancel: &AtomicBool,
    tx: &SyncSender<SearchEvent>,
    stats: &mut Stats,
) {
    if cancel.load(Ordering::SeqCst) {
        return;
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            log::warn!("cannot read directory {}: {e}", dir.display());
            stats.warnings += 1;
            let _ = tx.send(SearchEvent::Warning(
                dir.to_path_buf(),
                WarningReason::EntryUnreadable(e.to_string()),
            ));
            return;
        }
    };

    let mut names: Vec<(String, PathBuf)> = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(e) => names.push((e.file_name().to_string_lossy().into_owned(), e.path())),
            Err(e) => {
                log::debug!("cannot read directory entry under {}: {e}", dir.display());
                stats.warnings += 1;
                let _ = tx.send(SearchEvent::Warning(
                    dir.to_path_buf(),
                    WarningReason::EntryUnreadable(e.to_string()),
                ));
            }
        }
    }
    names.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for (_, path) in names {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        let symlink_meta = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("cannot stat {}: {e}", path.display());
                stats.warnings += 1;
                let _ = tx.send(SearchEvent::Warning(
                    path,
                    WarningReason::EntryUnreadable(e.to_string()),
                ));
                continue;
            }
        };

        let resolved = if symlink_meta.file_type().is_symlink() {
            match fs::metadata(&path) {
                Ok(m) => m,
                Err(_) => {
                    log::debug!("broken symlink at {}", path.display());
                    stats.warnings += 1;
                    let _ = tx.send(SearchEvent::Warning(path, WarningReason::BrokenSymlink));
                    continue;
                }
            }
        } else {
            symlink_meta
        };

        if resolved.is_dir() {
            dirs.push(Entry {
                path,
                metadata: resolved,
            });
        } else if resolved.is_file() {
            files.push(Entry {
                path,
                metadata: resolved,
            });
        }
    }

    for f in &files {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        process_file(&f.path, &f.metadata, query, filter, tx, stats);
    }

    let within_depth = match query.options.max_depth {
        Some(max) => depth < max,
        None => true,
    };
    if !within_depth {
        return;
    }

    for d in &dirs {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        if !query.options.include_hidden && is_hidden(&d.path) {
            continue;
        }
        let identity = match dir_identity(&d.path, &d.metadata) {
            Ok(id) => id,
            Err(e) => {
                log::debug!("cannot identify directory {}: {e}", d.path.display());
                stats.warnings += 1;
                let _ = tx.send(SearchEvent::Warning(
                    d.path.clone(),
                    WarningReason::EntryUnreadable(e.to_string()),
                ));
                continue;
            }
        };
        if !visited.insert(identity) {
            log::debug!("symlink cycle detected at {}", d.path.display());
            stats.warnings += 1;
            let _ = tx.send(SearchEvent::Warning(
                d.path.clone(),
                WarningReason::SymlinkCycle,
            ));
            continue;
        }
        walk_dir(&d.path, depth + 1, query, filter, visited, cancel, tx, stats);
    }
}

fn process_file(
    path: &Path,
    metadata: &fs::Metadata,
    query: &SearchQuery,
    filter: &FileFilter,
    tx: &SyncSender<SearchEvent>,
    stats: &mut Stats,
) {
    if !query.options.include_hidden && is_hidden(path) {
        return;
    }
    if let Some(name_pattern) = &query.name_pattern {
        if !NameMatcher::new(name_pattern).matches(path) {
            return;
        }
    }
    if !filter.matches(path, metadata) {
        return;
    }

    let Some(content_pattern) = &query.content_pattern else {
        stats.results += 1;
        let _ = tx.send(SearchEvent::Result(SearchResult {
            path: path.to_path_buf(),
            content_matches: Vec::new(),
        }));
        return;
    };

    let is_binary = match BinaryDetector::is_binary(path) {
        Ok(b) => b,
        Err(e) => {
            log::debug!("cannot classify {}: {e}", path.display());
            stats.warnings += 1;
            let _ = tx.send(SearchEvent::Warning(
                path.to_path_buf(),
                WarningReason::EntryUnreadable(e.to_string()),
            ));
            return;
        }
    };

    if is_binary {
        if !query.options.search_binaries {
            return;
        }
        let searcher = BinaryContentSearcher::new(content_pattern, query.options.case_sensitive_content);
        match searcher.search(path) {
            Ok(matches) if !matches.is_empty() => {
                stats.results += 1;
                let _ = tx.send(SearchEvent::Result(SearchResult {
                    path: path.to_path_buf(),
                    content_matches: matches,
                }));
            }
            Ok(_) => {}
            Err(e) => {
                log::debug!("cannot search binary content of {}: {e}", path.display());
                stats.warnings += 1;
                let _ = tx.send(SearchEvent::Warning(
                    path.to_path_buf(),
                    WarningReason::EntryUnreadable(e.to_string()),
                ));
            }
        }
    } else {
        let searcher = TextContentSearcher::new(content_pattern, query.options.case_sensitive_content);
        match searcher.search(path) {
            Ok(outcome) => {
                if let Some(warning) = outcome.warning {
                    stats.warnings += 1;
                    let _ = tx.send(SearchEvent::Warning(path.to_path_buf(), warning));
                }
                if !outcome.matches.is_empty() {
                    stats.results += 1;
                    let _ = tx.send(SearchEvent::Result(SearchResult {
                        path: path.to_path_buf(),
                        content_matches: outcome.matches,
                    }));
                }
            }
            Err(e) => {
                log::debug!("cannot search text content of {}: {e}", path.display());
                stats.warnings += 1;
                let _ = tx.send(SearchEvent::Warning(
                    path.to_path_buf(),
                    WarningReason::EntryUnreadable(e.to_string()),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchOptions;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, contents: &str) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn streams_name_matches_in_order() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("b.txt"), "b");
        write_file(&dir.path().join("a.txt"), "a");
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(&dir.path().join("sub").join("c.txt"), "c");

        let query = SearchQuery::build(
            dir.path(),
            Some("*.txt"),
            None,
            SearchOptions::default(),
        )
        .unwrap();

        let paths: Vec<PathBuf> = search(query)
            .filter_map(|event| match event {
                SearchEvent::Result(r) => Some(r.path),
                SearchEvent::Warning(..) => None,
            })
            .collect();

        assert_eq!(
            paths,
            vec![
                dir.path().join("a.txt"),
                dir.path().join("b.txt"),
                dir.path().join("sub").join("c.txt"),
            ]
        );
    }

    #[test]
    fn max_depth_zero_restricts_to_root_files() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("top.txt"), "x");
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(&dir.path().join("sub").join("nested.txt"), "x");

        let mut options = SearchOptions::default();
        options.max_depth = Some(0);
        let query = SearchQuery::build(dir.path(), Some("*.txt"), None, options).unwrap();

        let paths: Vec<PathBuf> = search(query)
            .filter_map(|event| match event {
                SearchEvent::Result(r) => Some(r.path),
                SearchEvent::Warning(..) => None,
            })
            .collect();

        assert_eq!(paths, vec![dir.path().join("top.txt")]);
    }

    #[test]
    fn unreadable_root_emits_single_warning() {
        let query = SearchQuery::build(
            "/does/not/exist/at/all",
            None,
            None,
            SearchOptions::default(),
        )
        .unwrap();

        let events: Vec<SearchEvent> = search(query).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SearchEvent::Warning(..)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_warned_and_not_followed_forever() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        symlink(dir.path(), sub.join("loop")).unwrap();

        let query = SearchQuery::build(dir.path(), None, None, SearchOptions::default()).unwrap();
        let warnings: Vec<SearchEvent> = search(query)
            .filter(|e| matches!(e, SearchEvent::Warning(_, WarningReason::SymlinkCycle)))
            .collect();
        assert!(!warnings.is_empty());
    }
}
