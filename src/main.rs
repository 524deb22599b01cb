//! `haybale`: CLI driver for the search core. Parses arguments into a
//! `SearchQuery`, renders the default text format of §6, and maps
//! errors/exit codes per §7.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use haybale::{search, SearchEvent, SearchOptions, SearchQuery};
use std::path::PathBuf;
use std::process::ExitCode;

/// Recursive wildcard/regex file-name and file-content search.
#[derive(Parser, Debug)]
#[command(name = "haybale", version, about)]
struct Cli {
    /// Directory to search.
    root: PathBuf,

    /// Pattern matched against each file's basename (see the pattern
    /// grammar in the crate docs: `r:` for regex, `;` for alternatives).
    #[arg(long = "name")]
    name_pattern: Option<String>,

    /// Pattern matched against file content.
    #[arg(long = "content")]
    content_pattern: Option<String>,

    /// Only files at least this large. Grammar: `<digits>[KB|MB]`.
    #[arg(long = "min-size")]
    min_size: Option<String>,

    /// Only files at most this large. Grammar: `<digits>[KB|MB]`.
    #[arg(long = "max-size")]
    max_size: Option<String>,

    /// Only files modified at or after this date/offset (`YYYY-MM-DD`
    /// or `<N>d`/`<N>w`/`<N>m`).
    #[arg(long = "modified-after")]
    modified_after: Option<String>,

    /// Only files modified at or before this date/offset.
    #[arg(long = "modified-before")]
    modified_before: Option<String>,

    /// Include hidden files and directories.
    #[arg(long = "hidden", default_value_t = false)]
    hidden: bool,

    /// Search inside binary files by extracting printable strings.
    #[arg(long = "binaries", default_value_t = false)]
    binaries: bool,

    /// Limit recursion to this many levels below the root (0 = root's
    /// direct file children only).
    #[arg(long = "max-depth")]
    max_depth: Option<u32>,

    /// Match content case-sensitively. Name matching is always
    /// case-insensitive; regex patterns control their own case via
    /// inline flags regardless of this setting.
    #[arg(long = "case-sensitive", default_value_t = false)]
    case_sensitive: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let root = cli.root.clone();

    let options = SearchOptions {
        case_sensitive_content: cli.case_sensitive,
        search_binaries: cli.binaries,
        include_hidden: cli.hidden,
        max_depth: cli.max_depth,
        ..SearchOptions::default()
    };

    let query = match build_query(&cli, options) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("haybale: {e:#}");
            return ExitCode::from(2);
        }
    };

    run(query, &root)
}

fn build_query(cli: &Cli, mut options: SearchOptions) -> anyhow::Result<SearchQuery> {
    let now = Local::now();

    options.min_size_bytes = cli
        .min_size
        .as_deref()
        .map(haybale::filter::parse_size)
        .transpose()
        .context("parsing --min-size")?;
    options.max_size_bytes = cli
        .max_size
        .as_deref()
        .map(haybale::filter::parse_size)
        .transpose()
        .context("parsing --max-size")?;
    options.modified_after = cli
        .modified_after
        .as_deref()
        .map(|s| haybale::filter::parse_date(s, now))
        .transpose()
        .context("parsing --modified-after")?;
    options.modified_before = cli
        .modified_before
        .as_deref()
        .map(|s| haybale::filter::parse_date(s, now))
        .transpose()
        .context("parsing --modified-before")?;

    SearchQuery::build(
        cli.root.clone(),
        cli.name_pattern.as_deref(),
        cli.content_pattern.as_deref(),
        options,
    )
    .context("building search query")
}

fn run(query: SearchQuery, root: &std::path::Path) -> ExitCode {
    let mut saw_result = false;
    let mut event_count = 0u32;
    let mut root_unreadable = false;

    for event in search(query) {
        event_count += 1;
        match event {
            SearchEvent::Result(result) => {
                saw_result = true;
                print_result(&result);
            }
            SearchEvent::Warning(path, reason) => {
                if event_count == 1 && path == root {
                    root_unreadable = true;
                }
                eprintln!("haybale: warning: {}: {reason}", path.display());
            }
        }
    }

    if saw_result {
        ExitCode::from(0)
    } else if root_unreadable && event_count == 1 {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn print_result(result: &haybale::SearchResult) {
    println!("{}", result.path.display());
    for content_match in &result.content_matches {
        for (n, text) in &content_match.context_before {
            println!("  {n}.  {text}");
        }
        println!(
            "  {}.  {}",
            content_match.line_number, content_match.line_text
        );
        for (n, text) in &content_match.context_after {
            println!("  {n}.  {text}");
        }
    }
    println!();
}
