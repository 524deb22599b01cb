//! Matchers: bind a finder to a source (§4.4).

mod binary_content;
mod name;
mod text_content;

pub use binary_content::BinaryContentSearcher;
pub use name::NameMatcher;
pub use text_content::TextContentSearcher;

/// Files larger than this are regex-scanned line-by-line instead of as
/// one multi-line-capable whole-text match (§4.4, §9).
pub const LARGE_FILE_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024;
