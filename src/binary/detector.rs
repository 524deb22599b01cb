//! `BinaryDetector`: classify a file by inspecting its first 8 KiB.

use super::PROBE_SIZE;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A byte-slice-level binary/text decision: any `0x00` byte in the
/// prefix makes it binary. Empty input is text.
pub fn is_binary_prefix(prefix: &[u8]) -> bool {
    prefix.contains(&0)
}

/// Reads up to `PROBE_SIZE` bytes of `path` and classifies it. Files
/// shorter than the probe size are classified from their entire
/// content.
pub struct BinaryDetector;

impl BinaryDetector {
    /// Returns `true` if `path`'s first 8 KiB contain a NUL byte.
    pub fn is_binary(path: &Path) -> std::io::Result<bool> {
        let mut file = File::open(path)?;
        let mut buf = vec![0u8; PROBE_SIZE];
        let mut filled = 0;
        loop {
            let n = file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == buf.len() {
                break;
            }
        }
        buf.truncate(filled);
        Ok(is_binary_prefix(&buf))
    }
}
