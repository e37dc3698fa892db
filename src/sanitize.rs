//!
//! Filename sanitizer
//! ------------------
//! The single boundary between attacker-controlled filenames and filesystem
//! paths. Every filename recovered from an upload must pass through
//! [`sanitize`] exactly once before it is joined with the serve directory.
//!
//! Backslash is treated purely as a dangerous character to replace, never as
//! a path separator; Windows path semantics are not emulated here.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::{AppError, AppResult};

/// Windows reserved device names, case-insensitive membership.
static RESERVED_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut s: HashSet<&'static str> = HashSet::from(["con", "prn", "aux", "nul"]);
    for n in [
        "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
        "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
    ] {
        s.insert(n);
    }
    s
});

fn is_dangerous(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 0x20
}

/// Fallback name for inputs that collapse to nothing: uploaded_file_<8 hex>.
/// Collision probability is negligible; no uniqueness check is performed.
fn fallback_name() -> String {
    let mut bytes = [0u8; 4];
    let _ = getrandom::getrandom(&mut bytes);
    let mut name = String::from("uploaded_file_");
    for b in &bytes { let _ = write!(&mut name, "{:02x}", b); }
    name
}

/// Sanitize an uploaded filename into a string safe to join with a trusted
/// base directory: no separators, never empty, never `.`/`..`, never hidden,
/// never a reserved device name. Unicode outside the dangerous set is
/// preserved unchanged.
///
/// An empty input is a programming error upstream (the decoder never emits
/// empty filenames) and is surfaced as `AppError::UserInput`.
pub fn sanitize(filename: &str) -> AppResult<String> {
    if filename.is_empty() {
        return Err(AppError::user("empty_filename", "filename must not be empty"));
    }

    // Keep only the final path element.
    let base = filename.rsplit('/').next().unwrap_or(filename);

    let mut safe: String = base
        .chars()
        .map(|c| if is_dangerous(c) { '_' } else { c })
        .collect();

    // Traversal-only inputs collapse to "", "." or ".." here.
    if safe.is_empty() || safe == "." || safe == ".." {
        safe = fallback_name();
    }

    if safe.starts_with('.') || RESERVED_NAMES.contains(safe.to_ascii_lowercase().as_str()) {
        safe.insert_str(0, "file_");
    }

    Ok(safe)
}
