//!
//! Security-filtered directory listing
//! -----------------------------------
//! Enumerates the direct children of the serve directory for the `/list`
//! endpoint. Hidden entries and non-regular files are silently omitted, and
//! enumeration failures collapse to an empty listing: this endpoint never
//! exposes filesystem error detail to the caller.

use serde::Serialize;
use std::path::Path;

/// One listable file, serialized as `{"name":..,"size":..}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub size: u64,
}

/// List the regular, non-hidden files directly under `dir`.
///
/// Re-reads the directory on every call; entry order is
/// filesystem-dependent and callers must not rely on it.
pub fn list(dir: &Path) -> Vec<DirectoryEntry> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        out.push(DirectoryEntry { name, size: meta.len() });
    }
    out
}
