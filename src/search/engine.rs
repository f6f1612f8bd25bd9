//! Search engine
//!
//! Case-insensitive prefix search over the files under a manager's root.
//! Recursion into subdirectories follows the manager's nesting flag.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VaultError;
use crate::storage::resolve::{PathResolver, relative_display};

/// Queries shorter than this are rejected before any filesystem access.
pub const MIN_QUERY_CHARS: usize = 4;

/// Finds all files whose name starts with `query` (case-insensitive).
///
/// Results are ordered case-insensitive alphabetical by path relative to the
/// root. Unreadable subdirectories are skipped rather than failing the whole
/// search.
pub fn search_files(resolver: &PathResolver, query: &str) -> Result<Vec<PathBuf>, VaultError> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(VaultError::Validation(
            "The search query must be 4 or more characters.".into(),
        ));
    }

    let mut matches = Vec::new();
    walk(resolver.root(), &query, resolver.allow_nested(), &mut matches);

    matches.sort_by_key(|path| relative_display(path, resolver.root()).to_lowercase());

    Ok(matches)
}

fn walk(dir: &Path, query: &str, recurse: bool, matches: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_file() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with(query) {
                matches.push(path);
            }
        } else if recurse && file_type.is_dir() {
            walk(&path, query, recurse, matches);
        }
    }
}
