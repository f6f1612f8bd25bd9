//! Directory operations
//!
//! List, read, stage-write, delete, mkdir and rmdir against a manager's
//! root. Every function resolves its raw input through the manager's
//! `PathResolver` first; validation failures never touch the filesystem.

use std::fs;

use crate::error::VaultError;
use crate::storage::entries::{EntryKind, FileContent, ListEntry, WriteTarget};
use crate::storage::resolve::PathResolver;

/// Lists the contents of a directory inside the root.
///
/// An empty directory yields an empty list; a missing one is `NotFound`.
/// With nesting enabled, directories sort before files, each group
/// case-insensitive alphabetical. Without nesting only files are listed.
pub fn list_directory(
    resolver: &PathResolver,
    raw: &str,
) -> Result<Vec<ListEntry>, VaultError> {
    let dir = resolver.resolve_dir(raw)?;
    let shown = if raw.trim().is_empty() { "." } else { raw.trim() };

    if !dir.exists() {
        return Err(VaultError::NotFound(format!(
            "Directory not found: `{}`",
            shown
        )));
    }

    if !dir.is_dir() {
        return Err(VaultError::Conflict(format!(
            "`{}` is not a directory.",
            shown
        )));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir)?.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if resolver.allow_nested() {
                entries.push(ListEntry {
                    name,
                    kind: EntryKind::Directory,
                });
            }
        } else if file_type.is_file() {
            entries.push(ListEntry {
                name,
                kind: EntryKind::File,
            });
        }
    }

    entries.sort_by(|a, b| match (a.kind, b.kind) {
        (EntryKind::Directory, EntryKind::File) => std::cmp::Ordering::Less,
        (EntryKind::File, EntryKind::Directory) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    Ok(entries)
}

/// Reads a file's full content for delivery.
pub fn read_file(resolver: &PathResolver, raw: &str) -> Result<FileContent, VaultError> {
    let path = resolver.resolve(raw)?;

    if !path.exists() {
        return Err(VaultError::NotFound(format!("File not found: `{}`", raw)));
    }

    if !path.is_file() {
        return Err(VaultError::Conflict(format!("`{}` is not a file.", raw)));
    }

    let data = fs::read(&path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string());

    Ok(FileContent { filename, data })
}

/// Stages a write: resolves the target, refuses directories, creates missing
/// parents when nesting is enabled, and reads the previous content when the
/// target is an existing file so it can be surfaced before replacement.
pub fn prepare_write(resolver: &PathResolver, raw: &str) -> Result<WriteTarget, VaultError> {
    let path = resolver.resolve(raw)?;

    if path.is_dir() {
        return Err(VaultError::Conflict(format!(
            "`{}` is a directory, not a file. Append `/` to the path to upload into it.",
            raw
        )));
    }

    if resolver.allow_nested() {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
    }

    let existing = if path.is_file() {
        let data = fs::read(&path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_string());
        Some(FileContent { filename, data })
    } else {
        None
    };

    Ok(WriteTarget { path, existing })
}

/// Removes a file. Resolution failures surface as `NotFound`/`Conflict`;
/// a failed removal of an existing file is a distinct `Io` failure.
pub fn remove_file(resolver: &PathResolver, raw: &str) -> Result<(), VaultError> {
    let path = resolver.resolve(raw)?;

    if !path.exists() {
        return Err(VaultError::NotFound(format!("File not found: `{}`", raw)));
    }

    if !path.is_file() {
        return Err(VaultError::Conflict(format!("`{}` is not a file.", raw)));
    }

    fs::remove_file(&path)?;
    Ok(())
}

/// Creates a directory chain. The target must not exist at all.
pub fn make_directory(resolver: &PathResolver, raw: &str) -> Result<(), VaultError> {
    let path = resolver.resolve(raw)?;

    if path.exists() {
        return Err(VaultError::Conflict(format!(
            "Directory `{}` already exists.",
            raw
        )));
    }

    fs::create_dir_all(&path)?;
    Ok(())
}

/// Removes a directory that exists, is a directory, and is empty.
pub fn remove_directory(resolver: &PathResolver, raw: &str) -> Result<(), VaultError> {
    let path = resolver.resolve(raw)?;

    if !path.exists() {
        return Err(VaultError::NotFound(format!(
            "Directory `{}` does not exist.",
            raw
        )));
    }

    if !path.is_dir() {
        return Err(VaultError::Conflict(format!("`{}` is not a directory.", raw)));
    }

    if fs::read_dir(&path)?.next().is_some() {
        return Err(VaultError::Conflict(format!(
            "Directory `{}` is not empty. Delete all files and subdirectories first.",
            raw
        )));
    }

    fs::remove_dir(&path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use tempfile::tempdir;

    fn nested_resolver(temp: &tempfile::TempDir) -> PathResolver {
        PathResolver::new(temp.path(), true).unwrap()
    }

    fn flat_resolver(temp: &tempfile::TempDir) -> PathResolver {
        PathResolver::new(temp.path(), false).unwrap()
    }

    #[test]
    fn test_list_empty_root_is_empty_not_error() {
        let temp = tempdir().unwrap();
        let resolver = nested_resolver(&temp);
        assert!(list_directory(&resolver, "").unwrap().is_empty());
    }

    #[test]
    fn test_list_missing_directory_is_not_found() {
        let temp = tempdir().unwrap();
        let resolver = nested_resolver(&temp);
        assert!(matches!(
            list_directory(&resolver, "missing"),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_orders_directories_before_files() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("beta.txt"), b"b").unwrap();
        std::fs::write(temp.path().join("Alpha.txt"), b"a").unwrap();
        std::fs::create_dir(temp.path().join("zoo")).unwrap();
        std::fs::create_dir(temp.path().join("Attic")).unwrap();

        let resolver = nested_resolver(&temp);
        let names: Vec<String> = list_directory(&resolver, "")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Attic", "zoo", "Alpha.txt", "beta.txt"]);
    }

    #[test]
    fn test_list_flat_mode_omits_directories() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("beta.txt"), b"b").unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let resolver = flat_resolver(&temp);
        let entries = list_directory(&resolver, "").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "beta.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
    }

    #[test]
    fn test_read_file_returns_content() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("note.txt"), b"hello").unwrap();

        let resolver = nested_resolver(&temp);
        let content = read_file(&resolver, "note.txt").unwrap();
        assert_eq!(content.filename, "note.txt");
        assert_eq!(content.data, b"hello");
    }

    #[test]
    fn test_read_directory_is_conflict() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let resolver = nested_resolver(&temp);
        assert!(matches!(
            read_file(&resolver, "sub"),
            Err(VaultError::Conflict(_))
        ));
    }

    #[test]
    fn test_prepare_write_creates_parents_when_nested() {
        let temp = tempdir().unwrap();
        let resolver = nested_resolver(&temp);

        let target = prepare_write(&resolver, "a/b/new.txt").unwrap();
        assert!(temp.path().join("a").join("b").is_dir());
        assert!(target.existing.is_none());
    }

    #[test]
    fn test_prepare_write_surfaces_existing_content() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("old.txt"), b"previous").unwrap();

        let resolver = nested_resolver(&temp);
        let target = prepare_write(&resolver, "old.txt").unwrap();
        assert_eq!(target.existing.unwrap().data, b"previous");
    }

    #[test]
    fn test_prepare_write_rejects_directory_target() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let resolver = nested_resolver(&temp);
        assert!(matches!(
            prepare_write(&resolver, "sub"),
            Err(VaultError::Conflict(_))
        ));
    }

    #[test]
    fn test_remove_missing_file_is_not_found() {
        let temp = tempdir().unwrap();
        let resolver = nested_resolver(&temp);
        assert!(matches!(
            remove_file(&resolver, "ghost.txt"),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_make_directory_twice_is_conflict_and_idempotent() {
        let temp = tempdir().unwrap();
        let resolver = nested_resolver(&temp);

        make_directory(&resolver, "fresh/sub").unwrap();
        assert!(temp.path().join("fresh").join("sub").is_dir());

        assert!(matches!(
            make_directory(&resolver, "fresh/sub"),
            Err(VaultError::Conflict(_))
        ));
        assert!(temp.path().join("fresh").join("sub").is_dir());
    }

    #[test]
    fn test_remove_directory_refuses_non_empty() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("full")).unwrap();
        std::fs::write(temp.path().join("full").join("keep.txt"), b"k").unwrap();

        let resolver = nested_resolver(&temp);
        assert!(matches!(
            remove_directory(&resolver, "full"),
            Err(VaultError::Conflict(_))
        ));
        assert!(temp.path().join("full").join("keep.txt").is_file());
    }

    #[test]
    fn test_remove_directory_succeeds_on_empty() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("hollow")).unwrap();

        let resolver = nested_resolver(&temp);
        remove_directory(&resolver, "hollow").unwrap();
        assert!(!temp.path().join("hollow").exists());
    }

    #[test]
    fn test_remove_directory_on_file_is_conflict() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("plain.txt"), b"p").unwrap();

        let resolver = nested_resolver(&temp);
        assert!(matches!(
            remove_directory(&resolver, "plain.txt"),
            Err(VaultError::Conflict(_))
        ));
    }
}
