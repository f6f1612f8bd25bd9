//! Archive assembly
//!
//! Builds an in-memory zip from a set of previously resolved files. Entries
//! are keyed by path relative to the root with forward slashes; files that
//! vanished since being cached are skipped. The finished archive is refused
//! outright when it exceeds the transport's attachment ceiling.

use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::VaultError;
use crate::storage::resolve::relative_display;
use crate::transport::MAX_ATTACHMENT_BYTES;

/// A finished in-memory archive.
#[derive(Debug)]
pub struct Archive {
    pub data: Vec<u8>,
    pub entry_count: usize,
}

/// Bundles the given files into a zip held in memory.
///
/// File contents are streamed into the writer one at a time; the whole
/// uncompressed set is never resident at once. Returns `SizeExceeded` when
/// the finished archive is over the attachment ceiling; partial archives
/// are never delivered.
pub fn build_archive(paths: &[PathBuf], root: &Path) -> Result<Archive, VaultError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entry_count = 0usize;

    for path in paths {
        if !path.is_file() {
            continue;
        }

        let mut file = match File::open(path) {
            Ok(file) => file,
            // Deleted between the check and the open: treat as vanished.
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        writer.start_file(relative_display(path, root), FileOptions::default())?;
        io::copy(&mut file, &mut writer)?;
        entry_count += 1;
    }

    let data = writer.finish()?.into_inner();
    let size = data.len() as u64;

    if size > MAX_ATTACHMENT_BYTES {
        return Err(VaultError::SizeExceeded {
            size,
            limit: MAX_ATTACHMENT_BYTES,
        });
    }

    Ok(Archive { data, entry_count })
}
