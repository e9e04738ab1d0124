//! Atomic file copy from a read-only source.

use crate::domain::ErrorKind;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("cannot read source: {0}")]
    Source(#[source] io::Error),

    #[error("cannot write destination: {0}")]
    Destination(#[source] io::Error),
}

impl CopyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CopyError::Source(err) => ErrorKind::from_io(err),
            CopyError::Destination(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                ErrorKind::PermissionDenied
            }
            CopyError::Destination(_) => ErrorKind::Io,
        }
    }
}

/// Copy `source` to `destination`, creating the parent directory if needed.
///
/// Bytes are streamed into a temporary file next to the destination which is
/// renamed into place once complete, so a failed copy never leaves a partial
/// file under the final name. The source modification time is preserved.
pub fn copy_atomic(source: &Path, destination: &Path) -> Result<u64, CopyError> {
    let mut reader = File::open(source).map_err(CopyError::Source)?;
    let metadata = reader.metadata().map_err(CopyError::Source)?;
    if !metadata.is_file() {
        return Err(CopyError::Source(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(CopyError::Destination)?;

    let mut staged = NamedTempFile::new_in(parent).map_err(CopyError::Destination)?;
    let bytes = io::copy(&mut reader, staged.as_file_mut()).map_err(CopyError::Destination)?;

    if let Ok(modified) = metadata.modified() {
        staged.as_file().set_modified(modified).map_err(CopyError::Destination)?;
    }

    staged.persist(destination).map_err(|err| CopyError::Destination(err.error))?;
    Ok(bytes)
}
