//! Whole-file reads and writes. The pipeline works on complete buffers in memory, so files are
//! read in one go before compression starts and written in one go after it ends.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::{debug, warn};

use crate::error::{BwhError, Result};

/// Read a whole file into a buffer.
pub fn file_to_buffer(path: &Path) -> Result<Vec<u8>> {
    let buffer = fs::read(path).map_err(|source| BwhError::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}.", buffer.len(), path.display());
    Ok(buffer)
}

/// Size of a file in bytes, used to size buffers up front.
pub fn seek_size_of_file(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| BwhError::IoRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a buffer to a file. An existing file is only replaced when `force` is set.
pub fn buffer_to_file(buffer: &[u8], path: &Path, force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut f_out = options.open(path).map_err(|source| {
        if source.kind() == ErrorKind::AlreadyExists {
            warn!("{} already exists. Use --force to overwrite it.", path.display());
        }
        BwhError::IoWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    f_out
        .write_all(buffer)
        .and_then(|_| f_out.flush())
        .map_err(|source| BwhError::IoWrite {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Wrote {} bytes to {}.", buffer.len(), path.display());
    Ok(())
}

/// Write a buffer to standard out.
pub fn buffer_to_stdout(buffer: &[u8]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(buffer)
        .and_then(|_| lock.flush())
        .map_err(|source| BwhError::IoWrite {
            path: "<stdout>".into(),
            source,
        })
}
