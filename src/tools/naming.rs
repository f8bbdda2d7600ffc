use std::path::{Path, PathBuf};

use super::cli::Mode;

/// Extension given to compressed files.
pub const EXTENSION: &str = "bwh";

/// Derive the output file name from the input file name.
/// Compressing appends `.bwh`. Decompressing strips `.bwh`, or appends `.out` when the input
/// does not carry our extension.
pub fn get_file_name(input: &Path, mode: &Mode) -> PathBuf {
    match mode {
        Mode::Zip => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(EXTENSION);
            PathBuf::from(name)
        }
        Mode::Unzip | Mode::Test => {
            if input.extension().map_or(false, |ext| ext == EXTENSION) {
                input.with_extension("")
            } else {
                let mut name = input.as_os_str().to_owned();
                name.push(".out");
                PathBuf::from(name)
            }
        }
    }
}
