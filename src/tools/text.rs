//! Text helpers used to cut the input into blocks.
//!
//! Blocks follow line boundaries where they can: a block ends right after the last newline that
//! fits in the wrap width. A line longer than the width is cut hard at the width.

use crate::error::{BwhError, Result};

/// Split `data` into blocks of at most `width` bytes. Concatenating the blocks gives back the
/// input. Empty input gives no blocks.
pub fn word_wrap_buffer(data: &[u8], width: usize) -> Result<Vec<&[u8]>> {
    if width == 0 {
        return Err(BwhError::Config("block width must be at least 1".to_string()));
    }
    let mut blocks = Vec::with_capacity(data.len() / width + 1);
    let mut rest = data;
    while !rest.is_empty() {
        if rest.len() <= width {
            blocks.push(rest);
            break;
        }
        let cut = match rest[..width].iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None => width,
        };
        let (block, tail) = rest.split_at(cut);
        blocks.push(block);
        rest = tail;
    }
    Ok(blocks)
}

/// Index just past the first newline, or the buffer length if there is none.
pub fn next_line_start(data: &[u8]) -> usize {
    data.iter()
        .position(|&b| b == b'\n')
        .map_or(data.len(), |pos| pos + 1)
}

/// Number of lines. A last line without a newline still counts.
pub fn count_lines(data: &[u8]) -> usize {
    let newlines = data.iter().filter(|&&b| b == b'\n').count();
    match data.last() {
        Some(&b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}
