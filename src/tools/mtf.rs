use log::trace;

use crate::error::{BwhError, Result};

/// Size of the symbol alphabet: every possible byte value.
pub const ALPHABET_SIZE: usize = 256;

/// The symbol list every pass starts from: 0, 1, 2, ... 255.
fn canonical_list() -> [u8; ALPHABET_SIZE] {
    std::array::from_fn(|i| i as u8)
}

/// Move the symbol at `idx` to the front, shifting everything before it back by one.
fn shift_to_front(list: &mut [u8; ALPHABET_SIZE], idx: usize) {
    if idx > 0 {
        let sym = list[idx];
        list.copy_within(..idx, 1);
        list[0] = sym;
    }
}

/// Encode data using the Move To Front transform. Every byte is replaced by its current rank
/// in the symbol list, then moved to the front of the list.
pub fn move_to_front_encode(stream: &[u8]) -> Vec<u8> {
    let mut list = canonical_list();
    let mut ranks = Vec::with_capacity(stream.len());

    for &byte in stream {
        // Every byte value is in the list, so the search cannot miss.
        let idx = list.iter().position(|&c| c == byte).unwrap_or(0);
        ranks.push(idx as u8);
        shift_to_front(&mut list, idx);
    }
    trace!("MTF ranks: {:?}", &ranks);
    ranks
}

/// Decode Move To Front ranks back into symbols. Ranks may be carried in any unsigned type that
/// widens to usize; a rank outside the alphabet is an error.
pub fn move_to_front_decode<T: Copy + Into<usize>>(ranks: &[T]) -> Result<Vec<u8>> {
    let mut list = canonical_list();
    let mut stream = Vec::with_capacity(ranks.len());

    for &rank in ranks {
        let idx: usize = rank.into();
        if idx >= ALPHABET_SIZE {
            return Err(BwhError::InvalidRank { rank: idx });
        }
        stream.push(list[idx]);
        shift_to_front(&mut list, idx);
    }
    Ok(stream)
}
