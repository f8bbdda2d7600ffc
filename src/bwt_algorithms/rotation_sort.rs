use std::cmp::Ordering;

use log::{debug, trace};

use crate::error::{BwhError, Result};

/*
The rotation matrix is never built. Each row of the matrix is described by the index of its
first symbol in the block, and rows are compared in place by walking the block cyclically.
The sort is the plain comparison sort over full rows, so a block of n symbols costs
O(n^2 log n) in the worst case (e.g. a block of one repeated symbol). Blocks are bounded by
the wrap width, which keeps this acceptable.
*/

/// Output of the forward transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BwtResult {
    /// Last symbol of every sorted rotation, in sorted order.
    pub last_column: Vec<u8>,
    /// Position of the unrotated block among the sorted rotations.
    pub primary_index: u32,
}

/// Burrows-Wheeler-Transform of one block by sorting all of its cyclic rotations.
/// Identical rotations keep the order of their rotation index, which keeps the
/// transform deterministic for blocks such as "aaaa" or "abab".
pub fn burrows_wheeler(block: &[u8]) -> Result<BwtResult> {
    if block.is_empty() {
        return Err(BwhError::InvalidBlock);
    }
    let n = block.len();

    let index = rotation_sort(block);
    let primary_index = seek_primary_index(&index);

    // Row i ends with the symbol just before its starting point.
    let last_column = index
        .iter()
        .map(|&start| block[(start as usize + n - 1) % n])
        .collect::<Vec<u8>>();

    debug!("BWT of {} symbols, primary index {}.", n, primary_index);
    trace!("BWT last column: {:?}", &last_column);
    Ok(BwtResult {
        last_column,
        primary_index,
    })
}

/// Sort the rotation indices of the block. Index is u32, which is more than enough for any
/// block width we accept.
fn rotation_sort(block: &[u8]) -> Vec<u32> {
    let mut index = (0_u32..block.len() as u32).collect::<Vec<u32>>();
    index.sort_unstable_by(|&a, &b| {
        rotation_cmp(a as usize, b as usize, block).then(a.cmp(&b))
    });
    index
}

/// Compare the rotation starting at `a` with the rotation starting at `b`.
fn rotation_cmp(a: usize, b: usize, block: &[u8]) -> Ordering {
    match a.cmp(&b) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => rotation_cmp(b, a, block).reverse(),
        Ordering::Less => {
            let n = block.len();
            // Rotation b reaches the end of the block first...
            let head = n - b;
            block[a..a + head]
                .cmp(&block[b..])
                // ...then restarts at 0 while rotation a finishes its tail...
                .then_with(|| block[a + head..].cmp(&block[..b - a]))
                // ...and finally rotation a wraps as well.
                .then_with(|| block[..a].cmp(&block[b - a..b]))
        }
    }
}

/// Find where rotation 0 ended up after sorting.
fn seek_primary_index(index: &[u32]) -> u32 {
    index.iter().position(|&start| start == 0).unwrap_or(0) as u32
}

/// Reverse the Burrows-Wheeler-Transform given the last column and the primary index.
pub fn burrows_wheeler_decode(last_column: &[u8], primary_index: u32) -> Result<Vec<u8>> {
    let end = last_column.len();
    if end == 0 {
        return Err(BwhError::CorruptData(
            "empty last column offered to the BWT decoder".to_string(),
        ));
    }
    if primary_index as usize >= end {
        return Err(BwhError::InvalidIndex {
            index: primary_index as usize,
            len: end,
        });
    }

    // Convert frequency count to the starting position of each symbol in the first column
    let mut freq = [0_usize; 256];
    for &s in last_column {
        freq[s as usize] += 1;
    }
    let mut start = [0_usize; 256];
    for i in 0..255 {
        start[i + 1] = start[i] + freq[i];
    }

    // Build the transformation vector. Equal symbols take first column slots in the order
    // they appear in the last column, which matches the tie rule of the sort.
    let mut t_vec = vec![0_u32; end];
    for (i, &s) in last_column.iter().enumerate() {
        t_vec[start[s as usize]] = i as u32;
        start[s as usize] += 1;
    }

    // Walk the chain from the primary index
    let mut out = Vec::with_capacity(end);
    let mut pos = t_vec[primary_index as usize] as usize;
    for _ in 0..end {
        out.push(last_column[pos]);
        pos = t_vec[pos] as usize;
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(block: &[u8]) {
        let result = burrows_wheeler(block).unwrap();
        assert_eq!(result.last_column.len(), block.len());
        let back = burrows_wheeler_decode(&result.last_column, result.primary_index).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn banana_test() {
        let result = burrows_wheeler(b"banana").unwrap();
        assert_eq!(result.last_column, b"nnbaaa");
        assert_eq!(result.primary_index, 3);
        assert_eq!(
            burrows_wheeler_decode(b"nnbaaa", 3).unwrap(),
            b"banana".to_vec()
        );
    }

    #[test]
    fn single_symbol_test() {
        let result = burrows_wheeler(b"x").unwrap();
        assert_eq!(result.last_column, b"x");
        assert_eq!(result.primary_index, 0);
        round_trip(b"x");
    }

    #[test]
    fn identical_symbols_test() {
        let result = burrows_wheeler(b"aaaa").unwrap();
        assert_eq!(result.last_column, b"aaaa");
        // All rotations are equal, so rotation 0 stays first.
        assert_eq!(result.primary_index, 0);
        round_trip(b"aaaa");
    }

    #[test]
    fn repeated_rotations_test() {
        round_trip(b"abababab");
        round_trip(b"abcabcabc");
        round_trip(b"\0\0\x01\0\0\x01");
    }

    #[test]
    fn distinct_symbols_test() {
        round_trip(b"zyxwvutsrq");
        round_trip(b"The quick brown fox");
    }

    #[test]
    fn every_byte_once_test() {
        let block = (0..=255_u8).rev().collect::<Vec<u8>>();
        round_trip(&block);
        let block = (0..=255_u8).collect::<Vec<u8>>();
        let result = burrows_wheeler(&block).unwrap();
        // Sorted rotations of 0..=255 start at 0, 1, ... so the primary index is 0
        assert_eq!(result.primary_index, 0);
        assert_eq!(result.last_column[0], 255);
        round_trip(&block);
    }

    #[test]
    fn rotation_cmp_test() {
        let block = b"banana";
        // "anaban" < "ananab"
        assert_eq!(rotation_cmp(3, 1, block), Ordering::Less);
        assert_eq!(rotation_cmp(1, 3, block), Ordering::Greater);
        assert_eq!(rotation_cmp(2, 2, block), Ordering::Equal);
        let block = b"abab";
        assert_eq!(rotation_cmp(0, 2, block), Ordering::Equal);
    }

    #[test]
    fn empty_block_is_rejected() {
        assert!(matches!(burrows_wheeler(b""), Err(BwhError::InvalidBlock)));
    }

    #[test]
    fn primary_index_equal_to_len_is_rejected() {
        let result = burrows_wheeler_decode(b"nnbaaa", 6);
        assert!(matches!(
            result,
            Err(BwhError::InvalidIndex { index: 6, len: 6 })
        ));
    }

    #[test]
    fn empty_last_column_is_rejected() {
        assert!(matches!(
            burrows_wheeler_decode(b"", 0),
            Err(BwhError::CorruptData(_))
        ));
    }
}
