use log::{debug, info, trace};

use crate::bwt_algorithms::rotation_sort::burrows_wheeler;
use crate::error::{BwhError, Result, Stage};
use crate::huffman_coding::huffman::{compress, create_huffman_table, EncodedBits};
use crate::huffman_coding::table::HuffmanTable;
use crate::tools::freq_count::freqs;
use crate::tools::mtf::move_to_front_encode;

/// Everything the decoder needs to rebuild one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// BWT and move-to-front were applied before huffman coding
    pub transformed: bool,
    /// Row of the original block in the sorted rotations. Always 0 for untransformed blocks.
    pub primary_index: u32,
    /// Number of bytes in the block
    pub symbol_count: u32,
    pub table: HuffmanTable,
    pub payload: EncodedBits,
}

/// Compress one block: BWT, move-to-front, occurrence count, table, huffman encode.
/// With `transform` off the raw bytes go straight to the huffman stage.
/// `seq` is only used to report which block failed.
pub fn compress_block(seq: usize, block: &[u8], transform: bool) -> Result<BlockRecord> {
    info!("Starting block {}", seq);
    let symbol_count = u32::try_from(block.len()).map_err(|_| {
        BwhError::Config(format!("block of {} bytes is too large", block.len()))
            .in_block(seq, Stage::Bwt)
    })?;

    let (stream, primary_index) = if transform {
        let bwt = burrows_wheeler(block).map_err(|e| e.in_block(seq, Stage::Bwt))?;
        debug!(
            "Block {}: BWT primary index is {} of {}.",
            seq, bwt.primary_index, symbol_count
        );
        (move_to_front_encode(&bwt.last_column), bwt.primary_index)
    } else {
        if block.is_empty() {
            return Err(BwhError::InvalidBlock.in_block(seq, Stage::Huffman));
        }
        (block.to_vec(), 0)
    };

    let occurrences = freqs(&stream);
    let (_, table) =
        create_huffman_table(&occurrences).map_err(|e| e.in_block(seq, Stage::Huffman))?;
    trace!("Block {}: {} symbols in the huffman table.", seq, table.len());
    let payload = compress(&stream, &table).map_err(|e| e.in_block(seq, Stage::Huffman))?;
    debug!(
        "Block {}: {} bytes coded into {} bits.",
        seq, symbol_count, payload.bit_len
    );

    Ok(BlockRecord {
        transformed: transform,
        primary_index,
        symbol_count,
        table,
        payload,
    })
}
