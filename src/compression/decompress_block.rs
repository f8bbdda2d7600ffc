use log::{debug, info};

use super::compress_block::BlockRecord;
use crate::bwt_algorithms::rotation_sort::burrows_wheeler_decode;
use crate::error::{BwhError, Result, Stage};
use crate::huffman_coding::huffman::{decompress, HuffmanTree};
use crate::tools::mtf::move_to_front_decode;

/// Rebuild one block: huffman decode, move-to-front decode, BWT decode.
/// Untransformed records stop after the huffman stage.
pub fn decompress_block(seq: usize, record: &BlockRecord) -> Result<Vec<u8>> {
    info!("Decoding block {}", seq);
    if record.symbol_count == 0 {
        return Err(BwhError::CorruptData("block record holds no symbols".to_string())
            .in_block(seq, Stage::Container));
    }
    if !record.transformed && record.primary_index != 0 {
        return Err(BwhError::CorruptData(format!(
            "untransformed block carries primary index {}",
            record.primary_index
        ))
        .in_block(seq, Stage::Container));
    }

    let tree = HuffmanTree::from_table(&record.table).map_err(|e| e.in_block(seq, Stage::Huffman))?;
    let stream = decompress(
        &record.payload.bytes,
        record.payload.bit_len,
        record.symbol_count as usize,
        &tree,
    )
    .map_err(|e| e.in_block(seq, Stage::Huffman))?;

    if !record.transformed {
        return Ok(stream);
    }

    let last_column = move_to_front_decode(&stream).map_err(|e| e.in_block(seq, Stage::Mtf))?;
    let block = burrows_wheeler_decode(&last_column, record.primary_index)
        .map_err(|e| e.in_block(seq, Stage::Bwt))?;
    debug!("Block {}: restored {} bytes.", seq, block.len());
    Ok(block)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress_block::compress_block;

    #[test]
    fn banana_round_trip() {
        let record = compress_block(0, b"banana", true).unwrap();
        assert_eq!(decompress_block(0, &record).unwrap(), b"banana".to_vec());
    }

    #[test]
    fn aaaa_round_trip() {
        let record = compress_block(0, b"aaaa", true).unwrap();
        assert_eq!(record.primary_index, 0);
        assert_eq!(record.table.len(), 1);
        assert_eq!(decompress_block(0, &record).unwrap(), b"aaaa".to_vec());
    }

    #[test]
    fn untransformed_round_trip() {
        let data = b"Peter Piper picked a peck\0of pickled peppers\n";
        let record = compress_block(0, data, false).unwrap();
        assert_eq!(decompress_block(0, &record).unwrap(), data.to_vec());
    }

    #[test]
    fn bad_primary_index_is_a_bwt_error() {
        let mut record = compress_block(0, b"banana", true).unwrap();
        record.primary_index = 6;
        match decompress_block(4, &record) {
            Err(BwhError::Block { index, stage, source }) => {
                assert_eq!(index, 4);
                assert_eq!(stage, Stage::Bwt);
                assert!(matches!(*source, BwhError::InvalidIndex { index: 6, len: 6 }));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn short_payload_is_a_huffman_error() {
        let mut record = compress_block(0, b"banana", true).unwrap();
        record.payload.bit_len -= 1;
        assert!(matches!(
            decompress_block(0, &record),
            Err(BwhError::Block { stage: Stage::Huffman, .. })
        ));
    }

    #[test]
    fn inconsistent_records_rejected() {
        let mut record = compress_block(0, b"abc", false).unwrap();
        record.primary_index = 1;
        assert!(matches!(
            decompress_block(0, &record),
            Err(BwhError::Block { stage: Stage::Container, .. })
        ));
        record.primary_index = 0;
        record.symbol_count = 0;
        assert!(matches!(
            decompress_block(0, &record),
            Err(BwhError::Block { stage: Stage::Container, .. })
        ));
    }
}
