//! Byte layout of a compressed stream.
//!
//! A stream is a fixed header followed by one record per block. All integers are big-endian.
//!
//! Header: magic `BWH`, version, block width (u32), block count (u32), original length (u64).
//!
//! Record: flags (u8, bit 0 set when BWT and move-to-front were applied), primary index (u32),
//! symbol count (u32), huffman table, payload bit length (u64), payload bytes.

use log::trace;

use super::compress_block::BlockRecord;
use crate::error::{BwhError, Result, Stage};
use crate::huffman_coding::huffman::EncodedBits;
use crate::huffman_coding::table::{load_table, save_table, MAX_CODE_LEN};

pub const MAGIC: &[u8; 3] = b"BWH";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = 20;

const FLAG_TRANSFORMED: u8 = 0x01;

/// Stream level information written ahead of the block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub block_width: u32,
    pub block_count: u32,
    pub total_len: u64,
}

/// Read position in a byte buffer. Running out of bytes is a truncated stream.
struct ByteCursor<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.buffer.len() - self.pos < n {
            return Err(BwhError::TruncatedStream(format!(
                "needed {} bytes for the {} at offset {}, found {}",
                n,
                what,
                self.pos,
                self.buffer.len() - self.pos
            )));
        }
        let slice = &self.buffer[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let mut bytes = [0_u8; 4];
        bytes.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_be_bytes(bytes))
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(bytes))
    }

    fn rest(&self) -> &'a [u8] {
        &self.buffer[self.pos..]
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buffer.len()
    }
}

/// Append the stream header to `out`.
pub fn write_header(out: &mut Vec<u8>, header: &StreamHeader) {
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&header.block_width.to_be_bytes());
    out.extend_from_slice(&header.block_count.to_be_bytes());
    out.extend_from_slice(&header.total_len.to_be_bytes());
}

/// Append one block record to `out`.
pub fn write_record(out: &mut Vec<u8>, record: &BlockRecord) {
    let flags = if record.transformed { FLAG_TRANSFORMED } else { 0 };
    out.push(flags);
    out.extend_from_slice(&record.primary_index.to_be_bytes());
    out.extend_from_slice(&record.symbol_count.to_be_bytes());
    out.extend_from_slice(&save_table(&record.table));
    out.extend_from_slice(&record.payload.bit_len.to_be_bytes());
    out.extend_from_slice(&record.payload.bytes);
}

fn read_header(cursor: &mut ByteCursor<'_>) -> Result<StreamHeader> {
    if cursor.buffer.len() < HEADER_LEN {
        return Err(BwhError::BadHeader(format!(
            "stream is {} bytes, shorter than a header",
            cursor.buffer.len()
        )));
    }
    let magic = cursor.take(MAGIC.len(), "magic")?;
    if magic != MAGIC {
        return Err(BwhError::BadHeader("not a bwhuff stream".to_string()));
    }
    let version = cursor.u8("version")?;
    if version != VERSION {
        return Err(BwhError::BadHeader(format!(
            "unsupported format version {}",
            version
        )));
    }
    Ok(StreamHeader {
        block_width: cursor.u32("block width")?,
        block_count: cursor.u32("block count")?,
        total_len: cursor.u64("total length")?,
    })
}

fn read_record(cursor: &mut ByteCursor<'_>) -> Result<BlockRecord> {
    let flags = cursor.u8("block flags")?;
    if flags & !FLAG_TRANSFORMED != 0 {
        return Err(BwhError::CorruptData(format!(
            "unknown block flags {:#04x}",
            flags
        )));
    }
    let primary_index = cursor.u32("primary index")?;
    let symbol_count = cursor.u32("symbol count")?;
    let table_len = match cursor.rest() {
        [hi, lo, ..] => 2 + 2 * u16::from_be_bytes([*hi, *lo]) as usize,
        _ => 2,
    };
    let (table, _) = load_table(cursor.take(table_len, "huffman table")?)?;
    let bit_len = cursor.u64("payload length")?;
    // Every symbol costs at least 1 bit and at most MAX_CODE_LEN bits.
    let symbols = symbol_count as u64;
    if bit_len < symbols || bit_len > symbols * MAX_CODE_LEN as u64 {
        return Err(BwhError::CorruptData(format!(
            "{} symbols cannot take {} bits",
            symbol_count, bit_len
        )));
    }
    let byte_len = usize::try_from(bit_len / 8 + u64::from(bit_len % 8 != 0)).map_err(|_| {
        BwhError::CorruptData(format!("payload of {} bits is too large", bit_len))
    })?;
    let bytes = cursor.take(byte_len, "payload")?.to_vec();
    Ok(BlockRecord {
        transformed: flags & FLAG_TRANSFORMED != 0,
        primary_index,
        symbol_count,
        table,
        payload: EncodedBits { bytes, bit_len },
    })
}

/// Split a stream into its header and block records, checking the header and the record count.
pub fn read_stream(bytes: &[u8]) -> Result<(StreamHeader, Vec<BlockRecord>)> {
    let mut cursor = ByteCursor::new(bytes);
    let header = read_header(&mut cursor)?;
    trace!(
        "Stream header: width {}, {} blocks, {} bytes.",
        header.block_width,
        header.block_count,
        header.total_len
    );
    if header.block_width == 0 {
        return Err(BwhError::BadHeader("block width is 0".to_string()));
    }

    // Every record takes at least 21 bytes, so a count larger than that cannot be honest.
    if header.block_count as usize > bytes.len() / 21 + 1 {
        return Err(BwhError::CorruptData(format!(
            "header claims {} blocks in {} bytes",
            header.block_count,
            bytes.len()
        )));
    }
    let mut records = Vec::with_capacity(header.block_count as usize);
    let mut total: u64 = 0;
    for seq in 0..header.block_count as usize {
        let record = read_record(&mut cursor).map_err(|e| e.in_block(seq, Stage::Container))?;
        if record.symbol_count == 0 || record.symbol_count > header.block_width {
            return Err(BwhError::CorruptData(format!(
                "block holds {} symbols with a block width of {}",
                record.symbol_count, header.block_width
            ))
            .in_block(seq, Stage::Container));
        }
        total += record.symbol_count as u64;
        records.push(record);
    }
    if !cursor.is_empty() {
        return Err(BwhError::CorruptData(format!(
            "{} bytes after the last block",
            cursor.rest().len()
        )));
    }
    if total != header.total_len {
        return Err(BwhError::CorruptData(format!(
            "blocks hold {} bytes but the header claims {}",
            total, header.total_len
        )));
    }
    Ok((header, records))
}
