//! The huffman code table and its serialized form.
//!
//! Only code lengths are stored. Both sides rebuild the same codes from the lengths using
//! canonical assignment: symbols are ordered by (length, symbol), codes are consecutive within
//! a length, and the running code is shifted left whenever the length grows. For example,
//! lengths {0: 1, 99: 2, 110: 2} give the codes 0, 10 and 11.
//!
//! Serialized layout (big-endian):
//! - u16 entry count, 1..=256
//! - count pairs of (symbol: u8, code length: u8), symbols strictly ascending

use log::trace;
use rustc_hash::FxHashMap;

use crate::error::{BwhError, Result};

/// Longest code we can put through the BitWriter in one call.
pub const MAX_CODE_LEN: u8 = 32;

/// A huffman code: the low `len` bits of `bits`, written most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u32,
    pub len: u8,
}

impl Code {
    /// True if this code is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

/// Mapping from symbol to code. Symbols that never occur in the block have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanTable {
    codes: FxHashMap<u8, Code>,
}

impl HuffmanTable {
    /// Build the canonical codes for a set of (symbol, code length) pairs.
    /// The lengths must describe a complete prefix-free code, except for the one symbol table,
    /// which uses a single 1 bit code.
    pub fn from_lengths(lengths: &[(u8, u8)]) -> Result<Self> {
        if lengths.is_empty() {
            return Err(BwhError::MalformedTable("table has no symbols".to_string()));
        }
        if lengths.len() > 256 {
            return Err(BwhError::MalformedTable(format!(
                "table has {} symbols",
                lengths.len()
            )));
        }

        let mut seen = [false; 256];
        // Kraft sum, scaled so a 1 bit code counts 2^31
        let mut kraft: u64 = 0;
        for &(sym, len) in lengths {
            if len == 0 || len > MAX_CODE_LEN {
                return Err(BwhError::MalformedTable(format!(
                    "symbol {} has code length {}",
                    sym, len
                )));
            }
            if seen[sym as usize] {
                return Err(BwhError::MalformedTable(format!(
                    "symbol {} appears twice",
                    sym
                )));
            }
            seen[sym as usize] = true;
            kraft += 1_u64 << (MAX_CODE_LEN - len);
        }
        let full = 1_u64 << MAX_CODE_LEN;
        let single = lengths.len() == 1 && lengths[0].1 == 1;
        if kraft > full {
            return Err(BwhError::MalformedTable(
                "code lengths are over-subscribed".to_string(),
            ));
        }
        if kraft < full && !single {
            return Err(BwhError::MalformedTable(
                "code lengths leave the tree incomplete".to_string(),
            ));
        }

        // Sort ascending by length, then symbol
        let mut len_sym = lengths
            .iter()
            .map(|&(sym, len)| (len, sym))
            .collect::<Vec<(u8, u8)>>();
        len_sym.sort_unstable();

        // Next_code is a tuple of the current length and the next code at that length.
        let mut next_code: (u8, u64) = (len_sym[0].0, 0);
        let mut codes = FxHashMap::default();
        for &(len, sym) in &len_sym {
            if len != next_code.0 {
                next_code.1 <<= len - next_code.0;
                next_code.0 = len;
            }
            codes.insert(
                sym,
                Code {
                    bits: next_code.1 as u32,
                    len,
                },
            );
            trace!("Symbol {} gets code {:0>w$b}", sym, next_code.1, w = len as usize);
            next_code.1 += 1;
        }
        Ok(Self { codes })
    }

    /// Code for `symbol`, if the symbol occurs in the block.
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes.get(&symbol).copied()
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// (symbol, code length) pairs in ascending symbol order.
    pub fn lengths(&self) -> Vec<(u8, u8)> {
        let mut lengths = self
            .codes
            .iter()
            .map(|(&sym, code)| (sym, code.len))
            .collect::<Vec<(u8, u8)>>();
        lengths.sort_unstable();
        lengths
    }

    /// All (symbol, code) pairs in ascending symbol order.
    pub fn codes(&self) -> Vec<(u8, Code)> {
        let mut codes = self
            .codes
            .iter()
            .map(|(&sym, &code)| (sym, code))
            .collect::<Vec<(u8, Code)>>();
        codes.sort_unstable_by_key(|&(sym, _)| sym);
        codes
    }
}

/// Serialize the table as a list of code lengths.
pub fn save_table(table: &HuffmanTable) -> Vec<u8> {
    let lengths = table.lengths();
    let mut out = Vec::with_capacity(2 + 2 * lengths.len());
    out.extend_from_slice(&(lengths.len() as u16).to_be_bytes());
    for (sym, len) in lengths {
        out.push(sym);
        out.push(len);
    }
    out
}

/// Read a table written by save_table. Returns the table and the number of bytes used.
pub fn load_table(bytes: &[u8]) -> Result<(HuffmanTable, usize)> {
    if bytes.len() < 2 {
        return Err(BwhError::MalformedTable(
            "table header is truncated".to_string(),
        ));
    }
    let count = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    if count == 0 || count > 256 {
        return Err(BwhError::MalformedTable(format!(
            "table claims {} symbols",
            count
        )));
    }
    let used = 2 + 2 * count;
    if bytes.len() < used {
        return Err(BwhError::MalformedTable(format!(
            "table needs {} bytes but only {} are left",
            used,
            bytes.len()
        )));
    }

    let lengths = bytes[2..used]
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect::<Vec<(u8, u8)>>();
    if lengths.windows(2).any(|w| w[0].0 >= w[1].0) {
        return Err(BwhError::MalformedTable(
            "symbols are not in ascending order".to_string(),
        ));
    }
    Ok((HuffmanTable::from_lengths(&lengths)?, used))
}
