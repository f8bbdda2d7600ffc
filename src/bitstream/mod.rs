//! The bitstream module packs and unpacks the huffman coded payload of each block.
//!
//! Codes are written most significant bit first into a dense sequence of bytes. The last byte
//! is padded with zero bits, so the writer reports the exact bit count, which is stored in the
//! block record and used by the reader to stop before the padding.
//!
//! This subsystem is designed to interface with the huffman coder only. It is not intended for
//! more general use.
pub mod bitreader;
pub mod bitwriter;
