//! The tools module holds the helpers around the compression stages of bwhuff.
//!
//! The tools are:
//! - cli: Command line interface.
//! - file_io: Whole-file reads and writes.
//! - freq_count: Byte occurrence counts for the huffman stage.
//! - mtf: Move-To-Front transform and its inverse.
//! - naming: Output file names.
//! - text: Cutting the input into blocks at line boundaries.
//!
pub mod cli;
pub mod file_io;
pub mod freq_count;
pub mod mtf;
pub mod naming;
pub mod text;
