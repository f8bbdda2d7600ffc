//! bwhuff: a block-sorting lossless compressor.
//!
//! Each block of input goes through a rotation-sort Burrows-Wheeler transform, a
//! move-to-front transform and huffman coding with a table saved next to the block.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> bwhuff -z test.txt`
//!
//! This will compress the file and create the file test.txt.bwh.
//! The original file is left in place.
//!
//! The same pipeline is available on buffers:
//!
//! ```
//! use bwhuff::compression::{compress::compress_buffer, decompress::decompress_buffer};
//!
//! let stream = compress_buffer(b"banana\n", 1024, true).unwrap();
//! assert_eq!(decompress_buffer(&stream).unwrap(), b"banana\n".to_vec());
//! ```
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;
