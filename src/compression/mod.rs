//! The compression module runs the bwhuff pipeline over whole buffers and files.
//!
//! Compression happens in the following steps for each block:
//! - Burrows-Wheeler Transform: Sort all rotations of the block so equal contexts sit together.
//! - Move To Front transform: Turn the clustered symbols into runs of small ranks.
//! - Huffman coding: Code the ranks with one table per block.
//!
//! Blocks are cut from the input at line boundaries and are independent of each other.
//! Decompression follows the inverse of the compression process, block by block.
//!
//! Blocks compressed without the transform skip straight to the huffman stage.
//!

pub mod compress;
pub mod compress_block;
pub mod container;
pub mod decompress;
pub mod decompress_block;
