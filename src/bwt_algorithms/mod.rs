//! The bwt_algorithms module holds the block sorting stage of bwhuff.
//!
//! The Burrows-Wheeler Transform prepares each block for compression. Sorting every cyclic
//! rotation of the block groups symbols that share a context, so the last column of the
//! sorted rotations has many runs of identical bytes.
//!
//! Only the simple rotation sort is provided. It compares full rotations in place and is meant
//! for blocks of bounded width, not for suffix-array scale inputs.
//!
pub mod rotation_sort;
