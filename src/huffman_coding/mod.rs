//! The huffman module is the entropy coding stage of bwhuff.
//!
//! Each block gets one huffman table, built from the occurrences of the move-to-front ranks
//! in that block. The tree is grown greedily by merging the two lightest nodes, its depths
//! become the code lengths, and the codes themselves are assigned canonically from those
//! lengths. Only the lengths are saved with the block, which is enough for the decoder to
//! rebuild the same tree.
//!
//! Codes use 0 for a left branch and 1 for a right branch, and are written most significant
//! bit first.
//!

pub mod huffman;
pub mod table;
