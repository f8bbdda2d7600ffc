use log::{debug, trace};

use super::table::{HuffmanTable, MAX_CODE_LEN};
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{BwhError, Result};
use crate::tools::freq_count::Occurrences;

/// Marks a child slot that has not been filled while a tree is rebuilt from codes.
const NIL: usize = usize::MAX;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NodeData {
    /// Children are indices into the tree's node arena. Left is bit 0, right is bit 1.
    Kids(usize, usize),
    Leaf(u8),
    /// Stands in for the missing second symbol when a block uses only one symbol.
    Placeholder,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub frequency: u64,
    pub node_data: NodeData,
}
impl Node {
    /// Create a new node
    pub fn new(frequency: u64, node_data: NodeData) -> Node {
        Node {
            frequency,
            node_data,
        }
    }
}

/// Binary code tree held in an arena. Nodes refer to their children by index, and the whole
/// tree is dropped at once when the block is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

/// Huffman coded payload of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBits {
    pub bytes: Vec<u8>,
    /// Exact number of payload bits. The rest of the last byte is padding.
    pub bit_len: u64,
}

impl HuffmanTree {
    /// Build the tree greedily from symbol weights: keep merging the two lightest unmerged
    /// nodes until one root is left.
    fn from_weights(weights: &[u64; 256]) -> Result<Self> {
        // Leaves are created in ascending symbol order, so arena order doubles as the tie rule.
        let mut nodes = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0)
            .map(|(sym, &w)| Node::new(w, NodeData::Leaf(sym as u8)))
            .collect::<Vec<Node>>();

        match nodes.len() {
            0 => return Err(BwhError::InvalidBlock),
            1 => {
                // One symbol still needs a 1 bit code, so give it a placeholder sibling.
                let frequency = nodes[0].frequency;
                nodes.push(Node::new(0, NodeData::Placeholder));
                nodes.push(Node::new(frequency, NodeData::Kids(0, 1)));
                let root = nodes.len() - 1;
                return Ok(Self { nodes, root });
            }
            _ => {}
        }

        let mut unmerged = (0..nodes.len()).collect::<Vec<usize>>();
        while unmerged.len() > 1 {
            let (left, right) = seek_two_min(&unmerged, &nodes);
            nodes.push(Node::new(
                nodes[left].frequency + nodes[right].frequency,
                NodeData::Kids(left, right),
            ));
            unmerged.retain(|&i| i != left && i != right);
            unmerged.push(nodes.len() - 1);
        }
        let root = unmerged[0];
        Ok(Self { nodes, root })
    }

    /// Rebuild the decoding tree from the codes of a table.
    pub fn from_table(table: &HuffmanTable) -> Result<Self> {
        if table.is_empty() {
            return Err(BwhError::MalformedTable("table has no symbols".to_string()));
        }
        let mut nodes = vec![Node::new(0, NodeData::Kids(NIL, NIL))];
        let root = 0;

        for (sym, code) in table.codes() {
            let mut node = root;
            // Walk (and grow) the tree one bit at a time, MSB first.
            for depth in (0..code.len).rev() {
                let bit = (code.bits >> depth) & 1;
                let (left, right) = match nodes[node].node_data {
                    NodeData::Kids(left, right) => (left, right),
                    _ => {
                        return Err(BwhError::MalformedTable(format!(
                            "code of symbol {} runs through another symbol",
                            sym
                        )))
                    }
                };
                let child = if bit == 0 { left } else { right };
                if depth == 0 {
                    if child != NIL {
                        return Err(BwhError::MalformedTable(format!(
                            "code of symbol {} is not unique",
                            sym
                        )));
                    }
                    nodes.push(Node::new(0, NodeData::Leaf(sym)));
                } else if child == NIL {
                    nodes.push(Node::new(0, NodeData::Kids(NIL, NIL)));
                } else {
                    node = child;
                    continue;
                }
                let new = nodes.len() - 1;
                nodes[node].node_data = if bit == 0 {
                    NodeData::Kids(new, right)
                } else {
                    NodeData::Kids(left, new)
                };
                node = new;
            }
        }

        // Any empty slot left over belongs to the one symbol table, which gets a placeholder.
        for i in 0..nodes.len() {
            if let NodeData::Kids(left, right) = nodes[i].node_data {
                if left == NIL || right == NIL {
                    if table.len() != 1 {
                        return Err(BwhError::MalformedTable(
                            "codes leave the tree incomplete".to_string(),
                        ));
                    }
                    nodes.push(Node::new(0, NodeData::Placeholder));
                    let filler = nodes.len() - 1;
                    nodes[i].node_data = NodeData::Kids(
                        if left == NIL { filler } else { left },
                        if right == NIL { filler } else { right },
                    );
                }
            }
        }
        Ok(Self { nodes, root })
    }

    /// Walk the tree and return how deep each real leaf sits. Depth is the code length.
    fn code_lengths(&self) -> Vec<(u8, u8)> {
        let mut leaves = Vec::new();
        let mut stack = vec![(self.root, 0_u8)];
        while let Some((node, depth)) = stack.pop() {
            match self.nodes[node].node_data {
                NodeData::Kids(left, right) => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
                NodeData::Leaf(sym) => leaves.push((sym, depth)),
                NodeData::Placeholder => {}
            }
        }
        leaves.sort_unstable();
        leaves
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total weight under the root.
    pub fn frequency(&self) -> u64 {
        self.nodes[self.root].frequency
    }
}

/// Find the two lightest nodes among those not merged yet. Returns (lightest, second).
/// Equal weights go to the node created first: leaves before internal nodes, lower symbols
/// before higher ones.
fn seek_two_min(unmerged: &[usize], nodes: &[Node]) -> (usize, usize) {
    let key = |i: usize| (nodes[i].frequency, i);
    let mut min1 = unmerged[0];
    let mut min2 = unmerged[1];
    if key(min2) < key(min1) {
        std::mem::swap(&mut min1, &mut min2);
    }
    for &i in &unmerged[2..] {
        if key(i) < key(min2) {
            min2 = i;
            if key(min2) < key(min1) {
                std::mem::swap(&mut min1, &mut min2);
            }
        }
    }
    (min1, min2)
}

/// Create the huffman tree and code table for a block's occurrences.
///
/// The greedy tree gives the code lengths. If it is deeper than MAX_CODE_LEN the weights are
/// flattened (halved, plus one) and the tree is built again. The codes are then assigned
/// canonically from the lengths, and the returned tree is rebuilt from those codes so it is the
/// exact tree the decoder will rebuild from the saved table.
pub fn create_huffman_table(occurrences: &Occurrences) -> Result<(HuffmanTree, HuffmanTable)> {
    let mut weights = [0_u64; 256];
    for (w, &o) in weights.iter_mut().zip(occurrences.iter()) {
        *w = o as u64;
    }

    let lengths = loop {
        let tree = HuffmanTree::from_weights(&weights)?;
        let lengths = tree.code_lengths();
        let depth = lengths.iter().map(|&(_, len)| len).max().unwrap_or(0);
        if depth <= MAX_CODE_LEN {
            debug!(
                "Huffman tree: {} symbols, {} nodes, weight {}, max code length {}.",
                lengths.len(),
                tree.node_count(),
                tree.frequency(),
                depth
            );
            break lengths;
        }
        debug!("Huffman tree depth {} too deep, flattening weights.", depth);
        for w in weights.iter_mut().filter(|w| **w > 0) {
            *w = 1 + *w / 2;
        }
    };

    let table = HuffmanTable::from_lengths(&lengths)?;
    let tree = HuffmanTree::from_table(&table)?;
    Ok((tree, table))
}

/// Replace every symbol with its code. Returns the packed bits and the exact bit count.
pub fn compress(stream: &[u8], table: &HuffmanTable) -> Result<EncodedBits> {
    let mut bw = BitWriter::new(stream.len() / 2 + 1);
    for &sym in stream {
        let code = table.get(sym).ok_or_else(|| {
            BwhError::MalformedTable(format!("no code for symbol {}", sym))
        })?;
        bw.out_bits(code.bits, code.len);
    }
    trace!("Huffman payload ends at {}.", bw.loc());
    let (bytes, bit_len) = bw.finish();
    Ok(EncodedBits { bytes, bit_len })
}

/// Decode `symbol_count` symbols from the first `bit_len` bits of `bytes` by walking the tree
/// from the root for every symbol.
pub fn decompress(
    bytes: &[u8],
    bit_len: u64,
    symbol_count: usize,
    tree: &HuffmanTree,
) -> Result<Vec<u8>> {
    if (bytes.len() as u64) * 8 < bit_len {
        return Err(BwhError::TruncatedStream(format!(
            "payload claims {} bits but holds {}",
            bit_len,
            bytes.len() * 8
        )));
    }
    let mut br = BitReader::new(bytes, bit_len);
    let mut out = Vec::with_capacity(symbol_count.min(br.remaining() as usize));

    while out.len() < symbol_count {
        let mut node = tree.root;
        loop {
            match tree.nodes[node].node_data {
                NodeData::Leaf(sym) => {
                    out.push(sym);
                    break;
                }
                NodeData::Kids(left, right) => {
                    let bit = br.bool_bit().ok_or_else(|| {
                        BwhError::TruncatedStream(format!(
                            "bitstream ended after {} of {} symbols",
                            out.len(),
                            symbol_count
                        ))
                    })?;
                    node = if bit { right } else { left };
                }
                NodeData::Placeholder => {
                    return Err(BwhError::CorruptData(format!(
                        "unused code found at {}",
                        br.loc()
                    )))
                }
            }
        }
    }

    if br.remaining() > 0 {
        return Err(BwhError::CorruptData(format!(
            "{} bits left over after {} symbols",
            br.remaining(),
            symbol_count
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::freq_count::freqs;

    fn assert_prefix_free(table: &HuffmanTable) {
        let codes = table.codes();
        for (i, (_, a)) in codes.iter().enumerate() {
            for (j, (_, b)) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{:?} is a prefix of {:?}", a, b);
                }
            }
        }
    }

    fn round_trip(data: &[u8]) {
        let (tree, table) = create_huffman_table(&freqs(data)).unwrap();
        assert_prefix_free(&table);
        let encoded = compress(data, &table).unwrap();
        let decoded = decompress(&encoded.bytes, encoded.bit_len, data.len(), &tree).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn banana_ranks_test() {
        let ranks = [110_u8, 0, 99, 99, 0, 0];
        let (_, table) = create_huffman_table(&freqs(&ranks)).unwrap();
        // Rank 0 is the most frequent and gets the shortest code
        assert_eq!(table.get(0).unwrap().len, 1);
        assert_eq!(table.get(99).unwrap().len, 2);
        assert_eq!(table.get(110).unwrap().len, 2);
        assert!(table.get(1).is_none());
        round_trip(&ranks);
    }

    #[test]
    fn greedy_tie_break_test() {
        // Four equal weights: (a, b) merge, then (c, d), then the two internal nodes.
        let lengths = HuffmanTree::from_weights(&{
            let mut w = [0_u64; 256];
            for s in b"abcd" {
                w[*s as usize] = 5;
            }
            w
        })
        .unwrap()
        .code_lengths();
        assert_eq!(lengths, vec![(b'a', 2), (b'b', 2), (b'c', 2), (b'd', 2)]);
    }

    #[test]
    fn seek_two_min_test() {
        let nodes = vec![
            Node::new(4, NodeData::Leaf(0)),
            Node::new(2, NodeData::Leaf(1)),
            Node::new(2, NodeData::Leaf(2)),
            Node::new(1, NodeData::Leaf(3)),
            Node::new(2, NodeData::Kids(0, 1)),
        ];
        assert_eq!(seek_two_min(&[0, 1, 2, 3, 4], &nodes), (3, 1));
        // Leaf beats internal node of the same weight
        assert_eq!(seek_two_min(&[4, 2, 0], &nodes), (2, 4));
    }

    #[test]
    fn single_symbol_test() {
        let data = b"aaaa";
        let (tree, table) = create_huffman_table(&freqs(data)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b'a').unwrap().len, 1);
        let encoded = compress(data, &table).unwrap();
        assert_eq!(encoded.bit_len, 4);
        assert_eq!(encoded.bytes, vec![0]);
        assert_eq!(
            decompress(&encoded.bytes, encoded.bit_len, 4, &tree).unwrap(),
            data.to_vec()
        );
    }

    #[test]
    fn placeholder_code_is_corrupt() {
        let (tree, _) = create_huffman_table(&freqs(b"aaaa")).unwrap();
        // A 1 bit walks into the placeholder
        let result = decompress(&[0b1000_0000], 1, 1, &tree);
        assert!(matches!(result, Err(BwhError::CorruptData(_))));
    }

    #[test]
    fn round_trip_test() {
        round_trip(b"If Peter Piper picked a peck of pickled peppers");
        round_trip(&(0..=255_u8).collect::<Vec<u8>>());
        round_trip(b"\0\0\0\x01\0\0\0\x02\0");
    }

    #[test]
    fn skewed_weights_are_length_limited() {
        // Fibonacci weights would need codes far longer than 32 bits.
        let mut occ = [0_u32; 256];
        let (mut a, mut b) = (1_u32, 1_u32);
        for o in occ.iter_mut().take(45) {
            *o = a;
            let next = a.saturating_add(b);
            a = b;
            b = next;
        }
        let (tree, table) = create_huffman_table(&occ).unwrap();
        assert_eq!(table.len(), 45);
        assert!(table.codes().iter().all(|(_, c)| c.len <= MAX_CODE_LEN));
        assert_prefix_free(&table);
        let data = (0..45_u8).collect::<Vec<u8>>();
        let encoded = compress(&data, &table).unwrap();
        assert_eq!(
            decompress(&encoded.bytes, encoded.bit_len, data.len(), &tree).unwrap(),
            data
        );
    }

    #[test]
    fn empty_occurrences_are_rejected() {
        assert!(matches!(
            create_huffman_table(&[0; 256]),
            Err(BwhError::InvalidBlock)
        ));
    }

    #[test]
    fn truncated_stream_test() {
        let data = b"abracadabra";
        let (tree, table) = create_huffman_table(&freqs(data)).unwrap();
        let encoded = compress(data, &table).unwrap();
        let result = decompress(&encoded.bytes, encoded.bit_len - 1, data.len(), &tree);
        assert!(matches!(result, Err(BwhError::TruncatedStream(_))));
        let result = decompress(&encoded.bytes[..1], encoded.bit_len, data.len(), &tree);
        assert!(matches!(result, Err(BwhError::TruncatedStream(_))));
    }

    #[test]
    fn extra_bits_are_corrupt() {
        let data = b"abracadabra";
        let (tree, table) = create_huffman_table(&freqs(data)).unwrap();
        let encoded = compress(data, &table).unwrap();
        let result = decompress(&encoded.bytes, encoded.bit_len, data.len() - 1, &tree);
        assert!(matches!(result, Err(BwhError::CorruptData(_))));
    }

    #[test]
    fn huge_symbol_count_runs_out_of_bits() {
        let data = b"abracadabra";
        let (tree, table) = create_huffman_table(&freqs(data)).unwrap();
        let encoded = compress(data, &table).unwrap();
        let result = decompress(&encoded.bytes, encoded.bit_len, usize::MAX, &tree);
        assert!(matches!(result, Err(BwhError::TruncatedStream(_))));
    }

    #[test]
    fn missing_symbol_is_rejected() {
        let (_, table) = create_huffman_table(&freqs(b"ab")).unwrap();
        assert!(matches!(
            compress(b"abc", &table),
            Err(BwhError::MalformedTable(_))
        ));
    }

    #[test]
    fn tree_matches_table_test() {
        let (tree, table) = create_huffman_table(&freqs(b"mississippi river")).unwrap();
        let rebuilt = HuffmanTree::from_table(&table).unwrap();
        assert_eq!(tree, rebuilt);
        assert_eq!(tree.code_lengths(), table.lengths());
    }
}
