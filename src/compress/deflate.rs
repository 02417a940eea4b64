//! DEFLATE compression (RFC 1951) and the zlib container (RFC 1950).
//!
//! The whole input becomes a single block: LZ77 tokens coded with either the
//! fixed or a dynamic Huffman table, whichever is smaller. The zlib wrapper
//! falls back to stored blocks when compression does not pay off.

use crate::bits::BitWriter;
use crate::compress::lz77::{Lz77Compressor, Token, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH};
use crate::compress::{adler32::adler32, huffman};

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code-length code lengths are transmitted.
const CL_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

const END_OF_BLOCK: usize = 256;
const NUM_LIT_CODES: usize = 286;
const NUM_DIST_CODES: usize = 30;
const MAX_STORED_BLOCK: usize = 65_535;

/// How the DEFLATE body was coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
    /// Uncompressed stored blocks.
    Stored,
    /// Fixed Huffman codes.
    #[default]
    Fixed,
    /// Dynamic Huffman codes.
    Dynamic,
}

/// Accounting for a single zlib encode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeflateStats {
    /// Number of literal tokens produced by LZ77.
    pub literal_count: usize,
    /// Number of match tokens produced by LZ77.
    pub match_count: usize,
    /// Block coding chosen for the output.
    pub block_type: BlockType,
}

/// Length symbol (257-285), extra bit count and extra value for a match length.
#[inline]
fn length_code(length: u16) -> (u16, u8, u16) {
    debug_assert!(
        (MIN_MATCH_LENGTH as u16..=MAX_MATCH_LENGTH as u16).contains(&length),
        "Invalid length: {length}",
    );
    // 258 has its own code even though 227 + 31 would also reach it.
    let idx = if length == 258 {
        28
    } else {
        LENGTH_BASE.partition_point(|&base| base <= length) - 1
    };
    (
        257 + idx as u16,
        LENGTH_EXTRA[idx],
        length - LENGTH_BASE[idx],
    )
}

/// Distance symbol (0-29), extra bit count and extra value for a distance.
#[inline]
fn distance_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1, "Invalid distance");
    let idx = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;
    (idx as u16, DISTANCE_EXTRA[idx], distance - DISTANCE_BASE[idx])
}

/// Reverse the low `length` bits of a code; DEFLATE sends Huffman codes MSB-first
/// inside an LSB-first bit stream.
#[inline]
fn reverse_bits(code: u16, length: u8) -> u32 {
    if length == 0 {
        return 0;
    }
    (code.reverse_bits() >> (16 - length)) as u32
}

/// Huffman codes pre-reversed for the bit writer, indexed by symbol.
struct CodeTable(Vec<(u32, u8)>);

impl CodeTable {
    fn new(codes: &[huffman::HuffmanCode]) -> Self {
        Self(
            codes
                .iter()
                .map(|c| (reverse_bits(c.code, c.length), c.length))
                .collect(),
        )
    }

    #[inline]
    fn write(&self, writer: &mut BitWriter, symbol: usize) {
        let (code, len) = self.0[symbol];
        writer.write_bits(code, len);
    }
}

/// Compress data using raw DEFLATE (no zlib wrapper).
pub fn deflate(data: &[u8], level: u8) -> Vec<u8> {
    deflate_with_stats(data, level).0
}

fn deflate_with_stats(data: &[u8], level: u8) -> (Vec<u8>, DeflateStats) {
    let tokens = if data.is_empty() {
        Vec::new()
    } else {
        Lz77Compressor::new(level).compress(data)
    };

    let match_count = tokens
        .iter()
        .filter(|t| matches!(t, Token::Match { .. }))
        .count();
    let mut stats = DeflateStats {
        literal_count: tokens.len() - match_count,
        match_count,
        block_type: BlockType::Fixed,
    };

    let fixed = encode_fixed_huffman(&tokens);
    if tokens.is_empty() {
        return (fixed, stats);
    }
    let dynamic = encode_dynamic_huffman(&tokens);
    if dynamic.len() < fixed.len() {
        stats.block_type = BlockType::Dynamic;
        (dynamic, stats)
    } else {
        (fixed, stats)
    }
}

/// Compress data and wrap it in a zlib container (RFC 1950).
pub fn deflate_zlib(data: &[u8], level: u8) -> Vec<u8> {
    deflate_zlib_with_stats(data, level).0
}

/// Compress data in a zlib container, returning bytes plus stats.
pub fn deflate_zlib_with_stats(data: &[u8], level: u8) -> (Vec<u8>, DeflateStats) {
    let (mut body, mut stats) = deflate_with_stats(data, level);
    if should_use_stored(data.len(), body.len()) {
        body = deflate_stored(data);
        stats.block_type = BlockType::Stored;
    }

    let mut output = Vec::with_capacity(body.len() + 6);
    output.extend_from_slice(&zlib_header(level));
    output.extend_from_slice(&body);
    output.extend_from_slice(&adler32(data).to_be_bytes());
    (output, stats)
}

/// Decide whether stored blocks would be no larger than the compressed stream.
fn should_use_stored(data_len: usize, deflated_len: usize) -> bool {
    let blocks = data_len.div_ceil(MAX_STORED_BLOCK).max(1);
    deflated_len >= data_len + blocks * 5
}

/// Build the two-byte zlib header for the given compression level.
fn zlib_header(level: u8) -> [u8; 2] {
    // CM=8 (deflate), CINFO=7 (32K window)
    let cmf: u8 = 0x78;

    let flevel: u8 = match level {
        0..=1 => 0,
        2..=5 => 1,
        6 => 2,
        _ => 3,
    };

    let flg = flevel << 6;
    let fcheck = 31 - ((u16::from(cmf) << 8 | u16::from(flg)) % 31);
    [cmf, flg | (fcheck % 31) as u8]
}

/// DEFLATE stream of stored (uncompressed) blocks.
pub fn deflate_stored(data: &[u8]) -> Vec<u8> {
    let capacity = data.len() + (data.len() / MAX_STORED_BLOCK + 1) * 5;
    let mut writer = BitWriter::with_capacity(capacity);

    let blocks: Vec<&[u8]> = if data.is_empty() {
        vec![&[][..]]
    } else {
        data.chunks(MAX_STORED_BLOCK).collect()
    };
    let last = blocks.len() - 1;

    for (i, block) in blocks.into_iter().enumerate() {
        writer.write_bits(u32::from(i == last), 1); // BFINAL
        writer.write_bits(0, 2); // BTYPE=00
        let len = block.len() as u16;
        let [l0, l1] = len.to_le_bytes();
        let [n0, n1] = (!len).to_le_bytes();
        writer.write_bytes(&[l0, l1, n0, n1]);
        writer.write_bytes(block);
    }

    writer.finish()
}

/// Encode tokens as one final block with the fixed Huffman table.
fn encode_fixed_huffman(tokens: &[Token]) -> Vec<u8> {
    let lit = CodeTable::new(huffman::fixed_literal_codes());
    let dist = CodeTable::new(huffman::fixed_distance_codes());

    let mut writer = BitWriter::with_capacity(tokens.len() + 16);
    writer.write_bits(1, 1); // BFINAL
    writer.write_bits(1, 2); // BTYPE=01
    write_tokens(&mut writer, tokens, &lit, &dist);
    writer.finish()
}

/// Encode tokens as one final block with dynamic Huffman tables.
fn encode_dynamic_huffman(tokens: &[Token]) -> Vec<u8> {
    let mut lit_freqs = vec![0u32; NUM_LIT_CODES];
    let mut dist_freqs = vec![0u32; NUM_DIST_CODES];
    for token in tokens {
        match *token {
            Token::Literal(b) => lit_freqs[b as usize] += 1,
            Token::Match { length, distance } => {
                lit_freqs[length_code(length).0 as usize] += 1;
                dist_freqs[distance_code(distance).0 as usize] += 1;
            }
        }
    }
    lit_freqs[END_OF_BLOCK] += 1;

    let mut lit_lengths = huffman::build_lengths(&lit_freqs, huffman::MAX_CODE_LENGTH);
    let mut dist_lengths = huffman::build_lengths(&dist_freqs, huffman::MAX_CODE_LENGTH);
    let lit = CodeTable::new(&huffman::generate_canonical_codes(&lit_lengths));
    let dist = CodeTable::new(&huffman::generate_canonical_codes(&dist_lengths));

    // Trailing unused codes are not transmitted.
    lit_lengths.truncate(used_prefix(&lit_lengths).max(257));
    dist_lengths.truncate(used_prefix(&dist_lengths).max(1));

    let mut cl_freqs = vec![0u32; 19];
    let rle = rle_code_lengths(&lit_lengths, &dist_lengths, &mut cl_freqs);
    let cl_lengths = huffman::build_lengths(&cl_freqs, huffman::MAX_CODE_LENGTH_CL);
    let cl = CodeTable::new(&huffman::generate_canonical_codes(&cl_lengths));

    let num_cl = CL_ORDER
        .iter()
        .rposition(|&sym| cl_lengths[sym] != 0)
        .map_or(4, |i| (i + 1).max(4));

    let mut writer = BitWriter::with_capacity(tokens.len() / 2 + 64);
    writer.write_bits(1, 1); // BFINAL
    writer.write_bits(2, 2); // BTYPE=10
    writer.write_bits((lit_lengths.len() - 257) as u32, 5); // HLIT
    writer.write_bits((dist_lengths.len() - 1) as u32, 5); // HDIST
    writer.write_bits((num_cl - 4) as u32, 4); // HCLEN

    for &sym in &CL_ORDER[..num_cl] {
        writer.write_bits(cl_lengths[sym] as u32, 3);
    }
    for (sym, extra_value, extra_bits) in rle {
        cl.write(&mut writer, sym as usize);
        writer.write_bits(extra_value as u32, extra_bits);
    }

    write_tokens(&mut writer, tokens, &lit, &dist);
    writer.finish()
}

fn write_tokens(writer: &mut BitWriter, tokens: &[Token], lit: &CodeTable, dist: &CodeTable) {
    for token in tokens {
        match *token {
            Token::Literal(byte) => lit.write(writer, byte as usize),
            Token::Match { length, distance } => {
                let (len_sym, len_bits, len_extra) = length_code(length);
                lit.write(writer, len_sym as usize);
                writer.write_bits(len_extra as u32, len_bits);

                let (dist_sym, dist_bits, dist_extra) = distance_code(distance);
                dist.write(writer, dist_sym as usize);
                writer.write_bits(dist_extra as u32, dist_bits);
            }
        }
    }
    lit.write(writer, END_OF_BLOCK);
}

/// Number of entries up to and including the last non-zero length.
fn used_prefix(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Run-length encode the literal/distance code lengths with symbols 16-18.
///
/// Returns `(symbol, extra value, extra bit count)` triples and fills the
/// code-length symbol frequencies.
fn rle_code_lengths(
    lit_lengths: &[u8],
    dist_lengths: &[u8],
    cl_freqs: &mut [u32],
) -> Vec<(u8, u8, u8)> {
    let seq: Vec<u8> = lit_lengths.iter().chain(dist_lengths).copied().collect();
    let mut encoded = Vec::new();
    let mut emit = |sym: u8, value: u8, bits: u8, freqs: &mut [u32]| {
        freqs[sym as usize] += 1;
        encoded.push((sym, value, bits));
    };

    let mut i = 0;
    while i < seq.len() {
        let curr = seq[i];
        let run = seq[i..].iter().take_while(|&&l| l == curr).count();
        let mut rem = run;

        if curr == 0 {
            while rem >= 11 {
                let take = rem.min(138);
                emit(18, (take - 11) as u8, 7, cl_freqs);
                rem -= take;
            }
            if rem >= 3 {
                emit(17, (rem - 3) as u8, 3, cl_freqs);
                rem = 0;
            }
        } else {
            emit(curr, 0, 0, cl_freqs);
            rem -= 1;
            while rem >= 3 {
                let take = rem.min(6);
                emit(16, (take - 3) as u8, 2, cl_freqs);
                rem -= take;
            }
        }
        for _ in 0..rem {
            emit(curr, 0, 0, cl_freqs);
        }

        i += run;
    }

    encoded
}
