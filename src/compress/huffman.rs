//! Huffman code construction for DEFLATE.
//!
//! Code lengths come from a standard Huffman tree, then get limited to the
//! DEFLATE maximum while keeping the code complete (Kraft sum exactly 1),
//! which strict inflaters such as zlib require.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::LazyLock;

/// Maximum code length for literal/length and distance codes.
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CODE_LENGTH_CL: usize = 7;

/// Huffman code: (code bits, length in bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// The code bits, MSB-first and right-aligned.
    pub code: u16,
    /// Number of bits in the code; 0 means the symbol is unused.
    pub length: u8,
}

/// Compute length-limited code lengths from symbol frequencies.
///
/// When at most one symbol is used, two codes of length 1 are still
/// produced so the resulting code is complete.
pub fn build_lengths(frequencies: &[u32], max_length: usize) -> Vec<u8> {
    let n = frequencies.len();
    let mut lengths = vec![0u8; n];

    let used: Vec<usize> = (0..n).filter(|&i| frequencies[i] > 0).collect();
    match used.len() {
        0 => {
            if n >= 2 {
                lengths[0] = 1;
                lengths[1] = 1;
            }
            return lengths;
        }
        1 => {
            lengths[used[0]] = 1;
            let other = if used[0] == 0 { 1 } else { 0 };
            if other < n {
                lengths[other] = 1;
            }
            return lengths;
        }
        _ => {}
    }

    // Nodes 0..used.len() are leaves; internal nodes are appended, so a
    // parent always has a larger id than its children.
    let leaves = used.len();
    let mut parent = vec![usize::MAX; 2 * leaves - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = used
        .iter()
        .enumerate()
        .map(|(id, &sym)| Reverse((frequencies[sym] as u64, id)))
        .collect();

    let mut next_id = leaves;
    while let (Some(Reverse((fa, a))), Some(Reverse((fb, b)))) = (heap.pop(), heap.pop()) {
        parent[a] = next_id;
        parent[b] = next_id;
        heap.push(Reverse((fa + fb, next_id)));
        next_id += 1;
    }

    let root = next_id - 1;
    let mut depth = vec![0usize; next_id];
    for id in (0..root).rev() {
        depth[id] = depth[parent[id]] + 1;
    }

    // Count leaves per length, folding anything too deep into max_length.
    let mut bl_count = vec![0u32; max_length + 1];
    for &d in &depth[..leaves] {
        bl_count[d.min(max_length)] += 1;
    }

    let kraft_target = 1u64 << max_length;
    let mut kraft: u64 = (1..=max_length)
        .map(|len| (bl_count[len] as u64) << (max_length - len))
        .sum();
    while kraft > kraft_target {
        // Move one leaf down a level and pair it with a leaf from max_length.
        bl_count[max_length] -= 1;
        if let Some(len) = (1..max_length).rev().find(|&len| bl_count[len] > 0) {
            bl_count[len] -= 1;
            bl_count[len + 1] += 2;
        }
        kraft -= 1;
    }

    // Most frequent symbols get the shortest codes.
    let mut by_freq = used;
    by_freq.sort_by_key(|&sym| (Reverse(frequencies[sym]), sym));
    let mut symbols = by_freq.into_iter();
    for (len, &count) in bl_count.iter().enumerate().skip(1) {
        for sym in symbols.by_ref().take(count as usize) {
            lengths[sym] = len as u8;
        }
    }

    lengths
}

/// Generate canonical Huffman codes from code lengths (RFC 1951 3.2.2).
pub fn generate_canonical_codes(lengths: &[u8]) -> Vec<HuffmanCode> {
    let mut bl_count = [0u16; MAX_CODE_LENGTH + 1];
    for &length in lengths {
        if length > 0 {
            bl_count[length as usize] += 1;
        }
    }

    let mut next_code = [0u16; MAX_CODE_LENGTH + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_CODE_LENGTH {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&length| {
            if length == 0 {
                return HuffmanCode::default();
            }
            let code = next_code[length as usize];
            next_code[length as usize] += 1;
            HuffmanCode { code, length }
        })
        .collect()
}

static FIXED_LITERAL_CODES: LazyLock<Vec<HuffmanCode>> = LazyLock::new(|| {
    let lengths: Vec<u8> = (0..288)
        .map(|sym| match sym {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        })
        .collect();
    generate_canonical_codes(&lengths)
});

static FIXED_DISTANCE_CODES: LazyLock<Vec<HuffmanCode>> =
    LazyLock::new(|| generate_canonical_codes(&[5u8; 32]));

/// DEFLATE fixed Huffman codes for literal/length symbols (0-287).
#[inline]
pub fn fixed_literal_codes() -> &'static [HuffmanCode] {
    &FIXED_LITERAL_CODES
}

/// DEFLATE fixed Huffman codes for distance symbols (0-31).
#[inline]
pub fn fixed_distance_codes() -> &'static [HuffmanCode] {
    &FIXED_DISTANCE_CODES
}
