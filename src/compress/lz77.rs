//! LZ77 match finding over a 32 KiB sliding window.
//!
//! Positions are indexed by a hash of their first three bytes; each hash
//! bucket is a chain of earlier positions, newest first. Search effort is
//! tuned per compression level the way zlib does it: a chain length cap, a
//! "nice" length that stops the search early, and lazy evaluation that
//! defers a match by one byte when the next position matches longer.

/// Maximum distance to look back for matches (32 KiB window).
pub const MAX_DISTANCE: usize = 32768;

/// Maximum match length (RFC 1951).
pub const MAX_MATCH_LENGTH: usize = 258;

/// Minimum match length worth encoding.
pub const MIN_MATCH_LENGTH: usize = 3;

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const WINDOW_MASK: usize = MAX_DISTANCE - 1;

/// Empty slot marker in `head`/`prev`.
const NIL: u32 = u32::MAX;

/// LZ77 token representing either a literal or a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte that couldn't be compressed.
    Literal(u8),
    /// A back-reference: (length, distance).
    Match {
        /// Length of the match (3-258).
        length: u16,
        /// Distance back to the match (1-32768).
        distance: u16,
    },
}

/// Search effort for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchParams {
    /// Above this length, only a quarter of the chain is searched in lookahead.
    good_length: usize,
    /// Matches at least this long are taken without lookahead.
    max_lazy: usize,
    /// Stop searching once a match this long is found.
    nice_length: usize,
    /// Maximum chain links followed per search.
    max_chain: usize,
    lazy: bool,
}

impl MatchParams {
    fn for_level(level: u8) -> Self {
        let (good_length, max_lazy, nice_length, max_chain, lazy) = match level.clamp(1, 9) {
            1 => (4, 4, 8, 4, false),
            2 => (4, 5, 16, 8, false),
            3 => (4, 6, 32, 32, false),
            4 => (4, 4, 16, 16, true),
            5 => (8, 16, 32, 32, true),
            6 => (8, 16, 128, 128, true),
            7 => (8, 32, 128, 256, true),
            8 => (32, 128, 258, 1024, true),
            _ => (32, 258, 258, 4096, true),
        };
        Self {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
            lazy,
        }
    }
}

#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let v = (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32;
    (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// LZ77 compressor with hash chains.
pub struct Lz77Compressor {
    head: Vec<u32>,
    prev: Vec<u32>,
    params: MatchParams,
}

impl Lz77Compressor {
    /// Create a compressor for level 1-9 (higher = better compression, slower).
    pub fn new(level: u8) -> Self {
        Self {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; MAX_DISTANCE],
            params: MatchParams::for_level(level),
        }
    }

    /// Tokenize `data` into literals and back-references.
    pub fn compress(&mut self, data: &[u8]) -> Vec<Token> {
        self.head.fill(NIL);
        self.prev.fill(NIL);

        let mut tokens = Vec::with_capacity(data.len() / 4 + 16);
        let params = self.params;
        let mut pos = 0;

        while pos < data.len() {
            let found = self.find_longest_match(data, pos, params.max_chain);
            self.insert(data, pos);

            let Some((length, distance)) = found else {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
                continue;
            };

            if params.lazy && length < params.max_lazy && pos + 1 < data.len() {
                let chain = if length >= params.good_length {
                    params.max_chain >> 2
                } else {
                    params.max_chain
                };
                if let Some((next_length, _)) = self.find_longest_match(data, pos + 1, chain) {
                    if next_length > length {
                        tokens.push(Token::Literal(data[pos]));
                        pos += 1;
                        continue;
                    }
                }
            }

            tokens.push(Token::Match {
                length: length as u16,
                distance: distance as u16,
            });
            for p in pos + 1..pos + length {
                self.insert(data, p);
            }
            pos += length;
        }

        tokens
    }

    /// Record `pos` as the newest occurrence of its 3-byte prefix.
    #[inline]
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH_LENGTH > data.len() {
            return;
        }
        let h = hash3(data, pos);
        self.prev[pos & WINDOW_MASK] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Longest match for `pos` as `(length, distance)`, if any reaches
    /// `MIN_MATCH_LENGTH`.
    fn find_longest_match(
        &self,
        data: &[u8],
        pos: usize,
        max_chain: usize,
    ) -> Option<(usize, usize)> {
        if pos + MIN_MATCH_LENGTH > data.len() {
            return None;
        }

        let max_len = MAX_MATCH_LENGTH.min(data.len() - pos);
        let nice = self.params.nice_length.min(max_len);
        let mut best_len = MIN_MATCH_LENGTH - 1;
        let mut best_dist = 0;

        let mut candidate = self.head[hash3(data, pos)];
        let mut chain = max_chain;
        while candidate != NIL && chain > 0 {
            let cand = candidate as usize;
            if cand >= pos || pos - cand > MAX_DISTANCE {
                break;
            }

            // Cheap reject: the byte that would extend the best match.
            if data[cand + best_len] == data[pos + best_len] {
                let len = match_length(data, cand, pos, max_len);
                if len > best_len {
                    best_len = len;
                    best_dist = pos - cand;
                    if len >= nice {
                        break;
                    }
                }
            }

            let next = self.prev[cand & WINDOW_MASK];
            // A slot recycled by a newer position ends the chain.
            if next != NIL && next as usize >= cand {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        (best_len >= MIN_MATCH_LENGTH).then_some((best_len, best_dist))
    }
}

#[inline]
fn match_length(data: &[u8], a: usize, b: usize, max_len: usize) -> usize {
    data[a..a + max_len]
        .iter()
        .zip(&data[b..b + max_len])
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
pub(crate) fn expand(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(b) => out.push(b),
            Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_no_matches() {
        let mut lz = Lz77Compressor::new(6);
        let tokens = lz.compress(b"abcdefgh");
        assert_eq!(tokens.len(), 8);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_simple_repeat() {
        let mut lz = Lz77Compressor::new(6);
        let tokens = lz.compress(b"abcabcabcabc");
        assert_eq!(
            tokens,
            vec![
                Token::Literal(b'a'),
                Token::Literal(b'b'),
                Token::Literal(b'c'),
                Token::Match {
                    length: 9,
                    distance: 3
                },
            ]
        );
    }

    #[test]
    fn test_solid_scanlines_collapse_to_long_matches() {
        // Two rows of a 100px solid RGB image with filter bytes.
        let mut data = Vec::new();
        for _ in 0..2 {
            data.push(0);
            for _ in 0..100 {
                data.extend_from_slice(&[37, 99, 235]);
            }
        }
        let mut lz = Lz77Compressor::new(9);
        let tokens = lz.compress(&data);
        assert!(tokens.len() < 10, "got {} tokens", tokens.len());
        assert_eq!(expand(&tokens), data);
    }

    #[test]
    fn test_match_limits() {
        let data = vec![7u8; 10_000];
        let mut lz = Lz77Compressor::new(9);
        for token in lz.compress(&data) {
            if let Token::Match { length, distance } = token {
                assert!((MIN_MATCH_LENGTH..=MAX_MATCH_LENGTH).contains(&(length as usize)));
                assert!((1..=MAX_DISTANCE).contains(&(distance as usize)));
            }
        }
    }

    #[test]
    fn test_roundtrip_all_levels() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = Vec::new();
        // Mix of runs, repeats and noise, longer than the window.
        while data.len() < 80_000 {
            match rng.gen_range(0..3) {
                0 => data.extend(std::iter::repeat(rng.gen::<u8>()).take(rng.gen_range(1..300))),
                1 if data.len() > 10 => {
                    let start = rng.gen_range(0..data.len() - 5);
                    let len = rng.gen_range(3..50).min(data.len() - start);
                    let copy = data[start..start + len].to_vec();
                    data.extend(copy);
                }
                _ => data.extend((0..rng.gen_range(1..40)).map(|_| rng.gen::<u8>())),
            }
        }

        for level in 1..=9 {
            let mut lz = Lz77Compressor::new(level);
            assert_eq!(expand(&lz.compress(&data)), data, "level {level}");
        }
    }

    #[test]
    fn test_compressor_is_reusable() {
        let mut lz = Lz77Compressor::new(6);
        let first = lz.compress(b"hello hello hello");
        let second = lz.compress(b"hello hello hello");
        assert_eq!(first, second);
        assert!(lz.compress(&[]).is_empty());
    }
}
