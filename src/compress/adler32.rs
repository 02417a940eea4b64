//! Adler-32 checksum (RFC 1950) for the zlib trailer.

const MOD_ADLER: u32 = 65_521;

/// Largest n such that 255*n*(n+1)/2 + (n+1)*(MOD_ADLER-1) fits in a u32,
/// so the modulo can be deferred to block boundaries.
const NMAX: usize = 5552;

/// Calculate the Adler-32 checksum of `data`.
#[inline]
#[must_use]
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for block in data.chunks(NMAX) {
        for &byte in block {
            a += byte as u32;
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32_empty() {
        assert_eq!(adler32(&[]), 1);
    }

    #[test]
    fn test_adler32_known_values() {
        assert_eq!(adler32(b"hello"), 0x062C_0215);
        assert_eq!(adler32(b"123456789"), 0x091E_01DE);
    }

    #[test]
    fn test_adler32_block_boundaries() {
        // Reference computed with per-byte modulo.
        fn naive(data: &[u8]) -> u32 {
            let (mut a, mut b) = (1u32, 0u32);
            for &x in data {
                a = (a + x as u32) % MOD_ADLER;
                b = (b + a) % MOD_ADLER;
            }
            (b << 16) | a
        }

        for len in [NMAX - 1, NMAX, NMAX + 1, NMAX * 3 + 7] {
            let data = vec![0xFF; len];
            assert_eq!(adler32(&data), naive(&data), "len {len}");
        }
    }
}
