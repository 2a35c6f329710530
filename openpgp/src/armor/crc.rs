//! Computes the CRC-24, (see [RFC 4880, section 6.1]).
//!
//! [RFC 4880, section 6.1]: https://tools.ietf.org/html/rfc4880#section-6.1

const CRC24_INIT: u32 = 0xB704CE;
const CRC24_POLY: u32 = 0x864CFB;

/// The CRC of every octet value, shifted into the top of the register.
const TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut n = (i as u32) << 16;
        let mut bit = 0;
        while bit < 8 {
            n <<= 1;
            if n & 0x1000000 != 0 {
                n ^= CRC24_POLY;
            }
            bit += 1;
        }
        table[i] = n & 0xFFFFFF;
        i += 1;
    }
    table
}

/// An incremental CRC-24 computation.
///
/// The width is 24 bits, the input and output are not reflected, and
/// the result is not XORed.
#[derive(Clone, Copy, Debug)]
pub struct CRC {
    n: u32,
}

impl Default for CRC {
    fn default() -> Self {
        Self::new()
    }
}

impl CRC {
    /// Starts a new computation.
    pub fn new() -> Self {
        CRC { n: CRC24_INIT }
    }

    /// Adds `buf` to the computation.
    pub fn update(&mut self, buf: &[u8]) -> &Self {
        for octet in buf {
            let index = ((self.n >> 16) ^ *octet as u32) & 0xFF;
            self.n = ((self.n << 8) ^ TABLE[index as usize]) & 0xFFFFFF;
        }
        self
    }

    /// Returns the checksum of the data added so far.
    pub fn finalize(&self) -> u32 {
        self.n & 0xFFFFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn foobarbaz() {
        let b = b"foobarbaz";
        let crcs = [
            0xb704ce,
            0x6d2804,
            0xa2d10d,
            0x4fc255,
            0x7aafca,
            0xc79c46,
            0x7334de,
            0x77dc72,
            0x000f65,
            0xf40d86,
        ];

        for len in 0..b.len() + 1 {
            assert_eq!(CRC::new().update(&b[..len]).finalize(), crcs[len]);
        }
    }

    /// Reference implementation of the bitwise CRC24 computation.
    fn iterative(buf: &[u8]) -> u32 {
        let mut n = CRC24_INIT;
        for octet in buf {
            n ^= (*octet as u32) << 16;
            for _ in 0..8 {
                n <<= 1;
                if n & 0x1000000 > 0 {
                    n ^= CRC24_POLY;
                }
            }
        }
        n & 0xFFFFFF
    }

    #[quickcheck]
    fn compare(b: Vec<u8>) -> bool {
        CRC::new().update(&b).finalize() == iterative(&b)
    }

    #[quickcheck]
    fn incremental(a: Vec<u8>, b: Vec<u8>) -> bool {
        let mut c = CRC::new();
        c.update(&a);
        c.update(&b);
        c.finalize() == iterative(&[a, b].concat())
    }
}
