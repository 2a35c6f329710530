//! Utilities for formatting and parsing octets.

/// Utilities for hexadecimal encoding.
pub mod hex {
    use std::fmt::Write;

    /// Encodes the given buffer as hexadecimal number.
    pub fn encode<B: AsRef<[u8]>>(buffer: B) -> String {
        super::to_hex(buffer.as_ref(), false)
    }

    /// Encodes the given buffer as hexadecimal number with spaces
    /// between every group of two octets.
    pub fn encode_pretty<B: AsRef<[u8]>>(buffer: B) -> String {
        super::to_hex(buffer.as_ref(), true)
    }

    /// Decodes the given hexadecimal number.
    ///
    /// Whitespace is skipped.  Returns `None` if `hex` contains a
    /// non-hex character or an odd number of nibbles.
    pub fn decode<H: AsRef<str>>(hex: H) -> Option<Vec<u8>> {
        super::from_hex(hex.as_ref(), true)
    }

    /// Writes annotated hex dumps, like hd(1).
    ///
    /// Offsets are printed relative to `offset`, which lets a caller
    /// dump a slice of a larger buffer.
    pub fn dump<W: Write>(sink: &mut W, offset: usize, data: &[u8])
                          -> std::fmt::Result {
        for (i, line) in data.chunks(16).enumerate() {
            write!(sink, "{:08x} ", offset + i * 16)?;
            for (j, b) in line.iter().enumerate() {
                if j == 8 {
                    sink.write_char(' ')?;
                }
                write!(sink, " {:02x}", b)?;
            }
            for j in line.len()..16 {
                if j == 8 {
                    sink.write_char(' ')?;
                }
                sink.write_str("   ")?;
            }
            sink.write_str("  ")?;
            for b in line {
                let c = *b as char;
                sink.write_char(
                    if c.is_ascii_graphic() || c == ' ' { c } else { '.' })?;
            }
            sink.write_char('\n')?;
        }
        Ok(())
    }
}

fn to_hex(s: &[u8], pretty: bool) -> String {
    use std::fmt::Write;

    let mut result = String::new();
    for (i, b) in s.iter().enumerate() {
        // Add spaces every four digits to make the output more
        // readable.
        if pretty && i > 0 && i % 2 == 0 {
            result.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = write!(&mut result, "{:02X}", b);
    }
    result
}

fn from_hex(hex: &str, skip_whitespace: bool) -> Option<Vec<u8>> {
    let mut nibbles = Vec::with_capacity(hex.len());
    for c in hex.chars() {
        match c.to_digit(16) {
            Some(n) => nibbles.push(n as u8),
            None if skip_whitespace && c.is_whitespace() => (),
            None => return None,
        }
    }

    // We need an even number of nibbles.
    if nibbles.len() % 2 != 0 {
        return None;
    }

    Some(nibbles.chunks(2).map(|n| (n[0] << 4) | n[1]).collect())
}
