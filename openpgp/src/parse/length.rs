//! Body length decoding.
//!
//! See [Section 4.2 of RFC 4880] for the encodings.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use log::trace;

use crate::{Error, Result};
use crate::packet::{BodyLength, CTB, LengthDescriptor};
use crate::packet::ctb::PacketLengthType;
use crate::parse::Limits;

/// Returns the `n` octets at `offset`, or fails with `TruncatedInput`.
fn octets(data: &[u8], offset: usize, n: usize) -> Result<&[u8]> {
    offset.checked_add(n)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            Error::TruncatedInput {
                needed: offset.saturating_add(n),
                available: data.len(),
            }.into()
        })
}

fn read_be_u16(data: &[u8], offset: usize) -> Result<u16> {
    let o = octets(data, offset, 2)?;
    Ok(u16::from_be_bytes([o[0], o[1]]))
}

fn read_be_u32(data: &[u8], offset: usize) -> Result<u32> {
    let o = octets(data, offset, 4)?;
    Ok(u32::from_be_bytes([o[0], o[1], o[2], o[3]]))
}

/// Decodes a new format body length as described in [Section 4.2.2
/// of RFC 4880].
///
/// The length field starts at `data[offset]`.  Returns the length and
/// the number of octets the length field occupies.
///
///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
///
/// # Examples
///
/// ```
/// use openpgp_framing::packet::BodyLength;
/// use openpgp_framing::parse::length::body_length_new_format;
///
/// # fn main() -> openpgp_framing::Result<()> {
/// assert_eq!(body_length_new_format(&[0xC5, 0xFB], 0)?,
///            (BodyLength::Full(1723), 2));
/// assert_eq!(body_length_new_format(&[0xEF], 0)?,
///            (BodyLength::Partial(32768), 1));
/// # Ok(()) }
/// ```
pub fn body_length_new_format(data: &[u8], offset: usize)
                              -> Result<(BodyLength, usize)> {
    let octet1 = octets(data, offset, 1)?[0];
    match octet1 {
        // One octet.
        0..=191 => Ok((BodyLength::Full(octet1 as u32), 1)),
        // Two octets length.
        192..=223 => {
            let octet2 = octets(data, offset + 1, 1)?[0];
            Ok((BodyLength::Full(((octet1 as u32 - 192) << 8)
                                 + octet2 as u32 + 192),
                2))
        },
        // Partial body length.
        224..=254 => Ok((BodyLength::Partial(1 << (octet1 & 0x1F)), 1)),
        // Five octets.
        255 => Ok((BodyLength::Full(read_be_u32(data, offset + 1)?), 5)),
    }
}

/// Decodes an old format body length as described in [Section 4.2.1
/// of RFC 4880].
///
/// The length field starts at `data[offset]`.  Returns the length and
/// the number of octets the length field occupies.  Never returns
/// [`BodyLength::Partial`].
///
///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
pub fn body_length_old_format(data: &[u8], offset: usize,
                              length_type: PacketLengthType)
                              -> Result<(BodyLength, usize)> {
    let length = match length_type {
        PacketLengthType::OneOctet =>
            BodyLength::Full(octets(data, offset, 1)?[0] as u32),
        PacketLengthType::TwoOctets =>
            BodyLength::Full(read_be_u16(data, offset)? as u32),
        PacketLengthType::FourOctets =>
            BodyLength::Full(read_be_u32(data, offset)?),
        PacketLengthType::Indeterminate => BodyLength::Indeterminate,
    };
    Ok((length, length_type.field_len()))
}

/// Returns the size of the new format length field that encodes
/// `len`.
///
/// This is the size of the smallest of the one, two and five octet
/// encodings that can hold `len`.  Partial body lengths are not
/// considered.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedLengthEncoding`] if `len` does not
/// fit into 32 bits.
pub fn length_field_len(len: usize) -> Result<usize> {
    if len < 192 {
        Ok(1)
    } else if len < 8384 {
        Ok(2)
    } else if (len as u64) < (1 << 32) {
        Ok(5)
    } else {
        Err(Error::UnsupportedLengthEncoding(
            "cannot infer length of packet length field".into()).into())
    }
}

/// Computes a packet's header length and the lengths of its body's
/// segments.
///
/// This follows partial body length chains to their terminal length,
/// which means that it looks at data past the header.  The chain is
/// followed iteratively, and its cost is bounded by the configured
/// [`Limits`].
#[derive(Clone, Debug, Default)]
pub struct LengthDecoder {
    limits: Limits,
}

impl LengthDecoder {
    /// Returns a decoder enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        LengthDecoder { limits }
    }

    /// Decodes the body length of the packet starting at `data[0]`.
    ///
    /// `ctb` is the packet's parsed CTB.  Returns the header length
    /// (the CTB and the first length field) and the segment lengths
    /// in reverse chronological order.
    ///
    /// For old format packets of indeterminate length, the body is
    /// assumed to extend to the end of `data`.  This is only right if
    /// `data` holds the complete rest of the stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use openpgp_framing::packet::CTB;
    /// use openpgp_framing::parse::length::LengthDecoder;
    ///
    /// # fn main() -> openpgp_framing::Result<()> {
    /// // Old format SED packet, two octet length.
    /// let data = [0xa5, 0x64, 0x64];
    /// let ctb = CTB::from_ptag(data[0])?;
    /// let (header_len, lengths) = LengthDecoder::default().decode(&data, &ctb)?;
    /// assert_eq!(header_len, 3);
    /// assert_eq!(lengths.segments(), &[25700]);
    /// # Ok(()) }
    /// ```
    pub fn decode(&self, data: &[u8], ctb: &CTB)
                  -> Result<(usize, LengthDescriptor)> {
        let (header_len, lengths) = match ctb {
            CTB::Old(ctb) => {
                let (length, n) =
                    body_length_old_format(data, 1, ctb.length_type())?;
                trace!("old format {:?}: {:?}", ctb.length_type(), length);
                match length {
                    BodyLength::Full(l) =>
                        (1 + n, LengthDescriptor::full(l as usize)),
                    BodyLength::Indeterminate =>
                        (1, LengthDescriptor::full(
                            data.len().saturating_sub(1))),
                    BodyLength::Partial(_) =>
                        return Err(Error::MalformedPacket(
                            "Partial body lengths are not supported by \
                             old format packets".into()).into()),
                }
            },
            CTB::New(_) => self.decode_new_format(data)?,
        };

        let body_len = lengths.body_len();
        if body_len > self.limits.max_body_length {
            return Err(Error::LimitExceeded(
                format!("body length {} exceeds the maximum of {}",
                        body_len, self.limits.max_body_length)).into());
        }

        Ok((header_len, lengths))
    }

    fn decode_new_format(&self, data: &[u8])
                         -> Result<(usize, LengthDescriptor)> {
        let mut segments = Vec::new();
        let mut body_len: usize = 0;
        let mut header_len = None;
        let mut offset = 1;

        loop {
            let (length, n) = body_length_new_format(data, offset)?;
            header_len.get_or_insert(offset + n);

            match length {
                BodyLength::Partial(l) => {
                    let l = l as usize;
                    trace!("partial segment #{} at {}: {} bytes",
                           segments.len(), offset, l);

                    segments.push(l);
                    if segments.len() > self.limits.max_partial_segments {
                        return Err(Error::LimitExceeded(
                            format!("more than {} partial body segments",
                                    self.limits.max_partial_segments))
                                   .into());
                    }

                    body_len = body_len.saturating_add(l);
                    if body_len > self.limits.max_body_length {
                        return Err(Error::LimitExceeded(
                            format!("partial body exceeds the maximum \
                                     length of {}",
                                    self.limits.max_body_length)).into());
                    }

                    // Skip the marker and the segment's data.
                    offset = offset.checked_add(n + l).ok_or_else(|| {
                        Error::TruncatedInput {
                            needed: usize::MAX,
                            available: data.len(),
                        }
                    })?;
                },
                BodyLength::Full(l) => {
                    let l = l as usize;
                    trace!("terminal segment at {}: {} bytes ({} octet length)",
                           offset, l, n);

                    // The terminal length's size is recomputed from
                    // its value when splitting and assembling, so it
                    // has to use the smallest encoding.
                    if ! segments.is_empty() && length_field_len(l)? != n {
                        return Err(Error::MalformedPacket(
                            format!("terminal length {} of a partial body \
                                     uses a {} octet encoding", l, n))
                                   .into());
                    }

                    segments.push(l);
                    break;
                },
                BodyLength::Indeterminate =>
                    return Err(Error::MalformedPacket(
                        "indeterminate length in a new format packet".into())
                               .into()),
            }
        }

        // We collected the segments in the order we saw them.
        segments.reverse();
        let lengths = LengthDescriptor::from_segments(segments)
            .ok_or_else(|| Error::MalformedPacket("no body length".into()))?;
        Ok((header_len.unwrap_or(offset), lengths))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(data: &[u8]) -> Result<(usize, LengthDescriptor)> {
        let ctb = CTB::from_ptag(data[0])?;
        LengthDecoder::default().decode(data, &ctb)
    }

    #[test]
    fn new_format() {
        fn test(input: &[u8], expected: BodyLength, n: usize) {
            assert_eq!(body_length_new_format(input, 0).unwrap(),
                       (expected, n));
        }

        // Examples from Section 4.2.3 of RFC4880.

        // Example #1.
        test(&[0x64][..], BodyLength::Full(100), 1);

        // Example #2.
        test(&[0xC5, 0xFB][..], BodyLength::Full(1723), 2);

        // Example #3.
        test(&[0xFF, 0x00, 0x01, 0x86, 0xA0][..], BodyLength::Full(100000), 5);

        // Example #4.
        test(&[0xEF][..], BodyLength::Partial(32768), 1);
        test(&[0xE1][..], BodyLength::Partial(2), 1);
        test(&[0xF0][..], BodyLength::Partial(65536), 1);
        test(&[0xC5, 0xDD][..], BodyLength::Full(1693), 2);

        // Boundaries.
        test(&[0xBF][..], BodyLength::Full(191), 1);
        test(&[0xC0, 0x00][..], BodyLength::Full(192), 2);
        test(&[0xDF, 0xFF][..], BodyLength::Full(8383), 2);
        test(&[0xE0][..], BodyLength::Partial(1), 1);
        test(&[0xFE][..], BodyLength::Partial(1 << 30), 1);
    }

    #[quickcheck_macros::quickcheck]
    fn new_format_is_never_indeterminate(data: Vec<u8>) -> bool {
        match body_length_new_format(&data, 0) {
            Ok((BodyLength::Indeterminate, _)) => false,
            Ok((BodyLength::Partial(l), n)) => l.is_power_of_two() && n == 1,
            Ok((BodyLength::Full(_), n)) => [1, 2, 5].contains(&n),
            Err(_) => data.len() < 5,
        }
    }

    #[test]
    fn new_format_truncated() {
        let e = body_length_new_format(&[0xC5], 0).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::TruncatedInput { needed: 2, available: 1 }));
        let e = body_length_new_format(&[0xcb, 0xFF, 0, 0], 1).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::TruncatedInput { needed: 6, available: 4 }));
    }

    #[test]
    fn old_format() {
        fn test(input: &[u8], plt: PacketLengthType,
                expected: BodyLength, n: usize) {
            assert_eq!(body_length_old_format(input, 0, plt).unwrap(),
                       (expected, n));
        }

        test(&[1], PacketLengthType::OneOctet, BodyLength::Full(1), 1);
        test(&[1, 2], PacketLengthType::TwoOctets,
             BodyLength::Full((1 << 8) + 2), 2);
        test(&[1, 2, 3, 4], PacketLengthType::FourOctets,
             BodyLength::Full((1 << 24) + (2 << 16) + (3 << 8) + 4), 4);
        test(&[1, 2, 3, 4, 5, 6], PacketLengthType::FourOctets,
             BodyLength::Full((1 << 24) + (2 << 16) + (3 << 8) + 4), 4);
        test(&[1, 2, 3, 4], PacketLengthType::Indeterminate,
             BodyLength::Indeterminate, 0);

        assert!(body_length_old_format(&[1], 0, PacketLengthType::TwoOctets)
                .is_err());
    }

    #[test]
    fn field_len() {
        assert_eq!(length_field_len(0).unwrap(), 1);
        assert_eq!(length_field_len(191).unwrap(), 1);
        assert_eq!(length_field_len(192).unwrap(), 2);
        assert_eq!(length_field_len(8383).unwrap(), 2);
        assert_eq!(length_field_len(8384).unwrap(), 5);
        assert_eq!(length_field_len(u32::MAX as usize).unwrap(), 5);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn field_len_too_big() {
        let e = length_field_len(1 << 32).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::UnsupportedLengthEncoding(_))));
    }

    #[test]
    fn header_lengths() {
        // Old format: one, two, four octets, indeterminate.
        assert_eq!(decode(&[0xb4, 3]).unwrap().0, 2);
        assert_eq!(decode(&[0xa5, 0x64, 0x64]).unwrap(),
                   (3, LengthDescriptor::full(25700)));
        assert_eq!(decode(&[0x9a, 0, 0, 1, 0]).unwrap(),
                   (5, LengthDescriptor::full(256)));
        assert_eq!(decode(&[0xa3, 1, 2, 3]).unwrap(),
                   (1, LengthDescriptor::full(3)));

        // New format: one, two, five octets.
        assert_eq!(decode(&[0xcb, 0x64]).unwrap(),
                   (2, LengthDescriptor::full(100)));
        assert_eq!(decode(&[0xcb, 0xC5, 0xFB]).unwrap(),
                   (3, LengthDescriptor::full(1723)));
        assert_eq!(decode(&[0xcb, 0xFF, 0x00, 0x01, 0x86, 0xA0]).unwrap(),
                   (6, LengthDescriptor::full(100000)));
    }

    #[test]
    fn partial_chain() {
        // CTB, then 2 bytes, 1 byte, and a terminal 3 byte segment.
        let data = [0xcb,
                    0xE1, b'a', b'b',
                    0xE0, b'c',
                    0x03, b'd', b'e', b'f'];
        let (header_len, lengths) = decode(&data).unwrap();
        assert_eq!(header_len, 2);
        assert_eq!(lengths.segments(), &[3, 1, 2]);
    }

    #[test]
    fn partial_chain_truncated() {
        // The second marker is missing.
        let data = [0xcb, 0xE1, b'a', b'b'];
        let e = decode(&data).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::TruncatedInput { needed: 5, available: 4 }));
    }

    #[test]
    fn partial_chain_non_minimal_terminal() {
        let data = [0xcb, 0xE0, b'a', 0xFF, 0, 0, 0, 1, b'b'];
        let e = decode(&data).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::MalformedPacket(_))));
    }

    #[test]
    fn limits() {
        // A chain of 1 byte segments.
        let mut data = vec![0xcb];
        for _ in 0..10 {
            data.push(0xE0);
            data.push(0x42);
        }
        data.push(0);

        let ctb = CTB::from_ptag(data[0]).unwrap();
        let (_, lengths) = LengthDecoder::default().decode(&data, &ctb)
            .unwrap();
        assert_eq!(lengths.segments().len(), 11);

        let d = LengthDecoder::new(Limits {
            max_partial_segments: 9,
            ..Default::default()
        });
        let e = d.decode(&data, &ctb).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::LimitExceeded(_))));

        let d = LengthDecoder::new(Limits {
            max_body_length: 5,
            ..Default::default()
        });
        let e = d.decode(&data, &ctb).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::LimitExceeded(_))));

        // Also applies to plain lengths.
        let e = d.decode(&[0xcb, 0x06], &ctb).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::LimitExceeded(_))));
    }
}
