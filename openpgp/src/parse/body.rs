//! Reassembles a packet's body.

use crate::{Error, Octets, Result};
use crate::packet::LengthDescriptor;
use crate::parse::length::length_field_len;

/// Extracts the logical body from a packet's encoding.
///
/// `packet` is the complete encoding of one packet, as returned by
/// [`split`], and `lengths` its segments in reverse chronological
/// order.
///
/// If the body is not chunked, it is simply the tail of the packet.
/// Otherwise, the segments are peeled off the end of the packet one
/// at a time, terminal segment first, together with the length field
/// preceding each of them.  What remains is the CTB.  The result is
/// the concatenation of the segments in the order they appear in the
/// packet, without any length markers.
///
///   [`split`]: super::split::split
///
/// # Errors
///
/// Fails if `packet` is too short for `lengths`, or if there is data
/// left over besides the CTB.
pub fn assemble(packet: &Octets, lengths: &LengthDescriptor) -> Result<Octets> {
    if ! lengths.is_partial() {
        return packet.take_last(lengths.terminal());
    }

    let mut window = packet.clone();
    let mut segments = Vec::with_capacity(lengths.segments().len());
    for (i, &len) in lengths.segments().iter().enumerate() {
        let marker = if i == 0 {
            length_field_len(len)?
        } else {
            1
        };

        segments.push(window.take_last(len)?);
        window = window.drop_last(len + marker)?;
    }

    if window.len() != 1 {
        return Err(Error::MalformedPacket(
            format!("{} octets left after reassembling the body, \
                     expected just the CTB", window.len())).into());
    }

    // We collected the segments from the back.
    let mut body = Vec::with_capacity(lengths.body_len());
    for segment in segments.iter().rev() {
        body.extend_from_slice(segment);
    }

    Ok(body.into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn full() {
        let packet = Octets::from(&[0xcb, 0x03, b'a', b'b', b'c'][..]);
        let body = assemble(&packet, &LengthDescriptor::full(3)).unwrap();
        assert_eq!(&body[..], b"abc");

        let body = assemble(&packet, &LengthDescriptor::full(0)).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn partial() {
        let packet = Octets::from(&[0xcb,
                                    0xE1, b'a', b'b',
                                    0xE0, b'c',
                                    0x03, b'd', b'e', b'f'][..]);
        let lengths = LengthDescriptor::from_segments(vec![3, 1, 2]).unwrap();
        let body = assemble(&packet, &lengths).unwrap();
        assert_eq!(&body[..], b"abcdef");
    }

    #[test]
    fn partial_empty_terminal() {
        let packet = Octets::from(&[0xcb, 0xE1, b'a', b'b', 0x00][..]);
        let lengths = LengthDescriptor::from_segments(vec![0, 2]).unwrap();
        let body = assemble(&packet, &lengths).unwrap();
        assert_eq!(&body[..], b"ab");
    }

    #[test]
    fn partial_two_octet_terminal() {
        let mut packet = vec![0xcb, 0xE2];
        packet.extend_from_slice(b"wxyz");
        packet.extend_from_slice(&[0xC0, 0x00]);
        packet.extend(std::iter::repeat(b'.').take(192));
        let lengths = LengthDescriptor::from_segments(vec![192, 4]).unwrap();
        let body = assemble(&Octets::from(packet), &lengths).unwrap();
        assert_eq!(body.len(), 196);
        assert_eq!(&body[..5], b"wxyz.");
    }

    #[test]
    fn mismatch() {
        // One octet too many in front.
        let packet = Octets::from(&[0x00, 0xcb,
                                    0xE1, b'a', b'b',
                                    0x01, b'c'][..]);
        let lengths = LengthDescriptor::from_segments(vec![1, 2]).unwrap();
        assert!(assemble(&packet, &lengths).is_err());

        // Too short.
        let packet = Octets::from(&[0xE1, b'a', b'b', 0x01, b'c'][..]);
        assert!(assemble(&packet, &lengths).is_err());
    }
}
