//! Splits a packet off the front of a stream.

use crate::{Error, Octets, Result};
use crate::packet::LengthDescriptor;
use crate::parse::length::length_field_len;

/// Returns the number of octets a packet occupies in the stream.
///
/// `header_len` is the size of the CTB plus the first length field,
/// `lengths` the body's segments as returned by the
/// [`LengthDecoder`].
///
/// If the body is not chunked, this is simply the header plus the
/// body.  Otherwise, the packet also contains the length markers
/// interleaved with the body: one octet for each partial segment, and
/// the terminal segment's length field, which is assumed to use the
/// smallest possible encoding.  (The first partial segment's marker
/// is part of the header, so in this case the header length only
/// accounts for the CTB.)
///
///   [`LengthDecoder`]: super::length::LengthDecoder
///
/// # Examples
///
/// ```
/// use openpgp_framing::packet::LengthDescriptor;
/// use openpgp_framing::parse::split::total_packet_length;
///
/// # fn main() -> openpgp_framing::Result<()> {
/// assert_eq!(total_packet_length(2, &LengthDescriptor::full(100))?, 102);
///
/// let chunked = LengthDescriptor::from_segments(
///     vec![1693, 65536, 1, 2, 32768]).unwrap();
/// assert_eq!(total_packet_length(2, &chunked)?, 100000 + 7);
/// # Ok(()) }
/// ```
pub fn total_packet_length(header_len: usize, lengths: &LengthDescriptor)
                           -> Result<usize> {
    let overflow = || -> anyhow::Error {
        Error::UnsupportedLengthEncoding(
            "packet length overflows".into()).into()
    };

    let body_len = lengths.segments().iter()
        .try_fold(0usize, |acc, l| acc.checked_add(*l))
        .ok_or_else(overflow)?;

    if ! lengths.is_partial() {
        return header_len.checked_add(body_len).ok_or_else(overflow);
    }

    // The CTB, one marker per partial segment, the terminal
    // segment's length field, and the data.
    length_field_len(lengths.terminal())?
        .checked_add(lengths.partial_segments())
        .and_then(|n| n.checked_add(body_len))
        .and_then(|n| n.checked_add(1))
        .ok_or_else(overflow)
}

/// Splits `data` into the first `len` octets and the rest.
///
/// # Errors
///
/// Fails with [`Error::TruncatedInput`] if `data` is shorter than
/// `len`.
pub fn split(data: &Octets, len: usize) -> Result<(Octets, Octets)> {
    if len > data.len() {
        return Err(Error::TruncatedInput {
            needed: len,
            available: data.len(),
        }.into());
    }

    data.split_at(len)
}
