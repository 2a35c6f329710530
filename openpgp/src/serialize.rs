//! Packet framing serialization.
//!
//! This is the inverse of the [`parse`] module: it frames a body into
//! a packet.  The length fields use the smallest possible encoding.
//!
//!   [`parse`]: crate::parse
//!
//! # Examples
//!
//! ```
//! use openpgp_framing as openpgp;
//! use openpgp::packet::Tag;
//! use openpgp::parse::PacketParser;
//! use openpgp::serialize;
//!
//! # fn main() -> openpgp::Result<()> {
//! let body = vec![0x2a; 1000];
//! let data = serialize::partial_packet(Tag::Literal, &body, &[512, 256, 232])?;
//!
//! let packet = PacketParser::decode(data)?;
//! assert_eq!(packet.body(), &body[..]);
//! assert_eq!(packet.header().lengths().segments(), &[232, 256, 512]);
//! # Ok(()) }
//! ```

use crate::{Error, Result};
use crate::packet::{CTB, Tag};
use crate::packet::ctb::{CTBOld, PacketLengthType};

/// The largest partial body length.
const MAX_PARTIAL_BODY_LENGTH: usize = 1 << 30;

fn unsupported<S: Into<String>>(msg: S) -> anyhow::Error {
    Error::UnsupportedLengthEncoding(msg.into()).into()
}

/// Encodes `len` as a new format body length.
///
/// See [Section 4.2.2 of RFC 4880].
///
///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
///
/// # Errors
///
/// Fails with [`Error::UnsupportedLengthEncoding`] if `len` does not
/// fit into 32 bits.
pub fn body_length_new_format(len: usize) -> Result<Vec<u8>> {
    if len < 192 {
        Ok(vec![len as u8])
    } else if len < 8384 {
        let v = len - 192;
        Ok(vec![(v >> 8) as u8 + 192, v as u8])
    } else if (len as u64) <= u32::MAX as u64 {
        let mut buf = vec![0xFF];
        buf.extend_from_slice(&(len as u32).to_be_bytes());
        Ok(buf)
    } else {
        Err(unsupported(format!("{} bytes do not fit into a length field",
                                len)))
    }
}

/// Encodes `len` as an old format body length of the given type.
///
/// An indeterminate length has no length field.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedLengthEncoding`] if `len` does not
/// fit into the length field.
pub fn body_length_old_format(len: usize, length_type: PacketLengthType)
                              -> Result<Vec<u8>> {
    match length_type {
        PacketLengthType::OneOctet if len <= u8::MAX as usize =>
            Ok(vec![len as u8]),
        PacketLengthType::TwoOctets if len <= u16::MAX as usize =>
            Ok((len as u16).to_be_bytes().to_vec()),
        PacketLengthType::FourOctets if (len as u64) <= u32::MAX as u64 =>
            Ok((len as u32).to_be_bytes().to_vec()),
        PacketLengthType::Indeterminate => Ok(Vec::new()),
        _ => Err(unsupported(format!("{} bytes do not fit into a {:?} length",
                                     len, length_type))),
    }
}

/// Returns the smallest old format length type that can hold `len`.
fn old_length_type(len: usize) -> Result<PacketLengthType> {
    if len <= u8::MAX as usize {
        Ok(PacketLengthType::OneOctet)
    } else if len <= u16::MAX as usize {
        Ok(PacketLengthType::TwoOctets)
    } else if (len as u64) <= u32::MAX as u64 {
        Ok(PacketLengthType::FourOctets)
    } else {
        Err(unsupported(format!("{} bytes do not fit into a length field",
                                len)))
    }
}

/// Frames `body` as a packet with a full body length.
///
/// For an old format CTB, the length type is replaced by the smallest
/// one that can hold the body's length.
pub fn packet(ctb: &CTB, body: &[u8]) -> Result<Vec<u8>> {
    let (ptag, length) = match ctb {
        CTB::New(_) => (ctb.to_ptag(), body_length_new_format(body.len())?),
        CTB::Old(c) => {
            let length_type = old_length_type(body.len())?;
            let ctb = CTB::Old(CTBOld::new(c.tag(), length_type)?);
            (ctb.to_ptag(), body_length_old_format(body.len(), length_type)?)
        },
    };

    let mut buf = Vec::with_capacity(1 + length.len() + body.len());
    buf.push(ptag);
    buf.extend_from_slice(&length);
    buf.extend_from_slice(body);
    Ok(buf)
}

/// Frames `body` as a new format packet using partial body lengths.
///
/// `chunk_sizes` are the sizes of the segments in the order they are
/// written.  All but the last must be powers of two no larger than
/// 2^30, and their sum must be the body's length.  The last segment is
/// written with a full body length.  Note: RFC 4880 requires the first
/// segment to be at least 512 octets, this is not enforced.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedLengthEncoding`] if a partial chunk
/// size cannot be encoded or `tag` is not a [data packet], and with [`Error::MalformedPacket`] if the
/// chunk sizes do not add up.
///
///   [data packet]: Tag::is_data_packet
pub fn partial_packet(tag: Tag, body: &[u8], chunk_sizes: &[usize])
                      -> Result<Vec<u8>> {
    let (last, partial) = match chunk_sizes.split_last() {
        Some(split) => split,
        None => return packet(&CTB::new(tag), body),
    };

    if ! tag.is_data_packet() {
        return Err(unsupported(format!(
            "{} may not use partial body lengths", tag)));
    }

    let total = chunk_sizes.iter()
        .try_fold(0usize, |acc, l| acc.checked_add(*l));
    if total != Some(body.len()) {
        return Err(Error::MalformedPacket(
            format!("chunk sizes do not add up to {} bytes", body.len()))
                   .into());
    }

    let mut buf = Vec::with_capacity(body.len() + chunk_sizes.len() + 5);
    buf.push(CTB::new(tag).to_ptag());

    let mut rest = body;
    for &size in partial {
        if ! size.is_power_of_two() || size > MAX_PARTIAL_BODY_LENGTH {
            return Err(unsupported(format!(
                "{} is not a valid partial body length", size)));
        }
        buf.push(0xE0 | size.trailing_zeros() as u8);
        buf.extend_from_slice(&rest[..size]);
        rest = &rest[size..];
    }

    buf.extend_from_slice(&body_length_new_format(*last)?);
    buf.extend_from_slice(rest);
    Ok(buf)
}
