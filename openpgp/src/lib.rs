//! OpenPGP packet framing.
//!
//! This crate decodes a raw octet stream that follows the OpenPGP
//! packet framing format ([Section 4 of RFC 4880]) into a sequence of
//! packets.  Each decoded [`Packet`] carries its format, its [`Tag`],
//! the header octets, the logical body, and the unconsumed rest of
//! the stream.
//!
//! The hard part is the body length.  Old format packets use a fixed
//! width length field (or none at all, in which case the packet runs
//! to the end of the data).  New format packets use a variable width
//! length field, and may split a body into an arbitrary number of
//! *partial* chunks, each preceded by its own length octet.  The
//! decoder reassembles such bodies so that the caller sees one
//! contiguous sequence of octets.
//!
//! Interpreting packet contents (keys, signatures, etc.) is out of
//! scope.  What this crate does provide are the two collaborators
//! that typically surround the framing layer: an [ASCII Armor] reader
//! and writer, and a [decompressor] for compressed data packets,
//! whose contents are again a packet stream.
//!
//! [Section 4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4
//! [ASCII Armor]: armor
//! [decompressor]: compression
//!
//! # Examples
//!
//! ```
//! use openpgp_framing as openpgp;
//! use openpgp::parse::PacketParser;
//! use openpgp::packet::Tag;
//!
//! # fn main() -> openpgp::Result<()> {
//! // A new format marker packet followed by an old format user id.
//! let data = [
//!     0xca, 0x03, b'P', b'G', b'P',
//!     0xb4, 0x03, b'a', b'b', b'c',
//! ];
//!
//! let packets = PacketParser::from_bytes(&data)?.into_packets()?;
//! assert_eq!(packets.len(), 2);
//! assert_eq!(packets[0].tag(), Tag::Marker);
//! assert_eq!(packets[1].tag(), Tag::UserID);
//! assert_eq!(packets[1].body(), b"abc");
//! # Ok(()) }
//! ```

#![warn(missing_docs)]

pub mod armor;
pub mod compression;
pub mod fmt;
mod octets;
pub use octets::Octets;
pub mod packet;
pub use packet::Packet;
pub mod parse;
pub mod serialize;

use crate::compression::CompressionAlgorithm;

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// Errors used in this crate.
///
/// Functions return [`anyhow::Error`]s.  To find out which condition
/// caused a failure, use `downcast_ref`:
///
/// ```
/// use openpgp_framing as openpgp;
/// use openpgp::Error;
/// use openpgp::parse::PacketParser;
///
/// let err = PacketParser::decode(&[0x3f, 0x00][..]).unwrap_err();
/// assert!(matches!(err.downcast_ref::<Error>(),
///                  Some(Error::MalformedTag(0x3f))));
/// ```
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// There was nothing to decode.
    #[error("Empty input")]
    EmptyInput,

    /// The most significant bit of the packet tag is not set.
    #[error("Malformed packet tag: {0:#04x}")]
    MalformedTag(u8),

    /// The packet tag names a packet type that is not defined.
    #[error("Unknown packet type: {0}")]
    UnknownPacketType(u8),

    /// A length cannot be expressed using any length encoding.
    #[error("Unsupported length encoding: {0}")]
    UnsupportedLengthEncoding(String),

    /// The packet's length exceeds the available data.
    #[error("Truncated input: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// The number of bytes the packet claims to occupy.
        needed: usize,
        /// The number of bytes that are available.
        available: usize,
    },

    /// The packet's framing is inconsistent.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// A configured resource limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// The armor's checksum does not match the data.
    #[error("Checksum mismatch: expected {expected:06x}, computed {computed:06x}")]
    ChecksumMismatch {
        /// The CRC-24 stored in the armor.
        expected: u32,
        /// The CRC-24 of the decoded data.
        computed: u32,
    },

    /// The ASCII Armor is malformed.
    #[error("Malformed ASCII Armor: {0}")]
    MalformedArmor(String),

    /// The compression algorithm is known, but not supported.
    #[error("Unsupported compression algorithm: {0}")]
    UnsupportedCompression(CompressionAlgorithm),

    /// The compression algorithm is not known.
    #[error("Unknown compression algorithm: {0}")]
    UnknownCompressionAlgorithm(CompressionAlgorithm),
}
