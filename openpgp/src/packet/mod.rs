//! Packet-related types.
//!
//! See [Section 4 of RFC 4880] for more details.
//!
//!   [Section 4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4

use crate::Octets;

pub mod ctb;
pub use self::ctb::CTB;
pub mod header;
pub use self::header::{BodyLength, Header, LengthDescriptor};
mod tag;
pub use self::tag::Tag;

/// A decoded OpenPGP packet.
///
/// A `Packet` is the result of decoding the head of an octet stream.
/// Besides the packet's header and body, it holds the rest of the
/// stream ([`Packet::residual`]), which is where the next packet
/// starts.
///
/// Note: when the body uses partial body lengths, the header and the
/// body together are *shorter* than the packet's encoding, because
/// the length markers interleaved with the body are not part of
/// either.  [`Packet::encoded_len`] is the number of octets the packet
/// occupied in the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    header: Header,
    header_octets: Octets,
    body: Octets,
    encoded_len: usize,
    residual: Octets,
}

impl Packet {
    pub(crate) fn new(header: Header, header_octets: Octets, body: Octets,
                      encoded_len: usize, residual: Octets) -> Self {
        Packet { header, header_octets, body, encoded_len, residual }
    }

    /// Returns the packet's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the packet's format.
    pub fn format(&self) -> ctb::Format {
        self.header.format()
    }

    /// Returns the packet's type.
    pub fn tag(&self) -> Tag {
        self.header.tag()
    }

    /// Returns the header as it was encoded.
    ///
    /// This is the CTB followed by the first length field.
    pub fn header_octets(&self) -> &[u8] {
        &self.header_octets
    }

    /// Returns the packet's body.
    ///
    /// Any partial body length markers have been removed.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the packet's body as `Octets`.
    ///
    /// This is cheap; use it to decode a body that is itself a packet
    /// stream.
    pub fn body_octets(&self) -> &Octets {
        &self.body
    }

    /// Returns the number of octets the packet occupied in the stream.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    /// Returns the data following this packet.
    pub fn residual(&self) -> &Octets {
        &self.residual
    }

    /// Splits the packet into itself and the data following it.
    ///
    /// The returned packet's residual is empty.
    pub fn into_residual(mut self) -> (Packet, Octets) {
        let residual = std::mem::take(&mut self.residual);
        (self, residual)
    }
}
