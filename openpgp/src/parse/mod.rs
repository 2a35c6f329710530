//! Packet parsing infrastructure.
//!
//! Decoding a packet is a pipeline of small steps, each of which is
//! exposed on its own:
//!
//!   1. The input is flattened into one contiguous [`Octets`]
//!      sequence.
//!   2. The first octet is parsed into a [`CTB`].
//!   3. The [`LengthDecoder`] computes the header's length and the
//!      lengths of the body's segments, following partial body
//!      length chains.
//!   4. [`split::total_packet_length`] computes how many octets the
//!      packet occupies, and [`split::split`] cuts the stream there.
//!   5. [`body::assemble`] removes any length markers from the body.
//!
//! [`PacketParser::decode`] runs the whole pipeline once.  A
//! [`PacketParser`] is an iterator that runs it repeatedly, each time
//! on the residual of the previous packet.  A [`PacketPile`]
//! additionally descends into compressed data packets.
//!
//!   [`CTB`]: crate::packet::CTB
//!   [`LengthDecoder`]: length::LengthDecoder

use log::debug;

use crate::{Error, Octets, Packet, Result};
use crate::packet::{CTB, Header};

pub mod body;
pub mod length;
use self::length::LengthDecoder;
pub mod split;
mod packet_pile;
pub use self::packet_pile::{Node, PacketPile};

/// The default maximum number of partial body segments per packet.
pub const DEFAULT_MAX_PARTIAL_SEGMENTS: usize = 1 << 20;

/// The default maximum size of a packet's body.
pub const DEFAULT_MAX_BODY_LENGTH: usize = u32::MAX as usize;

/// The default amount of acceptable nesting.  Typically, we expect a
/// message to look like:
///
///   [ encryption container: [ signature: [ compressed data: [ literal data ]]]]
///
/// So, this should be more than enough.
pub const MAX_RECURSION_DEPTH: u8 = 16;

/// Resource limits for decoding.
///
/// An attacker can encode a long body as a chain of tiny partial
/// segments, or announce an enormous body.  These limits bound the
/// work and memory spent on a single packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// The maximum number of partial body segments in a packet.
    pub max_partial_segments: usize,
    /// The maximum size of a packet's body, and of decompressed data.
    pub max_body_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_partial_segments: DEFAULT_MAX_PARTIAL_SEGMENTS,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
        }
    }
}

/// Decodes the packet at the start of `data`.
fn decode(data: &Octets, limits: &Limits) -> Result<Packet> {
    let ptag = data.get(0).ok_or(Error::EmptyInput)?;
    let ctb = CTB::from_ptag(ptag)?;

    let (header_len, lengths) =
        LengthDecoder::new(*limits).decode(data, &ctb)?;
    let total = split::total_packet_length(header_len, &lengths)?;
    let (encoded, residual) = split::split(data, total)?;
    let body = body::assemble(&encoded, &lengths)?;
    let header_octets = encoded.prefix(header_len)?;

    debug!("{} ({:?}): header {} bytes, body {} bytes in {} segment(s), \
            {} bytes follow",
           ctb.tag(), ctb.format(), header_len, body.len(),
           lengths.segments().len(), residual.len());

    Ok(Packet::new(Header::new(ctb, header_len, lengths),
                   header_octets, body, total, residual))
}

/// A builder for configuring a [`PacketParser`].
///
/// Since the default settings are usually appropriate, this mechanism
/// will only be needed in exceptional circumstances.  Instead use,
/// for instance, [`PacketParser::from_bytes`] to start decoding an
/// OpenPGP message.
///
/// # Examples
///
/// ```
/// use openpgp_framing as openpgp;
/// use openpgp::parse::PacketParserBuilder;
///
/// # fn main() -> openpgp::Result<()> {
/// // A marker packet.
/// let data = [0xca, 0x03, b'P', b'G', b'P'];
/// let mut pp = PacketParserBuilder::from_bytes(&data)?
///     .max_partial_segments(16)
///     .max_body_length(1024)
///     .finalize();
/// assert_eq!(pp.next().unwrap()?.body(), b"PGP");
/// assert!(pp.next().is_none());
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct PacketParserBuilder {
    data: Octets,
    limits: Limits,
    max_recursion_depth: u8,
}

impl PacketParserBuilder {
    /// Creates a `PacketParserBuilder` for an OpenPGP stream delivered
    /// in chunks.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyInput`] if there is no data.
    pub fn from_chunks<I, C>(chunks: I) -> Result<Self>
        where I: IntoIterator<Item = C>,
              C: AsRef<[u8]>,
    {
        Ok(Self::from_octets(Octets::from_chunks(chunks)?))
    }

    /// Creates a `PacketParserBuilder` for an OpenPGP stream stored in
    /// the specified buffer.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyInput`] if there is no data.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        Self::from_chunks(std::iter::once(bytes))
    }

    /// Creates a `PacketParserBuilder` for an OpenPGP stream stored in
    /// `data`.
    ///
    /// Unlike the other constructors, this accepts empty data, which
    /// results in a parser that yields nothing.
    pub fn from_octets(data: Octets) -> Self {
        PacketParserBuilder {
            data,
            limits: Limits::default(),
            max_recursion_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Sets the maximum number of partial body segments per packet.
    ///
    /// The default is [`DEFAULT_MAX_PARTIAL_SEGMENTS`].
    pub fn max_partial_segments(mut self, value: usize) -> Self {
        self.limits.max_partial_segments = value;
        self
    }

    /// Sets the maximum body length.
    ///
    /// This also bounds the size of decompressed data when building
    /// a [`PacketPile`].  The default is [`DEFAULT_MAX_BODY_LENGTH`].
    pub fn max_body_length(mut self, value: usize) -> Self {
        self.limits.max_body_length = value;
        self
    }

    /// Sets all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the maximum recursion depth.
    ///
    /// This is only relevant for [`PacketParserBuilder::into_packet_pile`].
    /// Setting this to 0 means that compressed data packets are not
    /// decompressed.  The default is [`MAX_RECURSION_DEPTH`].
    pub fn max_recursion_depth(mut self, value: u8) -> Self {
        self.max_recursion_depth = value;
        self
    }

    /// Finishes configuring the `PacketParser`.
    pub fn finalize(self) -> PacketParser {
        PacketParser {
            data: self.data,
            limits: self.limits,
            failed: false,
        }
    }

    /// Decodes the whole stream into a [`PacketPile`], descending
    /// into compressed data packets.
    pub fn into_packet_pile(self) -> Result<PacketPile> {
        PacketPile::decode(self.data, &self.limits, self.max_recursion_depth)
    }
}

/// Decodes a stream of packets.
///
/// A `PacketParser` is an iterator over the packets in a stream.
/// Each item is the result of decoding the head of the data that the
/// previous packet left over.  Decoding stops when there is no more
/// data, or after the first error, which is returned.
///
/// # Examples
///
/// ```
/// use openpgp_framing as openpgp;
/// use openpgp::parse::PacketParser;
///
/// # fn main() -> openpgp::Result<()> {
/// let data = [
///     // Old format user id, one octet length.
///     0xb4, 0x05, b'A', b'l', b'i', b'c', b'e',
///     // New format literal data packet, partial body.
///     0xcb, 0xE1, b'b', 0x00, 0x02, b'H', b'i',
/// ];
///
/// for packet in PacketParser::from_bytes(&data)? {
///     let packet = packet?;
///     println!("{}: {} bytes", packet.tag(), packet.body().len());
/// }
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct PacketParser {
    data: Octets,
    limits: Limits,
    failed: bool,
}

impl PacketParser {
    /// Starts decoding an OpenPGP stream delivered in chunks.
    pub fn from_chunks<I, C>(chunks: I) -> Result<Self>
        where I: IntoIterator<Item = C>,
              C: AsRef<[u8]>,
    {
        Ok(PacketParserBuilder::from_chunks(chunks)?.finalize())
    }

    /// Starts decoding an OpenPGP stream stored in the specified
    /// buffer.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        Ok(PacketParserBuilder::from_bytes(bytes)?.finalize())
    }

    /// Starts decoding an OpenPGP stream stored in `data`.
    pub fn from_octets(data: Octets) -> Self {
        PacketParserBuilder::from_octets(data).finalize()
    }

    /// Decodes the packet at the start of `data` using the default
    /// limits.
    ///
    /// The rest of the data is available as the packet's
    /// [residual](Packet::residual).
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyInput`] if `data` is empty, and with
    /// the other variants of [`Error`] if the packet is malformed.
    pub fn decode<O: Into<Octets>>(data: O) -> Result<Packet> {
        decode(&data.into(), &Limits::default())
    }

    /// Decodes the packet at the start of `data` using the given
    /// limits.
    pub fn decode_with_limits<O: Into<Octets>>(data: O, limits: &Limits)
                                               -> Result<Packet> {
        decode(&data.into(), limits)
    }

    /// Returns the data that has not been decoded yet.
    pub fn remaining(&self) -> &Octets {
        &self.data
    }

    /// Decodes all remaining packets.
    ///
    /// Fails on the first error.
    pub fn into_packets(self) -> Result<Vec<Packet>> {
        self.collect()
    }
}

impl Iterator for PacketParser {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }

        match decode(&self.data, &self.limits) {
            Ok(packet) => {
                self.data = packet.residual().clone();
                Some(Ok(packet))
            },
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            },
        }
    }
}
