//! Decompression of compressed data packets.
//!
//! A compressed data packet's body consists of a one octet algorithm
//! identifier followed by the compressed data, which, once
//! decompressed, is again a sequence of OpenPGP packets.  See
//! [Section 5.6 of RFC 4880].
//!
//!   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6

use std::fmt;
#[cfg(feature = "compression-deflate")]
use std::io::Read;

use log::debug;
#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::{Error, Octets, Packet, Result};
use crate::packet::Tag;

/// The OpenPGP compression algorithms as defined in [Section 9.3 of RFC 4880].
///
///   [Section 9.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.3
///
/// The values correspond to the serialized format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum CompressionAlgorithm {
    /// Null compression.
    Uncompressed,
    /// DEFLATE Compressed Data.
    ///
    /// See [RFC 1951].
    ///
    /// [RFC 1951]: https://tools.ietf.org/html/rfc1951
    Zip,
    /// ZLIB Compressed Data.
    ///
    /// See [RFC 1950].
    ///
    /// [RFC 1950]: https://tools.ietf.org/html/rfc1950
    Zlib,
    /// bzip2
    BZip2,
    /// Private compression algorithm identifier.
    Private(u8),
    /// Unknown compression algorithm identifier.
    Unknown(u8),
}

impl From<u8> for CompressionAlgorithm {
    fn from(u: u8) -> Self {
        match u {
            0 => CompressionAlgorithm::Uncompressed,
            1 => CompressionAlgorithm::Zip,
            2 => CompressionAlgorithm::Zlib,
            3 => CompressionAlgorithm::BZip2,
            100..=110 => CompressionAlgorithm::Private(u),
            u => CompressionAlgorithm::Unknown(u),
        }
    }
}

impl From<CompressionAlgorithm> for u8 {
    fn from(c: CompressionAlgorithm) -> u8 {
        match c {
            CompressionAlgorithm::Uncompressed => 0,
            CompressionAlgorithm::Zip => 1,
            CompressionAlgorithm::Zlib => 2,
            CompressionAlgorithm::BZip2 => 3,
            CompressionAlgorithm::Private(u) => u,
            CompressionAlgorithm::Unknown(u) => u,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CompressionAlgorithm::Uncompressed => f.write_str("Uncompressed"),
            CompressionAlgorithm::Zip => f.write_str("ZIP"),
            CompressionAlgorithm::Zlib => f.write_str("ZLIB"),
            CompressionAlgorithm::BZip2 => f.write_str("BZip2"),
            CompressionAlgorithm::Private(u) =>
                f.write_fmt(format_args!(
                    "Private/Experimental compression algorithm {}", u)),
            CompressionAlgorithm::Unknown(u) =>
                f.write_fmt(format_args!(
                    "Unknown compression algorithm {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for CompressionAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

impl CompressionAlgorithm {
    /// Returns whether this algorithm is supported.
    pub fn is_supported(&self) -> bool {
        use self::CompressionAlgorithm::*;
        match self {
            Uncompressed => true,
            #[cfg(feature = "compression-deflate")]
            Zip | Zlib => true,
            _ => false,
        }
    }
}

/// Decompresses `data`.
///
/// ZIP is raw DEFLATE.  RFC 4880 says that it uses a 13 bit window,
/// but implementations (GnuPG included) write data using the full 15
/// bit window, so that is what we accept.  ZLIB has the usual header
/// and checksum.
///
/// # Errors
///
/// BZip2 is not supported and fails with
/// [`Error::UnsupportedCompression`].  Private and unknown algorithms
/// fail with [`Error::UnknownCompressionAlgorithm`].
///
/// # Examples
///
/// ```
/// use openpgp_framing::compression::{decompress, CompressionAlgorithm};
///
/// # fn main() -> openpgp_framing::Result<()> {
/// let data = decompress(CompressionAlgorithm::Uncompressed, b"hello")?;
/// assert_eq!(data, b"hello");
/// assert!(decompress(CompressionAlgorithm::BZip2, b"BZh").is_err());
/// # Ok(()) }
/// ```
pub fn decompress(algo: CompressionAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
    decompress_bounded(algo, data, usize::MAX)
}

/// Like [`decompress`], but fails with [`Error::LimitExceeded`] if
/// the decompressed data exceeds `max_len` octets.
pub fn decompress_bounded(algo: CompressionAlgorithm, data: &[u8],
                          max_len: usize)
                          -> Result<Vec<u8>> {
    debug!("decompressing {} bytes using {}", data.len(), algo);

    match algo {
        CompressionAlgorithm::Uncompressed => {
            if data.len() > max_len {
                return Err(too_big(max_len));
            }
            Ok(data.to_vec())
        },
        #[cfg(feature = "compression-deflate")]
        CompressionAlgorithm::Zip =>
            read_bounded(flate2::read::DeflateDecoder::new(data), max_len),
        #[cfg(feature = "compression-deflate")]
        CompressionAlgorithm::Zlib =>
            read_bounded(flate2::read::ZlibDecoder::new(data), max_len),
        CompressionAlgorithm::Private(_) | CompressionAlgorithm::Unknown(_) =>
            Err(Error::UnknownCompressionAlgorithm(algo).into()),
        _ => Err(Error::UnsupportedCompression(algo).into()),
    }
}

fn too_big(max_len: usize) -> anyhow::Error {
    Error::LimitExceeded(
        format!("decompressed data exceeds {} bytes", max_len)).into()
}

#[cfg(feature = "compression-deflate")]
fn read_bounded<R: Read>(reader: R, max_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    // Read one byte more than allowed so that we can tell whether
    // the limit was exceeded.
    reader.take((max_len as u64).saturating_add(1)).read_to_end(&mut out)?;
    if out.len() > max_len {
        return Err(too_big(max_len));
    }
    Ok(out)
}

/// A compressed data packet.
///
/// See [Section 5.6 of RFC 4880] for details.
///
///   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedData {
    algo: CompressionAlgorithm,
    data: Octets,
}

impl CompressedData {
    /// Interprets the body of a compressed data packet.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedPacket`] if `packet` is not a
    /// compressed data packet, or if its body is empty.
    pub fn from_packet(packet: &Packet) -> Result<Self> {
        if packet.tag() != Tag::CompressedData {
            return Err(Error::MalformedPacket(
                format!("Expected a {}, got a {}",
                        Tag::CompressedData, packet.tag())).into());
        }

        let body = packet.body_octets();
        let algo = body.get(0).ok_or_else(|| Error::MalformedPacket(
            "Compressed data packet is empty".into()))?;
        Ok(CompressedData {
            algo: algo.into(),
            data: body.suffix(1)?,
        })
    }

    /// Returns the compression algorithm.
    pub fn algo(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Returns the compressed data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decompresses the data.
    ///
    /// The result is an OpenPGP packet stream, which can be decoded
    /// using a [`PacketParser`].
    ///
    ///   [`PacketParser`]: crate::parse::PacketParser
    pub fn decompress(&self) -> Result<Octets> {
        self.decompress_bounded(usize::MAX)
    }

    /// Like [`CompressedData::decompress`], but bounds the size of
    /// the decompressed data.
    pub fn decompress_bounded(&self, max_len: usize) -> Result<Octets> {
        if self.algo == CompressionAlgorithm::Uncompressed {
            if self.data.len() > max_len {
                return Err(too_big(max_len));
            }
            return Ok(self.data.clone());
        }
        decompress_bounded(self.algo, &self.data, max_len).map(Into::into)
    }
}
