use std::convert::TryFrom;
use std::fmt;

use log::debug;

use crate::{Octets, Packet, Result};
use crate::compression::CompressedData;
use crate::packet::Tag;
use crate::parse::{Limits, PacketParser, PacketParserBuilder};

/// A packet and the packets it contains.
///
/// Only compressed data packets have children.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    packet: Packet,
    children: Vec<Node>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.packet.tag())
            .field("body_len", &self.packet.body().len())
            .field("children", &self.children)
            .finish()
    }
}

impl Node {
    /// Returns the packet.
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Returns the packets contained in this packet.
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// An unstructured packet sequence, whose compressed data packets
/// have been decompressed and decoded.
///
/// # Examples
///
/// ```
/// use openpgp_framing as openpgp;
/// use openpgp::packet::Tag;
/// use openpgp::parse::PacketPile;
///
/// # fn main() -> openpgp::Result<()> {
/// let data = [
///     // A compressed data packet using no compression, which
///     // contains a marker packet.
///     0xc8, 0x06, 0x00, 0xca, 0x03, b'P', b'G', b'P',
/// ];
///
/// let pile = PacketPile::from_bytes(&data)?;
/// let tags: Vec<(usize, Tag)> = pile.descendants()
///     .map(|(depth, p)| (depth, p.tag()))
///     .collect();
/// assert_eq!(tags, vec![(0, Tag::CompressedData), (1, Tag::Marker)]);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketPile {
    top_level: Vec<Node>,
}

impl PacketPile {
    /// Decodes the packets in `bytes` using the default settings.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        PacketParserBuilder::from_bytes(bytes)?.into_packet_pile()
    }

    pub(super) fn decode(data: Octets, limits: &Limits, max_depth: u8)
                         -> Result<Self> {
        Ok(PacketPile {
            top_level: Self::decode_level(data, limits, 0, max_depth)?,
        })
    }

    fn decode_level(data: Octets, limits: &Limits, depth: u8, max_depth: u8)
                    -> Result<Vec<Node>> {
        let parser = PacketParserBuilder::from_octets(data)
            .limits(*limits)
            .finalize();

        let mut nodes = Vec::new();
        for packet in parser {
            let packet = packet?;
            let children = if packet.tag() == Tag::CompressedData
                && depth < max_depth
            {
                let cd = CompressedData::from_packet(&packet)?;
                debug!("descending into {} compressed data at depth {}",
                       cd.algo(), depth + 1);
                let data = cd.decompress_bounded(limits.max_body_length)?;
                Self::decode_level(data, limits, depth + 1, max_depth)?
            } else {
                Vec::new()
            };

            nodes.push(Node { packet, children });
        }

        Ok(nodes)
    }

    /// Returns the top-level packets.
    pub fn children(&self) -> &[Node] {
        &self.top_level
    }

    /// Returns all packets in depth-first order, together with their
    /// nesting depth.
    pub fn descendants(&self) -> impl Iterator<Item = (usize, &Packet)> {
        let mut stack: Vec<(usize, &Node)> =
            self.top_level.iter().rev().map(|n| (0, n)).collect();
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
            Some((depth, &node.packet))
        })
    }

    /// Returns the top-level packets, discarding any children.
    pub fn into_packets(self) -> Vec<Packet> {
        self.top_level.into_iter().map(|n| n.packet).collect()
    }
}

impl TryFrom<PacketParser> for PacketPile {
    type Error = anyhow::Error;

    /// Collects the packets without descending into containers.
    fn try_from(pp: PacketParser) -> Result<Self> {
        Ok(PacketPile {
            top_level: pp.map(|p| p.map(|packet| Node {
                packet,
                children: Vec::new(),
            })).collect::<Result<Vec<_>>>()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    /// Wraps `inner` into an uncompressed compressed data packet.
    fn wrap(inner: &[u8]) -> Vec<u8> {
        assert!(inner.len() < 191);
        let mut v = vec![0xc8, inner.len() as u8 + 1, 0x00];
        v.extend_from_slice(inner);
        v
    }

    #[test]
    fn nesting() {
        let marker = [0xca, 0x03, b'P', b'G', b'P'];
        let mut data = wrap(&wrap(&marker));
        data.extend_from_slice(&[0xb4, 0x01, b'x']);

        let pile = PacketPile::from_bytes(&data).unwrap();
        assert_eq!(pile.children().len(), 2);
        let tags: Vec<(usize, Tag)> =
            pile.descendants().map(|(d, p)| (d, p.tag())).collect();
        assert_eq!(tags, vec![
            (0, Tag::CompressedData),
            (1, Tag::CompressedData),
            (2, Tag::Marker),
            (0, Tag::UserID),
        ]);

        let shallow = PacketParserBuilder::from_bytes(&data).unwrap()
            .max_recursion_depth(1)
            .into_packet_pile().unwrap();
        assert_eq!(shallow.descendants().count(), 3);

        let flat = PacketParserBuilder::from_bytes(&data).unwrap()
            .max_recursion_depth(0)
            .into_packet_pile().unwrap();
        assert_eq!(flat.descendants().count(), 2);
        assert_eq!(flat.into_packets().len(), 2);

        let pp = PacketParser::from_bytes(&data).unwrap();
        assert_eq!(PacketPile::try_from(pp).unwrap().descendants().count(), 2);
    }

    #[test]
    fn errors_propagate() {
        // BZip2.
        let data = [0xc8, 0x02, 0x03, 0x42];
        let e = PacketPile::from_bytes(&data).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::UnsupportedCompression(_))));

        // A malformed packet inside the container.
        let data = wrap(&[0x00]);
        let e = PacketPile::from_bytes(&data).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(), Some(&Error::MalformedTag(0)));
    }
}
