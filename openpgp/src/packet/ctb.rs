//! Cipher Type Byte.
//!
//! The first octet of every packet is the CTB.  It says which packet
//! format is used, what the packet's type is, and, for old format
//! packets, how the body length is encoded.
//!
//! See [Section 4.2 of RFC 4880] for more details.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use std::convert::TryFrom;
use std::fmt;

use crate::{Error, Result};
use crate::packet::Tag;

/// OpenPGP defines two packet formats: the old and the new format.
///
/// They are distinguished by bit 6 of the CTB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// The old (RFC 1991 compatible) packet format.
    Old,
    /// The new packet format.
    New,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Format::Old => f.write_str("Old CTB"),
            Format::New => f.write_str("New CTB"),
        }
    }
}

/// The PacketLengthType is used as part of the [old CTB], and is
/// partially used to determine the packet's size.
///
/// See [Section 4.2.1 of RFC 4880] for more details.
///
///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
///   [old CTB]: CTBOld
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketLengthType {
    /// A one-octet Body Length header encodes a length of 0 to 191 octets.
    ///
    /// The header is 2 octets long.  It contains the one byte CTB and
    /// the one octet length.
    OneOctet,
    /// A two-octet Body Length header encodes a length of 192 to 8383 octets.
    ///
    /// The header is 3 octets long.  It contains the one byte CTB and
    /// the two octet length.
    TwoOctets,
    /// A four-octet Body Length.
    ///
    /// The header is 5 octets long.  It contains the one byte CTB and
    /// the four octet length.
    FourOctets,
    /// The packet is of indeterminate length.
    ///
    /// Neither the packet header nor the packet itself contain any
    /// information about the length.  The end of the packet is the
    /// end of the data.  RFC 4880 deprecates this; it should only be
    /// used for the last packet of a stream.
    Indeterminate,
}

impl PacketLengthType {
    /// Returns the size of the length field in octets.
    pub fn field_len(self) -> usize {
        match self {
            PacketLengthType::OneOctet => 1,
            PacketLengthType::TwoOctets => 2,
            PacketLengthType::FourOctets => 4,
            PacketLengthType::Indeterminate => 0,
        }
    }
}

impl TryFrom<u8> for PacketLengthType {
    type Error = anyhow::Error;

    fn try_from(u: u8) -> Result<Self> {
        match u {
            0 => Ok(PacketLengthType::OneOctet),
            1 => Ok(PacketLengthType::TwoOctets),
            2 => Ok(PacketLengthType::FourOctets),
            3 => Ok(PacketLengthType::Indeterminate),
            _ => Err(Error::MalformedPacket(
                format!("Invalid packet length type: {}", u)).into()),
        }
    }
}

impl From<PacketLengthType> for u8 {
    fn from(l: PacketLengthType) -> Self {
        match l {
            PacketLengthType::OneOctet => 0,
            PacketLengthType::TwoOctets => 1,
            PacketLengthType::FourOctets => 2,
            PacketLengthType::Indeterminate => 3,
        }
    }
}

/// The new CTB format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CTBNew {
    tag: Tag,
}

impl CTBNew {
    /// Constructs a new-style CTB.
    pub fn new(tag: Tag) -> Self {
        CTBNew { tag }
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// The old CTB format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CTBOld {
    tag: Tag,
    length_type: PacketLengthType,
}

impl CTBOld {
    /// Constructs an old-style CTB.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLengthEncoding`] if the tag cannot
    /// be expressed using an old-style CTB.  Only tags 0-15 fit in
    /// the four bits the old format has.
    pub fn new(tag: Tag, length_type: PacketLengthType) -> Result<Self> {
        let n: u8 = tag.into();
        if n > 15 {
            return Err(Error::UnsupportedLengthEncoding(
                format!("Only tags 0-15 are supported by old format \
                         packets, got: {} ({})", tag, n)).into());
        }

        Ok(CTBOld { tag, length_type })
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the packet's length type.
    pub fn length_type(&self) -> PacketLengthType {
        self.length_type
    }
}

/// A sum type for the different CTB variants.
///
/// There are two CTB variants: the [old CTB format] and the [new CTB
/// format].
///
///   [old CTB format]: CTBOld
///   [new CTB format]: CTBNew
///
/// Note: CTB stands for Cipher Type Byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CTB {
    /// New (current) packet header format.
    New(CTBNew),
    /// Old PGP 2.6 header format.
    Old(CTBOld),
}

impl CTB {
    /// Constructs a new-style CTB.
    pub fn new(tag: Tag) -> Self {
        CTB::New(CTBNew::new(tag))
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            CTB::New(c) => c.tag(),
            CTB::Old(c) => c.tag(),
        }
    }

    /// Returns the packet's format.
    pub fn format(&self) -> Format {
        match self {
            CTB::New(_) => Format::New,
            CTB::Old(_) => Format::Old,
        }
    }

    /// Returns the old format length type, if any.
    ///
    /// New format packets do not have one; their length is encoded
    /// in a variable number of octets following the CTB.
    pub fn length_type(&self) -> Option<PacketLengthType> {
        match self {
            CTB::New(_) => None,
            CTB::Old(c) => Some(c.length_type()),
        }
    }

    /// Parses a CTB as described in [Section 4.2 of RFC 4880].
    ///
    /// This function parses both new and old format CTBs.
    ///
    ///   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedTag`] if the most significant bit
    /// is not set, and with [`Error::UnknownPacketType`] if the tag
    /// is not assigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use openpgp_framing::packet::{CTB, Tag};
    /// use openpgp_framing::packet::ctb::{Format, PacketLengthType};
    ///
    /// # fn main() -> openpgp_framing::Result<()> {
    /// // 0x99 = old format public key packet, two octet length.
    /// let ctb = CTB::from_ptag(0x99)?;
    /// assert_eq!(ctb.format(), Format::Old);
    /// assert_eq!(ctb.tag(), Tag::PublicKey);
    /// assert_eq!(ctb.length_type(), Some(PacketLengthType::TwoOctets));
    /// # Ok(()) }
    /// ```
    pub fn from_ptag(ptag: u8) -> Result<CTB> {
        // The top bit of the ptag must be set.
        if ptag & 0b1000_0000 == 0 {
            return Err(Error::MalformedTag(ptag).into());
        }

        let ctb = if ptag & 0b0100_0000 != 0 {
            let tag = ptag & 0b0011_1111;
            CTB::New(CTBNew::new(Tag::from_numeric(tag)?))
        } else {
            let tag = (ptag & 0b0011_1100) >> 2;
            let length_type = PacketLengthType::try_from(ptag & 0b0000_0011)?;
            CTB::Old(CTBOld::new(Tag::from_numeric(tag)?, length_type)?)
        };

        Ok(ctb)
    }

    /// Returns the CTB's serialized form.
    pub fn to_ptag(&self) -> u8 {
        match self {
            CTB::New(c) => 0b1100_0000 | u8::from(c.tag()),
            CTB::Old(c) =>
                0b1000_0000
                | (u8::from(c.tag()) << 2)
                | u8::from(c.length_type()),
        }
    }
}

impl TryFrom<u8> for CTB {
    type Error = anyhow::Error;

    fn try_from(ptag: u8) -> Result<Self> {
        CTB::from_ptag(ptag)
    }
}
