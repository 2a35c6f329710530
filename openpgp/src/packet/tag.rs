use std::convert::TryFrom;
use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::{Error, Result};

/// The OpenPGP packet tags as defined in [Section 4.3 of RFC 4880].
///
///   [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
///
/// The values correspond to the serialized format.  Tags 15, 16 and
/// 20 to 59 are not assigned; trying to convert them fails with
/// [`Error::UnknownPacketType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Reserved Packet tag.
    Reserved,
    /// Public-Key Encrypted Session Key Packet.
    PKESK,
    /// Signature Packet.
    Signature,
    /// Symmetric-Key Encrypted Session Key Packet.
    SKESK,
    /// One-Pass Signature Packet.
    OnePassSig,
    /// Secret-Key Packet.
    SecretKey,
    /// Public-Key Packet.
    PublicKey,
    /// Secret-Subkey Packet.
    SecretSubkey,
    /// Compressed Data Packet.
    CompressedData,
    /// Symmetrically Encrypted Data Packet.
    SED,
    /// Marker Packet (Obsolete Literal Packet).
    Marker,
    /// Literal Data Packet.
    Literal,
    /// Trust Packet.
    Trust,
    /// User ID Packet.
    UserID,
    /// Public-Subkey Packet.
    PublicSubkey,
    /// User Attribute Packet.
    UserAttribute,
    /// Sym. Encrypted and Integrity Protected Data Packet.
    SEIP,
    /// Modification Detection Code Packet.
    MDC,
    /// Private or Experimental Values (60 to 63).
    Private(u8),
}

/// The packet type table, indexed by the numeric tag.
///
/// New format CTBs have room for six bits of tag, so there are 64
/// entries.
const TAGS: [Option<Tag>; 64] = {
    let mut t = [None; 64];
    t[0] = Some(Tag::Reserved);
    t[1] = Some(Tag::PKESK);
    t[2] = Some(Tag::Signature);
    t[3] = Some(Tag::SKESK);
    t[4] = Some(Tag::OnePassSig);
    t[5] = Some(Tag::SecretKey);
    t[6] = Some(Tag::PublicKey);
    t[7] = Some(Tag::SecretSubkey);
    t[8] = Some(Tag::CompressedData);
    t[9] = Some(Tag::SED);
    t[10] = Some(Tag::Marker);
    t[11] = Some(Tag::Literal);
    t[12] = Some(Tag::Trust);
    t[13] = Some(Tag::UserID);
    t[14] = Some(Tag::PublicSubkey);
    t[17] = Some(Tag::UserAttribute);
    t[18] = Some(Tag::SEIP);
    t[19] = Some(Tag::MDC);
    t[60] = Some(Tag::Private(60));
    t[61] = Some(Tag::Private(61));
    t[62] = Some(Tag::Private(62));
    t[63] = Some(Tag::Private(63));
    t
};

impl Tag {
    /// Looks up the numeric packet type `n`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnknownPacketType`] if `n` is not assigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use openpgp_framing::packet::Tag;
    ///
    /// assert_eq!(Tag::from_numeric(11).unwrap(), Tag::Literal);
    /// assert_eq!(Tag::from_numeric(61).unwrap(), Tag::Private(61));
    /// assert!(Tag::from_numeric(15).is_err());
    /// ```
    pub fn from_numeric(n: u8) -> Result<Self> {
        TAGS.get(n as usize)
            .copied()
            .flatten()
            .ok_or_else(|| Error::UnknownPacketType(n).into())
    }

    /// Returns the numeric packet type.
    pub fn to_numeric(self) -> u8 {
        self.into()
    }

    /// Returns whether packets of this type may use partial body
    /// lengths.
    ///
    /// According to [Section 4.2.2.4 of RFC 4880], only data packets
    /// (literal, compressed, and encrypted) may be chunked.  The
    /// decoder does not enforce this, [`partial_packet`] does.
    ///
    ///   [Section 4.2.2.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2.4
    ///   [`partial_packet`]: crate::serialize::partial_packet
    pub fn is_data_packet(self) -> bool {
        matches!(self,
                 Tag::Literal | Tag::CompressedData | Tag::SED | Tag::SEIP)
    }
}

impl TryFrom<u8> for Tag {
    type Error = anyhow::Error;

    fn try_from(n: u8) -> Result<Self> {
        Tag::from_numeric(n)
    }
}

impl From<Tag> for u8 {
    fn from(t: Tag) -> u8 {
        match t {
            Tag::Reserved => 0,
            Tag::PKESK => 1,
            Tag::Signature => 2,
            Tag::SKESK => 3,
            Tag::OnePassSig => 4,
            Tag::SecretKey => 5,
            Tag::PublicKey => 6,
            Tag::SecretSubkey => 7,
            Tag::CompressedData => 8,
            Tag::SED => 9,
            Tag::Marker => 10,
            Tag::Literal => 11,
            Tag::Trust => 12,
            Tag::UserID => 13,
            Tag::PublicSubkey => 14,
            Tag::UserAttribute => 17,
            Tag::SEIP => 18,
            Tag::MDC => 19,
            Tag::Private(x) => x,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::Reserved =>
                f.write_str("Reserved - a packet tag MUST NOT have this value"),
            Tag::PKESK =>
                f.write_str("Public-Key Encrypted Session Key Packet"),
            Tag::Signature =>
                f.write_str("Signature Packet"),
            Tag::SKESK =>
                f.write_str("Symmetric-Key Encrypted Session Key Packet"),
            Tag::OnePassSig =>
                f.write_str("One-Pass Signature Packet"),
            Tag::SecretKey =>
                f.write_str("Secret-Key Packet"),
            Tag::PublicKey =>
                f.write_str("Public-Key Packet"),
            Tag::SecretSubkey =>
                f.write_str("Secret-Subkey Packet"),
            Tag::CompressedData =>
                f.write_str("Compressed Data Packet"),
            Tag::SED =>
                f.write_str("Symmetrically Encrypted Data Packet"),
            Tag::Marker =>
                f.write_str("Marker Packet"),
            Tag::Literal =>
                f.write_str("Literal Data Packet"),
            Tag::Trust =>
                f.write_str("Trust Packet"),
            Tag::UserID =>
                f.write_str("User ID Packet"),
            Tag::PublicSubkey =>
                f.write_str("Public-Subkey Packet"),
            Tag::UserAttribute =>
                f.write_str("User Attribute Packet"),
            Tag::SEIP =>
                f.write_str("Sym. Encrypted and Integrity Protected Data Packet"),
            Tag::MDC =>
                f.write_str("Modification Detection Code Packet"),
            Tag::Private(u) =>
                f.write_fmt(format_args!("Private/Experimental Packet {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Tag {
    fn arbitrary(g: &mut Gen) -> Self {
        loop {
            if let Ok(t) = Tag::from_numeric(u8::arbitrary(g) % 64) {
                return t;
            }
        }
    }
}
