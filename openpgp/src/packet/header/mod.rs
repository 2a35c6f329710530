//! OpenPGP packet headers.

use std::fmt;

use crate::packet::ctb::{CTB, Format};
use crate::packet::Tag;

/// A single body length field.
///
/// This is what one length field says about the packet's body.  A
/// packet that uses partial body lengths has several of them; see
/// [`LengthDescriptor`] for the whole picture.
///
/// See [Section 4.2.2 of RFC 4880] for more details.
///
///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BodyLength {
    /// The body (or, in a partial body chain, its last chunk) has
    /// this length.
    Full(u32),
    /// The parameter is the number of bytes in the current chunk.
    /// This type is only used with new format packets.
    Partial(u32),
    /// The packet extends until the end of the data.  This type is
    /// only used with old format packets.
    Indeterminate,
}

/// The lengths of a packet body's segments.
///
/// A packet that does not use partial body lengths has exactly one
/// segment, which covers the whole body.  A packet that does has one
/// segment per partial body length, plus a terminal segment whose
/// length is encoded using a one, two or five octet length.
///
/// The segments are stored in reverse chronological order: element 0
/// is the terminal segment (the last one read), and the last element
/// is the first segment following the CTB.  This is the order in
/// which the body assembler peels the segments off the end of the
/// packet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LengthDescriptor {
    segments: Vec<usize>,
}

impl LengthDescriptor {
    /// Returns a descriptor for a body that is not chunked.
    pub fn full(len: usize) -> Self {
        LengthDescriptor { segments: vec![len] }
    }

    /// Returns a descriptor for the given segments.
    ///
    /// `segments` is expected in reverse chronological order, i.e.,
    /// the terminal segment first.  Returns `None` if `segments` is
    /// empty.
    pub fn from_segments(segments: Vec<usize>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(LengthDescriptor { segments })
        }
    }

    /// Returns the segment lengths, terminal segment first.
    pub fn segments(&self) -> &[usize] {
        &self.segments
    }

    /// Returns the segment lengths in the order they appear in the
    /// packet.
    pub fn chronological(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().rev().copied()
    }

    /// Returns the terminal segment's length.
    pub fn terminal(&self) -> usize {
        self.segments[0]
    }

    /// Returns whether the body is split using partial body lengths.
    pub fn is_partial(&self) -> bool {
        self.segments.len() > 1
    }

    /// Returns the number of partial (non-terminal) segments.
    ///
    /// Each of them is preceded by a one octet length marker.
    pub fn partial_segments(&self) -> usize {
        self.segments.len() - 1
    }

    /// Returns the length of the logical body.
    pub fn body_len(&self) -> usize {
        self.segments.iter().sum()
    }
}

impl fmt::Debug for LengthDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.segments.iter()).finish()
    }
}

/// An OpenPGP packet's header.
///
/// The header comprises the CTB and the octets of the first length
/// field.  For packets with partial body lengths, the remaining
/// length markers are interleaved with the body and are not part of
/// the header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    /// The packet's CTB.
    ctb: CTB,
    /// The size of the header in octets.
    len: usize,
    /// The body's segments.
    lengths: LengthDescriptor,
}

impl Header {
    /// Creates a new header.
    pub fn new(ctb: CTB, len: usize, lengths: LengthDescriptor) -> Self {
        Header { ctb, len, lengths }
    }

    /// Returns the packet's CTB.
    pub fn ctb(&self) -> &CTB {
        &self.ctb
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.ctb.tag()
    }

    /// Returns the packet's format.
    pub fn format(&self) -> Format {
        self.ctb.format()
    }

    /// Returns the size of the header in octets.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the body's segment lengths.
    pub fn lengths(&self) -> &LengthDescriptor {
        &self.lengths
    }
}
