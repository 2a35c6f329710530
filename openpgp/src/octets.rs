use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

use crate::{Error, Result};

/// An immutable, cheaply clonable view of a contiguous run of octets.
///
/// OpenPGP data may reach us in arbitrarily sized pieces (lines of an
/// armored file, chunks of a network read, ...).  `Octets` flattens
/// such a sequence into one contiguous buffer, which the framing
/// decoder can then index and slice without caring how the data was
/// originally chunked.
///
/// Slicing never copies: all views share the same reference-counted
/// buffer.  This means that handing the rest of a stream to the next
/// decoding step is O(1).
#[derive(Clone)]
pub struct Octets {
    buffer: Arc<[u8]>,
    range: Range<usize>,
}

impl Octets {
    /// Flattens the given chunks into one logical sequence.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyInput`] if there are no chunks, or if
    /// all of the chunks are empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use openpgp_framing::Octets;
    ///
    /// # fn main() -> openpgp_framing::Result<()> {
    /// let a = Octets::from_chunks(vec![&b"fo"[..], &b""[..], &b"obar"[..]])?;
    /// let b = Octets::from_chunks(b"foobar".chunks(1))?;
    /// assert_eq!(a, b);
    /// assert_eq!(&a[..], b"foobar");
    /// # Ok(()) }
    /// ```
    pub fn from_chunks<I, C>(chunks: I) -> Result<Self>
        where I: IntoIterator<Item = C>,
              C: AsRef<[u8]>,
    {
        let mut buffer = Vec::new();
        let mut count = 0;
        for chunk in chunks {
            buffer.extend_from_slice(chunk.as_ref());
            count += 1;
        }

        if count == 0 || buffer.is_empty() {
            return Err(Error::EmptyInput.into());
        }

        Ok(buffer.into())
    }

    /// Returns an empty sequence.
    pub fn empty() -> Self {
        Vec::new().into()
    }

    /// Returns the number of octets.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Returns the octet at `index`, if any.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Returns the octets as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[self.range.clone()]
    }

    /// Returns a view of the given subrange.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TruncatedInput`] if the range extends past
    /// the end of the sequence.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::TruncatedInput {
                needed: range.end.max(range.start),
                available: self.len(),
            }.into());
        }

        Ok(Octets {
            buffer: self.buffer.clone(),
            range: self.range.start + range.start
                ..self.range.start + range.end,
        })
    }

    /// Splits the sequence into the first `mid` octets and the rest.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TruncatedInput`] if `mid` exceeds the
    /// sequence's length.
    pub fn split_at(&self, mid: usize) -> Result<(Self, Self)> {
        Ok((self.prefix(mid)?, self.slice(mid..self.len())?))
    }

    /// Returns the first `n` octets.
    pub fn prefix(&self, n: usize) -> Result<Self> {
        self.slice(0..n)
    }

    /// Returns everything from `offset` onwards.
    pub fn suffix(&self, offset: usize) -> Result<Self> {
        self.slice(offset..self.len().max(offset))
    }

    /// Returns the last `n` octets.
    pub fn take_last(&self, n: usize) -> Result<Self> {
        let start = self.len().checked_sub(n).ok_or_else(|| {
            Error::TruncatedInput { needed: n, available: self.len() }
        })?;
        self.slice(start..self.len())
    }

    /// Returns everything but the last `n` octets.
    pub fn drop_last(&self, n: usize) -> Result<Self> {
        let end = self.len().checked_sub(n).ok_or_else(|| {
            Error::TruncatedInput { needed: n, available: self.len() }
        })?;
        self.slice(0..end)
    }
}

impl From<Vec<u8>> for Octets {
    fn from(v: Vec<u8>) -> Self {
        let len = v.len();
        Octets {
            buffer: v.into(),
            range: 0..len,
        }
    }
}

impl From<&[u8]> for Octets {
    fn from(v: &[u8]) -> Self {
        v.to_vec().into()
    }
}

impl Default for Octets {
    fn default() -> Self {
        Octets::empty()
    }
}

impl Deref for Octets {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Octets {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for Octets {
    fn eq(&self, other: &Octets) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Octets {}

impl PartialEq<[u8]> for Octets {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl fmt::Debug for Octets {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const MAX: usize = 32;
        let s = self.as_slice();
        let prefix = &s[..s.len().min(MAX)];
        f.debug_struct("Octets")
            .field("len", &s.len())
            .field("data", &format_args!(
                "{}{}", crate::fmt::hex::encode(prefix),
                if s.len() > MAX { "..." } else { "" }))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty() {
        let no_chunks: Vec<&[u8]> = Vec::new();
        let e = Octets::from_chunks(no_chunks).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(), Some(&Error::EmptyInput));

        let e = Octets::from_chunks(vec![&b""[..], &b""[..]]).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(), Some(&Error::EmptyInput));

        assert!(Octets::empty().is_empty());
    }

    #[test]
    fn slicing() {
        let o = Octets::from_chunks(vec![&b"0123"[..], &b"45"[..], &b"6789"[..]])
            .unwrap();
        assert_eq!(o.len(), 10);
        assert_eq!(o.get(4), Some(b'4'));
        assert_eq!(o.get(10), None);

        let (a, b) = o.split_at(3).unwrap();
        assert_eq!(&a[..], b"012");
        assert_eq!(&b[..], b"3456789");

        // Views of views are relative to the view.
        let c = b.slice(1..4).unwrap();
        assert_eq!(&c[..], b"456");
        assert_eq!(&c.take_last(2).unwrap()[..], b"56");
        assert_eq!(&c.drop_last(2).unwrap()[..], b"4");
        assert_eq!(&c.suffix(1).unwrap()[..], b"56");
        assert!(c.suffix(3).unwrap().is_empty());

        assert!(o.take_last(11).is_err());
        assert!(o.drop_last(11).is_err());
        assert!(o.split_at(11).is_err());
        assert!(o.slice(5..4).is_err());
    }

    #[test]
    fn truncation_is_reported() {
        let o = Octets::from(&b"abc"[..]);
        let e = o.prefix(5).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::TruncatedInput { needed: 5, available: 3 }));
    }

    #[quickcheck_macros::quickcheck]
    fn chunking_is_irrelevant(data: Vec<u8>, cuts: Vec<usize>) -> bool {
        if data.is_empty() {
            return true;
        }

        let mut cuts: Vec<usize> =
            cuts.into_iter().map(|c| c % (data.len() + 1)).collect();
        cuts.push(0);
        cuts.push(data.len());
        cuts.sort_unstable();

        let chunks: Vec<&[u8]> =
            cuts.windows(2).map(|w| &data[w[0]..w[1]]).collect();
        let o = Octets::from_chunks(chunks).unwrap();
        o.as_slice() == &data[..]
    }
}
