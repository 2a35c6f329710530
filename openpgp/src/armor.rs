//! ASCII Armor.
//!
//! This module deals with ASCII Armored data (see [RFC 4880, section 6]).
//!
//! [RFC 4880, section 6]: https://tools.ietf.org/html/rfc4880#section-6
//!
//! # Scope
//!
//! This implements a subset of the ASCII Armor specification.  Not
//! supported are multipart messages and the cleartext signature
//! framework.  The reader works on data that is completely in memory.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use openpgp_framing as openpgp;
//! use openpgp::armor::{Kind, Reader, Writer};
//!
//! # fn main() -> openpgp::Result<()> {
//! let mut writer = Writer::new(Vec::new(), Kind::Message, &[])?;
//! writer.write_all(&[0xca, 0x03, b'P', b'G', b'P'])?;
//! let armored = writer.finalize()?;
//!
//! let reader = Reader::from_bytes(&armored, Some(Kind::Message))?;
//! assert_eq!(&reader.data()[..], &[0xca, 0x03, b'P', b'G', b'P']);
//! # Ok(()) }
//! ```

use std::cmp::min;
use std::io::{self, Write};
use std::str;

use log::{debug, trace};
#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::{Error, Octets, Result};

mod crc;
pub use self::crc::CRC;

/// The encoded output stream must be represented in lines of no more
/// than 76 characters each (see [RFC 4880, section 6.3]).  GnuPG uses
/// 64.
///
/// [RFC 4880, section 6.3]: https://tools.ietf.org/html/rfc4880#section-6.3
const LINE_LENGTH: usize = 64;

const LINE_ENDING: &str = "\n";

/// Specifies the type of data (see [RFC 4880, section 6.2]).
///
/// [RFC 4880, section 6.2]: https://tools.ietf.org/html/rfc4880#section-6.2
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A generic OpenPGP message.
    Message,
    /// A transferable public key.
    PublicKey,
    /// A transferable secret key.
    SecretKey,
    /// A detached signature.
    Signature,
    /// A generic file.  This is a GnuPG extension.
    File,
}

#[cfg(test)]
impl Arbitrary for Kind {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::Kind::*;
        *g.choose(&[Message, PublicKey, SecretKey, Signature, File])
            .expect("non-empty")
    }
}

impl Kind {
    /// Autodetects the kind of data from an Armor Header Line.
    fn detect(blurb: &[u8]) -> Option<Self> {
        if ! blurb.starts_with(b"-----BEGIN PGP ") {
            return None;
        }

        let kind = &blurb[15..];
        if kind.starts_with(b"MESSAGE-----") {
            Some(Kind::Message)
        } else if kind.starts_with(b"PUBLIC KEY BLOCK-----") {
            Some(Kind::PublicKey)
        } else if kind.starts_with(b"PRIVATE KEY BLOCK-----") {
            Some(Kind::SecretKey)
        } else if kind.starts_with(b"SIGNATURE-----") {
            Some(Kind::Signature)
        } else if kind.starts_with(b"ARMORED FILE-----") {
            Some(Kind::File)
        } else {
            None
        }
    }

    /// Returns the kind of armored data, if `data` starts with an
    /// Armor Header Line.
    ///
    /// Leading whitespace is skipped.  This is meant to tell armored
    /// input from binary input, so unlike the [`Reader`], it does not
    /// skip other text in front of the header line.
    ///
    /// ```
    /// use openpgp_framing::armor::Kind;
    ///
    /// assert_eq!(Kind::sniff(b"\n-----BEGIN PGP SIGNATURE-----\n"),
    ///            Some(Kind::Signature));
    /// assert_eq!(Kind::sniff(&[0xca, 0x03, b'P', b'G', b'P']), None);
    /// ```
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let start = data.iter().position(|c| ! c.is_ascii_whitespace())?;
        Self::detect(&data[start..])
    }

    fn blurb(&self) -> &str {
        match self {
            Kind::Message => "MESSAGE",
            Kind::PublicKey => "PUBLIC KEY BLOCK",
            Kind::SecretKey => "PRIVATE KEY BLOCK",
            Kind::Signature => "SIGNATURE",
            Kind::File => "ARMORED FILE",
        }
    }

    fn begin(&self) -> String {
        format!("-----BEGIN PGP {}-----", self.blurb())
    }

    fn end(&self) -> String {
        format!("-----END PGP {}-----", self.blurb())
    }
}

/// A filter that applies ASCII Armor to the data written to it.
///
/// The Armor Header Line and the armor headers are written right
/// away.  The footer is written by [`Writer::finalize`], or, failing
/// that, when the writer is dropped.
pub struct Writer<W: Write> {
    sink: Option<W>,
    kind: Kind,
    stash: Vec<u8>,
    column: usize,
    crc: CRC,
}

fn finalized() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "Writer is finalized.")
}

impl<W: Write> Writer<W> {
    /// Constructs a new filter for the given type of data.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::Write;
    /// use openpgp_framing::armor::{Writer, Kind};
    ///
    /// # fn main() -> std::io::Result<()> {
    /// let mut writer = Writer::new(Vec::new(), Kind::File,
    ///                              &[ ("Key", "Value") ][..])?;
    /// writer.write_all(b"Hello world!")?;
    /// let buffer = writer.finalize()?;
    /// assert_eq!(
    ///     String::from_utf8_lossy(&buffer),
    ///     "-----BEGIN PGP ARMORED FILE-----
    /// Key: Value
    ///
    /// SGVsbG8gd29ybGQh
    /// =s4Gu
    /// -----END PGP ARMORED FILE-----
    /// ");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(mut inner: W, kind: Kind, headers: &[(&str, &str)])
               -> io::Result<Self> {
        write!(inner, "{}{}", kind.begin(), LINE_ENDING)?;
        for (key, value) in headers {
            write!(inner, "{}: {}{}", key, value, LINE_ENDING)?;
        }
        // A blank line separates the headers from the body.
        write!(inner, "{}", LINE_ENDING)?;

        Ok(Writer {
            sink: Some(inner),
            kind,
            stash: Vec::with_capacity(3),
            column: 0,
            crc: CRC::new(),
        })
    }

    /// Writes base64 text, breaking lines at `LINE_LENGTH`.
    fn emit(&mut self, mut encoded: &[u8]) -> io::Result<()> {
        let sink = self.sink.as_mut().ok_or_else(finalized)?;
        while ! encoded.is_empty() {
            let n = min(LINE_LENGTH - self.column, encoded.len());
            sink.write_all(&encoded[..n])?;
            encoded = &encoded[n..];
            self.column += n;
            if self.column == LINE_LENGTH {
                sink.write_all(LINE_ENDING.as_bytes())?;
                self.column = 0;
            }
        }
        Ok(())
    }

    /// Writes the stashed octets, the checksum and the footer.
    fn finish(&mut self) -> io::Result<()> {
        if ! self.stash.is_empty() {
            let encoded = base64::encode_config(&self.stash, base64::STANDARD);
            self.stash.clear();
            self.emit(encoded.as_bytes())?;
        }

        let column = self.column;
        let crc = self.crc.finalize();
        let end = self.kind.end();
        let sink = self.sink.as_mut().ok_or_else(finalized)?;
        if column > 0 {
            write!(sink, "{}", LINE_ENDING)?;
        }

        let bytes: [u8; 3] = [
            (crc >> 16) as u8,
            (crc >>  8) as u8,
            crc as u8,
        ];
        write!(sink, "={}{}{}{}",
               base64::encode_config(&bytes, base64::STANDARD),
               LINE_ENDING, end, LINE_ENDING)?;
        self.column = 0;
        Ok(())
    }

    /// Writes the footer and returns the inner writer.
    ///
    /// An empty payload still results in a complete armor frame.
    pub fn finalize(mut self) -> io::Result<W> {
        let result = self.finish();
        let sink = self.sink.take();
        result?;
        sink.ok_or_else(finalized)
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.sink.is_none() {
            return Err(finalized());
        }

        // Update CRC on the unencoded data.
        self.crc.update(buf);

        // Complete the stash first.
        let mut input = buf;
        if ! self.stash.is_empty() {
            let n = min(3 - self.stash.len(), input.len());
            self.stash.extend_from_slice(&input[..n]);
            input = &input[n..];
            if self.stash.len() < 3 {
                return Ok(buf.len());
            }

            let encoded = base64::encode_config(&self.stash, base64::STANDARD);
            self.stash.clear();
            self.emit(encoded.as_bytes())?;
        }

        // Encode a multiple of 3 octets and stash the rest.
        let whole = input.len() - input.len() % 3;
        let encoded = base64::encode_config(&input[..whole], base64::STANDARD);
        self.emit(encoded.as_bytes())?;
        self.stash.extend_from_slice(&input[whole..]);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.as_mut().ok_or_else(finalized)?.flush()
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            let _ = self.finish();
        }
    }
}

/// Strips ASCII Armor from data.
///
/// The reader looks for the first Armor Header Line in the data,
/// skipping any lines in front of it.  It then collects the armor
/// headers, decodes the base64 payload, and verifies the checksum, if
/// there is one.  If anything is amiss, no data is returned at all.
///
/// # Example
///
/// ```
/// use openpgp_framing as openpgp;
/// use openpgp::armor::{Reader, Kind};
///
/// # fn main() -> openpgp::Result<()> {
/// let data =
///     "-----BEGIN PGP ARMORED FILE-----
///
///      SGVsbG8gd29ybGQh
///      =s4Gu
///      -----END PGP ARMORED FILE-----";
///
/// let reader = Reader::from_bytes(data.as_bytes(), Some(Kind::File))?;
/// assert_eq!(reader.kind(), Kind::File);
/// assert_eq!(&reader.data()[..], b"Hello world!");
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Reader {
    kind: Kind,
    headers: Vec<(String, String)>,
    data: Octets,
}

/// Removes the line terminator and surrounding whitespace.
fn trim(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|c| ! c.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line.iter().rposition(|c| ! c.is_ascii_whitespace())
        .map(|i| i + 1)
        .unwrap_or(start);
    &line[start..end]
}

/// Checks whether the given byte is in the base64 character set.
fn is_base64_char(b: &u8) -> bool {
    b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/'
}

/// Parses a checksum line of the form `=XXXX`.
fn parse_checksum(line: &[u8]) -> Option<u32> {
    if line.len() != 5 || line[0] != b'=' || ! line[1..].iter().all(is_base64_char) {
        return None;
    }

    let crc = base64::decode_config(&line[1..], base64::STANDARD).ok()?;
    if crc.len() != 3 {
        return None;
    }
    Some((crc[0] as u32) << 16 | (crc[1] as u32) << 8 | crc[2] as u32)
}

fn malformed<S: Into<String>>(msg: S) -> anyhow::Error {
    Error::MalformedArmor(msg.into()).into()
}

impl Reader {
    /// Dearmors `bytes`.
    ///
    /// If `kind` is given, the first Armor Header Line must be of
    /// that kind.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedArmor`] if the armor frame is
    /// damaged, and with [`Error::ChecksumMismatch`] if the payload
    /// does not match the checksum.
    pub fn from_bytes(bytes: &[u8], kind: Option<Kind>) -> Result<Self> {
        let mut lines = bytes.split(|&c| c == b'\n').map(trim).peekable();

        // Look for the Armor Header Line, skipping any garbage in the
        // process.
        let found = lines.by_ref()
            .find_map(Kind::detect)
            .ok_or_else(|| malformed("No Armor Header Line found"))?;
        if let Some(kind) = kind {
            if kind != found {
                return Err(malformed(format!(
                    "Expected {}, found {}", kind.begin(), found.begin())));
            }
        }
        debug!("found armored {:?}", found);

        // Read the key-value headers.  If the first line is not a
        // header, the blank line is missing, and the line is
        // already part of the body.
        let mut headers = Vec::new();
        while let Some(&line) = lines.peek() {
            if line.is_empty() {
                lines.next();
                break;
            }

            let header = str::from_utf8(line).ok()
                .and_then(|l| {
                    let mut kv = l.splitn(2, ": ");
                    Some((kv.next()?, kv.next()?))
                });
            match header {
                Some((key, value)) => {
                    trace!("armor header {:?}: {:?}", key, value);
                    headers.push((key.to_string(), value.to_string()));
                    lines.next();
                },
                None if headers.is_empty() => break,
                None => return Err(malformed(format!(
                    "Invalid armor header: {}", String::from_utf8_lossy(line)))),
            }
        }

        // Collect the payload up to the footer.
        let end = found.end();
        let mut payload = Vec::new();
        let mut expected_crc = None;
        let mut footer = false;
        for line in lines {
            if line.is_empty() {
                continue;
            }

            if line.starts_with(b"-----") {
                if line != end.as_bytes() {
                    return Err(malformed(format!(
                        "Invalid ASCII Armor footer, expected {}", end)));
                }
                footer = true;
                break;
            }

            if expected_crc.is_some() {
                return Err(malformed("Data after the checksum"));
            }

            if line[0] == b'=' {
                expected_crc = Some(parse_checksum(line).ok_or_else(
                    || malformed("Invalid checksum line"))?);
                continue;
            }

            payload.extend(line.iter().filter(|c| ! c.is_ascii_whitespace()));
        }

        if ! footer {
            return Err(malformed("Armor footer is missing"));
        }

        let data = base64::decode_config(&payload, base64::STANDARD)
            .map_err(|e| malformed(format!("Invalid base64: {}", e)))?;

        let computed = CRC::new().update(&data).finalize();
        match expected_crc {
            Some(expected) if expected != computed =>
                return Err(Error::ChecksumMismatch { expected, computed }
                           .into()),
            Some(_) => trace!("checksum {:06x} ok", computed),
            None => debug!("armor has no checksum"),
        }

        Ok(Reader {
            kind: found,
            headers,
            data: data.into(),
        })
    }

    /// Returns the kind of data.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the armored headers.
    ///
    /// The tuples contain a key and a value.
    ///
    /// Note: if a key occurs multiple times, then there are multiple
    /// entries in the vector with the same key; values with the same
    /// key are *not* combined.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the dearmored data.
    pub fn data(&self) -> &Octets {
        &self.data
    }

    /// Returns the dearmored data, ready to be handed to a
    /// [`PacketParser`].
    ///
    ///   [`PacketParser`]: crate::parse::PacketParser
    pub fn into_octets(self) -> Octets {
        self.data
    }
}
