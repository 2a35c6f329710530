use std::io::{self, Write};

use openpgp_framing as openpgp;
use openpgp::{Error, Packet, Result};
use openpgp::compression::CompressedData;
use openpgp::fmt::hex;
use openpgp::packet::Tag;
use openpgp::parse::PacketParserBuilder;

/// How much of a body is shown in hex dumps.
const HEX_BODY_PREFIX: usize = 128;

/// Lists the packets in `input`.
///
/// `max_body_length` bounds both packet bodies and decompressed
/// data.  Without `recursive`, compressed data is not decompressed.
pub fn dump(input: &[u8], output: &mut dyn io::Write,
            recursive: bool, hex: bool, max_body_length: Option<usize>)
            -> Result<()> {
    let data = super::binary(input)?;
    if data.is_empty() {
        return Err(Error::EmptyInput.into());
    }

    let mut builder = PacketParserBuilder::from_octets(data);
    if let Some(n) = max_body_length {
        builder = builder.max_body_length(n);
    }
    if ! recursive {
        builder = builder.max_recursion_depth(0);
    }
    let pile = builder.into_packet_pile()?;

    let dumper = PacketDumper { recursive, hex };
    for (depth, packet) in pile.descendants() {
        dumper.dump_packet(output, packet, depth)?;
    }
    output.flush()?;
    Ok(())
}

struct PacketDumper {
    recursive: bool,
    hex: bool,
}

impl PacketDumper {
    fn dump_packet(&self, output: &mut dyn io::Write, p: &Packet,
                   depth: usize)
                   -> Result<()> {
        let i = indent(depth);
        let lengths = p.header().lengths();
        writeln!(output, "{}{}, {}, header: {} bytes, body: {} bytes, \
                          {} partial body segments",
                 i, p.tag(), p.format(), p.header_octets().len(),
                 p.body().len(), lengths.partial_segments())?;

        if self.recursive && p.tag() == Tag::CompressedData {
            let cd = CompressedData::from_packet(p)?;
            writeln!(output, "{}  Algorithm: {}", i, cd.algo())?;
        }

        if self.hex {
            let mut s = String::new();
            hex::dump(&mut s, 0, p.header_octets())?;
            writeln!(output, "{}  Header:", i)?;
            for line in s.lines() {
                writeln!(output, "{}    {}", i, line)?;
            }

            let body = p.body();
            let shown = &body[..body.len().min(HEX_BODY_PREFIX)];
            s.clear();
            hex::dump(&mut s, 0, shown)?;
            writeln!(output, "{}  Body:", i)?;
            for line in s.lines() {
                writeln!(output, "{}    {}", i, line)?;
            }
            if shown.len() < body.len() {
                writeln!(output, "{}    ... {} more bytes", i,
                         body.len() - shown.len())?;
            }
        }

        Ok(())
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
