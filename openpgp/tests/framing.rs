use std::env;
use std::fs;
use std::path::PathBuf;

use openpgp_framing as openpgp;
use openpgp::Error;
use openpgp::armor::{self, Kind};
use openpgp::packet::Tag;
use openpgp::packet::ctb::Format;
use openpgp::parse::{PacketParser, PacketParserBuilder, PacketPile};

/// Computes the path to a file in the test data directory.
fn test_data(name: &str) -> PathBuf {
    let manifest_dir = PathBuf::from(
        env::var_os("CARGO_MANIFEST_DIR")
        .as_ref()
        .expect("CARGO_MANIFEST_DIR not set"));

    manifest_dir.join("tests").join("data").join(name)
}

fn read(name: &str) -> Vec<u8> {
    fs::read(test_data(name)).unwrap()
}

fn tags(pile: &PacketPile) -> Vec<(usize, Tag)> {
    pile.descendants().map(|(depth, p)| (depth, p.tag())).collect()
}

#[cfg(feature = "compression-deflate")]
#[test]
fn armored_zlib_message() {
    let armored = read("messages/compressed-zlib.asc");
    let reader = armor::Reader::from_bytes(&armored, Some(Kind::Message))
        .unwrap();
    assert_eq!(reader.headers(), &[
        ("Comment".to_string(), "zlib compressed literal data".to_string()),
    ]);
    let data = reader.into_octets();

    let packets = PacketParser::from_octets(data.clone())
        .into_packets().unwrap();
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].tag(), Tag::Marker);
    assert_eq!(packets[0].body(), b"PGP");

    // Old format, indeterminate length: runs to the end of the data.
    let compressed = &packets[1];
    assert_eq!(compressed.tag(), Tag::CompressedData);
    assert_eq!(compressed.format(), Format::Old);
    assert_eq!(compressed.header_octets(), &[0xa3]);
    assert_eq!(compressed.body().len(), data.len() - 5 - 1);
    assert!(compressed.residual().is_empty());

    let pile = PacketParserBuilder::from_octets(data)
        .into_packet_pile().unwrap();
    assert_eq!(tags(&pile), vec![
        (0, Tag::Marker),
        (0, Tag::CompressedData),
        (1, Tag::Literal),
    ]);
    let (_, literal) = pile.descendants().last().unwrap();
    assert!(literal.body().ends_with(b"Hello, world!\n"));
    assert_eq!(literal.body().len(), 20);
}

#[test]
fn armored_bad_checksum() {
    let armored = read("messages/compressed-zlib-bad-checksum.asc");
    let e = armor::Reader::from_bytes(&armored, None).unwrap_err();
    assert_eq!(e.downcast_ref::<Error>(),
               Some(&Error::ChecksumMismatch {
                   expected: 0x02412a,
                   computed: 0x02412b,
               }));
}

#[cfg(feature = "compression-deflate")]
#[test]
fn nested_compression() {
    let data = read("messages/nested-zip.pgp");
    let pile = PacketPile::from_bytes(&data).unwrap();
    assert_eq!(tags(&pile), vec![
        (0, Tag::CompressedData),
        (1, Tag::CompressedData),
        (2, Tag::Marker),
        (2, Tag::Literal),
    ]);

    let (_, literal) = pile.descendants().last().unwrap();
    assert_eq!(literal.header().lengths().segments(), &[446, 512, 2048]);
    assert_eq!(literal.body().len(), 3006);
    assert!(literal.body()[6..].iter().enumerate()
            .all(|(i, &b)| b == (i * 7) as u8));

    let shallow = PacketParserBuilder::from_bytes(&data).unwrap()
        .max_recursion_depth(1)
        .into_packet_pile().unwrap();
    assert_eq!(tags(&shallow), vec![
        (0, Tag::CompressedData),
        (1, Tag::CompressedData),
    ]);
}

#[cfg(feature = "compression-deflate")]
#[test]
fn decompression_is_bounded() {
    let data = read("messages/nested-zip.pgp");
    let e = PacketParserBuilder::from_bytes(&data).unwrap()
        .max_body_length(1000)
        .into_packet_pile().unwrap_err();
    assert!(matches!(e.downcast_ref::<Error>(),
                     Some(Error::LimitExceeded(_))));
}

#[test]
fn partial_body_literal() {
    let data = read("messages/partial-literal.pgp");
    let packets = PacketParser::from_bytes(&data).unwrap()
        .into_packets().unwrap();
    assert_eq!(packets.len(), 2);

    let literal = &packets[0];
    assert_eq!(literal.header_octets(), &[0xcb, 0xEB]);
    assert_eq!(literal.header().lengths().segments(), &[446, 512, 2048]);
    assert_eq!(literal.body().len(), 3006);
    assert_eq!(literal.encoded_len(), 3011);
    assert_eq!(literal.residual().len(), 5);
    assert_eq!(packets[1].tag(), Tag::Marker);
}

#[test]
fn chunking_is_irrelevant() {
    for name in &["messages/nested-zip.pgp", "messages/partial-literal.pgp"] {
        let data = read(name);
        let whole = PacketParser::from_bytes(&data).unwrap()
            .into_packets().unwrap();
        for size in &[1, 3, 7, 512] {
            let chunked = PacketParser::from_chunks(data.chunks(*size))
                .unwrap().into_packets().unwrap();
            assert_eq!(whole, chunked, "{} in {} byte chunks", name, size);
        }
    }
}

#[test]
fn truncated_file() {
    let data = read("messages/partial-literal.pgp");
    let e = PacketParser::from_bytes(&data[..3000]).unwrap()
        .into_packets().unwrap_err();
    assert!(matches!(e.downcast_ref::<Error>(),
                     Some(Error::TruncatedInput { .. })));
}
