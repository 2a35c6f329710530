use std::fs::{self, File};
use std::io::Write;

use assert_cli::Assert;
use tempfile::TempDir;

use openpgp_framing as openpgp;
use openpgp::armor;
use openpgp::packet::{CTB, Tag};
use openpgp::serialize;

/// A marker packet followed by a literal data packet with a chunked
/// body.
fn message() -> Vec<u8> {
    let mut data = serialize::packet(&CTB::new(Tag::Marker), b"PGP").unwrap();
    let body = vec![b'x'; 1000];
    data.extend(serialize::partial_packet(Tag::Literal, &body, &[512, 488])
                .unwrap());
    data
}

#[test]
fn dump_binary() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("message.pgp");
    fs::write(&input, message()).unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", input.to_str().unwrap()])
        .stdout().contains("Marker Packet, New CTB, header: 2 bytes, \
                            body: 3 bytes, 0 partial body segments")
        .stdout().contains("Literal Data Packet, New CTB, header: 2 bytes, \
                            body: 1000 bytes, 1 partial body segments")
        .unwrap();
}

#[test]
fn dump_armored() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("message.asc");
    let mut w = armor::Writer::new(File::create(&input).unwrap(),
                                   armor::Kind::Message, &[]).unwrap();
    w.write_all(&message()).unwrap();
    w.finalize().unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", "--hex", input.to_str().unwrap()])
        .stdout().contains("Marker Packet")
        .stdout().contains("50 47 50")
        .stdout().contains("more bytes")
        .unwrap();
}

#[test]
fn dump_malformed() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("truncated.pgp");
    fs::write(&input, &[0xcb, 0x05, b'a']).unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", input.to_str().unwrap()])
        .fails()
        .unwrap();
}

#[test]
fn dearmor() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("message.asc");
    let output = tmp_dir.path().join("message.pgp");
    let mut w = armor::Writer::new(File::create(&input).unwrap(),
                                   armor::Kind::Message, &[]).unwrap();
    w.write_all(&message()).unwrap();
    w.finalize().unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dearmor", input.to_str().unwrap(),
                     "-o", output.to_str().unwrap()])
        .unwrap();
    assert_eq!(fs::read(&output).unwrap(), message());

    // Refuses to overwrite without --force.
    Assert::cargo_binary("sq-frames")
        .with_args(&["dearmor", input.to_str().unwrap(),
                     "-o", output.to_str().unwrap()])
        .fails()
        .unwrap();
}

/// A ZLIB compressed data packet that inflates to a 100000 byte
/// literal data packet.
#[cfg(feature = "compression-deflate")]
fn zlib_literal() -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let literal = serialize::packet(&CTB::new(Tag::Literal), &vec![0; 100000])
        .unwrap();
    let mut e = ZlibEncoder::new(vec![2], Compression::best());
    e.write_all(&literal).unwrap();
    let body = e.finish().unwrap();
    serialize::packet(&CTB::new(Tag::CompressedData), &body).unwrap()
}

#[cfg(feature = "compression-deflate")]
#[test]
fn dump_recursive() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("compressed.pgp");
    fs::write(&input, zlib_literal()).unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", "--recursive", input.to_str().unwrap()])
        .stdout().contains("Algorithm: ZLIB")
        .stdout().contains("  Literal Data Packet, New CTB, header: 6 bytes, \
                            body: 100000 bytes")
        .unwrap();
}

#[cfg(feature = "compression-deflate")]
#[test]
fn dump_bounds_decompression() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("compressed.pgp");
    fs::write(&input, zlib_literal()).unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", "--recursive", "--max-body-length", "10000",
                     input.to_str().unwrap()])
        .fails()
        .and()
        .stderr().contains("Limit exceeded")
        .unwrap();

    // Without --recursive, nothing is decompressed.
    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", "--max-body-length", "10000",
                     input.to_str().unwrap()])
        .stdout().contains("Compressed Data Packet")
        .unwrap();

    Assert::cargo_binary("sq-frames")
        .with_args(&["dump", "--max-body-length", "lots",
                     input.to_str().unwrap()])
        .fails()
        .unwrap();
}
