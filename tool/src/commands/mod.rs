use std::io;

use openpgp_framing as openpgp;
use openpgp::{armor, Octets, Result};

mod dump;
pub use self::dump::dump;

/// Returns the binary data, removing ASCII Armor if the input starts
/// with an Armor Header Line.
fn binary(input: &[u8]) -> Result<Octets> {
    match armor::Kind::sniff(input) {
        Some(kind) => {
            log::debug!("input is armored ({:?})", kind);
            Ok(armor::Reader::from_bytes(input, Some(kind))?.into_octets())
        },
        None => Ok(Octets::from(input)),
    }
}

pub fn dearmor(input: &[u8], output: &mut dyn io::Write) -> Result<()> {
    let reader = armor::Reader::from_bytes(input, None)?;
    output.write_all(reader.data())?;
    output.flush()?;
    Ok(())
}
