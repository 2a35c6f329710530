/// A command-line frontend for openpgp-framing.

use anyhow::Context as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

use openpgp_framing as openpgp;
use openpgp::Result;

mod sq_frames_cli;
mod commands;

fn read_input(f: Option<&str>) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    match f {
        Some(f) if f != "-" => {
            File::open(f)
                .with_context(|| format!("Failed to open input file {:?}", f))?
                .read_to_end(&mut data)?;
        },
        _ => {
            io::stdin().read_to_end(&mut data)?;
        },
    }
    Ok(data)
}

fn create_or_stdout(f: Option<&str>, force: bool)
    -> Result<Box<dyn io::Write>> {
    match f {
        None => Ok(Box::new(io::stdout())),
        Some(p) if p == "-" => Ok(Box::new(io::stdout())),
        Some(f) => {
            let p = Path::new(f);
            if !p.exists() || force {
                Ok(Box::new(OpenOptions::new()
                            .write(true)
                            .truncate(true)
                            .create(true)
                            .open(f)
                            .context("Failed to create output file")?))
            } else {
                Err(anyhow::anyhow!(
                    format!("File {:?} exists, use --force to overwrite", p)))
            }
        }
    }
}

fn main() -> Result<()> {
    let matches = sq_frames_cli::build().get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    if matches.is_present("trace") {
        logger.filter_level(log::LevelFilter::Trace);
    }
    logger.init();

    let force = matches.is_present("force");

    match matches.subcommand() {
        ("dump",  Some(m)) => {
            let max_body_length = m.value_of("max-body-length")
                .map(|v| v.parse::<usize>().with_context(
                    || format!("Invalid --max-body-length {:?}", v)))
                .transpose()?;
            let input = read_input(m.value_of("input"))?;
            let mut output = create_or_stdout(m.value_of("output"), force)?;
            commands::dump(&input, &mut output,
                           m.is_present("recursive"), m.is_present("hex"),
                           max_body_length)?;
        },
        ("dearmor",  Some(m)) => {
            let input = read_input(m.value_of("input"))?;
            let mut output = create_or_stdout(m.value_of("output"), force)?;
            commands::dearmor(&input, &mut output)?;
        },
        _ => unreachable!(),
    }

    Ok(())
}
