/// Command-line parser for sq-frames.

use clap::{App, Arg, AppSettings, SubCommand};

pub fn build() -> App<'static, 'static> {
    configure(App::new("sq-frames"))
}

/// Defines the CLI.
pub fn configure(app: App<'static, 'static>) -> App<'static, 'static> {
    app
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decodes the packet framing of OpenPGP data.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("force")
             .short("f").long("force")
             .help("Overwrite existing files"))
        .arg(Arg::with_name("trace")
             .long("trace")
             .help("Trace execution"))

        .subcommand(SubCommand::with_name("dump")
                    .display_order(10)
                    .about("Lists OpenPGP packets")
                    .arg(Arg::with_name("input")
                         .value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output")
                         .short("o").long("output").value_name("FILE")
                         .help("Sets the output file to use"))
                    .arg(Arg::with_name("recursive")
                         .short("r").long("recursive")
                         .help("Descends into compressed data packets"))
                    .arg(Arg::with_name("hex")
                         .short("x").long("hex")
                         .help("Print a hexdump"))
                    .arg(Arg::with_name("max-body-length")
                         .long("max-body-length").value_name("BYTES")
                         .help("Fails if a packet body or decompressed \
                                data exceeds BYTES")))

        .subcommand(SubCommand::with_name("dearmor")
                    .display_order(20)
                    .about("Removes ASCII Armor from a file")
                    .arg(Arg::with_name("input")
                         .value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output")
                         .short("o").long("output").value_name("FILE")
                         .help("Sets the output file to use")))
}
