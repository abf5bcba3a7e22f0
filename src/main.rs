use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use vf2ameavia::conversion::converter::ConverterOptions;
use vf2ameavia::data;

/// Convert flight logs from a vereinsflieger.de CSV export to ameavia CSV.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// The exported vereinsflieger.de flight list
    input: PathBuf,

    /// Membership export used to resolve crew member IDs
    #[arg(long, short)]
    members: Option<PathBuf>,

    /// File name for the generated output, standard output when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    data::convert_files(
        &args.input,
        args.members.as_deref(),
        args.output.as_deref(),
        &ConverterOptions::default(),
    )?;

    Ok(())
}
