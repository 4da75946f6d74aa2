use clap::Parser;

/// Normalises electoral commission data exports into a unified dataset.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory path) The directory holding the raw data: one sub-directory per election
    /// containing an input.json seed and optionally an original.zip archive, plus a shared/
    /// directory with sources common to all elections.
    #[clap(short, long, value_parser)]
    pub raw: String,

    /// (directory path) The directory the combined output files are written to: all.json,
    /// one file per election code and one file per entity kind.
    #[clap(short, long, value_parser)]
    pub out: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
