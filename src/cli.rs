use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "talpa",
    about = "Full-text search over delimited text archives",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a corpus file
    Search {
        /// Corpus file: documents introduced by <FS>location<GS> markers
        corpus: PathBuf,

        /// Query; "double quotes" force exact phrases, 'single quotes'
        /// force exact spellings
        query: String,

        /// Make quoted matching case-sensitive
        #[arg(long)]
        case_sensitive: bool,

        /// Treat the whole query as one exact phrase
        #[arg(long)]
        match_exact: bool,

        /// Worker threads; 0 runs single-threaded in process
        #[arg(short, long, default_value_t = 0)]
        shards: usize,

        /// Bytes of context shown around each document's first hit
        #[arg(long, default_value_t = 120)]
        context: usize,

        /// Emit the raw result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print corpus statistics
    Stats {
        /// Corpus file to inspect
        corpus: PathBuf,
    },
}
