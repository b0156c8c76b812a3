use clap::{Args, Parser, Subcommand};
use doomreader::shelf::Direction;
use std::path::PathBuf;

/// Split EPUB and DOCX books into reading chunks and keep a shelf of them
#[derive(Parser, Debug)]
#[command(name = "doomreader", version, about)]
pub struct Cli {
    /// Directory holding the library database and shelf
    #[arg(long, global = true, default_value = "doomreader-library")]
    pub library: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a book and add it to the shelf
    Add {
        /// Path to the input EPUB or DOCX file
        input: PathBuf,

        /// Do not store embedded images
        #[arg(long, default_value_t = false)]
        no_images: bool,

        #[command(flatten)]
        limits: Limits,
    },
    /// Parse a book and print its chunks without shelving it
    Chunk {
        input: PathBuf,

        /// Print the chunk sequence as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        limits: Limits,
    },
    /// List shelved books in display order
    List,
    /// Show a shelved book and its chunks
    Show {
        id: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Remove a book and everything stored for it
    Remove { id: String },
    /// Move a book one place up or down the shelf
    Move { id: String, direction: Direction },
    /// Record the reading position of a book
    Progress { id: String, index: usize },
    /// Toggle a bookmark on a chunk
    Bookmark { id: String, chunk_id: String },
    /// Print a book file's metadata
    Info { input: PathBuf },
}

/// Chunk size overrides, applied over DOOMREADER_* environment settings.
#[derive(Args, Debug, Default)]
pub struct Limits {
    /// Preferred maximum chunk size, in characters
    #[arg(long)]
    pub soft_limit: Option<usize>,

    /// Absolute maximum chunk size, in characters
    #[arg(long)]
    pub hard_limit: Option<usize>,

    /// Narrative paragraphs at least this long close their chunk
    #[arg(long)]
    pub min_paragraph: Option<usize>,
}
