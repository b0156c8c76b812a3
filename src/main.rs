mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, Limits};
use doomreader::chunk::{Chunk, ChunkKind};
use doomreader::config::ChunkingConfig;
use doomreader::ingest;
use doomreader::library::Library;
use doomreader::metadata;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const PREVIEW_CHARS: usize = 72;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Add {
            input,
            no_images,
            limits,
        } => {
            let config = chunking_config(&limits)?;
            let library = open_library(&cli.library)?;
            let id = library
                .add_book(&input, &config, !no_images)
                .with_context(|| format!("Failed to add {}", input.display()))?;
            println!("{}", id);
            library.close();
        }
        Command::Chunk {
            input,
            json,
            limits,
        } => {
            let config = chunking_config(&limits)?;
            let parsed = ingest::parse_book(&input, &config)
                .with_context(|| format!("Failed to parse {}", input.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed.chunks)?);
            } else {
                print_chunks(&parsed.chunks);
                for failure in &parsed.failures {
                    eprintln!("skipped unit {} ({}): {}", failure.index, failure.path, failure.reason);
                }
            }
        }
        Command::List => {
            let library = open_library(&cli.library)?;
            for book in library.shelf()? {
                println!(
                    "{}\t{}\t{}\t{}/{}",
                    book.id,
                    book.title,
                    book.creator,
                    book.last_read_index,
                    book.total_chunks
                );
            }
        }
        Command::Show { id, json } => {
            let library = open_library(&cli.library)?;
            let (book, chunks) = library
                .load_book(&id)
                .with_context(|| format!("Failed to load book {}", id))?;
            if json {
                let value = serde_json::json!({ "book": book, "chunks": chunks });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{} by {}", book.title, book.creator);
                println!(
                    "Added {}, read {}/{}, {} bookmarks",
                    book.added_at.format("%Y-%m-%d"),
                    book.last_read_index,
                    book.total_chunks,
                    book.bookmarks.len()
                );
                print_chunks(&chunks);
            }
        }
        Command::Remove { id } => {
            let library = open_library(&cli.library)?;
            library
                .remove_book(&id)
                .with_context(|| format!("Failed to remove book {}", id))?;
        }
        Command::Move { id, direction } => {
            let library = open_library(&cli.library)?;
            if !library.move_book(&id, direction)? {
                eprintln!("{} is already at that end of the shelf", id);
            }
        }
        Command::Progress { id, index } => {
            let library = open_library(&cli.library)?;
            if !library.update_progress(&id, index)? {
                anyhow::bail!("No book with id {}", id);
            }
        }
        Command::Bookmark { id, chunk_id } => {
            let library = open_library(&cli.library)?;
            if library.book(&id)?.is_none() {
                anyhow::bail!("No book with id {}", id);
            }
            for mark in library.toggle_bookmark(&id, &chunk_id)? {
                println!("{}", mark);
            }
        }
        Command::Info { input } => {
            let reader = ingest::open_reader(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            println!("{}", metadata::format_metadata(&reader.metadata()));
            println!("Units: {}", reader.units()?.len());
        }
    }

    Ok(())
}

fn chunking_config(limits: &Limits) -> Result<ChunkingConfig> {
    let config = ChunkingConfig::from_env().context("Invalid DOOMREADER_* settings")?;
    Ok(config.with_overrides(limits.soft_limit, limits.hard_limit, limits.min_paragraph))
}

fn open_library(dir: &Path) -> Result<Library> {
    Library::open(dir).with_context(|| format!("Failed to open library at {}", dir.display()))
}

fn print_chunks(chunks: &[Chunk]) {
    for chunk in chunks {
        match chunk.kind {
            ChunkKind::Header => println!("\n# {}  [{}]", chunk.content, chunk.id),
            ChunkKind::Text => println!("{:>10}  {}", chunk.id, preview(&chunk.content)),
        }
    }
}

fn preview(content: &str) -> String {
    let flat = content.replace("\n\n", " / ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}
