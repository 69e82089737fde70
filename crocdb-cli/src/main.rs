//! crocdb CLI
//!
//! Command-line interface for querying a crocdb ROM catalog database.
//! Every subcommand prints the standard `{info, data}` envelope as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crocdb_db::{Catalog, Response, SearchFilter};

#[derive(Parser)]
#[command(name = "crocdb")]
#[command(about = "Query a crocdb ROM catalog database", long_about = None)]
struct Cli {
    /// Path to the catalog database file
    #[arg(short, long, default_value = "db/roms.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search entries with filters
    Search {
        /// Free-text search key
        #[arg(short, long)]
        key: Option<String>,

        /// Platform codes (e.g. nes,snes,ps1)
        #[arg(short, long, value_delimiter = ',')]
        platforms: Vec<String>,

        /// Region codes (e.g. us,eu,jp)
        #[arg(short, long, value_delimiter = ',')]
        regions: Vec<String>,

        /// Exact ROM id
        #[arg(long)]
        rom_id: Option<String>,

        /// Results per page (1-100)
        #[arg(short, long, default_value_t = 100)]
        max_results: u32,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Fetch a single entry by its slug
    Entry {
        /// Entry slug
        slug: String,
    },

    /// Fetch a random entry
    Random,

    /// List the available platforms
    Platforms,

    /// List the available regions
    Regions,

    /// Show catalog statistics
    Info,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let catalog = Catalog::new(cli.db);

    let response = match cli.command {
        Commands::Search {
            key,
            platforms,
            regions,
            rom_id,
            max_results,
            page,
        } => catalog.search(&SearchFilter {
            search_key: key,
            platforms,
            regions,
            rom_id,
            max_results,
            page,
        }),
        Commands::Entry { slug } => catalog.entry(Some(&slug), false),
        Commands::Random => catalog.entry(None, true),
        Commands::Platforms => catalog.platforms(),
        Commands::Regions => catalog.regions(),
        Commands::Info => catalog.info(),
    };

    print_response(&response);
}

fn print_response(response: &Response) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            log::error!("failed to serialize response: {err}");
            std::process::exit(1);
        }
    }
}
