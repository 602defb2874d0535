//! Command-line arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use libris_catalog::{BookFilter, PAGE_SIZE};
use uuid::Uuid;

/// Libris - library inventory client
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Libris API
    #[arg(long, env = "LIBRIS_API_URL", default_value = "http://127.0.0.1:8080")]
    pub api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "LIBRIS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the Libris API server with the layered configuration
    Serve,

    /// List books ordered by title, optionally filtered and paged
    List(ListArgs),

    /// Show one book
    Show { id: Uuid },

    /// Show library statistics
    Stats,

    /// Add a book to the catalog
    Add(AddArgs),

    /// Change fields of a book
    Edit(EditArgs),

    /// Remove a book from the catalog
    Delete { id: Uuid },

    /// Return one copy; asks before growing the total
    Increment {
        id: Uuid,

        /// Grow the total without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Check out one copy
    Decrement { id: Uuid },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against title, author, genre, and series
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only books by this exact author
    #[arg(long)]
    pub author: Option<String>,

    /// Only books in this exact genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Only books in this exact series
    #[arg(long)]
    pub series: Option<String>,

    /// Show one page (1-based) instead of every match
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: Option<u64>,

    /// Books per page
    #[arg(long, default_value_t = PAGE_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub per_page: u64,
}

impl ListArgs {
    pub fn filter(&self) -> BookFilter {
        BookFilter {
            search: self.search.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            series: self.series.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    /// Copies owned
    #[arg(long)]
    pub copies: i64,

    /// Copies on the shelf; defaults to --copies
    #[arg(long)]
    pub available: Option<i64>,

    #[arg(long)]
    pub series: Option<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: Uuid,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub copies: Option<i64>,

    #[arg(long)]
    pub available: Option<i64>,

    #[arg(long)]
    pub series: Option<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub price: Option<f64>,

    /// Clear an optional field (repeatable)
    #[arg(long, value_enum)]
    pub clear: Vec<ClearField>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearField {
    Series,
    Publisher,
    Genre,
    Language,
    Year,
    Price,
}
