//! `csv-preview` is a small GUI tool for looking through delimited text files (CSV, TSV,
//! semicolon or pipe separated) one page at a time.
//!
//! # Example usage:
//! ```sh
//! # Start with an empty window and pick a file with "Open file"
//! csv-preview
//! # Open a file straight away, showing 100 rows per page
//! csv-preview data.csv --page-size 100
//! ```
//!
//! ## Design
//! The delimiter is inferred from the first two lines of the file. Comma, semicolon, tab and
//! pipe are tried in that order, and the first one which splits both lines into the same number
//! of fields (more than one) wins. If none fits, the file cannot be previewed.
//!
//! Rows are then read lazily with the `csv` crate, so quoted fields may contain the delimiter or
//! line breaks. Only as many pages as the user asks for are ever read, which keeps large files
//! cheap to open. "Copy to clipboard" copies the raw text of the rows currently displayed.
//!
//! Everything runs on the UI thread. Opening a new file drops the previous one and starts
//! again from the first row.

use anyhow::Result;
use clap::Parser;
use runner::run_preview;
use std::path::PathBuf;

use crate::parsers::delimited::DEFAULT_PAGE_SIZE;

mod parsers;
mod preview;
mod runner;
mod session;

/// `csv-preview` shows delimited text files in a table, one page of rows at a time
#[derive(Debug, Parser)]
struct Args {
    /// File to open at startup. Otherwise use the "Open file" button.
    path: Option<PathBuf>,
    /// Number of rows read each time "Next page" is pressed
    #[arg(short = 'n', long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    page_size: usize,
}

fn parse_page_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("page size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Primary entrypoint for `csv-preview`
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run_preview(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["csv-preview"]).unwrap();
        assert_eq!(args.path, None);
        assert_eq!(args.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_path_and_page_size() {
        let args = Args::try_parse_from(["csv-preview", "data.csv", "-n", "100"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("data.csv")));
        assert_eq!(args.page_size, 100);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Args::try_parse_from(["csv-preview", "--page-size", "0"]).is_err());
        assert!(Args::try_parse_from(["csv-preview", "--page-size", "many"]).is_err());
    }
}
