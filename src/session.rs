//! State for one opened file

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    parsers::{
        delimited::DelimitedPager,
        inference::{Delimiter, infer_delimiter_from_path},
    },
    preview::{PreviewError, TableRow},
};

/// An opened file together with its read position and the rows displayed so far.
///
/// Opening another file means building a new `Session`; dropping the old one closes its
/// file handle.
pub struct Session {
    path: PathBuf,
    delimiter: Delimiter,
    pager: DelimitedPager,
    /// Every row fetched so far, in file order
    rows: Vec<TableRow>,
    /// Widest row seen so far
    n_cols: usize,
    /// Bytes of the file covered by `rows`
    displayed_bytes: u64,
}

impl Session {
    /// Infers the delimiter of `path` and prepares to page through it. No rows are read yet.
    pub fn open(path: impl Into<PathBuf>, page_size: usize) -> Result<Self, PreviewError> {
        let path = path.into();
        let delimiter = infer_delimiter_from_path(&path)?;
        info!("Opened {} using {} delimiter", path.display(), delimiter);
        let pager = DelimitedPager::open(&path, delimiter, page_size)?;
        Ok(Self {
            path,
            delimiter,
            pager,
            rows: Vec::new(),
            n_cols: 0,
            displayed_bytes: 0,
        })
    }

    /// Fetches the next page and appends it to the displayed rows. Returns the number of rows
    /// added, zero once the end of the file has been reached.
    pub fn load_next_page(&mut self) -> Result<usize, PreviewError> {
        let page = self.pager.next_page()?;
        let n_rows = page.len();
        debug!("Loaded rows {}..{}", page.start, page.start + n_rows);
        if let Some(widest) = page.rows.iter().map(|row| row.cells().len()).max() {
            self.n_cols = self.n_cols.max(widest);
        }
        self.rows.extend(page.rows);
        self.displayed_bytes = self.pager.byte_offset();
        Ok(n_rows)
    }

    /// True once no further rows can be fetched
    pub fn at_end(&self) -> bool {
        self.pager.is_exhausted()
    }

    /// Re-reads the raw text of the displayed rows from disk
    pub fn displayed_text(&self) -> Result<String, PreviewError> {
        let mut text = String::new();
        File::open(&self.path)?
            .take(self.displayed_bytes)
            .read_to_string(&mut text)?;
        Ok(text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of rows read from the file so far
    pub fn cursor(&self) -> usize {
        self.pager.cursor()
    }
}
