//! Pages through a file where cells are separated by a delimiter

use std::{
    collections::VecDeque,
    fs::File,
    io::{self, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, trace};

use crate::preview::{PreviewError, TableRow};

use super::inference::Delimiter;

/// Number of rows fetched per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// A batch of consecutive rows
#[derive(Debug)]
pub struct Page {
    /// Cursor index of the first row in the page
    pub start: usize,
    pub rows: Vec<TableRow>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// An empty page signals the end of the file
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keeps every byte handed to the csv reader until it has been parsed, so the lines the csv
/// reader skips can still be seen.
struct RecordingReader<R> {
    inner: R,
    /// Bytes read from `inner` which the csv reader has not finished parsing
    pending: Vec<u8>,
    /// File offset of `pending[0]`
    base: u64,
}

impl<R> RecordingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            base: 0,
        }
    }

    /// Removes and returns everything up to the file offset `end`
    fn take_until(&mut self, end: u64) -> Vec<u8> {
        let n = usize::try_from(end.saturating_sub(self.base))
            .unwrap_or(usize::MAX)
            .min(self.pending.len());
        self.base += n as u64;
        self.pending.drain(..n).collect()
    }
}

impl<R: Read> Read for RecordingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pending.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Offsets (relative to the start of `consumed`) just past each blank line at the start of
/// `consumed`. `\n`, `\r\n` and a bare `\r` all end a line. A `\n` completing a `\r\n` split
/// over the previous chunk is not a blank line.
fn blank_line_ends(consumed: &[u8], after_cr: bool) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut i = usize::from(after_cr && consumed.first() == Some(&b'\n'));
    while let Some(&byte) = consumed.get(i) {
        match byte {
            b'\r' => {
                i += 1;
                if consumed.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => i += 1,
            _ => break,
        }
        ends.push(i);
    }
    ends
}

/// Forward-only reader which hands out rows of a delimited file one page at a time.
///
/// Quoting follows the usual CSV rules: quoted fields may contain the delimiter or line breaks,
/// and quotes inside them are escaped by doubling. Rows may have differing lengths, and a blank
/// line is a row with no cells.
pub struct DelimitedPager<R = File> {
    reader: csv::Reader<RecordingReader<R>>,
    record: StringRecord,
    /// Rows parsed but not handed out yet, with the file offset just past each
    queued: VecDeque<(TableRow, u64)>,
    page_size: usize,
    /// Number of rows handed out so far
    cursor: usize,
    /// File offset just past the last row handed out
    offset: u64,
    /// Whether the last chunk parsed ended in `\r`
    after_cr: bool,
    /// The csv reader has nothing more to give
    finished: bool,
}

impl DelimitedPager<File> {
    /// Opens `path` for paging. The file stays open until the pager is dropped.
    pub fn open(
        path: &Path,
        delimiter: Delimiter,
        page_size: usize,
    ) -> Result<Self, PreviewError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, delimiter, page_size))
    }
}

impl<R: Read> DelimitedPager<R> {
    pub fn from_reader(reader: R, delimiter: Delimiter, page_size: usize) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .from_reader(RecordingReader::new(reader));
        Self {
            reader,
            record: StringRecord::new(),
            queued: VecDeque::new(),
            // a zero sized page would never make progress
            page_size: page_size.max(1),
            cursor: 0,
            offset: 0,
            after_cr: false,
            finished: false,
        }
    }

    /// Reads up to `page_size` rows. A short page means the end of the file was reached and
    /// every later call returns an empty page.
    ///
    /// After an error the pager is marked exhausted and yields nothing further.
    pub fn next_page(&mut self) -> Result<Page, PreviewError> {
        let start = self.cursor;
        let mut rows = Vec::with_capacity(self.page_size);
        while rows.len() < self.page_size {
            if let Some((row, end)) = self.queued.pop_front() {
                rows.push(row);
                self.offset = end;
                continue;
            }
            if self.finished {
                break;
            }
            if let Err(e) = self.read_ahead() {
                self.finished = true;
                self.queued.clear();
                return Err(e);
            }
        }
        self.cursor += rows.len();
        trace!("Read page of {} rows starting at row {}", rows.len(), start);
        Ok(Page { start, rows })
    }

    /// Parses the next record, queueing an empty row for every blank line skipped before it
    fn read_ahead(&mut self) -> Result<(), PreviewError> {
        let before = self.reader.position().byte();
        let has_record = self.reader.read_record(&mut self.record)?;
        let after = self.reader.position().byte();

        let consumed = self.reader.get_mut().take_until(after);
        for end in blank_line_ends(&consumed, self.after_cr) {
            self.queued
                .push_back((TableRow::new(Vec::new()), before + end as u64));
        }
        if let Some(&last) = consumed.last() {
            self.after_cr = last == b'\r';
        }

        if has_record {
            let row = TableRow::new(self.record.iter().map(|s| s.to_string()).collect());
            self.queued.push_back((row, after));
        } else {
            debug!(
                "Reached end of file after {} rows",
                self.cursor + self.queued.len()
            );
            self.finished = true;
        }
        Ok(())
    }

    /// Number of rows handed out so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once every row of the file has been handed out
    pub fn is_exhausted(&self) -> bool {
        self.finished && self.queued.is_empty()
    }

    /// Byte offset just past the last row handed out
    pub fn byte_offset(&self) -> u64 {
        self.offset
    }
}
