//! Infers the delimiter of a file
//!
//! Only the first two lines are inspected. Each candidate delimiter is tried in priority order
//! and the first one which splits both lines into the same number of fields (more than one)
//! is chosen. Quotes are not considered here, this is purely a field count heuristic.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::debug;
use thiserror::Error;

use crate::preview::PreviewError;

/// Errors when inferring the delimiter of a file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Unable to determine a delimiter from the first two lines of the file")]
    DelimiterUndetermined,
}

/// Field separators which can be inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    /// Candidates in the order they are tried
    pub const CANDIDATES: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
        Delimiter::Pipe,
    ];

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Byte form, as expected by the `csv` reader
    pub fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Tab => "tab",
            Delimiter::Pipe => "pipe",
        };
        f.write_str(name)
    }
}

/// Picks the first candidate where `first` splits into more than one field and both lines
/// split into the same number of fields
pub fn infer_delimiter(first: &str, second: &str) -> Result<Delimiter, InferenceError> {
    for candidate in Delimiter::CANDIDATES {
        let first_len = first.split(candidate.as_char()).count();
        let second_len = second.split(candidate.as_char()).count();
        debug!(
            "Delimiter candidate {}: {} and {} fields",
            candidate, first_len, second_len
        );
        if first_len > 1 && first_len == second_len {
            return Ok(candidate);
        }
    }
    Err(InferenceError::DelimiterUndetermined)
}

/// Reads the first two lines of the file at `path` and infers its delimiter
pub fn infer_delimiter_from_path(path: &Path) -> Result<Delimiter, PreviewError> {
    let (first, second) = read_first_two_lines(path)?;
    Ok(infer_delimiter(&first, &second)?)
}

/// Missing lines are returned as empty strings. The file is closed before returning.
fn read_first_two_lines(path: &Path) -> io::Result<(String, String)> {
    let mut reader = BufReader::new(File::open(path)?);
    let first = read_text_line(&mut reader)?;
    let second = read_text_line(&mut reader)?;
    Ok((first, second))
}

/// Reads one line without its terminator. `\n`, `\r\n` and a bare `\r` all end a line.
fn read_text_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = Vec::new();
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(idx) => {
                let terminator = available[idx];
                line.extend_from_slice(&available[..idx]);
                reader.consume(idx + 1);
                if terminator == b'\r' && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                break;
            }
            None => {
                let n = available.len();
                line.extend_from_slice(available);
                reader.consume(n);
            }
        }
    }
    String::from_utf8(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_infer_comma() {
        assert_eq!(infer_delimiter("a,b,c\n", "1,2,3\n"), Ok(Delimiter::Comma));
    }

    #[test]
    fn test_comma_takes_priority_over_semicolon() {
        // both comma and semicolon split each line into the same number of fields
        assert_eq!(
            infer_delimiter("a,b;c,d\n", "1,2;3,4\n"),
            Ok(Delimiter::Comma)
        );
        assert_eq!(infer_delimiter("a,b;c\n", "1;2,3\n"), Ok(Delimiter::Comma));
    }

    #[test]
    fn test_infer_each_candidate() {
        assert_eq!(infer_delimiter("a;b\n", "1;2\n"), Ok(Delimiter::Semicolon));
        assert_eq!(infer_delimiter("a\tb\n", "1\t2\n"), Ok(Delimiter::Tab));
        assert_eq!(infer_delimiter("a|b|c\n", "1|2|3\n"), Ok(Delimiter::Pipe));
    }

    #[test]
    fn test_falls_through_mismatched_candidates() {
        // comma counts differ, semicolon counts match
        assert_eq!(
            infer_delimiter("a,x;b\n", "1;2\n"),
            Ok(Delimiter::Semicolon)
        );
    }

    #[test]
    fn test_mismatched_counts_undetermined() {
        assert_eq!(
            infer_delimiter("a;b\n", "1;2;3\n"),
            Err(InferenceError::DelimiterUndetermined)
        );
    }

    #[test]
    fn test_single_field_undetermined() {
        assert_eq!(
            infer_delimiter("header\n", "value\n"),
            Err(InferenceError::DelimiterUndetermined)
        );
    }

    #[test]
    fn test_missing_second_line_undetermined() {
        assert_eq!(
            infer_delimiter("a,b,c\n", ""),
            Err(InferenceError::DelimiterUndetermined)
        );
    }

    #[test]
    fn test_infer_from_path() {
        let file = file_with("name|age\nalice|30\nbob|41\n");
        let delimiter = infer_delimiter_from_path(file.path()).unwrap();
        assert_eq!(delimiter, Delimiter::Pipe);
    }

    #[test]
    fn test_infer_from_path_only_reads_two_lines() {
        // the third line would break the comma count, but it is never looked at
        let file = file_with("a,b\n1,2\n1,2,3,4\n");
        assert_eq!(
            infer_delimiter_from_path(file.path()).unwrap(),
            Delimiter::Comma
        );
    }

    #[test]
    fn test_infer_from_path_short_files() {
        for contents in ["", "a,b,c\n", "a,b,c"] {
            let file = file_with(contents);
            let err = infer_delimiter_from_path(file.path()).unwrap_err();
            assert!(
                matches!(
                    err,
                    PreviewError::Inference(InferenceError::DelimiterUndetermined)
                ),
                "unexpected error for {:?}: {}",
                contents,
                err
            );
        }
    }

    #[test]
    fn test_infer_from_path_line_endings() {
        for contents in ["a;b\r1;2\r", "a;b\r\n1;2\r\n", "a;b\n1;2"] {
            let file = file_with(contents);
            assert_eq!(
                infer_delimiter_from_path(file.path()).unwrap(),
                Delimiter::Semicolon,
                "failed for {:?}",
                contents
            );
        }
    }

    #[test]
    fn test_read_text_line() {
        let mut reader = io::Cursor::new(b"one\rtwo\r\nthree\nfour".to_vec());
        let lines: Vec<String> = (0..5)
            .map(|_| read_text_line(&mut reader).unwrap())
            .collect();
        assert_eq!(lines, vec!["one", "two", "three", "four", ""]);
    }

    #[test]
    fn test_infer_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = infer_delimiter_from_path(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, PreviewError::Io(_)));
    }

    #[test]
    fn test_delimiter_bytes() {
        let bytes: Vec<u8> = Delimiter::CANDIDATES
            .iter()
            .map(|d| d.as_byte())
            .collect();
        assert_eq!(bytes, vec![b',', b';', b'\t', b'|']);
    }
}
