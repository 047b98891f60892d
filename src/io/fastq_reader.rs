// FASTQ reader module
//
// This module provides a four-line FASTQ reader with:
// - Automatic gzip/bgzip detection by file extension and magic bytes
// - Parallel BGZIP decompression for .gz files (if BGZIP format detected)
// - Record-at-a-time reading for streaming filters
// - The header line kept verbatim, so a filter writes it back unchanged

use super::sequence::SequenceRecord;
use std::io::{self, BufRead, BufReader, Lines, Read};
use std::path::Path;

#[cfg(test)]
#[path = "fastq_reader_test.rs"]
mod fastq_reader_test;

/// FASTQ reader with automatic gzip/bgzip detection
pub struct FastqReader {
    lines: Lines<BufReader<Box<dyn Read>>>,
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl FastqReader {
    /// Open a FASTQ file (auto-detects gzip/bgzip by .gz extension and magic bytes)
    ///
    /// Uses parallel BGZIP decompression for .gz files when BGZIP format is detected.
    /// Falls back to single-threaded decompression for standard gzip.
    ///
    /// # Arguments
    /// * `path` - Path to FASTQ file (.fq, .fastq, .fq.gz, .fastq.gz)
    ///
    /// # Returns
    /// * `Ok(FastqReader)` on success
    /// * `Err(io::Error)` if file cannot be opened
    pub fn new(path: &Path) -> io::Result<Self> {
        let reader = super::open_decompressed(path)?;

        Ok(Self {
            lines: BufReader::new(reader).lines(),
        })
    }

    fn next_line(&mut self, what: &str) -> io::Result<String> {
        match self.lines.next() {
            Some(line) => line,
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated record: missing {}", what),
            )),
        }
    }

    /// Read the next FASTQ record, `Ok(None)` at EOF
    pub fn read_record(&mut self) -> io::Result<Option<SequenceRecord>> {
        let header_line = loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
            }
        };
        let header = header_line
            .strip_prefix('@')
            .ok_or_else(|| invalid(format!("expected '@' at record start, found {:?}", header_line)))?
            .to_string();

        let seq = self.next_line("sequence")?.trim_end().as_bytes().to_vec();
        let separator = self.next_line("'+' separator")?;
        if !separator.starts_with('+') {
            return Err(invalid(format!("expected '+' separator in record {}", header)));
        }
        let qual = self.next_line("quality")?.trim_end().as_bytes().to_vec();
        if qual.len() != seq.len() {
            return Err(invalid(format!(
                "record {}: {} bases but {} quality values",
                header,
                seq.len(),
                qual.len()
            )));
        }

        Ok(Some(SequenceRecord::new(header, seq, Some(qual))))
    }
}
