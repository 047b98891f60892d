// FASTA reader module
//
// Record-at-a-time reader over plain, gzip and BGZIP compressed input (see
// `open_decompressed`). The header line is kept verbatim; `bio::io::fasta`
// re-joins id and description with a single space, which turns a tab after
// the id into a space.

use super::sequence::SequenceRecord;
use std::io::{self, BufRead, BufReader, Lines, Read};
use std::path::Path;

/// FASTA reader with automatic gzip/bgzip detection
pub struct FastaReader {
    lines: Lines<BufReader<Box<dyn Read>>>,
    pending_header: Option<String>, // Header line already consumed by the previous record
}

impl FastaReader {
    /// Open a FASTA file (.fa, .fasta, .fa.gz, .fasta.gz)
    ///
    /// # Returns
    /// * `Ok(FastaReader)` on success
    /// * `Err(io::Error)` if file cannot be opened
    pub fn new(path: &Path) -> io::Result<Self> {
        let reader = super::open_decompressed(path)?;

        Ok(Self {
            lines: BufReader::new(reader).lines(),
            pending_header: None,
        })
    }

    /// Read the next FASTA record
    ///
    /// Sequence lines are concatenated. Returns `Ok(Some(record))` if a
    /// record is found, `Ok(None)` at EOF, and `Err(e)` when data appears
    /// before the first `>` line.
    pub fn read_record(&mut self) -> io::Result<Option<SequenceRecord>> {
        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                match self.lines.next() {
                    None => return Ok(None),
                    Some(line) => {
                        let line = line?;
                        if let Some(header) = line.strip_prefix('>') {
                            break header.to_string();
                        }
                        if !line.trim().is_empty() {
                            return Err(io::Error::new(
                                io::ErrorKind::InvalidData,
                                "expected '>' at record start",
                            ));
                        }
                    }
                }
            },
        };

        let mut seq = Vec::new();
        for line in self.lines.by_ref() {
            let line = line?;
            if let Some(next) = line.strip_prefix('>') {
                self.pending_header = Some(next.to_string());
                break;
            }
            seq.extend_from_slice(line.trim_end().as_bytes());
        }

        Ok(Some(SequenceRecord::new(header, seq, None)))
    }
}
