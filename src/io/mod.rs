//! Sequence and overlap file I/O.
//!
//! - `fasta_reader` / `fastq_reader`: record readers that keep the header line
//!   verbatim, with transparent gzip/BGZF decompression
//! - `sequence`: format detection and a format-preserving record writer on
//!   top of `bio::io`
//! - `paf`: pairwise overlap records produced by the aligner

pub mod fasta_reader;
pub mod fastq_reader;
pub mod paf;
pub mod sequence;

use flate2::read::GzDecoder;
use noodles_bgzf as bgzf;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

/// Detect if a gzipped file is BGZIP format by checking for BGZIP-specific header
pub(crate) fn is_bgzip_format(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 18]; // BGZIP header is at least 18 bytes

    // Try to read header
    if file.read(&mut header).unwrap_or(0) < 18 {
        return Ok(false); // Not enough bytes for BGZIP header
    }

    // Check for gzip magic bytes
    if header[0] != 0x1f || header[1] != 0x8b {
        return Ok(false); // Not gzip at all
    }

    // BGZIP uses extra field (FEXTRA flag = 0x04)
    if header[3] & 0x04 == 0 {
        return Ok(false); // No extra field, likely standard gzip
    }

    // BGZIP has specific extra field with 'BC' subfield ID
    // Extra field starts at byte 10, check for 'BC' signature at expected offset
    Ok(header[12] == b'B' && header[13] == b'C')
}

pub(crate) fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Open `path` for reading, decompressing `.gz` input (parallel for BGZIP)
pub(crate) fn open_decompressed(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_gzip_path(path) {
        if is_bgzip_format(path)? {
            log::debug!("Detected BGZIP format, using parallel decompression for {}", path.display());
            Box::new(BufReader::with_capacity(
                BUFFER_SIZE,
                bgzf::MultithreadedReader::new(file),
            ))
        } else {
            log::debug!("Detected standard gzip format for {}", path.display());
            Box::new(BufReader::with_capacity(BUFFER_SIZE, GzDecoder::new(file)))
        }
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    };
    Ok(reader)
}
