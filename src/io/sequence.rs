// Sequence artifact helpers
//
// Format detection by file name, a unified record type over FASTA and FASTQ,
// and a writer that reproduces the input format:
//   FASTA  >header\nseq\n
//   FASTQ  @header\nseq\n+\nqual\n

use super::fasta_reader::FastaReader;
use super::fastq_reader::FastqReader;
use bio::io::{fasta, fastq};
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    Fastq,
}

impl SequenceFormat {
    /// Detect the format from the extension, ignoring a trailing `.gz`
    pub fn from_path(path: &Path) -> Option<Self> {
        let (_, ext) = split_name(path);
        match ext?.to_ascii_uppercase().as_str() {
            "FA" | "FASTA" => Some(SequenceFormat::Fasta),
            "FQ" | "FASTQ" => Some(SequenceFormat::Fastq),
            _ => None,
        }
    }
}

/// File stem and extension with any `.gz` suffix removed
///
/// `reads.fastq.gz` gives `("reads", Some("fastq"))`.
pub fn split_name(path: &Path) -> (String, Option<String>) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if super::is_gzip_path(path) {
        name[..name.len() - 3].to_string()
    } else {
        name
    };

    match name.rfind('.') {
        Some(pos) if pos > 0 => (name[..pos].to_string(), Some(name[pos + 1..].to_string())),
        _ => (name, None),
    }
}

/// File name built from `path`'s stem plus `suffix`, keeping the extension
///
/// `contigs.fa` with `_racon` gives `contigs_racon.fa`.
pub fn suffixed_name(path: &Path, suffix: &str) -> String {
    match split_name(path) {
        (stem, Some(ext)) => format!("{}{}.{}", stem, suffix, ext),
        (stem, None) => format!("{}{}", stem, suffix),
    }
}

/// One sequence with its header line exactly as read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,     // Header up to the first whitespace
    pub header: String, // Full header line without the '>' or '@' marker
    pub seq: Vec<u8>,
    pub qual: Option<Vec<u8>>, // FASTQ only
}

impl SequenceRecord {
    pub fn new(header: String, seq: Vec<u8>, qual: Option<Vec<u8>>) -> Self {
        let id = header
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            header,
            seq,
            qual,
        }
    }
}

/// Streaming reader over either format
pub enum SequenceReader {
    Fasta(FastaReader),
    Fastq(FastqReader),
}

impl SequenceReader {
    pub fn open(path: &Path, format: SequenceFormat) -> io::Result<Self> {
        Ok(match format {
            SequenceFormat::Fasta => SequenceReader::Fasta(FastaReader::new(path)?),
            SequenceFormat::Fastq => SequenceReader::Fastq(FastqReader::new(path)?),
        })
    }

    pub fn read_record(&mut self) -> io::Result<Option<SequenceRecord>> {
        Ok(match self {
            SequenceReader::Fasta(r) => r.read_record()?,
            SequenceReader::Fastq(r) => r.read_record()?,
        })
    }
}

/// Writer that emits records in a fixed format
///
/// The raw header goes in the id slot of the `bio` writers so it is written
/// back byte for byte.
pub enum SequenceWriter {
    Fasta(fasta::Writer<File>),
    Fastq(fastq::Writer<File>),
}

impl SequenceWriter {
    pub fn create(path: &Path, format: SequenceFormat) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(match format {
            SequenceFormat::Fasta => SequenceWriter::Fasta(fasta::Writer::new(file)),
            SequenceFormat::Fastq => SequenceWriter::Fastq(fastq::Writer::new(file)),
        })
    }

    pub fn write(&mut self, record: &SequenceRecord) -> io::Result<()> {
        match self {
            SequenceWriter::Fasta(w) => w.write(&record.header, None, &record.seq),
            SequenceWriter::Fastq(w) => {
                let qual = record.qual.as_deref().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("record {} has no quality string", record.id),
                    )
                })?;
                w.write(&record.header, None, &record.seq, qual)
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            SequenceWriter::Fasta(w) => w.flush(),
            SequenceWriter::Fastq(w) => w.flush(),
        }
    }
}
