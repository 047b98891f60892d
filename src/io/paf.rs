// PAF overlap records
//
// The aligner writes one tab-separated row per overlap with 12 mandatory
// columns:
//   qname qlen qstart qend strand tname tlen tstart tend matches block_len mapq
// Optional SAM-like tags may follow and are ignored. Header-like lines
// (`#`, `track`, `browser`) are skipped.

use crate::error::{IoContext, Result, ScaraError};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MANDATORY_COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapRecord {
    pub query_name: String,
    pub query_len: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: Strand,
    pub target_name: String,
    pub target_len: i64,
    pub target_start: i64,
    pub target_end: i64,
    pub matches: i64,   // Residue matches
    pub block_len: i64, // Alignment block length
    pub mapq: u32,      // Mapping quality (0-255)
}

impl OverlapRecord {
    pub fn query_span(&self) -> i64 {
        self.query_end - self.query_start
    }

    pub fn target_span(&self) -> i64 {
        self.target_end - self.target_start
    }
}

fn field<T: FromStr>(fields: &[&str], idx: usize, name: &str) -> std::result::Result<T, String> {
    fields[idx]
        .trim()
        .parse::<T>()
        .map_err(|_| format!("invalid {} '{}'", name, fields[idx]))
}

impl FromStr for OverlapRecord {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MANDATORY_COLUMNS {
            return Err(format!(
                "expected at least {} tab-separated columns, found {}",
                MANDATORY_COLUMNS,
                fields.len()
            ));
        }

        let strand = match fields[4] {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            other => return Err(format!("invalid strand '{}'", other)),
        };

        Ok(Self {
            query_name: fields[0].to_string(),
            query_len: field(&fields, 1, "query length")?,
            query_start: field(&fields, 2, "query start")?,
            query_end: field(&fields, 3, "query end")?,
            strand,
            target_name: fields[5].to_string(),
            target_len: field(&fields, 6, "target length")?,
            target_start: field(&fields, 7, "target start")?,
            target_end: field(&fields, 8, "target end")?,
            matches: field(&fields, 9, "residue matches")?,
            block_len: field(&fields, 10, "block length")?,
            mapq: field(&fields, 11, "mapping quality")?,
        })
    }
}

fn is_header_line(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// Streaming reader over a PAF file, yielding one record per data line
pub struct PafReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl PafReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_io_context(|| format!("cannot open overlaps {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for PafReader {
    type Item = Result<OverlapRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(ScaraError::io(
                        format!("error reading {}", self.path.display()),
                        e,
                    )));
                }
            };
            self.line_no += 1;

            if is_header_line(&line) {
                continue;
            }

            let line = line.trim_end_matches('\r');
            return Some(line.parse::<OverlapRecord>().map_err(|reason| {
                ScaraError::OverlapParse {
                    path: self.path.clone(),
                    line: self.line_no,
                    reason,
                }
            }));
        }
    }
}
