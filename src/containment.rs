// Containment filter
//
// Reads that map almost entirely inside a contig carry no scaffolding signal.
// Given reads-vs-contigs overlaps, collect the ids of contained sequences and
// write a new read file without them. Headers, residues, qualities and the
// input format are preserved.

use crate::defaults;
use crate::error::{IoContext, Result, ScaraError};
use crate::io::paf::{OverlapRecord, PafReader};
use crate::io::sequence::{split_name, SequenceFormat, SequenceReader, SequenceWriter};
use crate::tools::invocation::partial_path;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "containment_test.rs"]
mod containment_test;

/// Query lies inside the target: it starts later on the target than on
/// itself, leaves a longer target-side tail, and aligns over at least half
/// its length.
pub fn is_query_contained(ovl: &OverlapRecord) -> bool {
    ovl.target_start > ovl.query_start
        && ovl.target_len - ovl.target_end > ovl.query_len - ovl.query_end
        && ovl.query_span() as f64 >= defaults::CONTAINMENT_FRACTION * ovl.query_len as f64
}

/// Mirror of `is_query_contained` with query and target swapped
pub fn is_target_contained(ovl: &OverlapRecord) -> bool {
    ovl.query_start > ovl.target_start
        && ovl.query_len - ovl.query_end > ovl.target_len - ovl.target_end
        && ovl.target_span() as f64 >= defaults::CONTAINMENT_FRACTION * ovl.target_len as f64
}

/// Ids marked contained by either direction on any record
pub fn contained_ids<I>(overlaps: I) -> HashSet<String>
where
    I: IntoIterator<Item = OverlapRecord>,
{
    let mut contained = HashSet::new();
    for ovl in overlaps {
        if is_query_contained(&ovl) {
            contained.insert(ovl.query_name.clone());
        }
        if is_target_contained(&ovl) {
            contained.insert(ovl.target_name);
        }
    }
    contained
}

/// Parse a PAF file and collect contained ids
pub fn collect_contained(overlaps: &Path) -> Result<HashSet<String>> {
    let records = PafReader::open(overlaps)?.collect::<Result<Vec<_>>>()?;
    log::debug!("Loaded {} overlaps from {}", records.len(), overlaps.display());
    Ok(contained_ids(records))
}

/// Where the filtered read set lives: `<results>/reads_processed.<ext>`
///
/// The extension is the input's, minus any `.gz`; the output is always
/// written uncompressed.
pub fn filtered_reads_path(results_dir: &Path, reads: &Path) -> PathBuf {
    let name = match split_name(reads) {
        (_, Some(ext)) => format!("{}.{}", defaults::FILTERED_READS_STEM, ext),
        (_, None) => defaults::FILTERED_READS_STEM.to_string(),
    };
    results_dir.join(name)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "reads in input: {}", self.total)?;
        writeln!(f, "reads kept: {}", self.kept)?;
        writeln!(f, "contained reads removed: {}", self.removed)
    }
}

/// Copy every read of `reads` whose id is not in `contained` to `output`
///
/// An unsupported read file extension is not fatal: a warning is logged and
/// an empty artifact is written. The output appears only once complete.
pub fn filter_reads(reads: &Path, contained: &HashSet<String>, output: &Path) -> Result<FilterSummary> {
    let partial = partial_path(output);
    let mut summary = FilterSummary::default();

    match SequenceFormat::from_path(reads) {
        None => {
            log::warn!(
                "Invalid reads filename (expected .fa/.fasta/.fq/.fastq): {}; no reads written",
                reads.display()
            );
            fs::write(&partial, b"")
                .with_io_context(|| format!("cannot create {}", partial.display()))?;
        }
        Some(format) => {
            let sequence_error = |e: std::io::Error| ScaraError::Sequence {
                path: reads.to_path_buf(),
                reason: e.to_string(),
            };

            let mut reader = SequenceReader::open(reads, format).map_err(sequence_error)?;
            let mut writer = SequenceWriter::create(&partial, format)
                .with_io_context(|| format!("cannot create {}", partial.display()))?;

            while let Some(record) = reader.read_record().map_err(sequence_error)? {
                summary.total += 1;
                if contained.contains(&record.id) {
                    summary.removed += 1;
                    continue;
                }
                writer
                    .write(&record)
                    .with_io_context(|| format!("error writing {}", partial.display()))?;
                summary.kept += 1;
            }
            writer
                .flush()
                .with_io_context(|| format!("error writing {}", partial.display()))?;
        }
    }

    fs::rename(&partial, output)
        .with_io_context(|| format!("cannot move filtered reads to {}", output.display()))?;

    log::info!(
        "Containment filter kept {} of {} reads ({} contained)",
        summary.kept,
        summary.total,
        summary.removed
    );
    Ok(summary)
}
