// Consensus polisher adapter (racon command line)

use super::Invocation;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Polisher {
    exe: PathBuf,
    options: Vec<String>,
}

impl Polisher {
    pub fn new(exe: impl Into<PathBuf>, options: Vec<String>) -> Self {
        Self {
            exe: exe.into(),
            options,
        }
    }

    /// Refine `contigs` with `reads` aligned in `overlaps`; polished FASTA goes to `output`
    pub fn polish(&self, reads: &Path, overlaps: &Path, contigs: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.exe)
            .args(&self.options)
            .arg(reads)
            .arg(overlaps)
            .arg(contigs)
            .stdout_to(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polish_argument_order() {
        let racon = Polisher::new("racon", vec!["-t".into(), "8".into()]);
        let inv = racon.polish(
            Path::new("reads.fq"),
            Path::new("r2c.paf"),
            Path::new("contigs.fa"),
            Path::new("contigs_racon.fa"),
        );
        assert_eq!(
            inv.to_string(),
            "racon -t 8 reads.fq r2c.paf contigs.fa > contigs_racon.fa"
        );
    }
}
