use std::ffi::OsString;
use std::path::{Path, PathBuf};

use bio::io::fasta::Index;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    pub name: String,
    pub length: u64,
}

/// Path of the `.fai` index belonging to a FASTA file. Paths that already point to an index
/// are returned as is.
pub fn fai_path(fasta: &Path) -> PathBuf {
    if fasta.extension().is_some_and(|ext| ext == "fai") {
        return fasta.to_path_buf();
    }
    let mut os_string: OsString = fasta.into();
    os_string.push(".fai");
    os_string.into()
}

/// Contigs of a reference in index order
pub fn read_fasta_index(fasta: &Path) -> Result<Vec<Contig>> {
    let path = fai_path(fasta);
    let index = Index::from_file(&path).map_err(|e| Error::FastaIndex {
        path: path.clone(),
        msg: e.to_string(),
    })?;

    let contigs: Vec<Contig> = index
        .sequences()
        .into_iter()
        .map(|seq| Contig {
            name: seq.name,
            length: seq.len,
        })
        .collect();

    tracing::debug!("Read {} contigs from {path:?}", contigs.len());
    Ok(contigs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fai_path() {
        assert_eq!(fai_path(Path::new("ref/hg38.fa")), PathBuf::from("ref/hg38.fa.fai"));
        assert_eq!(fai_path(Path::new("ref/hg38.fa.fai")), PathBuf::from("ref/hg38.fa.fai"));
    }

    #[test]
    fn test_read_fasta_index() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("ref.fa");
        std::fs::write(
            dir.path().join("ref.fa.fai"),
            "chr1\t2500\t6\t60\t61\nchr2\t1000\t2554\t60\t61\n",
        )
        .unwrap();

        let contigs = read_fasta_index(&fasta).unwrap();
        assert_eq!(
            contigs,
            vec![
                Contig { name: "chr1".into(), length: 2500 },
                Contig { name: "chr2".into(), length: 1000 },
            ]
        );

        assert!(read_fasta_index(&dir.path().join("missing.fa")).is_err());
    }
}
