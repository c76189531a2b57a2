use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::job::{vcf_file_name, ArrayType, Job};

/// Record of a scatter run: which regions were planned and where their arrays are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub vcf: PathBuf,
    pub output_dir: PathBuf,
    pub regions: Vec<String>,
    pub outputs: BTreeMap<ArrayType, Vec<PathBuf>>,
}

impl Manifest {
    pub fn from_jobs(vcf: &Path, output_dir: &Path, jobs: &[Job]) -> Self {
        let mut regions: Vec<String> = vec![];
        let mut outputs: BTreeMap<ArrayType, Vec<PathBuf>> = BTreeMap::new();

        for job in jobs {
            let region = job.region.to_string();
            if regions.last() != Some(&region) {
                regions.push(region);
            }
            outputs
                .entry(job.array_type)
                .or_default()
                .push(job.output.clone());
        }

        Self {
            vcf: vcf.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            regions,
            outputs,
        }
    }

    /// `<dir>/<vcf file name>.manifest.json`
    pub fn path(dir: &Path, prefix: &str) -> PathBuf {
        dir.join(format!("{prefix}.manifest.json"))
    }

    pub fn path_for_vcf(dir: &Path, vcf: &Path) -> PathBuf {
        Self::path(dir, &vcf_file_name(vcf))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn outputs(&self, array_type: ArrayType) -> &[PathBuf] {
        self.outputs
            .get(&array_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
