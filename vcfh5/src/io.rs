use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, OptionExt, WrapErr};
use color_eyre::Result;
use rust_htslib::bcf::{header::HeaderRecord, Read, Reader};

use vcfh5_core::region::read_regions;
use vcfh5_core::{Contig, Region};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    BED,
    VCF,
    /// Plain list of regions, one per line
    List,
}

impl FileType {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension: &str = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| eyre!("No filetype in path {path:?}"))?;

        let extension = match extension {
            "gz" | "bgz" => return_double_extension_filetype(path, extension)?,
            _ => extension.to_string(),
        };

        Ok(match extension.as_str() {
            "vcf.gz" | "vcf.bgz" | "vcf" | "bcf" => Self::VCF,
            "bed.gz" | "bed.bgz" | "bed" => Self::BED,
            "txt" | "txt.gz" | "list" | "regions" => Self::List,
            _ => return Err(eyre!("File extension: {extension} is not supported")),
        })
    }
}

pub fn return_double_extension_filetype(path: &Path, e1: &str) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| eyre!("file has no stem"))?;
    let e2 = Path::new(&stem)
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| eyre!("file has no other filetype"))?;
    Ok(format!("{e2}.{e1}"))
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            Some(name) => {
                let r = match niffler::from_path(name) {
                    Ok(x) => x.0,
                    Err(err) => {
                        let msg = format!("failed to open \"{name}\": {err}");
                        return Err(eyre!(msg))?;
                    }
                };
                Box::new(r)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

/// Regions from a BED file or a plain region list. Files without a known extension are read as lists.
pub fn read_regions_file(path: &Path) -> Result<Vec<Region>> {
    let bed = matches!(FileType::from_path(path), Ok(FileType::BED));
    let input = get_input(Some(path.to_path_buf()))?;
    let regions =
        read_regions(input, bed).wrap_err_with(|| eyre!("Error reading regions from {path:?}"))?;
    tracing::debug!("Read {} regions from {path:?}", regions.len());
    Ok(regions)
}

pub fn vcf_samples(path: &Path) -> Result<Vec<String>> {
    let bcf = Reader::from_path(path).wrap_err_with(|| eyre!("Error opening {path:?}"))?;
    bcf.header()
        .samples()
        .into_iter()
        .map(|sample| Ok(std::str::from_utf8(sample)?.to_string()))
        .collect()
}

/// Contig names and lengths from the `##contig` lines of a VCF header
pub fn vcf_contigs(path: &Path) -> Result<Vec<Contig>> {
    let bcf = Reader::from_path(path).wrap_err_with(|| eyre!("Error opening {path:?}"))?;
    bcf.header()
        .header_records()
        .iter()
        .filter_map(|r| match r {
            HeaderRecord::Contig { values, .. } => Some(values),
            _ => None,
        })
        .map(|values| {
            let name = values
                .get("ID")
                .ok_or_eyre("The input VCF has no ID for some contig record in the header")?;
            let length = values
                .get("length")
                .ok_or_else(|| eyre!("VCF header has no contig length for {name}"))?
                .parse::<u64>()
                .wrap_err_with(|| eyre!("Invalid contig length for {name}"))?;
            Ok(Contig {
                name: name.clone(),
                length,
            })
        })
        .collect()
}

/// Array files in `dir` named `<prefix>.<anything>.<suffix>.npy`, in natural order
pub fn list_npy_files(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let head = format!("{prefix}.");
    let tail = format!(".{suffix}.npy");

    let mut files = vec![];
    for entry in std::fs::read_dir(dir).wrap_err_with(|| eyre!("Error reading {dir:?}"))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(OsStr::to_str) else {
            continue;
        };
        if name.len() > head.len() + tail.len() && name.starts_with(&head) && name.ends_with(&tail) {
            files.push(path);
        }
    }

    alphanumeric_sort::sort_path_slice(&mut files);
    Ok(files)
}

pub fn create_dir(path: &Path) -> Result<()> {
    if let Err(e) = std::fs::create_dir_all(path) {
        match e.kind() {
            std::io::ErrorKind::AlreadyExists => (),
            _ => return Err(eyre!("Error creating directory {path:?}: {e}")),
        }
    }
    Ok(())
}
