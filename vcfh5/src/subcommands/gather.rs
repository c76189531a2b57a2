use std::path::{Path, PathBuf};
use std::time::Instant;

use color_eyre::eyre::{ensure, eyre, WrapErr};
use color_eyre::Result;

use vcfh5_core::job::vcf_file_name;
use vcfh5_core::npy::read_columns;
use vcfh5_core::store::{append_column, open_store, require_group, write_samples};
use vcfh5_core::{ArrayType, Manifest, StoreOptions};

use crate::args::{to_array_types, ArrayTypeOption, StoreArgs};
use crate::io::{list_npy_files, vcf_samples};

#[derive(Debug, Clone)]
pub struct GatherArgs {
    pub input_dir: PathBuf,
    pub vcf: Option<PathBuf>,
    pub prefix: Option<String>,
    pub output: PathBuf,
    pub group: String,
    pub array_types: Vec<ArrayTypeOption>,
    pub store_args: StoreArgs,
    pub overwrite: bool,
    pub allow_missing: bool,
}

/// Array files of one type, in manifest order when a manifest exists and natural order otherwise
pub fn find_inputs(
    input_dir: &Path,
    prefix: &str,
    manifest: Option<&Manifest>,
    array_type: ArrayType,
    allow_missing: bool,
) -> Result<Vec<PathBuf>> {
    let Some(manifest) = manifest else {
        return list_npy_files(input_dir, prefix, array_type.suffix());
    };

    // Manifest paths are relative to the directory scatter wrote to
    let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) = manifest
        .outputs(array_type)
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| input_dir.join(name))
        .partition(|path| path.exists());

    if let Some(first) = missing.first() {
        ensure!(
            allow_missing,
            "{} {array_type} files listed in the manifest are missing, i.e. {first:?}",
            missing.len()
        );
        tracing::warn!("Skipping {} missing {array_type} files", missing.len());
    }
    Ok(present)
}

#[doc(hidden)]
pub fn run(args: GatherArgs) -> Result<()> {
    let now = Instant::now();

    let prefix = match (&args.prefix, &args.vcf) {
        (Some(prefix), _) => prefix.clone(),
        (None, Some(vcf)) => vcf_file_name(vcf),
        (None, None) => return Err(eyre!("Either a VCF or a file prefix is needed to find the arrays")),
    };

    let manifest_path = Manifest::path(&args.input_dir, &prefix);
    let manifest = match manifest_path.exists() {
        true => {
            tracing::info!("Reading inputs from {manifest_path:?}");
            Some(Manifest::read(&manifest_path)?)
        }
        false => None,
    };

    let samples = match &args.vcf {
        Some(vcf) => Some(vcf_samples(vcf)?),
        None => None,
    };

    let opts = StoreOptions::from(&args.store_args);
    let file = open_store(&args.output, args.overwrite)
        .wrap_err_with(|| eyre!("Error opening {:?}", args.output))?;
    let root = require_group(&file, &args.group)?;

    for array_type in to_array_types(&args.array_types) {
        let inputs = find_inputs(
            &args.input_dir,
            &prefix,
            manifest.as_ref(),
            array_type,
            args.allow_missing,
        )?;

        if inputs.is_empty() {
            tracing::warn!("No {array_type} arrays found in {:?}", args.input_dir);
            continue;
        }

        let group = require_group(&root, array_type.group_name())?;
        for path in &inputs {
            let columns = read_columns(path, array_type.suffix())
                .wrap_err_with(|| eyre!("Error reading {path:?}"))?;
            for column in &columns {
                append_column(&group, column, &opts)
                    .wrap_err_with(|| eyre!("Error appending {} from {path:?}", column.name))?;
            }
        }
        tracing::info!("Loaded {} {array_type} files into {}", inputs.len(), group.name());

        if let (ArrayType::Calldata2d, Some(samples)) = (array_type, &samples) {
            check_sample_count(&group, samples.len())?;
        }
    }

    if let (Some(vcf), Some(samples)) = (&args.vcf, &samples) {
        write_samples(&root, samples, vcf)?;
        tracing::info!("Stored {} sample names", samples.len());
    }

    file.flush()?;
    tracing::info!("Wrote {:?} in {:?}", args.output, now.elapsed());
    Ok(())
}

fn check_sample_count(group: &hdf5::Group, n_samples: usize) -> Result<()> {
    for dataset in group.datasets()? {
        let shape = dataset.shape();
        if let Some(width) = shape.get(1) {
            if *width != n_samples {
                tracing::warn!(
                    "{} has {width} columns but the VCF has {n_samples} samples",
                    dataset.name()
                );
            }
        }
    }
    Ok(())
}
