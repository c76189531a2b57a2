use std::path::{Path, PathBuf};

use color_eyre::Result;

use vcfh5_core::reference::read_fasta_index;
use vcfh5_core::region::resolve_regions;
use vcfh5_core::{Contig, Region};

use crate::args::RegionArgs;
use crate::io::{read_regions_file, vcf_contigs};

/// Regions given on the command line followed by the regions of the regions file
pub fn explicit_regions(args: &RegionArgs) -> Result<Vec<Region>> {
    let mut regions = args
        .regions
        .iter()
        .map(|r| Region::parse(r))
        .collect::<std::result::Result<Vec<Region>, _>>()?;

    if let Some(path) = &args.regions_file {
        regions.extend(read_regions_file(path)?);
    }
    Ok(regions)
}

/// Contig lengths from the FASTA index when given, otherwise from the VCF header
pub fn reference_contigs(vcf: &Path, fasta: Option<&Path>) -> Result<Vec<Contig>> {
    let contigs = match fasta {
        Some(fasta) => read_fasta_index(fasta)?,
        None => vcf_contigs(vcf)?,
    };
    if contigs.is_empty() {
        tracing::warn!("No contigs with lengths found for {vcf:?}");
    }
    Ok(contigs)
}

/// The regions the extraction of `vcf` is split into
pub fn resolve(vcf: &Path, args: &RegionArgs) -> Result<Vec<Region>> {
    let explicit = explicit_regions(args)?;

    // Bounded regions need no contig lengths
    let contigs = match explicit.is_empty() || explicit.iter().any(|r| r.bounds().is_none()) {
        true => reference_contigs(vcf, args.fasta.as_deref())?,
        false => vec![],
    };

    let regions = resolve_regions(&explicit, &contigs, args.chunk_size)?;
    tracing::info!(
        "Split {} contigs and {} explicit regions into {} regions",
        contigs.len(),
        explicit.len(),
        regions.len()
    );
    Ok(regions)
}

#[doc(hidden)]
pub fn run(vcf: PathBuf, args: RegionArgs) -> Result<()> {
    for region in resolve(&vcf, &args)? {
        println!("{region}");
    }
    Ok(())
}
