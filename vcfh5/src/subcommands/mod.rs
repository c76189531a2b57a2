/// Split a VCF into regions and fan the extraction jobs out to GNU parallel
pub mod scatter;

/// Concatenate per-region arrays into an HDF5 file
pub mod gather;

/// Shortcut to list the regions a VCF would be split into
pub mod list_regions;

/// Shortcut to read vcf sample names
pub mod list_samples;
