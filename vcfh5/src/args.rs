use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vcfh5_core::store::{DEFAULT_CHUNK_BYTES, DEFAULT_CHUNK_WIDTH};
use vcfh5_core::{ArrayType, Compression, Parallel, StoreOptions};

pub const DEFAULT_REGION_SIZE: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct RegionArgs {
    /// Reference FASTA, contigs and lengths are read from its .fai index. Defaults to the VCF header contigs.
    #[cfg_attr(feature = "clap", arg(short = 'f', long, value_hint = clap::ValueHint::FilePath))]
    pub fasta: Option<PathBuf>,

    /// Region to process, i.e. chr9 or chr9:27573534-27573600. Can be given multiple times.
    #[cfg_attr(feature = "clap", arg(short = 'r', long = "regions", visible_alias = "region"))]
    pub regions: Vec<String>,

    /// File with one region per line, or a BED file (.bed, .bed.gz)
    #[cfg_attr(feature = "clap", arg(short = 'R', long, value_hint = clap::ValueHint::FilePath))]
    pub regions_file: Option<PathBuf>,

    /// Region size in base pairs
    #[cfg_attr(feature = "clap", arg(short = 'c', long, default_value_t = DEFAULT_REGION_SIZE))]
    pub chunk_size: u64,
}

impl Default for RegionArgs {
    fn default() -> Self {
        Self {
            fasta: None,
            regions: vec![],
            regions_file: None,
            chunk_size: DEFAULT_REGION_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ParallelArgs {
    /// Number of extraction jobs to run at once
    #[cfg_attr(feature = "clap", arg(short = 'j', long, default_value_t = 8))]
    pub jobs: usize,

    /// GNU parallel executable
    #[cfg_attr(feature = "clap", arg(long = "parallel", default_value_t = String::from("parallel")))]
    pub program: String,

    /// Ask parallel to write a job log
    #[cfg_attr(feature = "clap", arg(long))]
    pub joblog: Option<PathBuf>,

    /// Stop all jobs as soon as one fails
    #[cfg_attr(feature = "clap", arg(long))]
    pub halt_on_error: bool,

    /// Extra options passed to parallel itself, i.e. --parallel-args --eta --delay 1 ";"
    #[cfg_attr(feature = "clap", arg(long, allow_hyphen_values = true, num_args = 1.., value_terminator = ";"))]
    pub parallel_args: Vec<String>,
}

impl Default for ParallelArgs {
    fn default() -> Self {
        Self {
            jobs: 8,
            program: String::from("parallel"),
            joblog: None,
            halt_on_error: false,
            parallel_args: vec![],
        }
    }
}

impl From<ParallelArgs> for Parallel {
    fn from(args: ParallelArgs) -> Self {
        Self {
            program: args.program,
            jobs: args.jobs,
            joblog: args.joblog,
            halt_on_error: args.halt_on_error,
            extra_args: args.parallel_args,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct StoreArgs {
    /// Target chunk size in bytes
    #[cfg_attr(feature = "clap", arg(long, default_value_t = DEFAULT_CHUNK_BYTES))]
    pub chunk_bytes: usize,

    /// Chunk width along the samples axis
    #[cfg_attr(feature = "clap", arg(long, default_value_t = DEFAULT_CHUNK_WIDTH))]
    pub chunk_width: usize,

    #[cfg_attr(feature = "clap", arg(long, value_enum, default_value_t = CompressionOption::Gzip))]
    pub compression: CompressionOption,

    /// Gzip compression level
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=9)))]
    pub compression_level: u8,

    /// Apply the shuffle filter before compression
    #[cfg_attr(feature = "clap", arg(long))]
    pub shuffle: bool,
}

impl Default for StoreArgs {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            chunk_width: DEFAULT_CHUNK_WIDTH,
            compression: CompressionOption::Gzip,
            compression_level: 1,
            shuffle: false,
        }
    }
}

impl From<&StoreArgs> for StoreOptions {
    fn from(args: &StoreArgs) -> Self {
        Self {
            chunk_bytes: args.chunk_bytes,
            chunk_width: args.chunk_width.max(1),
            compression: match args.compression {
                CompressionOption::Gzip => Compression::Gzip(args.compression_level),
                CompressionOption::None => Compression::None,
            },
            shuffle: args.shuffle,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CompressionOption {
    #[default]
    Gzip,
    None,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ArrayTypeOption {
    /// Variant level fields (CHROM, POS, REF, ALT, INFO fields)
    Variants,
    /// Per sample call fields (genotype, GQ, DP, ...)
    #[cfg_attr(feature = "clap", value(name = "calldata_2d", alias = "calldata"))]
    Calldata2d,
}

impl From<ArrayTypeOption> for ArrayType {
    fn from(option: ArrayTypeOption) -> Self {
        match option {
            ArrayTypeOption::Variants => ArrayType::Variants,
            ArrayTypeOption::Calldata2d => ArrayType::Calldata2d,
        }
    }
}

pub fn to_array_types(options: &[ArrayTypeOption]) -> Vec<ArrayType> {
    let mut array_types: Vec<ArrayType> = options.iter().map(|o| (*o).into()).collect();
    array_types.dedup();
    if array_types.is_empty() {
        return ArrayType::ALL.to_vec();
    }
    array_types
}

impl std::fmt::Display for ArrayTypeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Variants => write!(f, "variants"),
            Self::Calldata2d => write!(f, "calldata_2d"),
        }
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_store_options() {
        let args = StoreArgs { compression_level: 6, shuffle: true, chunk_width: 0, ..Default::default() };
        let opts = StoreOptions::from(&args);
        assert_eq!(opts.compression, Compression::Gzip(6));
        assert_eq!(opts.chunk_width, 1);
        assert!(opts.shuffle);

        let args = StoreArgs { compression: CompressionOption::None, ..Default::default() };
        assert_eq!(StoreOptions::from(&args).compression, Compression::None);
    }

    #[test]
    fn test_parallel_from_args() {
        let args = ParallelArgs {
            jobs: 4,
            halt_on_error: true,
            parallel_args: vec![String::from("--eta"), String::from("--delay"), String::from("1")],
            ..Default::default()
        };
        let parallel = Parallel::from(args);
        assert_eq!(parallel.extra_args, vec!["--eta", "--delay", "1"]);
        assert_eq!(parallel.args(), vec!["--jobs", "4", "--halt", "now,fail=1", "--eta", "--delay", "1"]);
        assert_eq!(Parallel::from(ParallelArgs::default()), Parallel::default());
    }

    #[test]
    fn test_array_types() {
        assert_eq!(to_array_types(&[]), vec![ArrayType::Variants, ArrayType::Calldata2d]);
        assert_eq!(
            to_array_types(&[ArrayTypeOption::Calldata2d, ArrayTypeOption::Calldata2d]),
            vec![ArrayType::Calldata2d]
        );
    }
}
