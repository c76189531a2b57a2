use std::path::PathBuf;

use thiserror::Error as ThisError;

#[rustfmt::skip]
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Failed to parse region: {region:?}")]
    RegionParse { region: String },

    #[error("Position: {value:?} is not an integer in region {region:?}")]
    PosParse { region: String, value: String },

    #[error("Invalid bounds in region {region:?}: start must be >= 1 and <= stop")]
    RegionBounds { region: String },

    #[error("Chunk size must be larger than zero")]
    ZeroChunkSize,

    #[error("Io error: {0} {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Io error: {0}")]
    StdIo(#[from] std::io::Error),

    #[error("Failed to read FASTA index {path:?}: {msg}")]
    FastaIndex { path: PathBuf, msg: String },

    #[error("Error parsing regions file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown placeholder {{{name}}} in command template")]
    UnknownPlaceholder { name: String },

    #[error("Unbalanced brace at byte {pos} in command template")]
    UnbalancedBrace { pos: usize },

    #[error("Failed to start {program:?}: {source}")]
    Spawn { program: String, source: std::io::Error },

    #[error("{program:?} exited with code {code:?}, some extraction jobs failed")]
    JobsFailed { program: String, code: Option<i32> },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Not a NPY file: {path:?}")]
    NpyMagic { path: PathBuf },

    #[error("Unsupported NPY version {major}.{minor} in {path:?}")]
    NpyVersion { path: PathBuf, major: u8, minor: u8 },

    #[error("Malformed NPY header in {path:?}: {msg}")]
    NpyHeader { path: PathBuf, msg: String },

    #[error("Unsupported NPY dtype {descr:?}")]
    UnsupportedDtype { descr: String },

    #[error("NPY data in {path:?} is truncated: expected {expected} bytes, found {found}")]
    Truncated { path: PathBuf, expected: usize, found: usize },

    #[error("Fortran ordered structured arrays are not supported: {path:?}")]
    FortranRecords { path: PathBuf },

    #[error("Failed to read NPY array: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    #[error("Something failed in reshaping a column {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("Invalid string for HDF5: {0}")]
    Hdf5String(#[from] hdf5::types::StringError),

    #[error("Dataset {dataset} has trailing shape {existing:?}, but {found:?} was given")]
    ShapeMismatch { dataset: String, existing: Vec<usize>, found: Vec<usize> },

    #[error("Dataset {dataset} already exists with a different element type")]
    TypeMismatch { dataset: String },

    #[error("{0}")]
    New(String),
}

pub type Result<T> = std::result::Result<T, Error>;
