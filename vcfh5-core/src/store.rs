//! Appending columns to resizable, chunked and compressed HDF5 datasets

use std::path::Path;

use hdf5::types::VarLenUnicode;
use hdf5::{Dataset, Extent, File, Group, H5Type, Hyperslab, Selection, SimpleExtents, SliceOrIndex};
use ndarray::{ArrayView, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::npy::{Column, ColumnData};

pub const DEFAULT_CHUNK_BYTES: usize = 1 << 20;
pub const DEFAULT_CHUNK_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    None,
    /// Deflate with a level between 0 and 9
    Gzip(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Target size of a chunk in bytes
    pub chunk_bytes: usize,
    /// Chunk size along the second (samples) axis
    pub chunk_width: usize,
    pub compression: Compression,
    pub shuffle: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            chunk_width: DEFAULT_CHUNK_WIDTH,
            compression: Compression::Gzip(1),
            shuffle: false,
        }
    }
}

pub fn open_store(path: &Path, overwrite: bool) -> Result<File> {
    let file = match overwrite {
        true => File::create(path)?,
        false => File::append(path)?,
    };
    Ok(file)
}

/// Open a group by path, creating missing groups along the way.
/// Paths starting with `/` are resolved from the file root, others from `root`.
pub fn require_group(root: &Group, path: &str) -> Result<Group> {
    let mut group = match path.starts_with('/') {
        true => root.group("/")?,
        false => root.clone(),
    };
    for name in path.split('/').filter(|s| !s.is_empty()) {
        group = match group.link_exists(name) {
            true => group.group(name)?,
            false => group.create_group(name)?,
        };
    }
    Ok(group)
}

/// Chunk shape for a dataset whose rows have the trailing dimensions of `shape`
pub fn chunk_shape(shape: &[usize], elem_size: usize, opts: &StoreOptions) -> Vec<usize> {
    let mut chunk: Vec<usize> = shape
        .iter()
        .enumerate()
        .skip(1)
        .map(|(axis, dim)| match axis {
            1 => (*dim).min(opts.chunk_width),
            _ => *dim,
        })
        .map(|dim| dim.max(1))
        .collect();

    let row_bytes = chunk.iter().product::<usize>() * elem_size.max(1);
    let rows = (opts.chunk_bytes / row_bytes).max(1);
    chunk.insert(0, rows);
    chunk
}

fn create_dataset<T: H5Type>(
    group: &Group,
    name: &str,
    shape: &[usize],
    opts: &StoreOptions,
) -> Result<Dataset> {
    let extents: Vec<Extent> = std::iter::once(Extent::resizable(0))
        .chain(shape.iter().skip(1).map(|dim| Extent::fixed(*dim)))
        .collect();
    let chunk = chunk_shape(shape, std::mem::size_of::<T>(), opts);

    let mut builder = group
        .new_dataset::<T>()
        .shape(SimpleExtents::new(extents))
        .chunk(chunk);

    if opts.shuffle {
        builder = builder.shuffle();
    }
    if let Compression::Gzip(level) = opts.compression {
        builder = builder.deflate(level);
    }

    tracing::debug!("Creating dataset {name} with row shape {:?}", shape.get(1..).unwrap_or_default());
    Ok(builder.create(name)?)
}

fn append<T: H5Type>(
    group: &Group,
    name: &str,
    shape: &[usize],
    data: &[T],
    opts: &StoreOptions,
) -> Result<()> {
    let dataset = match group.link_exists(name) {
        true => {
            let dataset = group.dataset(name)?;
            if !dataset.dtype()?.is::<T>() {
                return Err(Error::TypeMismatch {
                    dataset: dataset.name(),
                });
            }
            dataset
        }
        false => create_dataset::<T>(group, name, shape, opts)?,
    };

    let existing = dataset.shape();
    if existing.len() != shape.len() || existing[1..] != shape[1..] {
        return Err(Error::ShapeMismatch {
            dataset: dataset.name(),
            existing: existing.into_iter().skip(1).collect(),
            found: shape.iter().skip(1).copied().collect(),
        });
    }

    let rows = shape[0];
    if rows == 0 {
        return Ok(());
    }

    let start = existing[0];
    let mut new_shape = existing;
    new_shape[0] = start + rows;
    dataset.resize(new_shape)?;

    let mut slices = vec![SliceOrIndex::from(start..start + rows)];
    slices.extend(shape.iter().skip(1).map(|_| SliceOrIndex::from(..)));
    let selection = Selection::from(Hyperslab::from(slices));

    let view = ArrayView::from_shape(IxDyn(shape), data)?;
    dataset.write_slice(view, selection)?;
    Ok(())
}

/// Append a column to the dataset of the same name in `group`. The dataset is created on first use.
pub fn append_column(group: &Group, column: &Column, opts: &StoreOptions) -> Result<()> {
    let (name, shape) = (column.name.as_str(), column.shape.as_slice());
    if shape.is_empty() {
        return Err(Error::New(format!("Cannot append zero dimensional column {name}")));
    }

    match &column.data {
        ColumnData::Bool(v) => append(group, name, shape, v, opts),
        ColumnData::I8(v) => append(group, name, shape, v, opts),
        ColumnData::I16(v) => append(group, name, shape, v, opts),
        ColumnData::I32(v) => append(group, name, shape, v, opts),
        ColumnData::I64(v) => append(group, name, shape, v, opts),
        ColumnData::U8(v) => append(group, name, shape, v, opts),
        ColumnData::U16(v) => append(group, name, shape, v, opts),
        ColumnData::U32(v) => append(group, name, shape, v, opts),
        ColumnData::U64(v) => append(group, name, shape, v, opts),
        ColumnData::F32(v) => append(group, name, shape, v, opts),
        ColumnData::F64(v) => append(group, name, shape, v, opts),
        ColumnData::Str(v) => {
            let v = to_varlen(v)?;
            append(group, name, shape, &v, opts)
        }
    }
}

fn to_varlen(strings: &[String]) -> Result<Vec<VarLenUnicode>> {
    Ok(strings
        .iter()
        .map(|s| s.parse::<VarLenUnicode>())
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Store sample names as the `samples` dataset of `group`, replacing an existing one
pub fn write_samples(group: &Group, samples: &[String], vcf: &Path) -> Result<()> {
    if group.link_exists("samples") {
        group.unlink("samples")?;
    }

    let samples = to_varlen(samples)?;
    let dataset = group
        .new_dataset::<VarLenUnicode>()
        .shape(samples.len())
        .create("samples")?;
    dataset.write_raw(&samples)?;

    if group.attr_names()?.iter().any(|n| n == "source_vcf") {
        group.delete_attr("source_vcf")?;
    }
    let source = vcf.display().to_string().parse::<VarLenUnicode>()?;
    group
        .new_attr::<VarLenUnicode>()
        .shape(())
        .create("source_vcf")?
        .write_scalar(&source)?;

    Ok(())
}
