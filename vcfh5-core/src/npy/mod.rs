//! Reading of NumPy `.npy` array files, including structured (record) arrays

pub mod column;
pub mod dtype;
pub mod literal;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyExt, ReadableElement};
use rayon::prelude::*;

pub use column::{Column, ColumnData};
pub use dtype::{Dtype, Field, Kind, Primitive};

use crate::error::{Error, Result};

const MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub dtype: Dtype,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Byte offset of the array data from the start of the file
    pub data_offset: usize,
}

impl NpyHeader {
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the array data in bytes, `None` when it does not fit in memory
    pub fn data_len(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(self.dtype.itemsize(), |acc, dim| acc.checked_mul(*dim))
    }
}

pub fn read_header<R: Read>(reader: &mut R, path: &Path) -> Result<NpyHeader> {
    let header_err = |msg: String| Error::NpyHeader {
        path: path.to_path_buf(),
        msg,
    };

    let mut preamble = [0u8; 8];
    reader
        .read_exact(&mut preamble)
        .map_err(|_| Error::NpyMagic {
            path: path.to_path_buf(),
        })?;
    if &preamble[..6] != MAGIC {
        return Err(Error::NpyMagic {
            path: path.to_path_buf(),
        });
    }

    let (major, minor) = (preamble[6], preamble[7]);
    let (header_len, prefix_len) = match major {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            (u16::from_le_bytes(len) as usize, 10)
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            (u32::from_le_bytes(len) as usize, 12)
        }
        _ => {
            return Err(Error::NpyVersion {
                path: path.to_path_buf(),
                major,
                minor,
            })
        }
    };

    let mut text = vec![0u8; header_len];
    reader.read_exact(&mut text)?;
    let text = String::from_utf8_lossy(&text);

    let dict = literal::parse(text.trim()).map_err(header_err)?;

    let descr = dict
        .get("descr")
        .ok_or_else(|| header_err(String::from("no 'descr' key")))?;
    let dtype = Dtype::from_descr(descr)?;

    let fortran_order = match dict.get("fortran_order") {
        Some(literal::PyValue::Bool(b)) => *b,
        other => return Err(header_err(format!("invalid 'fortran_order': {other:?}"))),
    };

    let shape = dict
        .get("shape")
        .and_then(literal::PyValue::as_seq)
        .ok_or_else(|| header_err(String::from("invalid 'shape'")))?
        .iter()
        .map(|v| match v {
            literal::PyValue::Int(n) => {
                usize::try_from(*n).map_err(|_| header_err(format!("negative dimension {n}")))
            }
            other => Err(header_err(format!("invalid dimension {other:?}"))),
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok(NpyHeader {
        dtype,
        fortran_order,
        shape,
        data_offset: prefix_len + header_len,
    })
}

/// Read the fields of an array file as columns. Plain numeric arrays yield a single column named `name`.
#[tracing::instrument(level = "debug")]
pub fn read_columns(path: &Path, name: &str) -> Result<Vec<Column>> {
    let file = File::open(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let header = read_header(&mut reader, path)?;

    // Checked before anything is allocated from the header's shape
    let expected = header.data_len().ok_or_else(|| Error::NpyHeader {
        path: path.to_path_buf(),
        msg: format!("array of shape {:?} is too large", header.shape),
    })?;
    let available = file_len.saturating_sub(header.data_offset as u64);
    if available < expected as u64 {
        return Err(Error::Truncated {
            path: path.to_path_buf(),
            expected,
            found: available as usize,
        });
    }

    match &header.dtype {
        Dtype::Scalar(p) if !matches!(p.kind, Kind::Bytes | Kind::Unicode | Kind::Void) => {
            reader.seek(SeekFrom::Start(0))?;
            let column = read_plain(reader, *p, name)?;
            Ok(vec![column])
        }
        Dtype::Scalar(p) => {
            let field = Field {
                name: name.to_string(),
                dtype: *p,
                shape: vec![],
                offset: 0,
            };
            read_records(reader, &header, &[field], expected, path)
        }
        Dtype::Record(fields) => read_records(reader, &header, fields, expected, path),
    }
}

fn read_records<R: Read>(
    reader: R,
    header: &NpyHeader,
    fields: &[Field],
    expected: usize,
    path: &Path,
) -> Result<Vec<Column>> {
    if header.fortran_order && header.shape.len() > 1 {
        return Err(Error::FortranRecords {
            path: path.to_path_buf(),
        });
    }

    let itemsize = header.dtype.itemsize();
    let mut buf = Vec::with_capacity(expected);
    reader.take(expected as u64).read_to_end(&mut buf)?;
    if buf.len() < expected {
        return Err(Error::Truncated {
            path: path.to_path_buf(),
            expected,
            found: buf.len(),
        });
    }

    let columns: Vec<Column> = fields
        .par_iter()
        .filter_map(|field| {
            let data = match itemsize {
                0 => column::decode_field(&[], 1, field),
                _ => column::decode_field(&buf, itemsize, field),
            }?;
            let mut shape = header.shape.clone();
            shape.extend(&field.shape);
            Some(Column {
                name: field.name.clone(),
                shape,
                data,
            })
        })
        .collect();

    tracing::debug!(
        "Decoded {} fields of {} records from {path:?}",
        columns.len(),
        header.len()
    );
    Ok(columns)
}

fn read_array<T: ReadableElement, R: Read>(reader: R) -> Result<(Vec<usize>, Vec<T>)> {
    let array = ArrayD::<T>::read_npy(reader)?;
    let shape = array.shape().to_vec();
    Ok((shape, array.into_iter().collect()))
}

fn read_plain<R: Read>(reader: R, p: Primitive, name: &str) -> Result<Column> {
    let (shape, data) = match (p.kind, p.size) {
        (Kind::Bool, _) => read_array::<bool, _>(reader).map(|(s, d)| (s, ColumnData::Bool(d)))?,
        (Kind::Int, 1) => read_array::<i8, _>(reader).map(|(s, d)| (s, ColumnData::I8(d)))?,
        (Kind::Int, 2) => read_array::<i16, _>(reader).map(|(s, d)| (s, ColumnData::I16(d)))?,
        (Kind::Int, 4) => read_array::<i32, _>(reader).map(|(s, d)| (s, ColumnData::I32(d)))?,
        (Kind::Int, _) => read_array::<i64, _>(reader).map(|(s, d)| (s, ColumnData::I64(d)))?,
        (Kind::UInt, 1) => read_array::<u8, _>(reader).map(|(s, d)| (s, ColumnData::U8(d)))?,
        (Kind::UInt, 2) => read_array::<u16, _>(reader).map(|(s, d)| (s, ColumnData::U16(d)))?,
        (Kind::UInt, 4) => read_array::<u32, _>(reader).map(|(s, d)| (s, ColumnData::U32(d)))?,
        (Kind::UInt, _) => read_array::<u64, _>(reader).map(|(s, d)| (s, ColumnData::U64(d)))?,
        (Kind::Float, 4) => read_array::<f32, _>(reader).map(|(s, d)| (s, ColumnData::F32(d)))?,
        (Kind::Float, _) => read_array::<f64, _>(reader).map(|(s, d)| (s, ColumnData::F64(d)))?,
        (kind, _) => {
            return Err(Error::UnsupportedDtype {
                descr: format!("{kind:?}"),
            })
        }
    };

    Ok(Column {
        name: name.to_string(),
        shape,
        data,
    })
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_npy::WriteNpyExt;

    /// Write a version 1.0 NPY file from a header dict and raw data
    fn write_npy(path: &Path, dict: &str, data: &[u8]) {
        write_npy_version(path, 1, dict, data)
    }

    fn write_npy_version(path: &Path, major: u8, dict: &str, data: &[u8]) {
        let prefix = match major { 1 => 10, _ => 12 };
        let mut header = dict.to_string();
        let total = prefix + header.len() + 1;
        header.push_str(&" ".repeat((64 - total % 64) % 64));
        header.push('\n');

        let mut bytes = vec![0x93u8];
        bytes.extend(b"NUMPY");
        bytes.extend([major, 0]);
        match major {
            1 => bytes.extend((header.len() as u16).to_le_bytes()),
            _ => bytes.extend((header.len() as u32).to_le_bytes()),
        }
        bytes.extend(header.as_bytes());
        bytes.extend(data);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_read_structured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.variants.npy");

        let mut data = vec![];
        for (chrom, pos) in [(b"chr1", 5i32), (b"chr2", 9)] {
            data.extend(chrom);
            data.extend(pos.to_le_bytes());
        }
        write_npy(&path, "{'descr': [('CHROM', '|S4'), ('POS', '<i4')], 'fortran_order': False, 'shape': (2,), }", &data);

        let mut reader = BufReader::new(File::open(&path).unwrap());
        let header = read_header(&mut reader, &path).unwrap();
        assert_eq!(header.shape, vec![2]);
        assert_eq!(header.data_offset % 64, 0);

        let columns = read_columns(&path, "variants").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "CHROM");
        assert_eq!(columns[0].data, ColumnData::Str(vec!["chr1".into(), "chr2".into()]));
        assert_eq!(columns[1].shape, vec![2]);
        assert_eq!(columns[1].data, ColumnData::I32(vec![5, 9]));
    }

    #[test]
    fn test_read_2d_structured_with_subarray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.calldata_2d.npy");

        // 2 variants x 3 samples, ('genotype', '|i1', (2,)), ('is_called', '|b1')
        let data: Vec<u8> = (0..6u8).flat_map(|i| [i, i + 10, (i % 2)]).collect();
        write_npy(&path, "{'descr': [('genotype', '|i1', (2,)), ('is_called', '|b1')], 'fortran_order': False, 'shape': (2, 3), }", &data);

        let columns = read_columns(&path, "calldata_2d").unwrap();
        assert_eq!(columns[0].shape, vec![2, 3, 2]);
        assert_eq!(columns[0].rows(), 2);
        assert_eq!(columns[0].data, ColumnData::I8(vec![0, 10, 1, 11, 2, 12, 3, 13, 4, 14, 5, 15]));
        assert_eq!(columns[1].shape, vec![2, 3]);
        assert_eq!(columns[1].data, ColumnData::Bool(vec![false, true, false, true, false, true]));
    }

    #[test]
    fn test_read_version_2_and_3() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = [7i32, -1].iter().flat_map(|v| v.to_le_bytes()).collect();

        for major in [2, 3] {
            let path = dir.path().join(format!("v{major}.npy"));
            write_npy_version(&path, major, "{'descr': [('POS', '<i4')], 'fortran_order': False, 'shape': (2,), }", &data);

            let mut reader = BufReader::new(File::open(&path).unwrap());
            let header = read_header(&mut reader, &path).unwrap();
            assert_eq!(header.data_offset % 64, 0);

            let columns = read_columns(&path, "variants").unwrap();
            assert_eq!(columns[0].data, ColumnData::I32(vec![7, -1]));
        }

        let path = dir.path().join("v4.npy");
        write_npy_version(&path, 4, "{'descr': '<i4', 'fortran_order': False, 'shape': (2,), }", &data);
        assert!(matches!(read_columns(&path, "x"), Err(Error::NpyVersion { major: 4, .. })));
    }

    #[test]
    fn test_read_fortran_records() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("fortran_2d.npy");
        write_npy(&path, "{'descr': [('genotype', '|i1')], 'fortran_order': True, 'shape': (2, 2), }", &[0, 1, 1, 0]);
        assert!(matches!(read_columns(&path, "calldata_2d"), Err(Error::FortranRecords { .. })));

        // One dimension has the same layout in both orders
        let path = dir.path().join("fortran_1d.npy");
        write_npy(&path, "{'descr': [('genotype', '|i1')], 'fortran_order': True, 'shape': (2,), }", &[0, 1]);
        assert_eq!(read_columns(&path, "x").unwrap()[0].data, ColumnData::I8(vec![0, 1]));
    }

    #[test]
    fn test_read_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.npy");
        let array = array![[1.5f64, 2.0], [3.0, 4.5]];
        array.write_npy(File::create(&path).unwrap()).unwrap();

        let columns = read_columns(&path, "values").unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "values");
        assert_eq!(columns[0].shape, vec![2, 2]);
        assert_eq!(columns[0].data, ColumnData::F64(vec![1.5, 2.0, 3.0, 4.5]));
    }

    #[test]
    fn test_read_errors() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("bad.npy");
        std::fs::write(&path, b"not a numpy file").unwrap();
        assert!(matches!(read_columns(&path, "x"), Err(Error::NpyMagic { .. })));

        let path = dir.path().join("short.npy");
        write_npy(&path, "{'descr': '|S4', 'fortran_order': False, 'shape': (3,), }", b"chr1chr2");
        assert!(matches!(
            read_columns(&path, "x"),
            Err(Error::Truncated { expected: 12, found: 8, .. })
        ));

        let path = dir.path().join("short_plain.npy");
        write_npy(&path, "{'descr': '<i4', 'fortran_order': False, 'shape': (3,), }", &[0; 8]);
        assert!(matches!(
            read_columns(&path, "x"),
            Err(Error::Truncated { expected: 12, found: 8, .. })
        ));

        let path = dir.path().join("huge.npy");
        write_npy(&path, "{'descr': [('POS', '<i8')], 'fortran_order': False, 'shape': (1152921504606846976,), }", &[0; 16]);
        assert!(matches!(read_columns(&path, "x"), Err(Error::Truncated { found: 16, .. })));

        let path = dir.path().join("overflow.npy");
        write_npy(&path, "{'descr': '<i8', 'fortran_order': False, 'shape': (1152921504606846976, 1152921504606846976), }", &[0; 16]);
        assert!(matches!(read_columns(&path, "x"), Err(Error::NpyHeader { .. })));

        let path = dir.path().join("object.npy");
        write_npy(&path, "{'descr': '|O', 'fortran_order': False, 'shape': (1,), }", &[0; 8]);
        assert!(matches!(read_columns(&path, "x"), Err(Error::UnsupportedDtype { .. })));

        assert!(matches!(read_columns(&dir.path().join("missing.npy"), "x"), Err(Error::Io(..))));
    }
}
