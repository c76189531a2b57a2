use crate::npy::dtype::{Field, Kind, Primitive};

/// Values of one field of an array, flattened in row-major order
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Str(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, shaped column. The shape is the array shape followed by the sub-array shape of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: ColumnData,
}

impl Column {
    /// Number of rows along the first axis
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }
}

trait FromBytes: Sized {
    fn from_bytes(bytes: &[u8], big_endian: bool) -> Self;
}

macro_rules! impl_from_bytes {
    ($($t:ty),*) => {
        $(
            impl FromBytes for $t {
                fn from_bytes(bytes: &[u8], big_endian: bool) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    match big_endian {
                        true => <$t>::from_be_bytes(buf),
                        false => <$t>::from_le_bytes(buf),
                    }
                }
            }
        )*
    };
}

impl_from_bytes!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Iterate over the raw bytes of every value of a field, record by record
fn values<'a>(
    buf: &'a [u8],
    itemsize: usize,
    field: &'a Field,
) -> impl Iterator<Item = &'a [u8]> + 'a {
    let size = field.dtype.size;
    let count = field.count();
    buf.chunks_exact(itemsize).flat_map(move |record| {
        (0..count).map(move |i| {
            let start = field.offset + i * size;
            &record[start..start + size]
        })
    })
}

fn collect<'a, T: FromBytes>(
    buf: &'a [u8],
    itemsize: usize,
    field: &'a Field,
) -> Vec<T> {
    let big_endian = field.dtype.big_endian;
    values(buf, itemsize, field)
        .map(|b| T::from_bytes(b, big_endian))
        .collect()
}

fn decode_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn decode_unicode(bytes: &[u8], big_endian: bool) -> String {
    bytes
        .chunks_exact(4)
        .map(|b| u32::from_bytes(b, big_endian))
        .take_while(|c| *c != 0)
        .map(|c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode a field from a buffer of packed records. Padding fields yield `None`.
pub fn decode_field(buf: &[u8], itemsize: usize, field: &Field) -> Option<ColumnData> {
    let Primitive {
        kind,
        size,
        big_endian,
    } = field.dtype;

    let data = match (kind, size) {
        (Kind::Void, _) => return None,
        (Kind::Bool, _) => ColumnData::Bool(values(buf, itemsize, field).map(|b| b[0] != 0).collect()),
        (Kind::Int, 1) => ColumnData::I8(collect(buf, itemsize, field)),
        (Kind::Int, 2) => ColumnData::I16(collect(buf, itemsize, field)),
        (Kind::Int, 4) => ColumnData::I32(collect(buf, itemsize, field)),
        (Kind::Int, _) => ColumnData::I64(collect(buf, itemsize, field)),
        (Kind::UInt, 1) => ColumnData::U8(collect(buf, itemsize, field)),
        (Kind::UInt, 2) => ColumnData::U16(collect(buf, itemsize, field)),
        (Kind::UInt, 4) => ColumnData::U32(collect(buf, itemsize, field)),
        (Kind::UInt, _) => ColumnData::U64(collect(buf, itemsize, field)),
        (Kind::Float, 4) => ColumnData::F32(collect(buf, itemsize, field)),
        (Kind::Float, _) => ColumnData::F64(collect(buf, itemsize, field)),
        (Kind::Bytes, _) => ColumnData::Str(values(buf, itemsize, field).map(decode_bytes).collect()),
        (Kind::Unicode, _) => ColumnData::Str(
            values(buf, itemsize, field)
                .map(|b| decode_unicode(b, big_endian))
                .collect(),
        ),
    };
    Some(data)
}
