use crate::error::{Error, Result};
use crate::npy::literal::PyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    UInt,
    Float,
    /// Fixed width byte string, `S<n>`
    Bytes,
    /// Fixed width UCS-4 string, `U<n>`
    Unicode,
    /// Padding, `V<n>`
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub kind: Kind,
    /// Size in bytes
    pub size: usize,
    pub big_endian: bool,
}

impl Primitive {
    /// Parse a numpy type string such as `<i4`, `|S12` or `?`
    pub fn parse(typestr: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedDtype {
            descr: typestr.into(),
        };

        let (big_endian, rest) = match typestr.chars().next() {
            Some('>') | Some('!') => (true, &typestr[1..]),
            Some('<' | '|' | '=') => (false, &typestr[1..]),
            _ => (false, typestr),
        };

        let mut chars = rest.chars();
        let code = chars.next().ok_or_else(unsupported)?;
        let width = chars.as_str();
        let width: Option<usize> = if width.is_empty() {
            None
        } else {
            Some(width.parse().map_err(|_| unsupported())?)
        };

        let (kind, size) = match (code, width) {
            ('?', None) | ('b', Some(1)) => (Kind::Bool, 1),
            ('b', None) => (Kind::Int, 1),
            ('B', None) => (Kind::UInt, 1),
            ('i', Some(n @ (1 | 2 | 4 | 8))) => (Kind::Int, n),
            ('u', Some(n @ (1 | 2 | 4 | 8))) => (Kind::UInt, n),
            ('f', Some(n @ (4 | 8))) => (Kind::Float, n),
            ('S' | 'a', Some(n)) => (Kind::Bytes, n),
            ('U', Some(n)) => (Kind::Unicode, n * 4),
            ('V', Some(n)) => (Kind::Void, n),
            _ => return Err(unsupported()),
        };

        Ok(Self {
            kind,
            size,
            big_endian,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub dtype: Primitive,
    /// Sub-array shape of the field, empty for scalar fields
    pub shape: Vec<usize>,
    /// Byte offset within a record
    pub offset: usize,
}

impl Field {
    /// Number of primitive values per record
    pub fn count(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn nbytes(&self) -> usize {
        self.count() * self.dtype.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dtype {
    Scalar(Primitive),
    Record(Vec<Field>),
}

impl Dtype {
    pub fn from_descr(descr: &PyValue) -> Result<Self> {
        match descr {
            PyValue::Str(typestr) => Ok(Self::Scalar(Primitive::parse(typestr)?)),
            PyValue::List(items) => {
                let mut fields = vec![];
                let mut offset = 0;
                for item in items {
                    let field = parse_field(item, offset)?;
                    offset += field.nbytes();
                    fields.push(field);
                }
                Ok(Self::Record(fields))
            }
            other => Err(Error::UnsupportedDtype {
                descr: format!("{other:?}"),
            }),
        }
    }

    /// Bytes per array element
    pub fn itemsize(&self) -> usize {
        match self {
            Self::Scalar(p) => p.size,
            Self::Record(fields) => fields.iter().map(Field::nbytes).sum(),
        }
    }
}

fn parse_field(item: &PyValue, offset: usize) -> Result<Field> {
    let unsupported = || Error::UnsupportedDtype {
        descr: format!("{item:?}"),
    };
    let parts = item.as_seq().ok_or_else(unsupported)?;

    let name = match parts.first() {
        Some(PyValue::Str(name)) => name.clone(),
        // (title, name) pairs
        Some(PyValue::Tuple(pair)) => pair
            .get(1)
            .and_then(PyValue::as_str)
            .ok_or_else(unsupported)?
            .to_string(),
        _ => return Err(unsupported()),
    };

    // Nested records come as lists in place of the type string
    let typestr = parts.get(1).and_then(PyValue::as_str).ok_or_else(unsupported)?;
    let dtype = Primitive::parse(typestr)?;

    let shape = match parts.get(2) {
        None => vec![],
        Some(PyValue::Int(n)) => vec![usize::try_from(*n).map_err(|_| unsupported())?],
        Some(PyValue::Tuple(dims)) => dims
            .iter()
            .map(|d| match d {
                PyValue::Int(n) => usize::try_from(*n).map_err(|_| unsupported()),
                _ => Err(unsupported()),
            })
            .collect::<Result<Vec<usize>>>()?,
        Some(_) => return Err(unsupported()),
    };

    Ok(Field {
        name,
        dtype,
        shape,
        offset,
    })
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use crate::npy::literal::parse;

    #[test]
    fn test_parse_primitive() {
        assert_eq!(Primitive::parse("<i4").unwrap(), Primitive { kind: Kind::Int, size: 4, big_endian: false });
        assert_eq!(Primitive::parse(">f8").unwrap(), Primitive { kind: Kind::Float, size: 8, big_endian: true });
        assert_eq!(Primitive::parse("|b1").unwrap().kind, Kind::Bool);
        assert_eq!(Primitive::parse("?").unwrap().kind, Kind::Bool);
        assert_eq!(Primitive::parse("|S12").unwrap(), Primitive { kind: Kind::Bytes, size: 12, big_endian: false });
        assert_eq!(Primitive::parse("<U3").unwrap().size, 12);
        assert_eq!(Primitive::parse("|V4").unwrap().kind, Kind::Void);
        assert!(Primitive::parse("<i3").is_err());
        assert!(Primitive::parse("<f2").is_err());
        assert!(Primitive::parse("<c16").is_err());
        assert!(Primitive::parse("|O").is_err());
    }

    #[test]
    fn test_record_dtype() {
        let descr = parse("[('CHROM', '|S4'), ('POS', '<i4'), ('', '|V2'), ('genotype', '|i1', (2, 3))]").unwrap();
        let dtype = Dtype::from_descr(&descr).unwrap();
        let Dtype::Record(fields) = &dtype else { panic!("not a record") };

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1].offset, 4);
        assert_eq!(fields[2].offset, 8);
        assert_eq!(fields[3].offset, 10);
        assert_eq!(fields[3].shape, vec![2, 3]);
        assert_eq!(fields[3].count(), 6);
        assert_eq!(dtype.itemsize(), 16);

        let nested = parse("[('a', [('b', '<i4')])]").unwrap();
        assert!(Dtype::from_descr(&nested).is_err());
    }
}
