//! Parser for the Python literal subset found in NPY headers

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    Tuple(Vec<PyValue>),
    List(Vec<PyValue>),
    Dict(Vec<(PyValue, PyValue)>),
}

impl PyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a tuple or a list
    pub fn as_seq(&self) -> Option<&[PyValue]> {
        match self {
            Self::Tuple(v) | Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PyValue> {
        match self {
            Self::Dict(items) => items
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

pub fn parse(input: &str) -> Result<PyValue, String> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };
    let value = parser.value()?;
    parser.skip_ws();
    match parser.chars.next() {
        None => Ok(value),
        Some(c) => Err(format!("trailing character {c:?}")),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn expect(&mut self, wanted: char) -> Result<(), String> {
        self.skip_ws();
        match self.chars.next() {
            Some(c) if c == wanted => Ok(()),
            other => Err(format!("expected {wanted:?}, found {other:?}")),
        }
    }

    fn value(&mut self) -> Result<PyValue, String> {
        self.skip_ws();
        match self.chars.peek().copied() {
            Some('\'' | '"') => self.string().map(PyValue::Str),
            Some('(') => {
                self.chars.next();
                let (items, trailing_comma) = self.items(')')?;
                // (x) is just a parenthesized value, (x,) is a tuple
                if items.len() == 1 && !trailing_comma {
                    Ok(items.into_iter().next().unwrap_or(PyValue::None))
                } else {
                    Ok(PyValue::Tuple(items))
                }
            }
            Some('[') => {
                self.chars.next();
                Ok(PyValue::List(self.items(']')?.0))
            }
            Some('{') => {
                self.chars.next();
                self.dict()
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.int(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            other => Err(format!("unexpected {other:?}")),
        }
    }

    fn string(&mut self) -> Result<String, String> {
        let quote = self.chars.next().ok_or("unexpected end of input")?;
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(String::from("unterminated string")),
                },
                Some(c) if c == quote => return Ok(s),
                Some(c) => s.push(c),
                None => return Err(String::from("unterminated string")),
            }
        }
    }

    fn int(&mut self) -> Result<PyValue, String> {
        let mut s = String::new();
        if let Some(c) = self.chars.next_if_eq(&'-') {
            s.push(c);
        }
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit()) {
            s.push(c);
        }
        // Python 2 long suffix
        self.chars.next_if(|c| *c == 'L');
        s.parse::<i64>()
            .map(PyValue::Int)
            .map_err(|e| format!("invalid integer {s:?}: {e}"))
    }

    fn word(&mut self) -> Result<PyValue, String> {
        let mut s = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            s.push(c);
        }
        match s.as_str() {
            "True" => Ok(PyValue::Bool(true)),
            "False" => Ok(PyValue::Bool(false)),
            "None" => Ok(PyValue::None),
            _ => Err(format!("unknown name {s:?}")),
        }
    }

    /// Comma separated values until `close`. Returns whether the last value was followed by a comma.
    fn items(&mut self, close: char) -> Result<(Vec<PyValue>, bool), String> {
        let mut items = vec![];
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&close).is_some() {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.next() {
                Some(',') => trailing_comma = true,
                Some(c) if c == close => return Ok((items, false)),
                other => return Err(format!("expected ',' or {close:?}, found {other:?}")),
            }
        }
    }

    fn dict(&mut self) -> Result<PyValue, String> {
        let mut items = vec![];
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&'}').is_some() {
                return Ok(PyValue::Dict(items));
            }
            let key = self.value()?;
            self.expect(':')?;
            let value = self.value()?;
            items.push((key, value));
            self.skip_ws();
            match self.chars.next() {
                Some(',') => (),
                Some('}') => return Ok(PyValue::Dict(items)),
                other => return Err(format!("expected ',' or '}}', found {other:?}")),
            }
        }
    }
}
