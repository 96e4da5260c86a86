//! Engine values

pub mod number;
pub mod varchar;

pub use number::Number;
pub use varchar::Varchar;

use crate::{Result, Error, err::codes};

/// Data type of a column, a bind parameter, or an output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    Varchar,
    Raw,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColumnType::Number  => f.write_str("NUMBER"),
            ColumnType::Varchar => f.write_str("VARCHAR2"),
            ColumnType::Raw     => f.write_str("RAW"),
        }
    }
}

/// A single engine value.
///
/// The empty string has no representation of its own - it *is* NULL,
/// which is one of the dialect quirks this engine reproduces on purpose.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(Number),
    Varchar(String),
    Raw(Vec<u8>),
}

impl Value {
    /// Creates a text value. Empty text collapses to NULL.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Value::Null
        } else {
            Value::Varchar(text)
        }
    }

    /// Creates a binary value. An empty buffer collapses to NULL.
    pub fn raw(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        if data.is_empty() {
            Value::Null
        } else {
            Value::Raw(data)
        }
    }

    pub fn number(num: Number) -> Self {
        Value::Number(num)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn sql_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null       => None,
            Value::Number(_)  => Some(ColumnType::Number),
            Value::Varchar(_) => Some(ColumnType::Varchar),
            Value::Raw(_)     => Some(ColumnType::Raw),
        }
    }

    /// Numeric view of the value with implicit conversion from text.
    /// NULL stays NULL (`None`); unconvertible text is an error.
    pub(crate) fn as_number(&self) -> Result<Option<Number>> {
        match self {
            Value::Null => Ok(None),
            Value::Number(num) => Ok(Some(*num)),
            Value::Varchar(txt) => Number::from_string(txt).map(Some),
            Value::Raw(_) => Err( Error::invalid_number() ),
        }
    }

    /// Text view of the value. NULL stays NULL (`None`).
    pub(crate) fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Number(num) => Some(num.to_string()),
            Value::Varchar(txt) => Some(txt.clone()),
            Value::Raw(data) => {
                let mut txt = String::with_capacity(data.len() * 2);
                for byte in data {
                    txt.push_str(&format!("{:02X}", byte));
                }
                Some(txt)
            }
        }
    }

    /// Size of the value in bytes, as counted against column widths
    /// and output buffer sizes.
    pub(crate) fn byte_len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Number(_) => 0,
            Value::Varchar(txt) => txt.len(),
            Value::Raw(data) => data.len(),
        }
    }

    /// Coerces the value to the type of the column it is written into.
    pub(crate) fn coerce_to(&self, ctype: ColumnType) -> Result<Value> {
        match (self, ctype) {
            (Value::Null, _) => Ok(Value::Null),
            (Value::Number(_), ColumnType::Number) => Ok(self.clone()),
            (Value::Varchar(_), ColumnType::Varchar) => Ok(self.clone()),
            (Value::Raw(_), ColumnType::Raw) => Ok(self.clone()),
            (Value::Varchar(txt), ColumnType::Number) => {
                Number::from_string(txt).map(Value::Number)
            }
            (Value::Number(num), ColumnType::Varchar) => Ok(Value::Varchar(num.to_string())),
            _ => Err( Error::db(codes::INVALID_NUMBER, "invalid number") ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_null() {
        assert!(Value::text("").is_null());
        assert!(!Value::text("x").is_null());
    }

    #[test]
    fn implicit_text_to_number() -> Result<()> {
        let val = Value::text("41");
        let num = val.as_number()?.expect("not null");
        assert_eq!(num.to_int::<i32>()?, 41);
        assert!(Value::text("nope").as_number().is_err());
        Ok(())
    }
}
