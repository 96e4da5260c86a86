//! Conversions of engine values into Rust types

use crate::{Result, Error, types::{Number, Value, Varchar}};

/// A trait for types which instances can be created from the returned
/// values.
pub trait FromSql<'a> : Sized {
    /// Converts, if possible, the value into the requested type. Returns
    /// an error if the conversion is not defined or fails.
    fn value(val: &'a Value) -> Result<Self>;
}

fn cannot_convert() -> Error {
    Error::new("cannot convert")
}

impl FromSql<'_> for String {
    fn value(val: &Value) -> Result<Self> {
        val.as_text().ok_or_else(cannot_convert)
    }
}

impl<'a> FromSql<'a> for &'a str {
    fn value(val: &'a Value) -> Result<Self> {
        match val {
            Value::Varchar(txt) => Ok(txt.as_str()),
            _ => Err( cannot_convert() ),
        }
    }
}

impl<'a> FromSql<'a> for &'a [u8] {
    fn value(val: &'a Value) -> Result<Self> {
        match val {
            Value::Raw(data) => Ok(data.as_slice()),
            _ => Err( cannot_convert() ),
        }
    }
}

impl FromSql<'_> for Vec<u8> {
    fn value(val: &Value) -> Result<Self> {
        match val {
            Value::Raw(data) => Ok(data.clone()),
            _ => Err( cannot_convert() ),
        }
    }
}

impl FromSql<'_> for Number {
    fn value(val: &Value) -> Result<Self> {
        val.as_number()?.ok_or_else(cannot_convert)
    }
}

impl FromSql<'_> for Varchar {
    fn value(val: &Value) -> Result<Self> {
        let txt = val.as_text().ok_or_else(cannot_convert)?;
        Ok( Varchar::from(&txt) )
    }
}

impl FromSql<'_> for Value {
    fn value(val: &Value) -> Result<Self> {
        Ok( val.clone() )
    }
}

macro_rules! impl_int_from_sql {
    ($($t:ty),+) => {
        $(
            impl FromSql<'_> for $t {
                fn value(val: &Value) -> Result<Self> {
                    let num = val.as_number()?.ok_or_else(cannot_convert)?;
                    num.to_int::<$t>()
                }
            }
        )+
    };
}

impl_int_from_sql!{ i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize }

macro_rules! impl_real_from_sql {
    ($($t:ty),+) => {
        $(
            impl FromSql<'_> for $t {
                fn value(val: &Value) -> Result<Self> {
                    let num = val.as_number()?.ok_or_else(cannot_convert)?;
                    num.to_real::<$t>()
                }
            }
        )+
    };
}

impl_real_from_sql!{ f32, f64 }

impl<'a, T: FromSql<'a>> FromSql<'a> for Option<T> {
    fn value(val: &'a Value) -> Result<Self> {
        if val.is_null() {
            Ok(None)
        } else {
            T::value(val).map(Some)
        }
    }
}
