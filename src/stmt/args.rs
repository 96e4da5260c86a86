//! SQL statement arguments

use super::bind::Params;
use super::vars::Variable;
use crate::{Result, types::{Number, Value}};
use crate::types::number::Integer;

/// A trait for types that can be used as SQL arguments.
///
/// Arguments bind to parameters either positionally - each argument takes
/// the next placeholder - or by name via `("NAME", value)` pairs, which do
/// not consume a position. A `&mut` reference is an output bind that
/// receives the value produced by a single-row RETURNING clause.
pub trait ToSql : Send + Sync {
    /**
    Binds itself to the SQL parameter placeholder

    # Parameters

    - `pos` - zero-based index of the parameter placeholder to which the value will be bound
    - `params` - Statement parameters as defined in the SQL

    Note that the specified position is ignored if the argument provides the
    placeholder name to which the value should be bound.

    # Returns

    The index of the placeholder for the next argument.
    */
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize>;

    /**
    Copies the received data back into the bound argument.

    This is only meaningful for output binds; everything else just reports
    the position of the next argument.
    */
    fn update_from_bind(&mut self, pos: usize, _params: &Params) -> usize {
        pos + 1
    }
}

impl ToSql for () {
    fn bind_to(&mut self, pos: usize, _params: &mut Params) -> Result<usize> {
        Ok(pos + 1)
    }
}

fn int_value<T: Integer + Copy>(val: T) -> Value {
    Value::Number(Number::from_int(val))
}

macro_rules! impl_int_args {
    ($($t:ty),+) => {
        $(
            impl ToSql for $t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_in(pos, int_value(*self))?;
                    Ok(pos + 1)
                }
            }
            impl ToSql for &$t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_in(pos, int_value(**self))?;
                    Ok(pos + 1)
                }
            }
            impl ToSql for &mut $t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_out(pos)?;
                    Ok(pos + 1)
                }
                fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
                    if let Some(val) = params.out_scalar(pos) {
                        if let Ok(Some(num)) = val.as_number() {
                            if let Ok(val) = num.to_int::<$t>() {
                                **self = val;
                            }
                        }
                    }
                    pos + 1
                }
            }
        )+
    };
}

impl_int_args!{ i8, i16, i32, i64, isize, u8, u16, u32, u64, usize }

macro_rules! impl_real_args {
    ($($t:ty),+) => {
        $(
            impl ToSql for $t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_in(pos, Value::Number(Number::from_real(*self)?))?;
                    Ok(pos + 1)
                }
            }
            impl ToSql for &$t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_in(pos, Value::Number(Number::from_real(**self)?))?;
                    Ok(pos + 1)
                }
            }
            impl ToSql for &mut $t {
                fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                    params.bind_out(pos)?;
                    Ok(pos + 1)
                }
                fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
                    if let Some(val) = params.out_scalar(pos) {
                        if let Ok(Some(num)) = val.as_number() {
                            if let Ok(val) = num.to_real::<$t>() {
                                **self = val;
                            }
                        }
                    }
                    pos + 1
                }
            }
        )+
    };
}

impl_real_args!{ f32, f64 }

impl ToSql for &str {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::text(*self))?;
        Ok(pos + 1)
    }
}

impl ToSql for &&str {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::text(**self))?;
        Ok(pos + 1)
    }
}

impl ToSql for String {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::text(self.as_str()))?;
        Ok(pos + 1)
    }
}

impl ToSql for &String {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::text(self.as_str()))?;
        Ok(pos + 1)
    }
}

impl ToSql for &mut String {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_out(pos)?;
        Ok(pos + 1)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
        if let Some(txt) = params.out_scalar(pos).and_then(|val| val.as_text()) {
            self.clear();
            self.push_str(&txt);
        }
        pos + 1
    }
}

impl ToSql for &[u8] {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::raw(self.to_vec()))?;
        Ok(pos + 1)
    }
}

impl ToSql for Vec<u8> {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::raw(self.clone()))?;
        Ok(pos + 1)
    }
}

impl ToSql for &Vec<u8> {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_in(pos, Value::raw(self.as_slice().to_vec()))?;
        Ok(pos + 1)
    }
}

impl ToSql for &mut Vec<u8> {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_out(pos)?;
        Ok(pos + 1)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
        if let Some(Value::Raw(data)) = params.out_scalar(pos) {
            self.clear();
            self.extend_from_slice(data);
        }
        pos + 1
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        match self.as_mut() {
            Some(val) => val.bind_to(pos, params),
            None => {
                params.bind_in(pos, Value::Null)?;
                Ok(pos + 1)
            }
        }
    }
}

impl<T: ToSql + Clone> ToSql for &Option<T> {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        match self.as_ref() {
            Some(val) => {
                let mut val = val.clone();
                val.bind_to(pos, params)
            }
            None => {
                params.bind_in(pos, Value::Null)?;
                Ok(pos + 1)
            }
        }
    }
}

impl ToSql for Variable {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_var(pos, self)?;
        Ok(pos + 1)
    }
}

impl ToSql for &Variable {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        params.bind_var(pos, *self)?;
        Ok(pos + 1)
    }
}

impl<T: ToSql> ToSql for (&str, T) {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        let idx = params.index_of(self.0)?;
        self.1.bind_to(idx, params)?;
        Ok(pos)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
        if let Ok(idx) = params.index_of(self.0) {
            self.1.update_from_bind(idx, params);
        }
        pos
    }
}

impl<T1: ToSql, T2: ToSql> ToSql for ((&str, T1), (&str, T2)) {
    fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
        let idx = params.index_of(self.0.0)?;
        self.0.1.bind_to(idx, params)?;
        let idx = params.index_of(self.1.0)?;
        self.1.1.bind_to(idx, params)?;
        Ok(pos)
    }

    fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
        if let Ok(idx) = params.index_of(self.0.0) {
            self.0.1.update_from_bind(idx, params);
        }
        if let Ok(idx) = params.index_of(self.1.0) {
            self.1.1.update_from_bind(idx, params);
        }
        pos
    }
}

macro_rules! impl_tuple_args {
    ($head:ident $($tail:ident)+) => {
        impl<$head $(, $tail)*> ToSql for ($head $(, $tail)*) where $head: ToSql $(, $tail: ToSql)* {
            #[allow(non_snake_case)]
            fn bind_to(&mut self, pos: usize, params: &mut Params) -> Result<usize> {
                let (ref mut $head $(, ref mut $tail)*) = *self;
                let pos = $head.bind_to(pos, params)?;
                $(
                    let pos = $tail.bind_to(pos, params)?;
                )*
                Ok(pos)
            }
            #[allow(non_snake_case)]
            fn update_from_bind(&mut self, pos: usize, params: &Params) -> usize {
                let (ref mut $head $(, ref mut $tail)*) = *self;
                let pos = $head.update_from_bind(pos, params);
                $(
                    let pos = $tail.update_from_bind(pos, params);
                )*
                pos
            }
        }
    };
}

impl_tuple_args! { A B C }
impl_tuple_args! { A B C D }
impl_tuple_args! { A B C D E }
impl_tuple_args! { A B C D E F }
impl_tuple_args! { A B C D E F G }
impl_tuple_args! { A B C D E F G H }
impl_tuple_args! { A B C D E F G H I }
impl_tuple_args! { A B C D E F G H I J }
impl_tuple_args! { A B C D E F G H I J K }
impl_tuple_args! { A B C D E F G H I J K L }
