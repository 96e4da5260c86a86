
use std::{ cmp, fmt, error, io };

/// Emulated database error codes.
///
/// The engine reports failures with the numeric codes its target dialect
/// uses, so assertions written against a real server port over unchanged.
pub(crate) mod codes {
    /// invalid SQL statement
    pub const INVALID_SQL: i32 = 900;
    /// "%s": invalid identifier
    pub const INVALID_IDENTIFIER: i32 = 904;
    /// invalid character
    pub const INVALID_CHARACTER: i32 = 911;
    /// table or view does not exist
    pub const TABLE_NOT_FOUND: i32 = 942;
    /// name is already used by an existing object
    pub const NAME_IN_USE: i32 = 955;
    /// invalid datatype
    pub const INVALID_DATATYPE: i32 = 902;
    /// SQL command not properly ended
    pub const COMMAND_NOT_ENDED: i32 = 933;
    /// too many values
    pub const TOO_MANY_VALUES: i32 = 913;
    /// not enough values
    pub const NOT_ENOUGH_VALUES: i32 = 947;
    /// column not allowed here
    pub const COLUMN_NOT_ALLOWED: i32 = 984;
    /// not all variables bound
    pub const NOT_ALL_VARIABLES_BOUND: i32 = 1008;
    /// illegal variable name/number
    pub const ILLEGAL_VARIABLE: i32 = 1036;
    /// cannot insert NULL
    pub const CANNOT_INSERT_NULL: i32 = 1400;
    /// converting column overflows integer datatype
    pub const INTEGER_OVERFLOW: i32 = 1455;
    /// divisor is equal to zero
    pub const DIVISOR_IS_ZERO: i32 = 1476;
    /// invalid number
    pub const INVALID_NUMBER: i32 = 1722;
    /// numeric or value error
    pub const VALUE_ERROR: i32 = 6502;
    /// value too large for column
    pub const VALUE_TOO_LARGE: i32 = 12899;
    /// error(s) in array DML
    pub const ARRAY_DML_ERRORS: i32 = 24381;
}

/// Represents possible errors returned from Pythia
#[derive(Debug)]
pub enum Error {
    /// API misuse detected before the statement reached the engine
    Interface(String),
    /// Error raised by the engine itself, tagged with the emulated numeric code
    Database(i32, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Database(errcode, errmsg) => write!(f, "ORA-{:05}: {}", errcode, errmsg),
            Error::Interface(errmsg) => write!(f, "{}", errmsg),
        }
    }
}

impl error::Error for Error {}

impl cmp::PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Database(this_code, _), Error::Database(other_code, _)) => this_code == other_code,
            (Error::Interface(this_msg),   Error::Interface(other_msg))    => this_msg  == other_msg,
            _ => false,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl Error {
    pub(crate) fn new(msg: &str) -> Self {
        Error::Interface( msg.to_owned() )
    }

    pub(crate) fn msg(msg: String) -> Self {
        Error::Interface( msg )
    }

    pub(crate) fn db(code: i32, msg: impl Into<String>) -> Self {
        Error::Database( code, msg.into() )
    }

    pub(crate) fn invalid_sql() -> Self {
        Self::db(codes::INVALID_SQL, "invalid SQL statement")
    }

    pub(crate) fn invalid_identifier(name: &str) -> Self {
        Self::db(codes::INVALID_IDENTIFIER, format!("\"{}\": invalid identifier", name))
    }

    pub(crate) fn table_not_found() -> Self {
        Self::db(codes::TABLE_NOT_FOUND, "table or view does not exist")
    }

    pub(crate) fn invalid_number() -> Self {
        Self::db(codes::INVALID_NUMBER, "invalid number")
    }

    /// Returns the emulated numeric code of a database error.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Database(code, _) => Some(*code),
            Error::Interface(_) => None,
        }
    }
}
