use std::fmt;

/// A dynamically typed scalar as the rest of the engine sees it.
///
/// Column element types are boxed into the nearest variant: unsigned integers
/// become [`Field::UInt64`], signed integers [`Field::Int64`] and floats
/// [`Field::Float64`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    UInt64(u64),
    Int64(i64),
    Float64(f64),
}

impl Field {
    pub fn type_name(&self) -> &'static str {
        match self {
            Field::UInt64(_) => "UInt64",
            Field::Int64(_) => "Int64",
            Field::Float64(_) => "Float64",
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Field::Float64(v) if v.is_nan())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::UInt64(v) => write!(f, "{v}"),
            Field::Int64(v) => write!(f, "{v}"),
            Field::Float64(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Field::UInt64(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Int64(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Float64(value)
    }
}
