//! Core type definitions for the catalog.

/// Scalar data types a property can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit integer column.
    Integer,
    /// Text column.
    String,
    /// Floating point column (prices, quantities).
    Double,
    /// 64-bit integer column.
    Bigint,
    /// Calendar date or timestamp column.
    Date,
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Integer | ScalarType::Double | ScalarType::Bigint
        )
    }

    /// Check if this type only admits whole numbers.
    pub fn is_integral(&self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Bigint)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarType::Integer => write!(f, "integer"),
            ScalarType::String => write!(f, "string"),
            ScalarType::Double => write!(f, "double"),
            ScalarType::Bigint => write!(f, "bigint"),
            ScalarType::Date => write!(f, "date"),
        }
    }
}
