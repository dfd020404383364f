//! Column types and the values generated for them.

use crate::error::GeneratorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type of an output column.
///
/// The textual names (`string`, `long`, `int`, `double`, `float`,
/// `timestamp-millis`) are what table definitions and `describe()` use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    String,
    Long,
    Int,
    Double,
    Float,
    TimestampMillis,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Long => "long",
            ColumnType::Int => "int",
            ColumnType::Double => "double",
            ColumnType::Float => "float",
            ColumnType::TimestampMillis => "timestamp-millis",
        }
    }

    /// Whether values of this type are rendered from the numeric range alone.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnType::String)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "long" => Ok(ColumnType::Long),
            "int" => Ok(ColumnType::Int),
            "double" => Ok(ColumnType::Double),
            "float" => Ok(ColumnType::Float),
            "timestamp-millis" => Ok(ColumnType::TimestampMillis),
            _ => Err(GeneratorError::UnknownType(s.to_string())),
        }
    }
}

/// A single generated column value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    String(String),
    Long(i64),
    Int(i32),
    Double(f64),
    Float(f32),
    /// Milliseconds since the Unix epoch.
    TimestampMillis(i64),
}

impl GeneratedValue {
    /// Build a numeric value of the given type from an integral number.
    ///
    /// Callers are responsible for range-checking `int` columns up front.
    pub(crate) fn from_number(column_type: ColumnType, n: i64) -> Self {
        match column_type {
            ColumnType::Long => GeneratedValue::Long(n),
            ColumnType::Int => GeneratedValue::Int(n as i32),
            ColumnType::Double => GeneratedValue::Double(n as f64),
            ColumnType::Float => GeneratedValue::Float(n as f32),
            ColumnType::TimestampMillis => GeneratedValue::TimestampMillis(n),
            ColumnType::String => GeneratedValue::String(n.to_string()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            GeneratedValue::String(_) => ColumnType::String,
            GeneratedValue::Long(_) => ColumnType::Long,
            GeneratedValue::Int(_) => ColumnType::Int,
            GeneratedValue::Double(_) => ColumnType::Double,
            GeneratedValue::Float(_) => ColumnType::Float,
            GeneratedValue::TimestampMillis(_) => ColumnType::TimestampMillis,
        }
    }

    /// The integral value, if this is an integer or timestamp.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Long(v) | GeneratedValue::TimestampMillis(v) => Some(*v),
            GeneratedValue::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedValue::String(s) => f.write_str(s),
            GeneratedValue::Long(v) | GeneratedValue::TimestampMillis(v) => write!(f, "{v}"),
            GeneratedValue::Int(v) => write!(f, "{v}"),
            GeneratedValue::Double(v) => write!(f, "{v:?}"),
            GeneratedValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_names() {
        for ty in [
            ColumnType::String,
            ColumnType::Long,
            ColumnType::Int,
            ColumnType::Double,
            ColumnType::Float,
            ColumnType::TimestampMillis,
        ] {
            assert_eq!(ty.as_str().parse::<ColumnType>().unwrap(), ty);
        }
        assert_eq!("Timestamp-Millis".parse::<ColumnType>().unwrap(), ColumnType::TimestampMillis);
        assert!(matches!(
            "decimal".parse::<ColumnType>(),
            Err(GeneratorError::UnknownType(_))
        ));
    }

    #[test]
    fn test_column_type_yaml_name() {
        let ty: ColumnType = serde_yaml::from_str("timestamp-millis").unwrap();
        assert_eq!(ty, ColumnType::TimestampMillis);
    }

    #[test]
    fn test_from_number() {
        assert_eq!(
            GeneratedValue::from_number(ColumnType::Float, 101),
            GeneratedValue::Float(101.0)
        );
        assert_eq!(
            GeneratedValue::from_number(ColumnType::Int, -7),
            GeneratedValue::Int(-7)
        );
        assert_eq!(GeneratedValue::Double(14.0).to_string(), "14.0");
    }
}
