//! Table definitions loaded from YAML.
//!
//! ```yaml
//! name: stock_trans
//! default_distribution: random
//! cache_limit: 1024
//! columns:
//!   - name: sym
//!     type: string
//!     values: "SYM[1-250]"
//!   - name: price
//!     type: double
//!     values: "[100-200]"
//!     distribution: runlength
//! ```

use crate::column_set::ColumnSet;
use crate::distribution::DistributionKind;
use crate::error::Result;
use crate::value::ColumnType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A column entry in a table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub values: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
}

/// A named table and its ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_limit: Option<usize>,
    /// Generate incrementally and size the row count from the largest range.
    #[serde(default)]
    pub fixed: bool,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build the column set, validating every column definition.
    pub fn to_column_set(&self) -> Result<ColumnSet> {
        let mut set = ColumnSet::new();
        if let Some(limit) = self.cache_limit {
            set = set.with_cache_limit(limit);
        }
        if self.fixed {
            set.fixed();
        }
        if let Some(name) = &self.default_distribution {
            set = set.with_default_distribution(name.parse::<DistributionKind>()?);
        }

        for column in &self.columns {
            match &column.distribution {
                Some(name) => {
                    let distribution = name.parse::<DistributionKind>()?;
                    set.add_with_distribution(
                        &column.name,
                        column.column_type,
                        &column.values,
                        distribution,
                    )?;
                }
                None => {
                    set.add(&column.name, column.column_type, &column.values)?;
                }
            }
        }
        Ok(set)
    }
}
