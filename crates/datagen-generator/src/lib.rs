//! Deterministic column value generation for benchmark tables.
//!
//! A [`ColumnSet`] holds ordered column definitions: a name, a
//! [`ColumnType`], and a value definition that is either a literal or a
//! bracketed inclusive range (`"[1-100]"`, `"SYM[1-250]"`). Each column
//! resolves to a [`Maker`] that turns a row index into a typed value through
//! a [`DistributionKind`].
//!
//! # Architecture
//!
//! ```text
//! TableDefinition (YAML) ──► ColumnSet
//!                              │ resolve()
//!                              ▼
//!                       ResolvedColumn ×N
//!                              │ makers()
//!                              ▼
//! ┌──────────────────────────────────────────┐
//! │  Maker                                   │
//! │   - ValueDomain (range or literal)       │
//! │   - DistributionFunction (row → index)   │
//! │   - MirrorPolicy (sign / position flip)  │
//! │   - bounded value cache                  │
//! └────────────────────┬─────────────────────┘
//!                      ▼
//!               GeneratedValue
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_generator::{ColumnSet, ColumnType, DistributionKind};
//!
//! let mut columns = ColumnSet::new();
//! columns
//!     .add_with_distribution("id", ColumnType::Int, "[1-100]", DistributionKind::Ascending)?
//!     .add("sym", ColumnType::String, "SYM[1-250]")?;
//!
//! let mut makers = columns.makers();
//! let first: Vec<_> = makers
//!     .iter_mut()
//!     .map(|m| m.next(0, 1000))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(first[0].to_string(), "1");
//! # Ok::<(), datagen_generator::GeneratorError>(())
//! ```
//!
//! # Distributions
//!
//! - `ascending` (alias `incremental`) - cycles through the range in order
//! - `descending` - ascending traversal, numbers negated, strings mirrored
//! - `random` - seeded uniform draws, reproducible per column definition
//! - `runlength` - each value repeated range-size times before advancing
//! - `linearconv` - row index scaled proportionally onto the range

pub mod column_set;
pub mod definition;
pub mod distribution;
pub mod domain;
pub mod error;
pub mod maker;
pub mod value;

// Re-exports for convenience
pub use column_set::{ColumnSet, ResolvedColumn};
pub use definition::{ColumnDefinition, TableDefinition};
pub use distribution::{hash64, DistributionFunction, DistributionKind, MirrorPolicy};
pub use domain::ValueDomain;
pub use error::GeneratorError;
pub use maker::{Maker, DEFAULT_CACHE_LIMIT};
pub use value::{ColumnType, GeneratedValue};
