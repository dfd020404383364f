//! Per-column value makers.

use crate::column_set::ResolvedColumn;
use crate::distribution::{DistributionFunction, MirrorPolicy};
use crate::domain::ValueDomain;
use crate::error::Result;
use crate::value::{ColumnType, GeneratedValue};

/// Default number of rendered values a maker keeps per column.
pub const DEFAULT_CACHE_LIMIT: usize = 1024;

/// Renders typed values for one column from row indices.
///
/// Values for the first `min(domain size, cache limit)` domain indices are
/// cached on first render and never invalidated. Indices past the cache are
/// rendered again on every access; large string domains therefore cost CPU
/// rather than memory.
#[derive(Debug, Clone)]
pub struct Maker {
    column_type: ColumnType,
    domain: ValueDomain,
    literal: Option<GeneratedValue>,
    mirror: MirrorPolicy,
    function: DistributionFunction,
    cache: Vec<Option<GeneratedValue>>,
}

impl Maker {
    pub fn new(column: &ResolvedColumn, cache_limit: usize) -> Self {
        let domain = column.domain().clone();
        let cache_len = usize::try_from(domain.size())
            .unwrap_or(usize::MAX)
            .min(cache_limit);

        Self {
            column_type: column.column_type(),
            literal: column.literal().cloned(),
            mirror: column.distribution().mirror_policy(),
            function: column.distribution().function(&column.seed_id()),
            cache: vec![None; cache_len],
            domain,
        }
    }

    /// Produce the value for `row_index` out of `max_rows` rows.
    pub fn next(&mut self, row_index: u64, max_rows: u64) -> Result<GeneratedValue> {
        let index = self.function.apply(
            0,
            to_i64(max_rows),
            to_i64(row_index),
            0,
            self.domain.size(),
        )?;

        if let Some(literal) = &self.literal {
            return Ok(literal.clone());
        }

        let slot = usize::try_from(index)
            .ok()
            .filter(|slot| *slot < self.cache.len());
        if let Some(cached) = slot.and_then(|slot| self.cache[slot].as_ref()) {
            return Ok(cached.clone());
        }

        let value = self.render(index);
        if let Some(slot) = slot {
            self.cache[slot] = Some(value.clone());
        }
        Ok(value)
    }

    /// Number of cache slots, filled or not.
    pub fn cache_capacity(&self) -> usize {
        self.cache.len()
    }

    /// Number of cache slots holding a rendered value.
    pub fn cached_count(&self) -> usize {
        self.cache.iter().filter(|v| v.is_some()).count()
    }

    fn render(&self, index: i64) -> GeneratedValue {
        let number = self.domain.number_at(index);
        match self.column_type {
            ColumnType::String => {
                let number = if self.mirror.mirrors_strings() {
                    self.domain.mirror_number(number)
                } else {
                    number
                };
                GeneratedValue::String(self.domain.render(number))
            }
            numeric => {
                let number = if self.mirror.negates(index) {
                    -number
                } else {
                    number
                };
                GeneratedValue::from_number(numeric, number)
            }
        }
    }
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
