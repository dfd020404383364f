//! Ordered column definitions.

use crate::distribution::DistributionKind;
use crate::domain::ValueDomain;
use crate::error::{GeneratorError, Result};
use crate::maker::{Maker, DEFAULT_CACHE_LIMIT};
use crate::value::{ColumnType, GeneratedValue};
use tracing::debug;

/// A declared column. The distribution may be left to the set's default.
#[derive(Debug, Clone)]
struct Column {
    name: String,
    column_type: ColumnType,
    value_def: String,
    distribution: Option<DistributionKind>,
    domain: ValueDomain,
    literal: Option<GeneratedValue>,
}

/// A column with its distribution fixed against the owning set's default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    name: String,
    column_type: ColumnType,
    value_def: String,
    distribution: DistributionKind,
    domain: ValueDomain,
    literal: Option<GeneratedValue>,
}

impl ResolvedColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn value_def(&self) -> &str {
        &self.value_def
    }

    pub fn distribution(&self) -> DistributionKind {
        self.distribution
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    /// The fixed value of a literal column.
    pub fn literal(&self) -> Option<&GeneratedValue> {
        self.literal.as_ref()
    }

    /// Seed key for random distributions: columns with the same type and
    /// value definition draw the same sequence.
    pub fn seed_id(&self) -> String {
        format!("{}:{}", self.column_type, self.value_def)
    }
}

/// An ordered set of column definitions sharing a default distribution.
///
/// Insertion order is the field order of every serialized record.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    default_distribution: DistributionKind,
    cache_limit: usize,
    is_fixed: bool,
    columns: Vec<Column>,
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnSet {
    pub fn new() -> Self {
        Self {
            default_distribution: DistributionKind::Random,
            cache_limit: DEFAULT_CACHE_LIMIT,
            is_fixed: false,
            columns: Vec::new(),
        }
    }

    /// Set how many rendered values each maker may cache.
    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }

    pub fn with_default_distribution(mut self, distribution: DistributionKind) -> Self {
        self.default_distribution = distribution;
        self
    }

    /// Add a column that uses the set's default distribution.
    pub fn add(
        &mut self,
        name: &str,
        column_type: ColumnType,
        value_def: &str,
    ) -> Result<&mut Self> {
        self.push(name, column_type, value_def, None)
    }

    /// Add a column with an explicit distribution.
    pub fn add_with_distribution(
        &mut self,
        name: &str,
        column_type: ColumnType,
        value_def: &str,
        distribution: DistributionKind,
    ) -> Result<&mut Self> {
        self.push(name, column_type, value_def, Some(distribution))
    }

    fn push(
        &mut self,
        name: &str,
        column_type: ColumnType,
        value_def: &str,
        distribution: Option<DistributionKind>,
    ) -> Result<&mut Self> {
        if self.columns.iter().any(|c| c.name == name) {
            return Err(GeneratorError::DuplicateColumn(name.to_string()));
        }

        let domain = ValueDomain::parse(name, value_def)?;
        let literal = validate_domain(name, column_type, &domain)?;

        debug!(
            "Added column '{}' ({}) with values '{}' ({} distinct)",
            name,
            column_type,
            value_def,
            domain.size()
        );

        self.columns.push(Column {
            name: name.to_string(),
            column_type,
            value_def: value_def.to_string(),
            distribution,
            domain,
            literal,
        });
        Ok(self)
    }

    /// Generate values incrementally through each range.
    pub fn fixed(&mut self) -> &mut Self {
        self.is_fixed = true;
        self.default_distribution = DistributionKind::Ascending;
        self
    }

    /// Generate values randomly from each range.
    pub fn random(&mut self) -> &mut Self {
        self.is_fixed = false;
        self.default_distribution = DistributionKind::Random;
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    pub fn default_distribution(&self) -> DistributionKind {
        self.default_distribution
    }

    pub fn cache_limit(&self) -> usize {
        self.cache_limit
    }

    pub fn count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Comma-separated, double-quoted column names.
    pub fn quoted_columns(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Column names and types in insertion order.
    pub fn type_map(&self) -> Vec<(&str, ColumnType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect()
    }

    /// The largest domain size over all columns, or 0 for an empty set.
    pub fn max_domain_size(&self) -> i64 {
        self.columns
            .iter()
            .map(|c| c.domain.size())
            .max()
            .unwrap_or(0)
    }

    /// Rows to generate: `requested` if positive, otherwise the largest
    /// domain when fixed, otherwise `scale_default`.
    pub fn row_count(&self, requested: u64, scale_default: u64) -> u64 {
        if requested > 0 {
            return requested;
        }
        if self.is_fixed {
            let max = u64::try_from(self.max_domain_size()).unwrap_or(0);
            if max > 0 {
                return max;
            }
        }
        scale_default
    }

    /// Canonical text listing every column, used to decide whether a
    /// previously generated table can be reused.
    ///
    /// Lines end in `\n` on every platform; nothing here depends on locale,
    /// time zone, or hash ordering.
    pub fn describe(&self) -> String {
        let mut text = String::from("name,type,values,distribution\n");
        for column in self.resolve() {
            text.push_str(&column.name);
            text.push(',');
            text.push_str(column.column_type.as_str());
            text.push(',');
            text.push_str(&column.value_def);
            text.push(',');
            text.push_str(column.distribution.name());
            text.push('\n');
        }
        text
    }

    /// Resolve every column against the default distribution.
    pub fn resolve(&self) -> Vec<ResolvedColumn> {
        self.columns
            .iter()
            .map(|c| ResolvedColumn {
                name: c.name.clone(),
                column_type: c.column_type,
                value_def: c.value_def.clone(),
                distribution: c.distribution.unwrap_or(self.default_distribution),
                domain: c.domain.clone(),
                literal: c.literal.clone(),
            })
            .collect()
    }

    /// Fresh makers, one per column in order.
    ///
    /// Each call starts from the beginning of every random sequence, so two
    /// production runs over the same set emit the same rows.
    pub fn makers(&self) -> Vec<Maker> {
        self.resolve()
            .iter()
            .map(|column| Maker::new(column, self.cache_limit))
            .collect()
    }
}

/// Check that a domain can be rendered as `column_type`, returning the
/// literal value for literal domains.
fn validate_domain(
    name: &str,
    column_type: ColumnType,
    domain: &ValueDomain,
) -> Result<Option<GeneratedValue>> {
    let definition = domain.definition();

    if domain.is_literal() {
        let invalid = |_| {
            GeneratorError::column_definition(
                name,
                definition,
                format!("not a {column_type} literal and no [start-end] range found"),
            )
        };
        let text = definition.trim();
        let literal = match column_type {
            ColumnType::String => GeneratedValue::String(definition.to_string()),
            ColumnType::Long => GeneratedValue::Long(text.parse().map_err(invalid)?),
            ColumnType::TimestampMillis => {
                GeneratedValue::TimestampMillis(text.parse().map_err(invalid)?)
            }
            ColumnType::Int => GeneratedValue::Int(text.parse().map_err(invalid)?),
            ColumnType::Double => GeneratedValue::Double(text.parse().map_err(|_| {
                GeneratorError::column_definition(name, definition, "not a double literal")
            })?),
            ColumnType::Float => GeneratedValue::Float(text.parse().map_err(|_| {
                GeneratorError::column_definition(name, definition, "not a float literal")
            })?),
        };
        return Ok(Some(literal));
    }

    if column_type == ColumnType::Int
        && (domain.range_start() < i64::from(i32::MIN) || domain.range_end() > i64::from(i32::MAX))
    {
        return Err(GeneratorError::column_definition(
            name,
            definition,
            "range does not fit in a 32-bit int",
        ));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.add("symbol", ColumnType::String, "ABC[1-10]")
            .unwrap()
            .add("price", ColumnType::Float, "[100-105]")
            .unwrap()
            .add("priceAgain", ColumnType::Int, "[100-105]")
            .unwrap();
        set
    }

    #[test]
    fn test_add_keeps_order_and_types() {
        let set = sample_set();
        assert_eq!(set.count(), 3);
        assert_eq!(set.names(), vec!["symbol", "price", "priceAgain"]);
        assert_eq!(
            set.type_map(),
            vec![
                ("symbol", ColumnType::String),
                ("price", ColumnType::Float),
                ("priceAgain", ColumnType::Int),
            ]
        );
        assert_eq!(set.quoted_columns(), "\"symbol\",\"price\",\"priceAgain\"");
    }

    #[test]
    fn test_max_domain_size() {
        assert_eq!(sample_set().max_domain_size(), 10);
        assert_eq!(ColumnSet::new().max_domain_size(), 0);
    }

    #[test]
    fn test_describe() {
        let mut set = sample_set();
        assert_eq!(
            set.describe(),
            "name,type,values,distribution\n\
             symbol,string,ABC[1-10],random\n\
             price,float,[100-105],random\n\
             priceAgain,int,[100-105],random\n"
        );

        set.fixed();
        assert_eq!(
            set.describe(),
            "name,type,values,distribution\n\
             symbol,string,ABC[1-10],ascending\n\
             price,float,[100-105],ascending\n\
             priceAgain,int,[100-105],ascending\n"
        );
    }

    #[test]
    fn test_describe_detects_changes() {
        let a = sample_set().describe();
        assert_eq!(a, sample_set().describe());

        let mut changed_values = ColumnSet::new();
        changed_values
            .add("symbol", ColumnType::String, "ABC[1-11]")
            .unwrap()
            .add("price", ColumnType::Float, "[100-105]")
            .unwrap()
            .add("priceAgain", ColumnType::Int, "[100-105]")
            .unwrap();
        assert_ne!(a, changed_values.describe());

        let mut changed_distribution = ColumnSet::new();
        changed_distribution
            .add_with_distribution(
                "symbol",
                ColumnType::String,
                "ABC[1-10]",
                DistributionKind::RunLength,
            )
            .unwrap()
            .add("price", ColumnType::Float, "[100-105]")
            .unwrap()
            .add("priceAgain", ColumnType::Int, "[100-105]")
            .unwrap();
        assert_ne!(a, changed_distribution.describe());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut set = sample_set();
        let err = set.add("price", ColumnType::Long, "[1-2]").unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateColumn(name) if name == "price"));
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn test_malformed_numeric_definition_rejected_eagerly() {
        let mut set = ColumnSet::new();
        let err = set.add("v", ColumnType::Long, "abc").unwrap_err();
        assert!(matches!(err, GeneratorError::ColumnDefinition { .. }));

        let err = set.add("w", ColumnType::Int, "[1-3000000000]").unwrap_err();
        assert!(matches!(err, GeneratorError::ColumnDefinition { .. }));
        assert!(set.is_empty());
    }

    #[test]
    fn test_literals_of_every_type() {
        let mut set = ColumnSet::new();
        set.add("col1", ColumnType::String, "11")
            .unwrap()
            .add("col2", ColumnType::Long, "12")
            .unwrap()
            .add("col3", ColumnType::Int, "13")
            .unwrap()
            .add("col4", ColumnType::Double, "14")
            .unwrap()
            .add("col5", ColumnType::Float, "15")
            .unwrap()
            .add("col6", ColumnType::TimestampMillis, "16")
            .unwrap();

        let mut makers = set.makers();
        for i in 0..10 {
            assert_eq!(makers[0].next(i, 10).unwrap(), GeneratedValue::String("11".into()));
            assert_eq!(makers[1].next(i, 10).unwrap(), GeneratedValue::Long(12));
            assert_eq!(makers[2].next(i, 10).unwrap(), GeneratedValue::Int(13));
            assert_eq!(makers[3].next(i, 10).unwrap(), GeneratedValue::Double(14.0));
            assert_eq!(makers[4].next(i, 10).unwrap(), GeneratedValue::Float(15.0));
            assert_eq!(makers[5].next(i, 10).unwrap(), GeneratedValue::TimestampMillis(16));
        }
    }

    #[test]
    fn test_resolve_uses_default_only_when_unset() {
        let mut set = ColumnSet::new().with_default_distribution(DistributionKind::LinearConv);
        set.add("a", ColumnType::Long, "[1-5]")
            .unwrap()
            .add_with_distribution("b", ColumnType::Long, "[1-5]", DistributionKind::Descending)
            .unwrap();

        let resolved = set.resolve();
        assert_eq!(resolved[0].distribution(), DistributionKind::LinearConv);
        assert_eq!(resolved[1].distribution(), DistributionKind::Descending);
        assert_eq!(resolved[0].seed_id(), "long:[1-5]");
    }

    #[test]
    fn test_row_count() {
        let mut set = sample_set();
        assert_eq!(set.row_count(500, 10_000), 500);
        assert_eq!(set.row_count(0, 10_000), 10_000);
        set.fixed();
        assert_eq!(set.row_count(0, 10_000), 10);
        set.random();
        assert_eq!(set.default_distribution(), DistributionKind::Random);
        assert_eq!(set.row_count(0, 10_000), 10_000);
    }
}
