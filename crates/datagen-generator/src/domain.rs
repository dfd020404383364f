//! Value domain parsing.
//!
//! A column's value definition is either a literal (`"5"`, `"ABC"`) or a
//! string containing a bracketed inclusive range token (`"[1-100]"`,
//! `"SYM[1-250]"`). When several tokens appear, the last one defines the
//! range and every occurrence of its exact text is substituted; other
//! tokens stay verbatim. The domain keeps the range bounds and the text
//! around the token so a concrete number can be substituted back in.

use crate::error::{GeneratorError, Result};
use regex::Regex;
use std::sync::LazyLock;

static RANGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+)-([0-9]+)\]").expect("range token pattern is valid"));

/// The normalized set of values a column draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDomain {
    range_start: i64,
    size: i64,
    template: Option<Template>,
    definition: String,
}

/// Definition text split at each occurrence of the range token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Template {
    pieces: Vec<String>,
}

impl Template {
    fn fill(&self, substitute: &str) -> String {
        self.pieces.join(substitute)
    }
}

impl ValueDomain {
    /// Parse a value definition for the named column.
    ///
    /// Definitions without a range token are literals of size 1. A range
    /// token whose end precedes its start, or whose bounds overflow, is a
    /// `ColumnDefinition` error.
    pub fn parse(column: &str, definition: &str) -> Result<Self> {
        let Some(captures) = RANGE_TOKEN.captures_iter(definition).last() else {
            return Ok(Self::literal(definition));
        };

        let parse_bound = |text: &str| {
            text.parse::<i64>().map_err(|_| {
                GeneratorError::column_definition(column, definition, "range bound overflows")
            })
        };
        let start = parse_bound(&captures[1])?;
        let end = parse_bound(&captures[2])?;
        if end < start {
            return Err(GeneratorError::column_definition(
                column,
                definition,
                format!("range end {end} is less than range start {start}"),
            ));
        }

        let size = (end - start).checked_add(1).ok_or_else(|| {
            GeneratorError::column_definition(column, definition, "range size overflows")
        })?;

        let token = &captures[0];
        Ok(Self {
            range_start: start,
            size,
            template: Some(Template {
                pieces: definition.split(token).map(str::to_string).collect(),
            }),
            definition: definition.to_string(),
        })
    }

    fn literal(definition: &str) -> Self {
        Self {
            range_start: 0,
            size: 1,
            template: None,
            definition: definition.to_string(),
        }
    }

    pub fn range_start(&self) -> i64 {
        self.range_start
    }

    /// Number of distinct values; always at least 1.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Inclusive end of the range.
    pub fn range_end(&self) -> i64 {
        self.range_start + (self.size - 1)
    }

    pub fn is_literal(&self) -> bool {
        self.template.is_none()
    }

    /// The original value definition text.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// The definition with the range token replaced by `{}`, if it has one.
    pub fn template(&self) -> Option<String> {
        self.template.as_ref().map(|t| t.fill("{}"))
    }

    /// The number a domain index maps to.
    pub fn number_at(&self, index: i64) -> i64 {
        index + self.range_start
    }

    /// Reflect a number in the range about its far end.
    pub fn mirror_number(&self, number: i64) -> i64 {
        self.range_end() - (number - self.range_start)
    }

    /// Render the definition with `number` in place of the range token.
    pub fn render(&self, number: i64) -> String {
        match &self.template {
            Some(t) => t.fill(&number.to_string()),
            None => self.definition.clone(),
        }
    }
}
