//! Filter conditions and query options
//!
//! Conditions name a top-level field, an operator and a comparison value.
//! A list of conditions is always combined with AND; there is no OR and no
//! grouping.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `LIKE`
    #[serde(rename = "LIKE")]
    Like,
    /// `IN`
    #[serde(rename = "IN")]
    In,
    /// `NOT IN`
    #[serde(rename = "NOT IN")]
    NotIn,
}

impl Operator {
    /// SQL text of the operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// True for `IN` and `NOT IN`
    pub fn is_set_operator(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            "LIKE" => Ok(Operator::Like),
            "IN" => Ok(Operator::In),
            "NOT IN" => Ok(Operator::NotIn),
            _ => Err(Error::invalid_condition(format!("unknown operator '{}'", s))),
        }
    }
}

/// A single field/operator/value filter term
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Top-level field name
    pub field: String,
    /// Comparison operator
    pub op: Operator,
    /// Comparison value
    pub value: Value,
}

impl Condition {
    /// Create a condition
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Gt, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Lt, value)
    }

    /// `field >= value`
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Ge, value)
    }

    /// `field <= value`
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Le, value)
    }

    /// `field LIKE pattern`
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, Operator::Like, Value::String(pattern.into()))
    }

    /// `field IN (values...)`
    pub fn is_in<T: Into<Value>>(field: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(field, Operator::In, values)
    }

    /// `field NOT IN (values...)`
    pub fn not_in<T: Into<Value>>(field: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(field, Operator::NotIn, values)
    }

    /// Parse a textual operator into a condition
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQueryCondition` for an unknown operator.
    pub fn parse(field: impl Into<String>, op: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Self::new(field, op.parse()?, value))
    }

    /// Check the condition's shape
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQueryCondition` when the field is empty or
    /// contains a double quote, when `IN`/`NOT IN` is not given a non-empty
    /// list, or when the value is `Absent`.
    pub fn validate(&self) -> Result<()> {
        if self.field.is_empty() {
            return Err(Error::invalid_condition("field name cannot be empty"));
        }
        if self.field.contains('"') || self.field.chars().any(char::is_control) {
            return Err(Error::invalid_condition(format!(
                "field name {:?} contains a forbidden character",
                self.field
            )));
        }
        if self.value.is_absent() {
            return Err(Error::invalid_condition(format!(
                "condition on '{}' has no value",
                self.field
            )));
        }
        if self.op.is_set_operator() {
            match self.value.as_array() {
                Some(items) if !items.is_empty() => {}
                Some(_) => {
                    return Err(Error::invalid_condition(format!(
                        "{} on '{}' requires a non-empty list",
                        self.op, self.field
                    )))
                }
                None => {
                    return Err(Error::invalid_condition(format!(
                        "{} on '{}' requires a list value, got {}",
                        self.op,
                        self.field,
                        self.value.type_name()
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortDirection {
    /// SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ordering for a query
///
/// `field` is a payload field, or one of the row columns `id`,
/// `created_at`, `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field or column to order by
    pub field: String,
    /// Direction
    pub direction: SortDirection,
}

impl OrderBy {
    /// Ascending order on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Options for a filtered, ordered, paginated query
///
/// # Example
///
/// ```
/// use docket_core::{Condition, OrderBy, QueryOptions};
///
/// let opts = QueryOptions::new()
///     .filter(Condition::eq("status", "active"))
///     .order_by(OrderBy::asc("hearing_date"))
///     .limit(20)
///     .offset(40);
/// assert_eq!(opts.conditions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Conditions combined with AND
    pub conditions: Vec<Condition>,
    /// Ordering; defaults to `created_at` descending
    pub order_by: Option<OrderBy>,
    /// Maximum number of documents
    pub limit: Option<usize>,
    /// Number of documents to skip
    pub offset: Option<usize>,
}

impl QueryOptions {
    /// Empty options: every document, default order
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the given conditions
    pub fn with_conditions(conditions: Vec<Condition>) -> Self {
        QueryOptions {
            conditions,
            ..Self::default()
        }
    }

    /// Add a condition
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the ordering
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Set the limit
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set the offset
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }
}
