//! Condition compilation
//!
//! Turns a list of [`Condition`]s into a SQL `WHERE` fragment plus its
//! bound parameters. Field values are extracted from the payload with
//! `json_extract(data, ?)`. Both the JSON path and the comparison value are
//! bound, never spliced into the statement text.
//!
//! The `id` field addresses the primary-key column directly, since ids are
//! not stored in the payload.

use docket_core::codec::encode_value;
use docket_core::{Condition, Error, Operator, OrderBy, Result, Value, ID_FIELD};
use rusqlite::types::Value as SqlValue;

/// Row columns that `ORDER BY` may address directly
const ORDERABLE_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A compiled `WHERE` fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    /// Predicate text without the `WHERE` keyword; empty when unfiltered
    pub sql: String,
    /// Parameters, in placeholder order
    pub params: Vec<SqlValue>,
}

impl WhereClause {
    /// True when no conditions were given
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The fragment prefixed with ` WHERE `, or an empty string
    pub fn to_sql(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.sql)
        }
    }
}

/// JSON path addressing a top-level payload field
pub fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field)
}

/// Convert a condition value to the SQL value `json_extract` would yield
///
/// Values go through the payload encoder first, so a date compares
/// against its stored string and a nested structure against its embedded
/// JSON text. Booleans become 0/1, matching `json_extract` on JSON booleans.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match encode_value(value) {
        None | Some(serde_json::Value::Null) => SqlValue::Null,
        Some(serde_json::Value::Bool(b)) => SqlValue::Integer(i64::from(b)),
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Some(serde_json::Value::String(s)) => SqlValue::Text(s),
        Some(other) => SqlValue::Text(other.to_string()),
    }
}

fn field_expr(field: &str, params: &mut Vec<SqlValue>) -> String {
    if field == ID_FIELD {
        "id".to_string()
    } else {
        params.push(SqlValue::Text(json_path(field)));
        "json_extract(data, ?)".to_string()
    }
}

fn compile(condition: &Condition, params: &mut Vec<SqlValue>) -> Result<String> {
    condition.validate()?;
    let expr = field_expr(&condition.field, params);

    if condition.op.is_set_operator() {
        let items = condition.value.as_array().unwrap_or_default();
        let placeholders = vec!["?"; items.len()].join(", ");
        params.extend(items.iter().map(to_sql_value));
        return Ok(format!("{} {} ({})", expr, condition.op.as_sql(), placeholders));
    }

    if condition.value.is_null() {
        return match condition.op {
            Operator::Eq => Ok(format!("{} IS NULL", expr)),
            Operator::Ne => Ok(format!("{} IS NOT NULL", expr)),
            op => Err(Error::invalid_condition(format!(
                "'{}' cannot compare '{}' against null",
                op, condition.field
            ))),
        };
    }

    params.push(to_sql_value(&condition.value));
    Ok(format!("{} {} ?", expr, condition.op.as_sql()))
}

/// Compile conditions into a `WHERE` fragment joined with AND
///
/// # Errors
///
/// Returns `Error::InvalidQueryCondition` for a malformed condition,
/// such as `IN` with an empty list.
pub fn build_where(conditions: &[Condition]) -> Result<WhereClause> {
    let mut params = Vec::new();
    let mut terms = Vec::with_capacity(conditions.len());
    for condition in conditions {
        terms.push(compile(condition, &mut params)?);
    }
    Ok(WhereClause {
        sql: terms.join(" AND "),
        params,
    })
}

/// Compile an ordering into an `ORDER BY` fragment, appending any parameter
///
/// Without an explicit ordering, documents are returned newest first.
/// Ties break on insertion order in the same direction.
///
/// # Errors
///
/// Returns `Error::InvalidQueryCondition` for an unusable field name.
pub fn build_order(order: Option<&OrderBy>, params: &mut Vec<SqlValue>) -> Result<String> {
    let Some(order) = order else {
        return Ok(" ORDER BY created_at DESC, rowid DESC".to_string());
    };
    let dir = order.direction.as_sql();

    if ORDERABLE_COLUMNS.contains(&order.field.as_str()) {
        return Ok(format!(" ORDER BY {} {}, rowid {}", order.field, dir, dir));
    }

    // Reuse the condition rules for the field name
    Condition::eq(order.field.clone(), Value::Null).validate()?;
    params.push(SqlValue::Text(json_path(&order.field)));
    Ok(format!(" ORDER BY json_extract(data, ?) {}, rowid {}", dir, dir))
}
