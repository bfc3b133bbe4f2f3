//! Small helper for SQL statements with a variable set of filters.
//!
//! Placeholders are numbered (`$1`, `$2`, ...) as they are pushed so the statement
//! and its bind list can never drift apart.

use crate::error::DbError;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Decode, Row, Type, ValueRef};

/// Reads a nullable column.
///
/// The `Any` driver reports a NULL value with the NULL type, which no Rust type
/// accepts, so `try_get::<Option<T>, _>` fails on it. Check for NULL first.
pub(crate) fn try_get_nullable<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, DbError>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    Ok(Some(row.try_get::<T, _>(column)?))
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlParam {
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<bool> for SqlParam {
    // Booleans are stored as INTEGER 0/1.
    fn from(v: bool) -> Self {
        SqlParam::Int(i64::from(v))
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Real(v)
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

#[derive(Debug, Default)]
pub(crate) struct SqlBuilder {
    sql: String,
    params: Vec<SqlParam>,
}

impl SqlBuilder {
    pub(crate) fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    pub(crate) fn push_param(&mut self, param: impl Into<SqlParam>) -> &mut Self {
        self.params.push(param.into());
        self.sql.push_str(&format!("${}", self.params.len()));
        self
    }

    /// Pushes `NULL` as a literal instead of binding it.
    pub(crate) fn push_opt_param(&mut self, param: Option<impl Into<SqlParam>>) -> &mut Self {
        match param {
            Some(p) => self.push_param(p),
            None => self.push("NULL"),
        }
    }

    pub(crate) fn query(&self) -> Query<'_, Any, AnyArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Real(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_numbered_in_push_order() {
        let mut builder = SqlBuilder::new("SELECT * FROM connects WHERE 1 = 1");
        builder
            .push(" AND vendor_id = ")
            .push_param(5_i64)
            .push(" AND all_products = ")
            .push_param(false);
        assert_eq!(
            builder.sql,
            "SELECT * FROM connects WHERE 1 = 1 AND vendor_id = $1 AND all_products = $2"
        );
        assert_eq!(builder.params, vec![SqlParam::Int(5), SqlParam::Int(0)]);
    }

    #[test]
    fn test_missing_optional_param_becomes_null_literal() {
        let mut builder = SqlBuilder::new("UPDATE connects SET vendor_id = ");
        builder.push_opt_param(None::<i64>).push(", rate = ").push_param(2.5);
        assert_eq!(builder.sql, "UPDATE connects SET vendor_id = NULL, rate = $1");
    }
}
