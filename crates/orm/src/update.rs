use strata_sql::Binds;

use crate::ValueMap;
use crate::cond::{primary_key_conditions, wrap};
use crate::error::{Error, Result};
use crate::query::Statement;
use crate::schema::Schema;

/// Compiles an UPDATE statement for `data` against `schema`.
///
/// Every non-primary schema field present in `data` lands in the SET
/// clause; the WHERE clause is the primary-key equality built from `data`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when no updatable field is present in
/// `data` or when a primary-key value is missing.
pub fn build_update(schema: &Schema, data: &ValueMap) -> Result<Statement> {
    let keys = schema.primary_keys();
    let mut assignments = Vec::new();
    let mut binds = Binds::new();
    for field in schema.fields() {
        if field.primary {
            continue;
        }
        let Some(value) = data.get(&field.name) else {
            continue;
        };
        let placeholder = format!(":{}__{}", field.name, binds.len());
        assignments.push(format!("{} = {placeholder}", wrap(&field.name)));
        binds.push(placeholder, value.clone());
    }
    if assignments.is_empty() {
        return Err(Error::validation("there are no fields to update"));
    }
    let condition = primary_key_conditions(&keys, data)?;
    let fragment = condition.compile(&mut binds)?;
    let sql = format!(
        "UPDATE {} SET {} WHERE {fragment}",
        wrap(schema.table()),
        assignments.join(", ")
    );

    tracing::debug!(
        table = schema.table(),
        sql = %sql,
        bind_count = binds.len(),
        "build_update generated SQL"
    );

    Ok(Statement { sql, binds })
}
