use strata_sql::Binds;

use crate::ValueMap;
use crate::cond::{primary_key_conditions, wrap};
use crate::error::Result;
use crate::query::Statement;
use crate::schema::Schema;

/// Compiles a DELETE statement whose WHERE clause is the primary-key
/// equality built from `data`.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) when a
/// primary-key value is missing from `data`.
pub fn build_delete(schema: &Schema, data: &ValueMap) -> Result<Statement> {
    let keys = schema.primary_keys();
    let mut binds = Binds::new();
    let condition = primary_key_conditions(&keys, data)?;
    let fragment = condition.compile(&mut binds)?;
    let sql = format!("DELETE FROM {} WHERE {fragment}", wrap(schema.table()));

    tracing::debug!(
        table = schema.table(),
        sql = %sql,
        bind_count = binds.len(),
        "build_delete generated SQL"
    );

    Ok(Statement { sql, binds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};
    use strata_sql::Value;

    #[test]
    fn keys_on_composite_primary() {
        let schema = Schema::new("items")
            .field(FieldDef::new("id", FieldType::Integer).primary())
            .field(FieldDef::new("region", FieldType::String).primary())
            .field(FieldDef::new("name", FieldType::String));
        let mut data = ValueMap::new();
        data.insert("id".to_string(), Value::from(7));
        data.insert("region".to_string(), Value::from("eu"));
        let stmt = build_delete(&schema, &data).unwrap();
        assert_eq!(
            stmt.sql,
            "DELETE FROM `items` WHERE (`id` = :id__0 AND `region` = :region__1)"
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let schema = Schema::new("items")
            .field(FieldDef::new("id", FieldType::Integer).primary())
            .field(FieldDef::new("name", FieldType::String));
        assert!(build_delete(&schema, &ValueMap::new()).is_err());
    }
}
