use strata_sql::{Binds, Value};

use crate::ValueMap;
use crate::cond::wrap;
use crate::error::{Error, Result};
use crate::query::Statement;
use crate::schema::Schema;

/// Compiles an INSERT statement for `data` against `schema`.
///
/// Auto-increment fields are skipped. For every other field the value is
/// taken from `data`, then the schema default, then NULL when the field is
/// not required; a required field with no value is an error. `ignore`
/// renders `INSERT IGNORE`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when a required field has no supplied value
/// and no default.
pub fn build_insert(schema: &Schema, data: &ValueMap, ignore: bool) -> Result<Statement> {
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut binds = Binds::new();
    for field in schema.fields() {
        if field.auto_increment {
            continue;
        }
        let value = match data.get(&field.name) {
            Some(value) => value.clone(),
            None => match &field.default {
                Some(default) => default.clone(),
                None if field.is_required() => {
                    return Err(Error::validation(format!(
                        "the field '{}' is required but has no value",
                        field.name
                    )));
                }
                None => Value::Null,
            },
        };
        let placeholder = format!(":{}__{}", field.name, binds.len());
        columns.push(wrap(&field.name));
        placeholders.push(placeholder.clone());
        binds.push(placeholder, value);
    }
    let verb = if ignore { "INSERT IGNORE" } else { "INSERT" };
    let sql = format!(
        "{verb} INTO {} ({}) VALUES ({})",
        wrap(schema.table()),
        columns.join(", "),
        placeholders.join(", ")
    );

    tracing::debug!(
        table = schema.table(),
        sql = %sql,
        bind_count = binds.len(),
        "build_insert generated SQL"
    );

    Ok(Statement { sql, binds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};

    fn schema() -> Schema {
        Schema::new("items")
            .field(FieldDef::new("id", FieldType::Integer).primary().auto_increment())
            .field(FieldDef::new("name", FieldType::String).required())
            .field(FieldDef::new("status", FieldType::String).default(Value::from("new")))
            .field(FieldDef::new("note", FieldType::Text))
    }

    #[test]
    fn skips_auto_increment_and_applies_defaults() {
        let mut data = ValueMap::new();
        data.insert("name".to_string(), Value::from("widget"));
        let stmt = build_insert(&schema(), &data, false).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `items` (`name`, `status`, `note`) \
             VALUES (:name__0, :status__1, :note__2)"
        );
        assert_eq!(stmt.binds.get(":status__1"), Some(&Value::from("new")));
        assert_eq!(stmt.binds.get(":note__2"), Some(&Value::Null));
    }

    #[test]
    fn ignore_variant_changes_the_verb() {
        let mut data = ValueMap::new();
        data.insert("name".to_string(), Value::from("widget"));
        let stmt = build_insert(&schema(), &data, true).unwrap();
        assert!(stmt.sql.starts_with("INSERT IGNORE INTO `items`"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let data = ValueMap::new();
        assert!(build_insert(&schema(), &data, false).is_err());
    }
}
