//! Schema-bound rows with change tracking.

use std::sync::Arc;

use strata_sql::{Row, Value};

use crate::ValueMap;
use crate::error::{Error, Result};
use crate::schema::Schema;

/// One row of a table, validated against its [`Schema`] and tracking which
/// fields changed since it was loaded.
///
/// Field names starting with `_` are transient: they bypass schema
/// validation and never reach the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: ValueMap,
    originals: ValueMap,
}

impl Record {
    /// Creates an empty record bound to `schema`.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: ValueMap::new(),
            originals: ValueMap::new(),
        }
    }

    /// Builds a record from a fetched row; nothing is marked dirty.
    #[must_use]
    pub fn from_row(schema: Arc<Schema>, row: &Row) -> Self {
        let mut values = ValueMap::new();
        for field in &row.fields {
            values.insert(field.name.clone(), field.value.clone());
        }
        Self {
            schema,
            values,
            originals: ValueMap::new(),
        }
    }

    /// The schema the record is bound to.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Sets a field value.
    ///
    /// A field turns dirty only when it already held a value and the new
    /// one differs; the first such change records the held value, so a
    /// later set back to it still reads as dirty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] when `field` is neither declared by
    /// the schema nor transient.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let field = field.into();
        if !field.starts_with('_') && !self.schema.has_field(&field) {
            return Err(Error::UnknownField {
                field,
                table: self.schema.table().to_string(),
            });
        }
        let value = value.into();
        if !self.originals.contains_key(&field)
            && let Some(previous) = self.values.get(&field)
            && *previous != value
        {
            self.originals.insert(field.clone(), previous.clone());
        }
        self.values.insert(field, value);
        Ok(())
    }

    /// Reads a field value; unset fields read as NULL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] when `field` is neither declared by
    /// the schema nor transient.
    pub fn get(&self, field: &str) -> Result<Value> {
        if !field.starts_with('_') && !self.schema.has_field(field) {
            return Err(Error::UnknownField {
                field: field.to_string(),
                table: self.schema.table().to_string(),
            });
        }
        Ok(self.values.get(field).cloned().unwrap_or(Value::Null))
    }

    /// Builds a record seeded from a value map; every entry is validated
    /// and tracked like a caller `set`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for entries the schema does not
    /// declare.
    pub fn from_data(schema: Arc<Schema>, data: ValueMap) -> Result<Self> {
        let mut record = Self::new(schema);
        record.assign(data)?;
        Ok(record)
    }

    /// Bulk-sets fields from a value map via [`Record::set`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for entries the schema does not
    /// declare; earlier entries stay applied.
    pub fn assign(&mut self, data: ValueMap) -> Result<()> {
        for (field, value) in data {
            self.set(field, value)?;
        }
        Ok(())
    }

    /// Whether `field` changed since the record was loaded or last saved.
    #[must_use]
    pub fn is_dirty(&self, field: &str) -> bool {
        self.originals.contains_key(field)
    }

    /// Whether any of the named fields changed since the record was loaded
    /// or last saved.
    #[must_use]
    pub fn is_dirty_any(&self, fields: &[&str]) -> bool {
        fields.iter().any(|field| self.is_dirty(field))
    }

    /// Whether anything changed since the record was loaded or last saved.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.originals.is_empty()
    }

    /// Schema-declared field values, optionally including hidden fields.
    /// Transient fields are excluded.
    #[must_use]
    pub fn data(&self, with_hidden: bool) -> ValueMap {
        let mut data = ValueMap::new();
        for name in self.schema.field_names(with_hidden) {
            if let Some(value) = self.values.get(&name) {
                data.insert(name, value.clone());
            }
        }
        data
    }

    /// Marks the current state as the saved baseline.
    pub(crate) fn persisted(&mut self) {
        self.originals.clear();
    }

    /// Forces a field value without schema validation or dirty tracking.
    pub(crate) fn load(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new("items")
                .field(FieldDef::new("id", FieldType::Integer).primary().auto_increment())
                .field(FieldDef::new("name", FieldType::String))
                .field(FieldDef::new("secret", FieldType::String).hidden()),
        )
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut record = Record::new(schema());
        assert!(record.set("bogus", "x").is_err());
        assert!(record.get("bogus").is_err());
    }

    #[test]
    fn transient_fields_bypass_the_schema() {
        let mut record = Record::new(schema());
        record.set("_note", "scratch").unwrap();
        assert_eq!(record.get("_note").unwrap(), Value::from("scratch"));
        assert!(!record.data(true).contains_key("_note"));
    }

    #[test]
    fn reverting_a_change_stays_dirty() {
        let mut record = Record::new(schema());
        record.set("name", "first").unwrap();
        record.persisted();
        record.set("name", "second").unwrap();
        record.set("name", "first").unwrap();
        assert!(record.is_dirty("name"));
    }

    #[test]
    fn assign_validates_every_entry() {
        let mut data = ValueMap::new();
        data.insert("name".to_string(), Value::from("n"));
        let mut record = Record::from_data(schema(), data).unwrap();
        assert!(!record.has_changes(), "seeding fresh fields is not a change");

        record.set("name", "renamed").unwrap();
        assert!(record.is_dirty("name"));
        assert!(record.is_dirty_any(&["id", "name"]));
        assert!(!record.is_dirty_any(&["id", "secret"]));

        let mut bad = ValueMap::new();
        bad.insert("bogus".to_string(), Value::from(1));
        let mut record = Record::new(schema());
        assert!(record.assign(bad).is_err());
    }

    #[test]
    fn resetting_the_held_value_is_not_a_change() {
        let row = Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("a"))]);
        let mut record = Record::from_row(schema(), &row);
        record.set("name", "a").unwrap();
        assert!(!record.has_changes());

        record.set("name", "b").unwrap();
        assert!(record.is_dirty("name"));
    }

    #[test]
    fn data_respects_hidden_flag() {
        let mut record = Record::new(schema());
        record.set("name", "n").unwrap();
        record.set("secret", "s").unwrap();
        assert!(!record.data(false).contains_key("secret"));
        assert!(record.data(true).contains_key("secret"));
    }
}
