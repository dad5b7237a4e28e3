//! Table definitions: field metadata, key layout, and JSON loading.

use serde::{Deserialize, Serialize};
use strata_sql::Value;

use crate::error::{Error, Result};

/// Storage type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Whole-number column.
    Integer,
    /// Short character column.
    String,
    /// Long character column.
    Text,
    /// Date-and-time column with an optional fractional-seconds precision.
    DateTime {
        /// Fractional-seconds digits, when declared (`datetime(3)`).
        precision: Option<u8>,
    },
}

impl FieldType {
    fn parse(text: &str) -> Result<Self> {
        match text {
            "integer" => return Ok(Self::Integer),
            "string" => return Ok(Self::String),
            "text" => return Ok(Self::Text),
            "datetime" => return Ok(Self::DateTime { precision: None }),
            _ => {}
        }
        if let Some(digits) = text
            .strip_prefix("datetime(")
            .and_then(|rest| rest.strip_suffix(')'))
            && let Ok(precision) = digits.parse::<u8>()
        {
            return Ok(Self::DateTime { precision: Some(precision) });
        }
        Err(Error::Schema {
            description: format!("unknown field type '{text}'"),
        })
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = match self {
            Self::Integer => "integer".to_string(),
            Self::String => "string".to_string(),
            Self::Text => "text".to_string(),
            Self::DateTime { precision: None } => "datetime".to_string(),
            Self::DateTime { precision: Some(p) } => format!("datetime({p})"),
        };
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Membership of a field in a named key group (unique or secondary index),
/// with its position inside the composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyGroup {
    /// Index name shared by the group's members.
    pub name: String,
    /// Position of the field within the composite key.
    pub order: u32,
}

impl KeyGroup {
    /// Creates a key-group membership at the given position.
    #[must_use]
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self { name: name.into(), order }
    }
}

impl From<&str> for KeyGroup {
    fn from(name: &str) -> Self {
        Self::new(name, 0)
    }
}

impl From<String> for KeyGroup {
    fn from(name: String) -> Self {
        Self::new(name, 0)
    }
}

impl<'de> Deserialize<'de> for KeyGroup {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Full {
                name: String,
                #[serde(default)]
                order: u32,
            },
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Name(name) => Self::new(name, 0),
            Repr::Full { name, order } => Self::new(name, order),
        })
    }
}

/// Declaration of one table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name.
    pub name: String,
    /// Storage type.
    #[serde(rename = "type")]
    pub ftype: FieldType,
    /// Unsigned numeric column.
    #[serde(default)]
    pub unsigned: bool,
    /// Whether NULL is storable.
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Value substituted on insert when none is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Part of the primary key.
    #[serde(default)]
    pub primary: bool,
    /// Database-assigned on insert.
    #[serde(default, alias = "autoincrement")]
    pub auto_increment: bool,
    /// Must carry a value on insert.
    #[serde(default)]
    pub required: bool,
    /// Unique-index group the field belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<KeyGroup>,
    /// Secondary-index group the field belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<KeyGroup>,
    /// Excluded from default reads and record data.
    #[serde(default)]
    pub hidden: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDef {
    /// Creates a field declaration with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, ftype: FieldType) -> Self {
        Self {
            name: name.into(),
            ftype,
            unsigned: false,
            nullable: true,
            default: None,
            primary: false,
            auto_increment: false,
            required: false,
            unique: None,
            index: None,
            hidden: false,
        }
    }

    /// Marks the column unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Forbids NULL storage.
    #[must_use]
    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the insert default.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the column part of the primary key.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Marks the column database-assigned.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Requires a value on insert.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Assigns the column to a unique-index group.
    #[must_use]
    pub fn unique(mut self, group: impl Into<KeyGroup>) -> Self {
        self.unique = Some(group.into());
        self
    }

    /// Assigns the column to a secondary-index group.
    #[must_use]
    pub fn index(mut self, group: impl Into<KeyGroup>) -> Self {
        self.index = Some(group.into());
        self
    }

    /// Hides the column from default reads.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether the field must resolve to a value on insert: explicitly
    /// required, or a primary key the database will not assign and no
    /// default covers.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required || (self.primary && !self.auto_increment && self.default.is_none())
    }
}

/// Metadata for one table: its columns, key layout, and soft-delete marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    table: String,
    fields: Vec<FieldDef>,
    #[serde(default = "default_soft_delete")]
    soft_delete: Option<String>,
}

fn default_soft_delete() -> Option<String> {
    Some("deleted_at".to_string())
}

impl Schema {
    /// Creates an empty schema for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            soft_delete: default_soft_delete(),
        }
    }

    /// Appends a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the soft-delete marker field, or disables soft deletion with
    /// `None`.
    #[must_use]
    pub fn soft_delete_field(mut self, field: Option<String>) -> Self {
        self.soft_delete = field;
        self
    }

    /// Loads a schema from its JSON form.
    ///
    /// Accepts either the bare object (`{"table": ..., "fields": [...]}`)
    /// or the single-key wrapped form (`{"<table>": {"fields": [...]}}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the document does not describe
    /// exactly one table or fails to deserialize.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: serde_json::Value =
            serde_json::from_str(text).map_err(|error| Error::Schema {
                description: error.to_string(),
            })?;
        if document.get("fields").is_some() {
            return serde_json::from_value(document).map_err(|error| Error::Schema {
                description: error.to_string(),
            });
        }
        let Some(object) = document.as_object() else {
            return Err(Error::Schema {
                description: "schema document must be a JSON object".to_string(),
            });
        };
        let mut entries = object.iter();
        let (Some((table, body)), None) = (entries.next(), entries.next()) else {
            return Err(Error::Schema {
                description: "schema document must describe exactly one table".to_string(),
            });
        };
        let mut body = body.clone();
        if let Some(object) = body.as_object_mut()
            && !object.contains_key("table")
        {
            object.insert("table".to_string(), serde_json::Value::from(table.as_str()));
        }
        serde_json::from_value(body).map_err(|error| Error::Schema {
            description: error.to_string(),
        })
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All field declarations, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field names, optionally including hidden fields.
    #[must_use]
    pub fn field_names(&self, with_hidden: bool) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| with_hidden || !field.hidden)
            .map(|field| field.name.clone())
            .collect()
    }

    /// Primary-key field names, in declaration order.
    #[must_use]
    pub fn primary_keys(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.primary)
            .map(|field| field.name.clone())
            .collect()
    }

    /// Field names that belong to the unique-index group `name`, in key
    /// order (falling back to declaration order for equal positions).
    #[must_use]
    pub fn unique_group(&self, name: &str) -> Vec<String> {
        let mut members: Vec<_> = self
            .fields
            .iter()
            .filter_map(|field| {
                let group = field.unique.as_ref()?;
                (group.name == name).then_some((group.order, field.name.clone()))
            })
            .collect();
        members.sort_by_key(|(order, _)| *order);
        members.into_iter().map(|(_, name)| name).collect()
    }

    /// Soft-delete marker field, when the schema actually declares it.
    #[must_use]
    pub fn soft_delete(&self) -> Option<&str> {
        let field = self.soft_delete.as_deref()?;
        self.has_field(field).then_some(field)
    }

    /// Whether the schema declares `name` as a field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Looks up a field declaration by name.
    #[must_use]
    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}
