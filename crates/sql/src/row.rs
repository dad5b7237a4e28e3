use serde::{Deserialize, Serialize};

use crate::Value;

/// One named column value within a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column (or alias) name as reported by the driver.
    pub name: String,
    /// Column value.
    pub value: Value,
}

/// A single result row: ordered named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Fields in select-list order.
    pub fields: Vec<Field>,
}

impl Row {
    /// Builds a row from name/value pairs, preserving order.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| Field { name: name.into(), value: value.into() })
                .collect(),
        }
    }

    /// Looks up a field value by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }
}
