//! Executor-facing SQL contract for the strata data-access layer.
//!
//! Statement builders in `strata-orm` produce SQL text plus an ordered
//! [`Binds`] map; an [`Executor`] implementation owns the connection and turns
//! that pair into [`Row`]s. The core never issues raw connection calls itself,
//! so pooling, retries, and cancellation all live behind this trait.

mod row;
mod value;

use thiserror::Error;

pub use self::row::{Field, Row};
pub use self::value::Value;

/// Insertion-ordered bind map: placeholder name (including the leading `:`)
/// to literal value.
///
/// Placeholder suffixes are derived from the map's size at the moment of
/// insertion, so [`Binds::len`] doubles as the next sequence index while a
/// statement is being compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binds(Vec<(String, Value)>);

impl Binds {
    /// Creates an empty bind map.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of bound placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no placeholders have been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a placeholder/value pair.
    pub fn push(&mut self, placeholder: impl Into<String>, value: impl Into<Value>) {
        self.0.push((placeholder.into(), value.into()));
    }

    /// Looks up a value by placeholder name.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&Value> {
        self.0.iter().find(|(name, _)| name == placeholder).map(|(_, value)| value)
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Binds {
    type IntoIter = std::slice::Iter<'a, (String, Value)>;
    type Item = &'a (String, Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Failure reported by the driver for a single statement.
///
/// `code` carries the driver/SQLSTATE error code verbatim; the persistence
/// layer inspects it to classify duplicate-key failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("driver error {code}: {message}")]
pub struct DriverError {
    /// Driver-reported error code (e.g. `1062`, `23000`).
    pub code: String,
    /// Driver-reported message text.
    pub message: String,
}

impl DriverError {
    /// Creates a driver error from code and message text.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// Opaque statement executor.
///
/// A statement either executes in full or fails; there is no partial-success
/// state. Implementations decide how binds are transmitted (named parameters,
/// positional rewrite, ...).
pub trait Executor {
    /// Executes one statement and returns the resulting rows (empty for
    /// statements without a result set).
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the driver rejects or fails the
    /// statement.
    fn execute(&self, sql: &str, binds: &Binds) -> Result<Vec<Row>, DriverError>;

    /// Last value generated for an auto-increment column on this connection.
    fn last_insert_id(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_preserve_insertion_order() {
        let mut binds = Binds::new();
        binds.push(":b__0", 1);
        binds.push(":a__1", 2);
        binds.push(":b__2", 3);

        let names: Vec<&str> = binds.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, [":b__0", ":a__1", ":b__2"]);
        assert_eq!(binds.get(":a__1"), Some(&Value::Int(2)));
        assert_eq!(binds.len(), 3);
    }
}
