use strata_sql::{Binds, Value};

use crate::ValueMap;
use crate::error::{Error, Result};

/// A boolean predicate over table fields, compiled into a SQL fragment plus
/// bind values.
///
/// Comparison variants hold the field token as written by the caller
/// (optionally `table.field` qualified, or `@@`-escaped raw SQL); conjunction
/// variants nest arbitrarily. Values convert via [`From`] so call sites use
/// natural Rust types.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field = value`, or `field IS NULL` when the value is NULL.
    Eq(String, Value),
    /// `field <> value`, or `field IS NOT NULL` when the value is NULL.
    Ne(String, Value),
    /// `field > value`
    Gt(String, Value),
    /// `field < value`
    Lt(String, Value),
    /// `field >= value`
    Ge(String, Value),
    /// `field <= value`
    Le(String, Value),
    /// Forward match: `field LIKE 'value%'` (wildcard appended here; callers
    /// must not pre-wrap).
    Like(String, String),
    /// Negated forward match: `field NOT LIKE 'value%'`.
    NotLike(String, String),
    /// Forward match, alias of [`Condition::Like`].
    Forward(String, String),
    /// Negated forward match, alias of [`Condition::NotLike`].
    NotForward(String, String),
    /// Partial match: `field LIKE '%value%'`.
    Partial(String, String),
    /// Negated partial match: `field NOT LIKE '%value%'`.
    NotPartial(String, String),
    /// `field IN (v, ...)` — the list must not be empty.
    In(String, Vec<Value>),
    /// `field NOT IN (v, ...)` — the list must not be empty.
    NotIn(String, Vec<Value>),
    /// `field BETWEEN low AND high`
    Between(String, Value, Value),
    /// All children must hold; joined with ` AND ` and parenthesized.
    And(Vec<Condition>),
    /// Any child must hold; joined with ` OR ` and parenthesized.
    Or(Vec<Condition>),
}

impl Condition {
    /// Creates an equality condition (`field = value`).
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Creates an inequality condition (`field <> value`).
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(field.into(), value.into())
    }

    /// Creates a greater-than condition.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(field.into(), value.into())
    }

    /// Creates a less-than condition.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal condition.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ge(field.into(), value.into())
    }

    /// Creates a less-than-or-equal condition.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Le(field.into(), value.into())
    }

    /// Creates an `IS NULL` condition (equality against NULL).
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::Eq(field.into(), Value::Null)
    }

    /// Creates an `IS NOT NULL` condition (inequality against NULL).
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::Ne(field.into(), Value::Null)
    }

    /// Creates a forward-match condition (`LIKE 'value%'`).
    pub fn like(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Like(field.into(), value.into())
    }

    /// Creates a negated forward-match condition (`NOT LIKE 'value%'`).
    pub fn not_like(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotLike(field.into(), value.into())
    }

    /// Creates a forward-match condition (`LIKE 'value%'`).
    pub fn forward(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Forward(field.into(), value.into())
    }

    /// Creates a negated forward-match condition.
    pub fn not_forward(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotForward(field.into(), value.into())
    }

    /// Creates a partial-match condition (`LIKE '%value%'`).
    pub fn partial(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Partial(field.into(), value.into())
    }

    /// Creates a negated partial-match condition.
    pub fn not_partial(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotPartial(field.into(), value.into())
    }

    /// Creates an `IN` condition.
    pub fn r#in(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates a `NOT IN` condition.
    pub fn not_in(
        field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self::NotIn(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates a `BETWEEN low AND high` condition.
    pub fn between(
        field: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>,
    ) -> Self {
        Self::Between(field.into(), low.into(), high.into())
    }

    /// Logical AND of the given conditions.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    /// Logical OR of the given conditions.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Merges a further condition into this one with AND semantics.
    ///
    /// An existing top-level `And` gains one more child; anything else is
    /// wrapped as `And([self, other])`. Used to append engine defaults (the
    /// soft-delete filter) to caller-supplied trees.
    #[must_use]
    pub fn and_with(self, other: Self) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            existing => Self::And(vec![existing, other]),
        }
    }

    /// Compiles this condition into a SQL boolean expression, appending bind
    /// values to `binds`.
    ///
    /// Placeholder names are `:<field>__<n>` where `n` is the bind map's size
    /// at the moment of insertion — unique across the full statement even
    /// when one field is compared several times. An empty conjunction
    /// compiles to an empty fragment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty `IN`/`NOT IN` value list.
    pub fn compile(&self, binds: &mut Binds) -> Result<String> {
        match self {
            Self::Eq(field, value) if value.is_null() => Ok(format!("{} IS NULL", wrap(field))),
            Self::Ne(field, value) if value.is_null() => {
                Ok(format!("{} IS NOT NULL", wrap(field)))
            }
            Self::Eq(field, value) => Ok(comparison(field, "=", value.clone(), binds)),
            Self::Ne(field, value) => Ok(comparison(field, "<>", value.clone(), binds)),
            Self::Gt(field, value) => Ok(comparison(field, ">", value.clone(), binds)),
            Self::Lt(field, value) => Ok(comparison(field, "<", value.clone(), binds)),
            Self::Ge(field, value) => Ok(comparison(field, ">=", value.clone(), binds)),
            Self::Le(field, value) => Ok(comparison(field, "<=", value.clone(), binds)),
            Self::Like(field, value) | Self::Forward(field, value) => {
                Ok(comparison(field, "LIKE", format!("{value}%"), binds))
            }
            Self::NotLike(field, value) | Self::NotForward(field, value) => {
                Ok(comparison(field, "NOT LIKE", format!("{value}%"), binds))
            }
            Self::Partial(field, value) => {
                Ok(comparison(field, "LIKE", format!("%{value}%"), binds))
            }
            Self::NotPartial(field, value) => {
                Ok(comparison(field, "NOT LIKE", format!("%{value}%"), binds))
            }
            Self::In(field, values) => in_list(field, "IN", values, binds),
            Self::NotIn(field, values) => in_list(field, "NOT IN", values, binds),
            Self::Between(field, low, high) => {
                let ph_low = placeholder(field, binds.len());
                binds.push(ph_low.clone(), low.clone());
                let ph_high = placeholder(field, binds.len());
                binds.push(ph_high.clone(), high.clone());
                Ok(format!("{} BETWEEN {ph_low} AND {ph_high}", wrap(field)))
            }
            Self::And(children) => group(children, " AND ", binds),
            Self::Or(children) => group(children, " OR ", binds),
        }
    }
}

/// Quotes a table or field token for the target dialect.
///
/// `table.field` becomes `` `table`.`field` ``; a `@@` prefix marks the token
/// as a raw expression and passes the remainder through untouched (the escape
/// hatch for aggregates like `@@COUNT(*)`).
#[must_use]
pub fn wrap(item: &str) -> String {
    if let Some(raw) = item.strip_prefix("@@") {
        return raw.to_string();
    }
    if item == "*" {
        return item.to_string();
    }
    match item.split_once('.') {
        Some((table, "*")) => format!("`{table}`.*"),
        Some((table, field)) => format!("`{table}`.`{field}`"),
        None => format!("`{item}`"),
    }
}

/// Primary-key equality conditions over `data`, in key order.
///
/// A single key yields a bare equality; composite keys yield an
/// AND-conjunction.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `data` lacks a value for any key field.
pub fn primary_key_conditions(keys: &[String], data: &ValueMap) -> Result<Condition> {
    let mut conditions = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(value) = data.get(key) else {
            return Err(Error::validation(format!(
                "primary key field `{key}` has no value in the supplied data"
            )));
        };
        conditions.push(Condition::Eq(key.clone(), value.clone()));
    }
    match conditions.len() {
        0 => Err(Error::validation("no primary key fields supplied")),
        1 => Ok(conditions.remove(0)),
        _ => Ok(Condition::And(conditions)),
    }
}

fn placeholder(field: &str, index: usize) -> String {
    format!(":{field}__{index}")
}

fn comparison(field: &str, operator: &str, value: impl Into<Value>, binds: &mut Binds) -> String {
    let ph = placeholder(field, binds.len());
    binds.push(ph.clone(), value);
    format!("{} {operator} {ph}", wrap(field))
}

fn in_list(field: &str, operator: &str, values: &[Value], binds: &mut Binds) -> Result<String> {
    if values.is_empty() {
        return Err(Error::validation(format!(
            "{operator} condition on `{field}` requires at least one value"
        )));
    }
    let mut placeholders = Vec::with_capacity(values.len());
    for value in values {
        let ph = placeholder(field, binds.len());
        binds.push(ph.clone(), value.clone());
        placeholders.push(ph);
    }
    Ok(format!("{} {operator} ({})", wrap(field), placeholders.join(", ")))
}

fn group(children: &[Condition], separator: &str, binds: &mut Binds) -> Result<String> {
    let mut fragments = Vec::with_capacity(children.len());
    for child in children {
        let fragment = child.compile(binds)?;
        // an empty conjunction compiles to nothing; skip it rather than
        // emitting stray boolean operators
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    if fragments.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("({})", fragments.join(separator)))
}
