use strata_sql::Binds;

use crate::cond::{Condition, wrap};
use crate::error::{Error, Result};
use crate::join::Join;
use crate::query::Statement;

const SORTS: [&str; 2] = ["ASC", "DESC"];

/// Builder for SELECT (and COUNT) statements.
///
/// Select-list items accept `"field"`, `"table.field alias"`, or a `@@`-raw
/// expression; the FROM target accepts `"table alias"` shorthand. Repeated
/// [`Select::filter`] calls merge with AND semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    select: Vec<String>,
    from: Option<String>,
    alias: Option<String>,
    joins: Vec<Join>,
    filter: Option<Condition>,
    order: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    for_update: bool,
}

impl Select {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one select-list item.
    #[must_use]
    pub fn column(mut self, item: impl Into<String>) -> Self {
        self.select.push(item.into());
        self
    }

    /// Appends several select-list items.
    #[must_use]
    pub fn columns(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select.extend(items.into_iter().map(Into::into));
        self
    }

    /// Sets the FROM target (`"table"` or `"table alias"` shorthand).
    #[must_use]
    pub fn from(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        match target.split_once(' ') {
            Some((table, alias)) => {
                self.from = Some(table.to_string());
                self.alias = Some(alias.to_string());
            }
            None => {
                self.from = Some(target);
                self.alias = None;
            }
        }
        self
    }

    /// Sets the FROM target with an explicit alias.
    #[must_use]
    pub fn from_as(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self.alias = Some(alias.into());
        self
    }

    /// Adds a JOIN clause.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds a WHERE condition, ANDed with any existing one.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_with(condition),
            None => condition,
        });
        self
    }

    /// Appends an ORDER BY item (`"field"` or `"field DIRECTION"`).
    #[must_use]
    pub fn order_by(mut self, item: impl Into<String>) -> Self {
        self.order.push(item.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Appends `FOR UPDATE` to the statement.
    #[must_use]
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    pub(crate) fn has_select(&self) -> bool {
        !self.select.is_empty()
    }

    pub(crate) fn has_from(&self) -> bool {
        self.from.is_some()
    }

    pub(crate) fn has_order(&self) -> bool {
        !self.order.is_empty()
    }

    pub(crate) fn from_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Compiles the query into a SELECT statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the select list is empty or no FROM
    /// target is set, and propagates condition compilation failures.
    pub fn build(&self) -> Result<Statement> {
        let mut binds = Binds::new();
        let mut sql = self.select_clause()?;
        sql.push_str(&self.from_clause()?);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.compile(&mut binds)?);
        }
        if let Some(condition) = &self.filter {
            let fragment = condition.compile(&mut binds)?;
            if !fragment.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&fragment);
            }
        }
        sql.push_str(&self.order_clause());
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        if self.for_update {
            sql.push_str(" FOR UPDATE");
        }

        tracing::debug!(
            sql = %sql,
            bind_count = binds.len(),
            "Select generated SQL"
        );

        Ok(Statement { sql, binds })
    }

    /// Compiles the query into a `COUNT(*)` statement: the select
    /// list is replaced with the aggregate and LIMIT/OFFSET/ORDER BY are
    /// stripped.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Select::build`].
    pub fn build_count(&self) -> Result<Statement> {
        let mut query = self.clone();
        query.select = vec!["@@COUNT(*)".to_string()];
        query.order.clear();
        query.limit = None;
        query.offset = None;
        query.build()
    }

    fn select_clause(&self) -> Result<String> {
        if self.select.is_empty() {
            return Err(Error::validation("SELECT fields must be specified"));
        }
        let mut items = Vec::with_capacity(self.select.len());
        for item in &self.select {
            if let Some(raw) = item.strip_prefix("@@") {
                items.push(raw.to_string());
                continue;
            }
            match item.split_once(' ') {
                Some((field, alias)) => items.push(format!("{} AS {}", wrap(field), wrap(alias))),
                None => items.push(wrap(item)),
            }
        }
        Ok(format!("SELECT {}", items.join(", ")))
    }

    fn from_clause(&self) -> Result<String> {
        let Some(table) = &self.from else {
            return Err(Error::validation("the table name must be specified by FROM"));
        };
        let mut clause = format!(" FROM {}", wrap(table));
        if let Some(alias) = &self.alias {
            clause.push(' ');
            clause.push_str(&wrap(alias));
        }
        Ok(clause)
    }

    fn order_clause(&self) -> String {
        if self.order.is_empty() {
            return String::new();
        }
        let mut items = Vec::with_capacity(self.order.len());
        for item in &self.order {
            match item.split_once(' ') {
                Some((field, direction)) => {
                    let direction = direction.to_uppercase();
                    // unrecognized direction tokens are dropped, not rejected
                    if SORTS.contains(&direction.as_str()) {
                        items.push(format!("{} {direction}", wrap(field)));
                    } else {
                        items.push(wrap(field));
                    }
                }
                None => items.push(wrap(item)),
            }
        }
        format!(" ORDER BY {}", items.join(", "))
    }
}
