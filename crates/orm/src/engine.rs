//! Persistence operations: fetch, count, paginate, and record lifecycle.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strata_sql::{Binds, DriverError, Executor, Row, Value};

use crate::ValueMap;
use crate::cond::{Condition, primary_key_conditions};
use crate::delete::build_delete;
use crate::error::{DuplicateKind, Error, Result};
use crate::insert::build_insert;
use crate::record::Record;
use crate::schema::Schema;
use crate::select::Select;
use crate::update::build_update;

/// Timestamp rendering used for stamped audit fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Read behavior switches shared by the fetch operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Include hidden schema fields in the default select list.
    pub with_hidden: bool,
    /// Skip the soft-delete filter and return trashed rows too.
    pub with_deleted: bool,
    /// Lock the fetched rows with `FOR UPDATE`.
    pub for_update: bool,
}

impl ReadOptions {
    /// Includes hidden schema fields in the default select list.
    #[must_use]
    pub const fn with_hidden(mut self) -> Self {
        self.with_hidden = true;
        self
    }

    /// Skips the soft-delete filter.
    #[must_use]
    pub const fn with_deleted(mut self) -> Self {
        self.with_deleted = true;
        self
    }

    /// Locks the fetched rows with `FOR UPDATE`.
    #[must_use]
    pub const fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }
}

/// One page of results with its pagination envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Rows of the served page.
    pub items: Vec<Row>,
    /// Total matching rows across all pages.
    pub total_items: u64,
    /// Total page count at the requested limit.
    pub total_pages: u64,
    /// The page actually served, after clamping.
    pub page: u64,
    /// The per-page row limit.
    pub limit: u64,
}

/// Persistence engine binding one [`Schema`] to a driver.
///
/// Reads exclude soft-deleted rows and order by the primary key unless the
/// query or options say otherwise.
#[derive(Debug, Clone)]
pub struct Store<E> {
    schema: Arc<Schema>,
    executor: E,
}

impl<E: Executor> Store<E> {
    /// Creates a store over `schema` backed by `executor`.
    pub fn new(schema: Arc<Schema>, executor: E) -> Self {
        Self { schema, executor }
    }

    /// The schema the store persists.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// A fresh, empty record bound to the store's schema.
    #[must_use]
    pub fn record(&self) -> Record {
        Record::new(Arc::clone(&self.schema))
    }

    /// Fetches raw rows for `query`, applying the store defaults.
    ///
    /// Missing parts of the query are filled in: FROM defaults to the
    /// schema table, the select list to the schema's visible fields,
    /// ordering to the primary key, and the soft-delete filter is appended
    /// unless `opts.with_deleted`.
    ///
    /// # Errors
    ///
    /// Propagates query compilation failures and driver errors.
    pub fn find(&self, query: Select, opts: ReadOptions) -> Result<Vec<Row>> {
        let statement = self.prepare(query, opts, true).build()?;
        self.execute(&statement.sql, &statement.binds)
    }

    /// Fetches records for `query`, applying the store defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] when a fetched column does not name
    /// a schema field, plus the failure modes of [`Store::find`].
    pub fn find_records(&self, query: Select, opts: ReadOptions) -> Result<Vec<Record>> {
        let rows = self.find(query, opts)?;
        rows.iter().map(|row| self.record_from(row)).collect()
    }

    /// Fetches the record whose primary key matches `data`.
    ///
    /// Soft-deleted rows are excluded like every other read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `data` lacks a primary-key value
    /// and [`Error::Cardinality`] when more than one row matches.
    pub fn find_by_id(&self, data: &ValueMap, opts: ReadOptions) -> Result<Option<Record>> {
        let condition = primary_key_conditions(&self.schema.primary_keys(), data)?;
        self.find_one(condition, opts)
    }

    /// Fetches at most one record matching `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cardinality`] when more than one row matches, plus
    /// the failure modes of [`Store::find_records`].
    pub fn find_one(&self, condition: Condition, opts: ReadOptions) -> Result<Option<Record>> {
        let mut records = self.find_records(Select::new().filter(condition), opts)?;
        if records.len() > 1 {
            return Err(Error::Cardinality {
                table: self.schema.table().to_string(),
                description: "more than one row matched a single-row lookup".to_string(),
            });
        }
        Ok(records.pop())
    }

    /// Counts the rows matching `query`, ignoring its LIMIT/OFFSET and
    /// ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the driver yields no countable
    /// value, plus query compilation failures.
    pub fn count(&self, query: Select, opts: ReadOptions) -> Result<u64> {
        let statement = self.prepare(query, opts, false).build_count()?;
        let rows = self.execute(&statement.sql, &statement.binds)?;
        let value = rows
            .first()
            .and_then(|row| row.fields.first())
            .map(|field| &field.value);
        match value.and_then(Value::as_u64) {
            Some(count) => Ok(count),
            None => Err(Error::Execution {
                sql: statement.sql,
                code: String::new(),
                message: "COUNT(*) returned no countable value".to_string(),
            }),
        }
    }

    /// Serves one page of results for `query`.
    ///
    /// The total is counted first; `page` is then clamped into
    /// `1..=total_pages` (an empty result set serves page 1) before the
    /// page itself is fetched with the derived LIMIT/OFFSET.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `limit` is zero, plus the failure
    /// modes of [`Store::count`] and [`Store::find`].
    pub fn paginate(
        &self,
        query: Select,
        page: u64,
        limit: u64,
        opts: ReadOptions,
    ) -> Result<Page> {
        if limit == 0 {
            return Err(Error::validation("the page limit must be greater than zero"));
        }
        let total_items = self.count(query.clone(), opts)?;
        let total_pages = total_items.div_ceil(limit);
        let page = if total_pages == 0 {
            1
        } else {
            page.clamp(1, total_pages)
        };
        let items = self.find(query.limit(limit).offset((page - 1) * limit), opts)?;
        Ok(Page {
            items,
            total_items,
            total_pages,
            page,
            limit,
        })
    }

    /// Inserts `record` into the table.
    ///
    /// `created_at` and `updated_at` are stamped with the current time when
    /// the schema declares them and the record has not set them itself.
    /// When the schema declares an auto-increment key the record gets the
    /// database-assigned id backfilled after the insert. `ignore` renders
    /// `INSERT IGNORE`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] when the driver reports a key
    /// collision, plus statement compilation failures and other driver
    /// errors.
    pub fn insert(&self, record: &mut Record, ignore: bool) -> Result<()> {
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        for stamp in ["created_at", "updated_at"] {
            if self.schema.has_field(stamp) {
                record.set(stamp, now.clone())?;
            }
        }
        let statement = build_insert(&self.schema, &record.data(true), ignore)?;
        self.execute(&statement.sql, &statement.binds)?;
        if let Some(key) = self.auto_increment_key()
            && record.get(&key)?.is_null()
        {
            record.load(key, self.executor.last_insert_id());
        }
        record.persisted();
        Ok(())
    }

    /// Writes the record's fields back to the table.
    ///
    /// Every held non-primary field lands in the SET clause; a clean
    /// record still gets written (a "touch"). `updated_at` is stamped with
    /// the current time when the schema declares it and the record has not
    /// changed it itself.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Store::insert`], plus [`Error::Validation`]
    /// when a primary-key value is missing.
    pub fn update(&self, record: &mut Record) -> Result<()> {
        if self.schema.has_field("updated_at") && !record.is_dirty("updated_at") {
            record.set("updated_at", Utc::now().format(TIMESTAMP_FORMAT).to_string())?;
        }
        let statement = build_update(&self.schema, &record.data(true))?;
        self.execute(&statement.sql, &statement.binds)?;
        record.persisted();
        Ok(())
    }

    /// Removes `record` from the table.
    ///
    /// When the schema declares a soft-delete marker the row is kept and
    /// the marker stamped via UPDATE; `hard` forces a real DELETE either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a primary-key value is missing,
    /// plus driver errors.
    pub fn delete(&self, record: &mut Record, hard: bool) -> Result<()> {
        match self.schema.soft_delete() {
            Some(marker) if !hard => {
                record.set(marker, Utc::now().format(TIMESTAMP_FORMAT).to_string())?;
                self.update(record)?;
            }
            _ => {
                let statement = build_delete(&self.schema, &record.data(true))?;
                self.execute(&statement.sql, &statement.binds)?;
                record.persisted();
            }
        }
        Ok(())
    }

    /// Fills in the store defaults on a query.
    fn prepare(&self, mut query: Select, opts: ReadOptions, with_order: bool) -> Select {
        if !query.has_from() {
            query = query.from(self.schema.table());
        }
        let alias = query.from_alias().map(ToString::to_string);
        let prefix = |field: &str| match &alias {
            Some(alias) => format!("{alias}.{field}"),
            None => field.to_string(),
        };
        if !query.has_select() {
            let names = self.schema.field_names(opts.with_hidden);
            query = query.columns(names.iter().map(|name| prefix(name)));
        }
        if with_order && !query.has_order() {
            for key in self.schema.primary_keys() {
                query = query.order_by(prefix(&key));
            }
        }
        if !opts.with_deleted
            && let Some(marker) = self.schema.soft_delete()
        {
            query = query.filter(Condition::is_null(prefix(marker)));
        }
        if opts.for_update {
            query = query.for_update();
        }
        query
    }

    fn record_from(&self, row: &Row) -> Result<Record> {
        for field in &row.fields {
            if !field.name.starts_with('_') && !self.schema.has_field(&field.name) {
                return Err(Error::UnknownField {
                    field: field.name.clone(),
                    table: self.schema.table().to_string(),
                });
            }
        }
        Ok(Record::from_row(Arc::clone(&self.schema), row))
    }

    fn execute(&self, sql: &str, binds: &Binds) -> Result<Vec<Row>> {
        self.executor.execute(sql, binds).map_err(|error| {
            tracing::error!(
                table = self.schema.table(),
                code = %error.code,
                message = %error.message,
                "statement execution failed"
            );
            self.classify(sql, error)
        })
    }

    /// Maps a driver key-collision report onto [`Error::Duplicate`]; every
    /// other driver error becomes [`Error::Execution`].
    fn classify(&self, sql: &str, error: DriverError) -> Error {
        if matches!(error.code.as_str(), "1062" | "23000")
            && let Some(index) = duplicate_index(&error.message)
        {
            let index = index
                .rsplit_once('.')
                .map_or(index.as_str(), |(_, name)| name)
                .to_string();
            return if index == "PRIMARY" {
                Error::Duplicate {
                    kind: DuplicateKind::PrimaryKey,
                    index,
                    fields: self.schema.primary_keys(),
                }
            } else {
                let fields = self.schema.unique_group(&index);
                Error::Duplicate {
                    kind: DuplicateKind::UniqueIndex,
                    index,
                    fields,
                }
            };
        }
        Error::Execution {
            sql: sql.to_string(),
            code: error.code,
            message: error.message,
        }
    }

    /// The auto-increment primary-key member, when the schema declares one.
    fn auto_increment_key(&self) -> Option<String> {
        self.schema
            .fields()
            .iter()
            .find(|field| field.primary && field.auto_increment)
            .map(|field| field.name.clone())
    }
}

/// Extracts the index name from a MySQL-style duplicate-entry message
/// (`... for key 'index_name'`).
fn duplicate_index(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("for key '")?;
    let (index, _) = rest.split_once('\'')?;
    Some(index.to_string())
}
