//! Metadata-driven data access over [`strata_sql`] drivers.
//!
//! Queries are declarative condition trees compiled to parameterized SQL,
//! and tables are described by JSON-loadable [`Schema`] metadata that
//! drives statement generation, record validation, and the persistence
//! lifecycle (timestamps, soft deletion, id backfill).
//!
//! # Quick Start
//!
//! ## Describe a table
//!
//! ```
//! use strata_orm::{FieldDef, FieldType, Schema};
//!
//! let schema = Schema::new("posts")
//!     .field(FieldDef::new("id", FieldType::Integer).primary().auto_increment())
//!     .field(FieldDef::new("title", FieldType::String).required())
//!     .field(FieldDef::new("created_at", FieldType::DateTime { precision: Some(3) }))
//!     .field(FieldDef::new("deleted_at", FieldType::DateTime { precision: Some(3) }));
//! assert_eq!(schema.primary_keys(), vec!["id".to_string()]);
//! ```
//!
//! ## Build a query
//!
//! ```
//! use strata_orm::{Condition, Select};
//!
//! let statement = Select::new()
//!     .column("posts.*")
//!     .from("posts p")
//!     .filter(Condition::or(vec![
//!         Condition::eq("p.title", "hello"),
//!         Condition::partial("p.title", "wor"),
//!     ]))
//!     .order_by("p.id DESC")
//!     .limit(10)
//!     .build()
//!     .unwrap();
//! assert!(statement.sql.starts_with("SELECT `posts`.* FROM `posts` `p`"));
//! ```
//!
//! ## Persist records
//!
//! ```ignore
//! use strata_orm::{ReadOptions, Select, Store};
//!
//! let store = Store::new(schema, executor);
//! let mut post = store.record();
//! post.set("title", "hello")?;
//! store.insert(&mut post, false)?;
//! let page = store.paginate(Select::new(), 1, 20, ReadOptions::default())?;
//! ```

mod cond;
mod delete;
mod engine;
mod error;
mod insert;
mod join;
mod query;
mod record;
mod schema;
mod select;
mod update;

use std::collections::BTreeMap;

pub use strata_sql::{Binds, DriverError, Executor, Field, Row, Value};

pub use crate::cond::{Condition, primary_key_conditions, wrap};
pub use crate::delete::build_delete;
pub use crate::engine::{Page, ReadOptions, Store, TIMESTAMP_FORMAT};
pub use crate::error::{DuplicateKind, Error, Result};
pub use crate::insert::build_insert;
pub use crate::join::{Cmp, Join};
pub use crate::query::Statement;
pub use crate::record::Record;
pub use crate::schema::{FieldDef, FieldType, KeyGroup, Schema};
pub use crate::select::Select;
pub use crate::update::build_update;

/// Ordered field-name to value map used for record data and key lookups.
pub type ValueMap = BTreeMap<String, Value>;
