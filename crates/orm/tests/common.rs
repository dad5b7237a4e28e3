//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

use strata_orm::{
    Binds, DriverError, Executor, FieldDef, FieldType, Row, Schema, Value,
};

/// Schema exercising every metadata feature: a composite primary key with
/// one auto-increment member, a three-field unique group with defaults, a
/// required field, audit stamps, and a hidden column.
pub fn sample_schema() -> Arc<Schema> {
    let dt = FieldType::DateTime { precision: Some(3) };
    Arc::new(
        Schema::new("table1")
            .field(FieldDef::new("id", FieldType::Integer).unsigned().primary().auto_increment())
            .field(FieldDef::new("pkey_2", FieldType::String).primary())
            .field(FieldDef::new("pkey_3", FieldType::String).primary())
            .field(FieldDef::new("ukey_1", FieldType::String).unique("ukey_123").default(Value::from("A")))
            .field(FieldDef::new("ukey_2", FieldType::String).unique("ukey_123").default(Value::from("B")))
            .field(FieldDef::new("ukey_3", FieldType::String).unique("ukey_123").default(Value::from("C")))
            .field(FieldDef::new("email", FieldType::String).required())
            .field(FieldDef::new("status", FieldType::String).index("status"))
            .field(FieldDef::new("token", FieldType::String).hidden())
            .field(FieldDef::new("created_at", dt.clone()))
            .field(FieldDef::new("created_by", FieldType::String))
            .field(FieldDef::new("updated_at", dt.clone()).required())
            .field(FieldDef::new("updated_by", FieldType::String))
            .field(FieldDef::new("deleted_at", dt))
            .field(FieldDef::new("deleted_by", FieldType::String)),
    )
}

/// Single-key schema without audit or soft-delete fields.
pub fn plain_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new("plain")
            .field(FieldDef::new("id", FieldType::Integer).primary().auto_increment())
            .field(FieldDef::new("name", FieldType::String)),
    )
}

/// Scripted driver: pops one canned response per `execute` call and logs
/// every statement it receives.
pub struct MockExecutor {
    responses: RefCell<VecDeque<Result<Vec<Row>, DriverError>>>,
    pub calls: RefCell<Vec<(String, Binds)>>,
    pub insert_id: Value,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            insert_id: Value::Null,
        }
    }

    pub fn with_insert_id(mut self, id: impl Into<Value>) -> Self {
        self.insert_id = id.into();
        self
    }

    pub fn respond(self, rows: Vec<Row>) -> Self {
        self.responses.borrow_mut().push_back(Ok(rows));
        self
    }

    pub fn fail(self, error: DriverError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    /// The SQL of the `n`th executed statement.
    pub fn sql(&self, n: usize) -> String {
        self.calls.borrow()[n].0.clone()
    }

    /// The binds of the `n`th executed statement.
    pub fn binds(&self, n: usize) -> Binds {
        self.calls.borrow()[n].1.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Executor for &MockExecutor {
    fn execute(&self, sql: &str, binds: &Binds) -> Result<Vec<Row>, DriverError> {
        self.calls.borrow_mut().push((sql.to_string(), binds.clone()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn last_insert_id(&self) -> Value {
        self.insert_id.clone()
    }
}

/// A count-query response carrying a single numeric column.
pub fn count_row(total: u64) -> Vec<Row> {
    vec![Row::from_pairs([("COUNT(*)", Value::UInt(total))])]
}
