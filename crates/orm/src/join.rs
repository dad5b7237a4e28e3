use strata_sql::Binds;

use crate::cond::{Condition, wrap};
use crate::error::{Error, Result};

/// Comparison operator for column-to-column join constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl Cmp {
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// One ON constraint of a join, ANDed with its siblings.
#[derive(Debug, Clone, PartialEq)]
enum JoinOn {
    /// Raw predicate text, passed through untouched.
    Raw(String),
    /// Column-to-column comparison; both sides are quoted.
    Columns(String, Cmp, String),
    /// A full condition compiled through the shared bind map.
    Cond(Condition),
}

/// A JOIN clause: kind, target table (with optional `"table alias"`
/// shorthand), and one or more ON constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    constraints: Vec<JoinOn>,
}

impl Join {
    fn new(kind: JoinKind, target: impl Into<String>) -> Self {
        let target = target.into();
        let (table, alias) = match target.split_once(' ') {
            Some((table, alias)) => (table.to_string(), Some(alias.to_string())),
            None => (target, None),
        };
        Self { kind, table, alias, constraints: Vec::new() }
    }

    /// Creates an INNER JOIN against `target` (`"table"` or `"table alias"`).
    pub fn inner(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, target)
    }

    /// Creates a LEFT JOIN.
    pub fn left(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, target)
    }

    /// Creates a RIGHT JOIN.
    pub fn right(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, target)
    }

    /// Adds a column-to-column equality constraint.
    #[must_use]
    pub fn on_columns(self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.on_columns_cmp(left, Cmp::Eq, right)
    }

    /// Adds a column-to-column constraint with an explicit operator.
    #[must_use]
    pub fn on_columns_cmp(
        mut self, left: impl Into<String>, cmp: Cmp, right: impl Into<String>,
    ) -> Self {
        self.constraints.push(JoinOn::Columns(left.into(), cmp, right.into()));
        self
    }

    /// Adds a raw predicate constraint, passed through untouched.
    #[must_use]
    pub fn on_raw(mut self, predicate: impl Into<String>) -> Self {
        self.constraints.push(JoinOn::Raw(predicate.into()));
        self
    }

    /// Adds a condition constraint, compiled through the statement's bind map.
    #[must_use]
    pub fn on(mut self, condition: Condition) -> Self {
        self.constraints.push(JoinOn::Cond(condition));
        self
    }

    /// Renders this join, appending condition binds to `binds`.
    pub(crate) fn compile(&self, binds: &mut Binds) -> Result<String> {
        if self.constraints.is_empty() {
            return Err(Error::validation(format!(
                "join on `{}` requires at least one constraint", self.table
            )));
        }
        let mut parts = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            match constraint {
                JoinOn::Raw(predicate) => parts.push(predicate.clone()),
                JoinOn::Columns(left, cmp, right) => {
                    parts.push(format!("{} {} {}", wrap(left), cmp.symbol(), wrap(right)));
                }
                JoinOn::Cond(condition) => {
                    let fragment = condition.compile(binds)?;
                    if !fragment.is_empty() {
                        parts.push(fragment);
                    }
                }
            }
        }
        if parts.is_empty() {
            return Err(Error::validation(format!(
                "join on `{}` compiled to no usable constraints", self.table
            )));
        }
        let mut sql = format!("{} JOIN {}", self.kind.keyword(), wrap(&self.table));
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&wrap(alias));
        }
        sql.push_str(" ON ");
        sql.push_str(&parts.join(" AND "));
        Ok(sql)
    }
}
