use strata_sql::Binds;

/// A compiled statement: SQL text plus its ordered bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `:<field>__<n>` placeholders.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Binds,
}
