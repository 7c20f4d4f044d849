//! The frozen form of an accumulated query.

use std::collections::BTreeMap;

use crate::{
    error::{DbError, Result},
    query::clause::{ColumnDef, JoinSpec, Limit, OrderClause, Predicate},
};

/// Everything a terminal verb needs to render one statement.
///
/// Built by [`super::QueryBuilder`] and consumed by a single verb; there is no way to
/// mutate it afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySpec {
    pub(crate) table: Option<String>,
    pub(crate) columns: BTreeMap<String, Vec<ColumnDef>>,
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) joins: Vec<JoinSpec>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<OrderClause>,
    pub(crate) limit: Option<Limit>,
}

impl QuerySpec {
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The active table, or a configuration error naming the verb that needed it.
    pub fn require_table(&self, verb: &'static str) -> Result<&str> {
        self.table.as_deref().ok_or(DbError::MissingTable(verb))
    }

    /// Columns staged for `table`.
    pub fn columns_for(&self, table: &str) -> &[ColumnDef] {
        self.columns.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[OrderClause] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Copy of this spec with its limit replaced.
    pub(crate) fn with_limit(&self, limit: Limit) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }
}
