//! Chainable clause setters.

use crate::{
    database::Database,
    error::{DbError, Result},
    query::{
        clause::{
            ColumnDef, ColumnType, Condition, Connector, GroupEntry, JoinKind, JoinSpec, Limit,
            OrderClause, Predicate, SortDirection,
        },
        preview::SqlPreview,
        spec::QuerySpec,
    },
    value::Value,
};

/// Accumulates clauses for one statement.
///
/// Setters take and return the builder. A setter that receives invalid input (an
/// unknown operator, a column before any table) records the error and the terminal
/// verb reports it without touching the database.
pub struct QueryBuilder<'a> {
    pub(crate) db: &'a mut Database,
    spec: QuerySpec,
    error: Option<DbError>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(db: &'a mut Database) -> Self {
        Self {
            db,
            spec: QuerySpec::default(),
            error: None,
        }
    }

    fn fail(mut self, err: DbError) -> Self {
        self.error.get_or_insert(err);
        self
    }

    /// The clauses collected so far.
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Selects the table the statement targets, replacing any previous one.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.spec.table = Some(table.into());
        self
    }

    /// Stages a column of the current table for `create`.
    pub fn column(self, name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        self.column_props(name, column_type, "")
    }

    /// Stages a column with raw attributes, e.g. `NOT NULL PRIMARY KEY AUTOINCREMENT`.
    pub fn column_props(
        mut self,
        name: impl Into<String>,
        column_type: impl Into<ColumnType>,
        properties: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let Some(table) = self.spec.table.clone() else {
            return self.fail(DbError::ColumnWithoutTable(name));
        };

        let def = ColumnDef::new(name, column_type).with_properties(properties);
        self.spec.columns.entry(table).or_default().push(def);
        self
    }

    /// Adds `column operator value`, joined to earlier predicates with AND.
    pub fn filter(self, column: impl Into<String>, operator: &str, value: impl Into<Value>) -> Self {
        self.filter_with(column, operator, value, Connector::And)
    }

    /// Adds `column operator value`, joined to earlier predicates with OR.
    pub fn or_filter(
        self,
        column: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.filter_with(column, operator, value, Connector::Or)
    }

    pub fn filter_with(
        mut self,
        column: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
        connector: Connector,
    ) -> Self {
        match Condition::new(column, operator, value, connector) {
            Ok(condition) => {
                self.spec.predicates.push(Predicate::Simple(condition));
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Adds a parenthesized group of predicates.
    ///
    /// Entries are `(column, operator, value)` tuples, joined with AND, or
    /// `(column, operator, value, connector)` tuples. `connector` joins the whole group
    /// to what precedes it.
    pub fn filter_group<I, E>(mut self, entries: I, connector: Connector) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<GroupEntry>,
    {
        let conditions = entries
            .into_iter()
            .map(|e| e.into().into_condition())
            .collect::<Result<Vec<_>>>();

        match conditions {
            Ok(conditions) if conditions.is_empty() => self,
            Ok(conditions) => {
                self.spec.predicates.push(Predicate::Group {
                    conditions,
                    connector,
                });
                self
            }
            Err(err) => self.fail(err),
        }
    }

    /// Appends verbatim SQL to the WHERE clause.
    ///
    /// No connector is inserted in front of it; include `AND`/`OR` yourself when other
    /// predicates precede it.
    pub fn filter_raw(mut self, sql: impl Into<String>) -> Self {
        self.spec.predicates.push(Predicate::Raw(sql.into()));
        self
    }

    /// `JOIN table ON base.left = table.right`, or `USING` when both columns match.
    pub fn join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.join_as(table, left, right, JoinKind::Plain, None)
    }

    pub fn join_as(
        mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        kind: JoinKind,
        alias: Option<&str>,
    ) -> Self {
        self.spec.joins.push(JoinSpec {
            table: table.into(),
            left: left.into(),
            right: right.into(),
            kind,
            alias: alias.filter(|a| !a.is_empty()).map(String::from),
        });
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.spec.group_by.push(column.into());
        self
    }

    /// Orders by `column`. `direction` accepts a [`SortDirection`], `"asc"`/`"desc"`
    /// or `true` for descending.
    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<SortDirection>) -> Self {
        self.spec.order_by.push(OrderClause {
            column: column.into(),
            direction: direction.into(),
        });
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.spec.limit = Some(Limit::Count(count));
        self
    }

    /// `LIMIT offset,count`.
    pub fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.spec.limit = Some(Limit::Range { offset, count });
        self
    }

    /// Switches to rendering: the returned preview produces SQL text without
    /// executing anything.
    pub fn sql(self) -> SqlPreview<'a> {
        SqlPreview::new(self.db, self.spec, self.error)
    }

    /// Freezes the builder, surfacing the first error a setter recorded.
    pub(crate) fn finish(self) -> Result<(&'a mut Database, QuerySpec)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.db, self.spec)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::clause::Operator;

    #[test]
    fn test_setters_accumulate() {
        let mut db = Database::in_memory().unwrap();
        let builder = db
            .table("users")
            .column("Id", "INTEGER")
            .column_props("Name", "STRING", "NOT NULL")
            .filter("Id", ">", 1)
            .or_filter("Name", "!=", "Ben")
            .join_as("orders", "Id", "UserId", JoinKind::Left, Some("o"))
            .group_by("Name")
            .order_by("Name", "desc")
            .limit_offset(5, 10);

        let spec = builder.spec();
        assert_eq!(spec.table(), Some("users"));
        assert_eq!(spec.columns_for("users").len(), 2);
        assert_eq!(spec.predicates().len(), 2);
        assert_eq!(spec.joins()[0].reference(), "o");
        assert_eq!(spec.order_by()[0].direction, SortDirection::Desc);
        assert_eq!(spec.limit(), Some(Limit::Range { offset: 5, count: 10 }));

        match &spec.predicates()[1] {
            Predicate::Simple(c) => {
                assert_eq!(c.operator, Operator::Ne);
                assert_eq!(c.connector, Connector::Or);
            }
            other => panic!("unexpected predicate {other:?}"),
        }
    }

    #[test]
    fn test_bad_operator_is_deferred() {
        let mut db = Database::in_memory().unwrap();
        let result = db
            .table("users")
            .filter("Id", "=~", 1)
            .filter("Name", "=", "x")
            .select(&[]);

        assert!(matches!(result, Err(DbError::UnsupportedOperator(op)) if op == "=~"));
        assert!(db.sql_log().is_empty());
    }

    #[test]
    fn test_column_without_table() {
        let mut db = Database::in_memory().unwrap();
        assert!(matches!(
            db.builder().column("Id", "INTEGER").create(),
            Err(DbError::ColumnWithoutTable(name)) if name == "Id"
        ));
    }

    #[test]
    fn test_empty_group_is_ignored() {
        let mut db = Database::in_memory().unwrap();
        let builder = db
            .table("t")
            .filter_group(Vec::<(&str, &str, i64)>::new(), Connector::Or);
        assert!(builder.spec().predicates().is_empty());
    }
}
