//! Clause building blocks accumulated by the [`super::QueryBuilder`].

use std::{borrow::Cow, fmt, str::FromStr};

use serde::Serialize;

use crate::{
    error::{DbError, Result},
    value::Value,
};

/// Boolean connector placed in front of every predicate but the first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for Connector {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Connector::And),
            "OR" => Ok(Connector::Or),
            _ => Err(DbError::UnsupportedOperator(s.to_string())),
        }
    }
}

/// Comparison operator of a simple predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" | "===" => Ok(Operator::Eq),
            "!=" | "!==" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "LIKE" => Ok(Operator::Like),
            "NOT LIKE" => Ok(Operator::NotLike),
            _ => Err(DbError::UnsupportedOperator(s.to_string())),
        }
    }
}

/// `column operator value`, joined to what precedes it by `connector`.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
    pub connector: Connector,
}

impl Condition {
    pub fn new(
        column: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
        connector: Connector,
    ) -> Result<Self> {
        Ok(Self {
            column: column.into(),
            operator: operator.parse()?,
            value: value.into(),
            connector,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Simple(Condition),
    /// A parenthesized group; `connector` joins the group to prior predicates.
    Group {
        conditions: Vec<Condition>,
        connector: Connector,
    },
    /// Verbatim SQL text. No connector is inserted in front of it.
    Raw(String),
}

/// One member of a predicate group before its operator has been validated.
#[derive(Clone, Debug)]
pub struct GroupEntry {
    column: String,
    operator: String,
    value: Value,
    connector: Connector,
}

impl GroupEntry {
    pub(crate) fn into_condition(self) -> Result<Condition> {
        Condition::new(self.column, &self.operator, self.value, self.connector)
    }
}

impl<C, O, V> From<(C, O, V)> for GroupEntry
where
    C: Into<String>,
    O: Into<String>,
    V: Into<Value>,
{
    fn from((column, operator, value): (C, O, V)) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
            connector: Connector::And,
        }
    }
}

impl<C, O, V> From<(C, O, V, Connector)> for GroupEntry
where
    C: Into<String>,
    O: Into<String>,
    V: Into<Value>,
{
    fn from((column, operator, value, connector): (C, O, V, Connector)) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
            connector,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Plain,
    Inner,
    Left,
    Right,
    Cross,
    /// Any other join keyword, such as `LEFT OUTER` or `NATURAL`, rendered as given.
    Raw(String),
}

impl JoinKind {
    /// Keyword placed before `JOIN`, with its trailing space.
    pub fn keyword(&self) -> Cow<'_, str> {
        match self {
            JoinKind::Plain => Cow::Borrowed(""),
            JoinKind::Inner => Cow::Borrowed("INNER "),
            JoinKind::Left => Cow::Borrowed("LEFT "),
            JoinKind::Right => Cow::Borrowed("RIGHT "),
            JoinKind::Cross => Cow::Borrowed("CROSS "),
            JoinKind::Raw(raw) => match raw.trim() {
                "" => Cow::Borrowed(""),
                raw => Cow::Owned(format!("{raw} ")),
            },
        }
    }
}

impl From<&str> for JoinKind {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "" => JoinKind::Plain,
            "INNER" => JoinKind::Inner,
            "LEFT" => JoinKind::Left,
            "RIGHT" => JoinKind::Right,
            "CROSS" => JoinKind::Cross,
            _ => JoinKind::Raw(s.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSpec {
    pub table: String,
    /// Column of the base table.
    pub left: String,
    /// Column of the joined table.
    pub right: String,
    pub kind: JoinKind,
    pub alias: Option<String>,
}

impl JoinSpec {
    /// Name the joined table is referenced by in the ON clause.
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl From<&str> for SortDirection {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" | "descendng" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

impl From<bool> for SortDirection {
    /// `true` sorts descending.
    fn from(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Range { offset: u64, count: u64 },
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Count(count) => write!(f, "{count}"),
            Limit::Range { offset, count } => write!(f, "{offset},{count}"),
        }
    }
}

/// Backend neutral column type, mapped to a native type at render time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    String,
    Float,
    Text,
    Blob,
    Date,
    DateTime,
    /// A backend native type passed through unchanged.
    Raw(String),
}

impl ColumnType {
    pub fn name(&self) -> &str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::String => "STRING",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Raw(raw) => raw,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "INTEGER" => ColumnType::Integer,
            "STRING" => ColumnType::String,
            "FLOAT" => ColumnType::Float,
            "TEXT" => ColumnType::Text,
            "BLOB" => ColumnType::Blob,
            "DATE" => ColumnType::Date,
            "DATETIME" => ColumnType::DateTime,
            _ => ColumnType::Raw(s.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column staged for `CREATE TABLE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Raw attribute text such as `NOT NULL PRIMARY KEY AUTOINCREMENT`.
    pub properties: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        let properties = properties.into();
        self.properties = (!properties.trim().is_empty()).then_some(properties);
        self
    }
}

/// Column metadata read back from the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub properties: String,
}
