//! Keyed records persisted through the query builder.
//!
//! A [`Model`] names a table and its key columns, usually through
//! [`crate::define_model!`]. A [`Record`] holds one row of that table and tracks which
//! fields changed since it was loaded or last saved.

use std::{fmt, marker::PhantomData};

use tracing::trace;

use crate::{
    database::Database,
    error::{DbError, Result},
    query::QueryBuilder,
    row::Row,
    value::Value,
};

pub trait Model {
    const TABLE: &'static str;

    /// Key columns, primary key first.
    const KEYS: &'static [&'static str];
}

pub struct Record<M> {
    data: Row,
    changed: Row,
    /// Key values of the stored row, `None` until the record is loaded or inserted.
    stored: Option<Row>,
    _model: PhantomData<M>,
}

impl<M: Model> Record<M> {
    /// An empty record; every field set on it is new.
    pub fn new() -> Self {
        Self {
            data: Row::new(),
            changed: Row::new(),
            stored: None,
            _model: PhantomData,
        }
    }

    /// A record loaded from `row`, with nothing changed.
    pub fn from_row(row: Row) -> Self {
        let mut record = Self {
            data: row,
            ..Self::new()
        };
        record.mark_stored();
        record
    }

    fn mark_stored(&mut self) {
        let keys = M::KEYS
            .iter()
            .filter_map(|key| self.data.get(key).map(|v| (*key, v.clone())))
            .collect();
        self.stored = Some(keys);
    }

    /// Loads the record whose key columns equal `keys`, in [`Model::KEYS`] order.
    pub fn find(db: &mut Database, keys: &[Value]) -> Result<Option<Self>> {
        if keys.len() < M::KEYS.len() {
            return Err(DbError::MissingKeys {
                expected: M::KEYS.len(),
                given: keys.len(),
            });
        }

        let builder = M::KEYS
            .iter()
            .zip(keys)
            .fold(db.table(M::TABLE), |b, (key, value)| b.filter(*key, "=", value));

        Ok(builder.select_one(&[])?.map(Self::from_row))
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.data
            .get(field)
            .ok_or_else(|| DbError::UnknownField(field.to_string()))
    }

    /// Sets `field`. Only a value that differs from the current one marks the field
    /// as changed.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        let value = value.into();
        if self.data.get(field) == Some(&value) {
            return;
        }
        self.data.set(field, value.clone());
        self.changed.set(field, value);
    }

    /// Inserts a record that was never stored, otherwise updates the changed fields
    /// of the stored row, matched by the keys it was loaded with.
    pub fn save(&mut self, db: &mut Database) -> Result<()> {
        if self.changed.is_empty() {
            return Ok(());
        }
        if self.stored.is_some() {
            self.update(db)
        } else {
            self.insert(db)
        }
    }

    fn insert(&mut self, db: &mut Database) -> Result<()> {
        db.table(M::TABLE).insert(self.changed.iter())?;

        if let Some(primary) = M::KEYS.first() {
            let missing = self.data.get(primary).map_or(true, Value::is_null);
            if missing {
                if let Some(id) = db.last_insert_id()? {
                    trace!("{} inserted with {primary} = {id}", M::TABLE);
                    self.data.set(*primary, id);
                }
            }
        }

        self.changed = Row::new();
        self.mark_stored();
        Ok(())
    }

    fn update(&mut self, db: &mut Database) -> Result<()> {
        let builder = self.by_keys(db.table(M::TABLE))?;
        builder.update(self.changed.iter())?;
        self.changed = Row::new();
        self.mark_stored();
        Ok(())
    }

    /// Deletes the row matching this record's keys.
    pub fn delete(&self, db: &mut Database) -> Result<u64> {
        self.by_keys(db.table(M::TABLE))?.delete()
    }

    fn by_keys<'a>(&self, builder: QueryBuilder<'a>) -> Result<QueryBuilder<'a>> {
        let source = self.stored.as_ref().unwrap_or(&self.data);
        M::KEYS.iter().try_fold(builder, |b, key| {
            let value = source
                .get(key)
                .ok_or_else(|| DbError::UnknownField(key.to_string()))?;
            Ok(b.filter(*key, "=", value))
        })
    }

    pub fn data(&self) -> &Row {
        &self.data
    }

    /// Fields set since the record was loaded or last saved.
    pub fn changed(&self) -> &Row {
        &self.changed
    }
}

impl<M: Model> Default for Record<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Record<M> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            changed: self.changed.clone(),
            stored: self.stored.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &M::TABLE)
            .field("data", &self.data)
            .field("changed", &self.changed)
            .finish()
    }
}
