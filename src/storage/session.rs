//! SQLite-backed storage session

use crate::record::{Record, ID_COLUMN};
use crate::relation::{LinkPlan, Relationship};
use crate::schema::Schema;
use crate::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// A unit of work against an ephemeral in-memory database.
///
/// Writes open a transaction on first use; [`Session::commit`] makes them
/// durable for the lifetime of the process. Reads on the same session see
/// uncommitted writes.
pub struct Session {
    conn: Connection,
    schema: Schema,
}

impl Session {
    /// Open an in-memory database and create every table in `schema`
    pub fn open_in_memory(schema: Schema) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let session = Self { conn, schema };
        session.initialize_schema()?;
        Ok(session)
    }

    /// Create all tables and indexes. Existing ones are left untouched.
    pub fn initialize_schema(&self) -> Result<()> {
        for stmt in self.schema.initialization_statements() {
            self.conn.execute(&stmt, [])?;
        }
        tracing::debug!("Initialized {} tables", self.schema.tables().len());
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// True while a transaction is open
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    // ========== Unit of Work ==========

    /// Stage a record for insertion and assign its surrogate id
    pub fn add<R: Record>(&mut self, record: &mut R) -> Result<i64> {
        if record.id().is_some() {
            return Err(Error::AlreadyPersisted(R::TABLE.to_string()));
        }
        self.schema.table(R::TABLE)?;
        self.begin_if_needed()?;

        let (columns, values): (Vec<&str>, Vec<Value>) = record.values().into_iter().unzip();
        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", R::TABLE)
        } else {
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                R::TABLE,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        self.conn.execute(&sql, params_from_iter(values))?;
        let id = self.conn.last_insert_rowid();
        record.set_id(id);
        tracing::debug!("Added {} row id={}", R::TABLE, id);
        Ok(id)
    }

    /// Commit the open transaction, if any
    pub fn commit(&mut self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
            tracing::debug!("Committed");
        }
        Ok(())
    }

    /// Discard the open transaction, if any
    pub fn rollback(&mut self) -> Result<()> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
            tracing::debug!("Rolled back");
        }
        Ok(())
    }

    fn begin_if_needed(&self) -> Result<()> {
        if !self.in_transaction() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    // ========== Queries ==========

    /// Every row of a record type, in surrogate id order
    pub fn query_all<R: Record>(&self) -> Result<Vec<R>> {
        let table = self.schema.table(R::TABLE)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY {}",
            table.column_list(None),
            table.name,
            ID_COLUMN
        ))?;

        let records = stmt
            .query_map([], |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<R>>>()?;
        tracing::debug!("Queried {} {} rows", records.len(), R::TABLE);
        Ok(records)
    }

    /// Re-read a persisted record from storage
    pub fn refresh<R: Record>(&self, record: &mut R) -> Result<()> {
        let id = record.id().ok_or_else(|| Error::NotPersisted(R::TABLE.to_string()))?;
        let table = self.schema.table(R::TABLE)?;
        *record = self.conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                table.column_list(None),
                table.name,
                ID_COLUMN
            ),
            [id],
            |row| R::from_row(row),
        )?;
        Ok(())
    }

    pub fn count<R: Record>(&self) -> Result<usize> {
        let table = self.schema.table(R::TABLE)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ========== Relationships ==========

    /// Connect `source` to `target` through `relationship`.
    ///
    /// Secondary joins insert an association row; reference joins rewrite the
    /// reference column of whichever side carries it, and the carrier record
    /// is refreshed from storage.
    pub fn link<S: Record, T: Record>(
        &mut self,
        relationship: &Relationship<S, T>,
        source: &mut S,
        target: &mut T,
    ) -> Result<()> {
        let join = relationship.join();
        let local = column_value(&*source, join.local_column(), S::TABLE)?;
        let remote = column_value(&*target, join.remote_column(), T::TABLE)?;

        self.begin_if_needed()?;
        match &relationship.link {
            LinkPlan::InsertAssociation { sql } => {
                self.conn.execute(sql, params![local, remote])?;
            }
            LinkPlan::UpdateSource { sql } => {
                let id = source.id().ok_or_else(|| Error::NotPersisted(S::TABLE.to_string()))?;
                self.conn.execute(sql, params![remote, id])?;
                self.refresh(source)?;
            }
            LinkPlan::UpdateTarget { sql } => {
                let id = target.id().ok_or_else(|| Error::NotPersisted(T::TABLE.to_string()))?;
                self.conn.execute(sql, params![local, id])?;
                self.refresh(target)?;
            }
        }

        tracing::debug!(
            "Linked {} -> {} via {}",
            S::TABLE,
            T::TABLE,
            relationship.name()
        );
        Ok(())
    }

    /// Load every record related to `source`
    pub fn load_related<S: Record, T: Record>(
        &self,
        relationship: &Relationship<S, T>,
        source: &S,
    ) -> Result<Vec<T>> {
        let key = column_value(source, relationship.join().local_column(), S::TABLE)?;
        let mut stmt = self.conn.prepare(relationship.load_sql())?;

        let related = stmt
            .query_map([key], |row| T::from_row(row))?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        tracing::debug!(
            "Loaded {} {} rows for {}.{}",
            related.len(),
            T::TABLE,
            S::TABLE,
            relationship.name()
        );
        Ok(related)
    }

    /// Load the single record related to `source`, if any
    pub fn load_one<S: Record, T: Record>(
        &self,
        relationship: &Relationship<S, T>,
        source: &S,
    ) -> Result<Option<T>> {
        Ok(self.load_related(relationship, source)?.into_iter().next())
    }
}

fn column_value<R: Record>(record: &R, column: &str, table: &str) -> Result<Value> {
    if column == ID_COLUMN && record.id().is_none() {
        return Err(Error::NotPersisted(table.to_string()));
    }
    record.value_of(column).ok_or_else(|| {
        Error::Schema(format!("{} record has no value for column {}", table, column))
    })
}
