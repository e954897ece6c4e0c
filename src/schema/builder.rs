//! Schema builder

use super::table::TableDef;
use crate::record::{Record, ID_COLUMN};
use crate::relation::{Join, Relationship, RelationshipInfo};
use crate::schema::ColumnType;
use crate::{Error, Result};

/// Immutable set of table definitions and relationship metadata.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<TableDef>,
    relationships: Vec<RelationshipInfo>,
}

impl Schema {
    /// Tables in registration order
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Result<&TableDef> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn relationships(&self) -> &[RelationshipInfo] {
        &self.relationships
    }

    /// Relationships declared on a given source table
    pub fn relationships_of(&self, table: &str) -> Vec<&RelationshipInfo> {
        self.relationships.iter().filter(|r| r.source == table).collect()
    }

    /// CREATE TABLE text for one table. Inspection only.
    pub fn create_statement(&self, table: &str) -> Result<String> {
        Ok(self.table(table)?.create_statement())
    }

    /// Every statement needed to bring up an empty store. Safe to re-run.
    pub fn initialization_statements(&self) -> Vec<String> {
        let mut stmts = Vec::new();
        for table in &self.tables {
            stmts.push(table.create_if_missing_statement());
            stmts.extend(table.index_if_missing_statements());
        }
        stmts
    }
}

/// Collects table definitions and relationships into a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table of record type `R`
    pub fn table<R: Record>(&mut self) -> Result<&mut Self> {
        let table = R::table();
        if table.name != R::TABLE {
            return Err(Error::Schema(format!(
                "record table {} declares definition for {}",
                R::TABLE,
                table.name
            )));
        }

        match table.get_column(ID_COLUMN) {
            Some(id) if id.primary_key && id.column_type == ColumnType::Integer => {}
            _ => {
                return Err(Error::Schema(format!(
                    "record table {} needs an integer {} primary key",
                    table.name, ID_COLUMN
                )));
            }
        }

        self.register(table)?;
        Ok(self)
    }

    /// Register an association table used by secondary joins
    pub fn association(&mut self, table: TableDef) -> Result<&mut Self> {
        if table.primary_key().is_empty() {
            return Err(Error::Schema(format!(
                "association table {} needs a primary key",
                table.name
            )));
        }
        self.register(table)?;
        Ok(self)
    }

    /// Declare a relationship reachable only from `S`
    pub fn relationship<S: Record, T: Record>(
        &mut self,
        name: &'static str,
        join: Join,
    ) -> Result<Relationship<S, T>> {
        let relationship = self.compile::<S, T>(name, join, None)?;
        self.schema.relationships.push(relationship.info().clone());
        Ok(relationship)
    }

    /// Declare a relationship navigable from both sides
    pub fn bidirectional<S: Record, T: Record>(
        &mut self,
        name: &'static str,
        back_name: &'static str,
        join: Join,
    ) -> Result<(Relationship<S, T>, Relationship<T, S>)> {
        if S::TABLE == T::TABLE && name == back_name {
            return Err(Error::Schema(format!(
                "relationship {}.{} cannot be its own inverse",
                S::TABLE,
                name
            )));
        }

        let inverse = join.reversed();
        let forward = self.compile::<S, T>(name, join, Some(back_name))?;
        let backward = self.compile::<T, S>(back_name, inverse, Some(name))?;

        self.schema.relationships.push(forward.info().clone());
        self.schema.relationships.push(backward.info().clone());
        Ok((forward, backward))
    }

    pub fn build(self) -> Schema {
        self.schema
    }

    fn register(&mut self, table: TableDef) -> Result<()> {
        table.validate()?;
        if self.schema.tables.iter().any(|t| t.name == table.name) {
            return Err(Error::Schema(format!("table {} registered twice", table.name)));
        }
        tracing::debug!("Registered table {}", table.name);
        self.schema.tables.push(table);
        Ok(())
    }

    fn compile<S: Record, T: Record>(
        &self,
        name: &'static str,
        join: Join,
        back_populates: Option<&'static str>,
    ) -> Result<Relationship<S, T>> {
        let source = self.schema.table(S::TABLE)?;
        let target = self.schema.table(T::TABLE)?;

        if self
            .schema
            .relationships
            .iter()
            .any(|r| r.source == source.name && r.name == name)
        {
            return Err(Error::Schema(format!(
                "relationship {}.{} declared twice",
                source.name, name
            )));
        }

        let association = match &join {
            Join::Secondary { table, .. } => Some(self.schema.table(table).map_err(|_| {
                Error::Schema(format!(
                    "relationship {} uses unregistered association table {}",
                    name, table
                ))
            })?),
            Join::Reference { .. } => None,
        };

        let relationship =
            Relationship::compile(name, join, back_populates, source, target, association)?;
        tracing::debug!(
            "Compiled relationship {}.{} -> {}",
            source.name,
            name,
            target.name
        );
        Ok(relationship)
    }
}
