//! Table definitions and DDL rendering

use crate::{Error, Result};
use std::collections::HashSet;

/// Column types understood by the schema layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer
    Integer,
    /// Text, optionally length-bounded
    String(Option<u32>),
}

impl ColumnType {
    /// SQL type name used in CREATE TABLE statements
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::String(Some(len)) => format!("VARCHAR({})", len),
            ColumnType::String(None) => "VARCHAR".to_string(),
        }
    }
}

/// A column in a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    /// Whether NULL is accepted. Ignored for primary key columns.
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDef {
    /// Nullable integer column
    pub fn integer(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Integer,
            nullable: true,
            primary_key: false,
        }
    }

    /// Nullable string column, bounded when `len` is set
    pub fn string(name: &'static str, len: Option<u32>) -> Self {
        Self {
            name,
            column_type: ColumnType::String(len),
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Primary key columns never accept NULL
    pub fn is_not_null(&self) -> bool {
        self.primary_key || !self.nullable
    }

    fn render(&self) -> String {
        if self.is_not_null() {
            format!("{} {} NOT NULL", self.name, self.column_type.sql_type())
        } else {
            format!("{} {}", self.name, self.column_type.sql_type())
        }
    }
}

/// A secondary index on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub unique: bool,
}

impl IndexDef {
    pub fn new(name: &'static str, columns: &[&'static str]) -> Self {
        Self {
            name,
            columns: columns.to_vec(),
            unique: false,
        }
    }

    pub fn unique(name: &'static str, columns: &[&'static str]) -> Self {
        Self {
            unique: true,
            ..Self::new(name, columns)
        }
    }
}

/// Complete definition of one table: columns in declaration order plus
/// indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Look up a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Names of the primary key columns in declaration order
    pub fn primary_key(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    /// Comma-separated column list, optionally qualified with a table alias
    pub fn column_list(&self, alias: Option<&str>) -> String {
        self.columns
            .iter()
            .map(|c| match alias {
                Some(a) => format!("{}.{}", a, c.name),
                None => c.name.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check the definition is self-consistent
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Schema(format!("table {} has no columns", self.name)));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name) {
                return Err(Error::Schema(format!(
                    "duplicate column {}.{}",
                    self.name, column.name
                )));
            }
        }

        for index in &self.indexes {
            if index.columns.is_empty() {
                return Err(Error::Schema(format!("index {} has no columns", index.name)));
            }
            if let Some(missing) = index.columns.iter().find(|c| !self.has_column(c)) {
                return Err(Error::Schema(format!(
                    "index {} references unknown column {}.{}",
                    index.name, self.name, missing
                )));
            }
        }

        Ok(())
    }

    /// CREATE TABLE statement for display, framed by blank lines
    pub fn create_statement(&self) -> String {
        format!("\n{}\n\n", self.render_create(false))
    }

    /// CREATE TABLE IF NOT EXISTS statement used to initialize storage
    pub fn create_if_missing_statement(&self) -> String {
        self.render_create(true)
    }

    /// CREATE INDEX statements for display
    pub fn index_statements(&self) -> Vec<String> {
        self.indexes.iter().map(|i| self.render_index(i, false)).collect()
    }

    /// CREATE INDEX IF NOT EXISTS statements used to initialize storage
    pub fn index_if_missing_statements(&self) -> Vec<String> {
        self.indexes.iter().map(|i| self.render_index(i, true)).collect()
    }

    fn render_create(&self, if_not_exists: bool) -> String {
        let mut lines: Vec<String> = self.columns.iter().map(ColumnDef::render).collect();

        let pk = self.primary_key();
        if !pk.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));
        }

        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!(
            "CREATE TABLE {}{} (\n\t{}\n)",
            guard,
            self.name,
            lines.join(", \n\t")
        )
    }

    fn render_index(&self, index: &IndexDef, if_not_exists: bool) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!(
            "CREATE {}INDEX {}{} ON {} ({})",
            unique,
            guard,
            index.name,
            self.name,
            index.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents() -> TableDef {
        TableDef::new("parents")
            .column(ColumnDef::integer("id").primary_key())
            .column(ColumnDef::string("uuid", Some(36)).not_null())
            .column(ColumnDef::string("name", None))
            .index(IndexDef::unique("parents_uuid_idx", &["uuid"]))
    }

    #[test]
    fn test_create_statement() {
        let expected = "\nCREATE TABLE parents (\n\
                        \tid INTEGER NOT NULL, \n\
                        \tuuid VARCHAR(36) NOT NULL, \n\
                        \tname VARCHAR, \n\
                        \tPRIMARY KEY (id)\n\
                        )\n\n";
        assert_eq!(parents().create_statement(), expected);
        assert!(parents()
            .create_if_missing_statement()
            .starts_with("CREATE TABLE IF NOT EXISTS parents (\n\tid INTEGER NOT NULL, \n"));
    }

    #[test]
    fn test_composite_primary_key() {
        let table = TableDef::new("association")
            .column(ColumnDef::string("parent_uuid", Some(36)).primary_key())
            .column(ColumnDef::string("child_uuid", Some(36)).primary_key());

        let ddl = table.create_if_missing_statement();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS association ("));
        assert!(ddl.contains("\tparent_uuid VARCHAR(36) NOT NULL, \n"));
        assert!(ddl.contains("PRIMARY KEY (parent_uuid, child_uuid)"));
    }

    #[test]
    fn test_index_statements() {
        let table = parents().index(IndexDef::new("parents_name_idx", &["name"]));
        assert_eq!(
            table.index_statements(),
            vec![
                "CREATE UNIQUE INDEX parents_uuid_idx ON parents (uuid)".to_string(),
                "CREATE INDEX parents_name_idx ON parents (name)".to_string(),
            ]
        );
        assert_eq!(
            table.index_if_missing_statements()[0],
            "CREATE UNIQUE INDEX IF NOT EXISTS parents_uuid_idx ON parents (uuid)"
        );
    }

    #[test]
    fn test_validate() {
        assert!(parents().validate().is_ok());
        assert!(TableDef::new("empty").validate().is_err());

        let dup = parents().column(ColumnDef::string("name", None));
        assert!(matches!(dup.validate(), Err(Error::Schema(_))));

        let bad_index = parents().index(IndexDef::new("bad_idx", &["missing"]));
        assert!(bad_index.validate().is_err());
    }

    #[test]
    fn test_column_list() {
        assert_eq!(parents().column_list(None), "id, uuid, name");
        assert_eq!(parents().column_list(Some("t")), "t.id, t.uuid, t.name");
    }
}
