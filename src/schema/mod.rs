//! Schema layer - table definitions, DDL and the schema builder
//!
//! A [`Schema`] is assembled explicitly by the caller through a
//! [`SchemaBuilder`]:
//! - record tables, one per [`Record`](crate::Record) type
//! - association tables for many-to-many links
//! - relationships, compiled and validated as they are declared

pub mod builder;
pub mod table;

pub use builder::{Schema, SchemaBuilder};
pub use table::{ColumnDef, ColumnType, IndexDef, TableDef};
