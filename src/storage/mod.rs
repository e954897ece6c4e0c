//! Storage Layer - SQLite-backed session
//!
//! The system of record is an in-memory SQLite database owned by a
//! [`Session`]. Table layout comes from the [`Schema`](crate::Schema) the
//! session is opened with; nothing survives the process.

pub mod session;

pub use session::Session;
