pub mod table;

pub use table::{scenario_table, TableBuilder};
