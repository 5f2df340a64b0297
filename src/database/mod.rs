pub mod manager;
pub mod table;

pub use manager::{Database, DatabaseError};
pub use table::{BindValue, Column, ColumnKind, TableSchema};
