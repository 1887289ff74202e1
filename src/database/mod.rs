pub mod handle;
pub mod migrate;

pub use handle::{Database, DatabaseError};
