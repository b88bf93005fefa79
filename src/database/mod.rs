pub mod manager;
pub mod models;

pub use manager::{timed, Database, DatabaseError, MIGRATOR};
