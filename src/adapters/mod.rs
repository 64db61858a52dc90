pub mod database;
pub mod memory;
