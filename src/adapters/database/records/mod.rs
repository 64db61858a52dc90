pub mod user;

pub use user::{EntryRecord, UserRecord};
