use rand::Rng;
use time::Date;

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_-";
const ID_LEN: usize = 9;

/// Generates a short, URL-safe record identifier.
#[must_use]
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN).map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())])).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub log: Vec<ActivityEntry>,
    /// Revision of the stored record, bumped by every successful save.
    pub version: i32,
}

impl User {
    #[must_use]
    pub const fn new(id: String, username: String) -> Self {
        Self { id, username, log: Vec::new(), version: 0 }
    }

    /// Returns the record with `entry` appended to the end of its log.
    #[must_use]
    pub fn with_entry(self, entry: ActivityEntry) -> Self {
        let mut log = self.log;
        log.push(entry);
        Self { log, ..self }
    }
}

/// A single logged exercise session, owned by its user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub description: String,
    /// Minutes.
    pub duration: i64,
    /// `None` until the store resolves it, and possibly after.
    pub date: Option<Date>,
}
