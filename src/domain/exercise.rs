use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Calendar format accepted for caller-supplied dates.
pub const INPUT_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Display format for log output, e.g. `Mon Jan 02 2006`.
const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");

/// Parses a caller-supplied `YYYY-MM-DD` date.
///
/// # Errors
/// Returns the parse error if the text is not a valid calendar date.
pub fn parse_entry_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), INPUT_DATE_FORMAT)
}

/// Renders a date the way log listings show it.
///
/// # Errors
/// Returns an error if the date cannot be formatted.
pub fn display_date(date: Date) -> Result<String, time::error::Format> {
    date.format(DISPLAY_DATE_FORMAT)
}

/// A freshly logged entry as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedEntry {
    pub user_id: String,
    pub username: String,
    pub description: String,
    pub duration: i64,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub description: String,
    pub duration: i64,
    pub date: String,
}

/// Summary of a user's log in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLog {
    pub user_id: String,
    pub username: String,
    pub count: usize,
    pub log: Vec<LogLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_display_date_matches_log_format() {
        assert_eq!(display_date(date!(2006 - 01 - 02)).unwrap(), "Mon Jan 02 2006");
        assert_eq!(display_date(date!(2024 - 12 - 25)).unwrap(), "Wed Dec 25 2024");
    }

    #[test]
    fn test_parse_entry_date() {
        assert_eq!(parse_entry_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert_eq!(parse_entry_date(" 2024-01-05 ").unwrap(), date!(2024 - 01 - 05));
        assert!(parse_entry_date("2023-02-29").is_err());
        assert!(parse_entry_date("yesterday").is_err());
        assert!(parse_entry_date("01/05/2024").is_err());
    }
}
