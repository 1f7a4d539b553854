pub mod format;

pub use format::{format_date, format_status, parse_int, FormatError};
