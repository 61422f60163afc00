//! Time helpers
//!
//! Business dates use the server's local time zone.

use chrono::{Local, NaiveDate};

/// Today in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Archive file name stamp `YYYYmmdd_HHMMSS`
pub fn archive_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
