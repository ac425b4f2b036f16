// docmongo-core/src/timestamp.rs
// Audit timestamps written as local-time strings

use chrono::Local;
use mongodb::bson::Document;

pub const CREATE_TIME_FIELD: &str = "create_time";
pub const UPDATE_TIME_FIELD: &str = "update_time";

/// `YYYY-MM-DD HH:MM:SS`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Set `field` to the current timestamp. An existing value is overwritten in place.
pub fn stamp(document: &mut Document, field: &str) {
    document.insert(field, timestamp_now());
}

pub fn stamp_create_time(document: &mut Document) {
    stamp(document, CREATE_TIME_FIELD);
}

pub fn stamp_update_time(document: &mut Document) {
    stamp(document, UPDATE_TIME_FIELD);
}
