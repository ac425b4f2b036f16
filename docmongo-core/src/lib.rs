// docmongo-core/src/lib.rs
// Thin MongoDB access layer: shared handle, bounded CRUD dispatch, audit timestamps

pub mod config;
pub mod connection;
pub mod context;
pub mod crud;
pub mod document;
pub mod error;
pub mod logging;
pub mod sort_spec;
pub mod timestamp;

// Public exports
pub use config::ConnectionConfig;
pub use connection::DocStore;
pub use context::OperationContext;
pub use crud::{set_envelope, DriverOption, UpdateCall, UpdateKind, UpdateMode};
pub use document::{
    deep_copy, deep_copy_map, filter_fields, has_key, object_id_from_hex, ordered_from_map,
    to_ordered_document, to_unordered_document, DocMap,
};
pub use error::{DocMongoError, Result};
pub use logging::{init_logging, LogLevel};
pub use sort_spec::SortSpec;
pub use timestamp::{timestamp_now, CREATE_TIME_FIELD, TIMESTAMP_FORMAT, UPDATE_TIME_FIELD};

// Driver re-exports so callers build filters and options against the same versions
pub use mongodb::bson;
pub use mongodb::options;
pub use mongodb::results;
