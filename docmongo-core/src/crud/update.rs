// docmongo-core/src/crud/update.rs
//! Multi-mode update dispatch
//!
//! | mode         | driver call    | update document      | options          |
//! |--------------|----------------|----------------------|------------------|
//! | `UpdateOne`  | `update_one`   | `{ "$set": doc }`    | `UpdateOptions`  |
//! | `softDelete` | `update_one`   | `{ "$set": doc }`    | `UpdateOptions`  |
//! | `UpdateMany` | `update_many`  | `{ "$set": doc }`    | `UpdateOptions`  |
//! | `ReplaceOne` | `replace_one`  | `doc` as given       | `ReplaceOptions` |

use mongodb::bson::{doc, Document};
use mongodb::options::{ReplaceOptions, UpdateOptions};
use mongodb::results::UpdateResult;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info};

use crate::connection::DocStore;
use crate::document::to_ordered_document;
use crate::error::{DocMongoError, Result};
use crate::timestamp::stamp_update_time;

/// Mode tag without options, as named by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    UpdateOne,
    UpdateMany,
    ReplaceOne,
    /// Marks a document deleted through a single `$set` update
    SoftDelete,
}

impl UpdateKind {
    pub const ALL: [UpdateKind; 4] = [
        UpdateKind::UpdateOne,
        UpdateKind::UpdateMany,
        UpdateKind::ReplaceOne,
        UpdateKind::SoftDelete,
    ];

    /// Case-sensitive: `UpdateOne`, `UpdateMany`, `ReplaceOne`, `softDelete`
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "UpdateOne" => Ok(UpdateKind::UpdateOne),
            "UpdateMany" => Ok(UpdateKind::UpdateMany),
            "ReplaceOne" => Ok(UpdateKind::ReplaceOne),
            "softDelete" => Ok(UpdateKind::SoftDelete),
            other => Err(DocMongoError::InvalidUpdateMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::UpdateOne => "UpdateOne",
            UpdateKind::UpdateMany => "UpdateMany",
            UpdateKind::ReplaceOne => "ReplaceOne",
            UpdateKind::SoftDelete => "softDelete",
        }
    }

    /// Name of the option struct this mode accepts
    pub fn expected_option(&self) -> &'static str {
        match self {
            UpdateKind::ReplaceOne => "ReplaceOptions",
            _ => "UpdateOptions",
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            UpdateKind::UpdateOne => "update_one",
            UpdateKind::UpdateMany => "update_many",
            UpdateKind::ReplaceOne => "replace_one",
            UpdateKind::SoftDelete => "soft_delete",
        }
    }
}

impl FromStr for UpdateKind {
    type Err = DocMongoError;

    fn from_str(s: &str) -> Result<Self> {
        UpdateKind::parse(s)
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Update mode with the options its driver call takes
#[derive(Debug, Clone)]
pub enum UpdateMode {
    UpdateOne(Option<UpdateOptions>),
    UpdateMany(Option<UpdateOptions>),
    ReplaceOne(Option<ReplaceOptions>),
    SoftDelete(Option<UpdateOptions>),
}

/// Driver option object as supplied to the by-name entry point
#[derive(Debug, Clone)]
pub enum DriverOption {
    Update(UpdateOptions),
    Replace(ReplaceOptions),
}

impl DriverOption {
    fn type_name(&self) -> &'static str {
        match self {
            DriverOption::Update(_) => "UpdateOptions",
            DriverOption::Replace(_) => "ReplaceOptions",
        }
    }
}

impl From<UpdateOptions> for DriverOption {
    fn from(options: UpdateOptions) -> Self {
        DriverOption::Update(options)
    }
}

impl From<ReplaceOptions> for DriverOption {
    fn from(options: ReplaceOptions) -> Self {
        DriverOption::Replace(options)
    }
}

impl UpdateMode {
    pub fn kind(&self) -> UpdateKind {
        match self {
            UpdateMode::UpdateOne(_) => UpdateKind::UpdateOne,
            UpdateMode::UpdateMany(_) => UpdateKind::UpdateMany,
            UpdateMode::ReplaceOne(_) => UpdateKind::ReplaceOne,
            UpdateMode::SoftDelete(_) => UpdateKind::SoftDelete,
        }
    }

    /// Mode without options
    pub fn plain(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::UpdateOne => UpdateMode::UpdateOne(None),
            UpdateKind::UpdateMany => UpdateMode::UpdateMany(None),
            UpdateKind::ReplaceOne => UpdateMode::ReplaceOne(None),
            UpdateKind::SoftDelete => UpdateMode::SoftDelete(None),
        }
    }

    /// Resolve a mode name and an option bag.
    ///
    /// Every option must be of the type the mode expects; the first one that
    /// is not rejects the whole call. Of several valid options the last wins.
    pub fn resolve(name: &str, options: Vec<DriverOption>) -> Result<Self> {
        let kind = UpdateKind::parse(name)?;

        let mut mode = UpdateMode::plain(kind);
        for option in options {
            match (&mut mode, option) {
                (UpdateMode::ReplaceOne(slot), DriverOption::Replace(o)) => *slot = Some(o),
                (
                    UpdateMode::UpdateOne(slot)
                    | UpdateMode::UpdateMany(slot)
                    | UpdateMode::SoftDelete(slot),
                    DriverOption::Update(o),
                ) => *slot = Some(o),
                (_, bad) => {
                    error!(
                        mode = kind.as_str(),
                        got = bad.type_name(),
                        "invalid option type for update mode"
                    );
                    return Err(DocMongoError::InvalidOptionType {
                        mode: kind.as_str(),
                        expected: kind.expected_option(),
                    });
                }
            }
        }
        Ok(mode)
    }
}

impl From<UpdateKind> for UpdateMode {
    fn from(kind: UpdateKind) -> Self {
        UpdateMode::plain(kind)
    }
}

/// `{ "$set": document }`
pub fn set_envelope(document: Document) -> Document {
    doc! { "$set": document }
}

/// Driver call a mode dispatches to, carrying the payload it sends
#[derive(Debug, Clone)]
pub enum UpdateCall {
    UpdateOne {
        update: Document,
        options: Option<UpdateOptions>,
    },
    UpdateMany {
        update: Document,
        options: Option<UpdateOptions>,
    },
    ReplaceOne {
        replacement: Document,
        options: Option<ReplaceOptions>,
    },
}

impl UpdateCall {
    /// Plan the call for `mode`: update modes wrap `document` in `$set`,
    /// ReplaceOne sends it unchanged.
    pub fn plan(mode: UpdateMode, document: Document) -> Self {
        match mode {
            UpdateMode::UpdateOne(options) | UpdateMode::SoftDelete(options) => {
                UpdateCall::UpdateOne {
                    update: set_envelope(document),
                    options,
                }
            }
            UpdateMode::UpdateMany(options) => UpdateCall::UpdateMany {
                update: set_envelope(document),
                options,
            },
            UpdateMode::ReplaceOne(options) => UpdateCall::ReplaceOne {
                replacement: document,
                options,
            },
        }
    }

    /// Document sent to the server
    pub fn payload(&self) -> &Document {
        match self {
            UpdateCall::UpdateOne { update, .. } | UpdateCall::UpdateMany { update, .. } => update,
            UpdateCall::ReplaceOne { replacement, .. } => replacement,
        }
    }
}

impl DocStore {
    /// Dispatch an update according to `mode`
    pub async fn update(
        &self,
        collection: &str,
        mode: UpdateMode,
        filter: Document,
        document: Document,
    ) -> Result<UpdateResult> {
        let kind = mode.kind();
        let (coll, ctx) = self.collection_for::<Document>(collection, kind.operation())?;
        debug!(collection, mode = kind.as_str(), "dispatching update");

        let updated = ctx
            .run(async move {
                let result = match UpdateCall::plan(mode, document) {
                    UpdateCall::UpdateOne { update, options } => {
                        coll.update_one(filter, update, options).await?
                    }
                    UpdateCall::UpdateMany { update, options } => {
                        coll.update_many(filter, update, options).await?
                    }
                    UpdateCall::ReplaceOne {
                        replacement,
                        options,
                    } => coll.replace_one(filter, replacement, options).await?,
                };
                Ok::<_, DocMongoError>(result)
            })
            .await;

        match updated {
            Ok(result) => {
                info!(
                    collection,
                    mode = kind.as_str(),
                    matched = result.matched_count,
                    modified = result.modified_count,
                    "update done"
                );
                Ok(result)
            }
            Err(e) => {
                error!(collection, mode = kind.as_str(), error = %e, "update failed");
                Err(e)
            }
        }
    }

    /// Update with a textual mode and an untyped option bag; input is
    /// validated before the collection is touched
    pub async fn update_by_name(
        &self,
        collection: &str,
        mode_name: &str,
        filter: Document,
        document: Document,
        options: Vec<DriverOption>,
    ) -> Result<UpdateResult> {
        let mode = UpdateMode::resolve(mode_name, options).map_err(|e| {
            error!(collection, mode = mode_name, error = %e, "update rejected");
            e
        })?;
        self.update(collection, mode, filter, document).await
    }

    /// Append `update_time` to an ordered document, then update
    pub async fn update_document_with_update_time(
        &self,
        collection: &str,
        mode: UpdateMode,
        filter: Document,
        mut document: Document,
    ) -> Result<UpdateResult> {
        stamp_update_time(&mut document);
        self.update(collection, mode, filter, document).await
    }

    /// Convert a record to an ordered document, append `update_time`, update
    pub async fn update_with_update_time<T>(
        &self,
        collection: &str,
        mode: UpdateMode,
        filter: Document,
        record: &T,
    ) -> Result<UpdateResult>
    where
        T: Serialize + ?Sized,
    {
        let document = to_ordered_document(record).map_err(|e| {
            error!(collection, error = %e, "record conversion failed");
            e
        })?;
        self.update_document_with_update_time(collection, mode, filter, document)
            .await
    }
}
