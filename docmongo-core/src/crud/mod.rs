// docmongo-core/src/crud/mod.rs
// CRUD dispatch layer
//
// FILE STRUCTURE:
// ├── find.rs    find_one, find_many (+ typed variants)
// ├── count.rs   count
// ├── insert.rs  insert_one, create_time variants
// └── update.rs  UpdateMode / DriverOption, update dispatch, update_time variants
//
// Every operation: resolve collection -> derive OperationContext -> driver call.

mod count;
mod find;
mod insert;
mod update;

pub use update::{set_envelope, DriverOption, UpdateCall, UpdateKind, UpdateMode};

use mongodb::Collection;

use crate::connection::DocStore;
use crate::context::OperationContext;
use crate::error::Result;

impl DocStore {
    /// Named collection from the shared database, plus the deadline for this call
    fn collection_for<T>(
        &self,
        name: &str,
        operation: &'static str,
    ) -> Result<(Collection<T>, OperationContext)>
    where
        T: Send + Sync,
    {
        let session = self.session()?;
        Ok((
            session.database().collection::<T>(name),
            session.context(operation),
        ))
    }
}
