// docmongo-core/src/crud/insert.rs

use mongodb::bson::Document;
use mongodb::options::InsertOneOptions;
use mongodb::results::InsertOneResult;
use serde::Serialize;
use tracing::{debug, error};

use crate::connection::DocStore;
use crate::document::to_ordered_document;
use crate::error::{DocMongoError, Result};
use crate::timestamp::stamp_create_time;

impl DocStore {
    /// Insert `document` exactly as given
    pub async fn insert_one<T>(
        &self,
        collection: &str,
        document: &T,
        options: impl Into<Option<InsertOneOptions>>,
    ) -> Result<InsertOneResult>
    where
        T: Serialize + Send + Sync,
    {
        let (coll, ctx) = self.collection_for::<T>(collection, "insert_one")?;
        let options = options.into();

        let inserted = ctx
            .run(async move {
                let result = coll.insert_one(document, options).await?;
                Ok::<_, DocMongoError>(result)
            })
            .await;

        match inserted {
            Ok(result) => {
                debug!(collection, inserted_id = %result.inserted_id, "insert_one done");
                Ok(result)
            }
            Err(e) => {
                error!(collection, error = %e, "insert_one failed");
                Err(e)
            }
        }
    }

    /// Append `create_time` to an ordered document, then insert it
    pub async fn insert_document_with_create_time(
        &self,
        collection: &str,
        mut document: Document,
        options: impl Into<Option<InsertOneOptions>>,
    ) -> Result<InsertOneResult> {
        stamp_create_time(&mut document);
        self.insert_one(collection, &document, options).await
    }

    /// Convert a record to an ordered document, append `create_time`, insert
    pub async fn insert_with_create_time<T>(
        &self,
        collection: &str,
        record: &T,
        options: impl Into<Option<InsertOneOptions>>,
    ) -> Result<InsertOneResult>
    where
        T: Serialize + ?Sized,
    {
        let document = to_ordered_document(record).map_err(|e| {
            error!(collection, error = %e, "record conversion failed");
            e
        })?;
        self.insert_document_with_create_time(collection, document, options)
            .await
    }
}
