// docmongo-core/src/crud/find.rs

use mongodb::bson::{self, Document};
use mongodb::options::{FindOneOptions, FindOptions};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::connection::DocStore;
use crate::error::{DocMongoError, Result};

impl DocStore {
    // ========== FIND ONE ==========

    /// First document matching `filter`.
    ///
    /// No match is reported as `DocMongoError::NotFound`; use
    /// [`DocMongoError::is_not_found`] to tell it apart from real failures.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: impl Into<Option<FindOneOptions>>,
    ) -> Result<Document> {
        self.find_one_as::<Document>(collection, filter, options)
            .await
    }

    pub async fn find_one_as<T>(
        &self,
        collection: &str,
        filter: Document,
        options: impl Into<Option<FindOneOptions>>,
    ) -> Result<T>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let (coll, ctx) = self.collection_for::<T>(collection, "find_one")?;
        let options = options.into();

        let found = ctx
            .run(async move {
                let result = coll.find_one(filter, options).await?;
                Ok::<_, DocMongoError>(result)
            })
            .await;

        match found {
            Ok(Some(document)) => {
                debug!(collection, "find_one matched");
                Ok(document)
            }
            Ok(None) => {
                debug!(collection, "find_one: no document");
                Err(DocMongoError::NotFound {
                    collection: collection.to_string(),
                })
            }
            Err(e) => {
                error!(collection, error = %e, "find_one failed");
                Err(e)
            }
        }
    }

    // ========== FIND MANY ==========

    /// All documents matching `filter`. An empty result is `Ok(vec![])`.
    pub async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        options: impl Into<Option<FindOptions>>,
    ) -> Result<Vec<Document>> {
        self.find_many_as::<Document>(collection, filter, options)
            .await
    }

    /// Drains the cursor, then decodes each result on its own; a document
    /// that fails to decode into `T` is logged and skipped.
    pub async fn find_many_as<T>(
        &self,
        collection: &str,
        filter: Document,
        options: impl Into<Option<FindOptions>>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let (coll, ctx) = self.collection_for::<Document>(collection, "find_many")?;
        let options = options.into();

        let outcome = ctx
            .run(async move {
                let mut cursor = coll.find(filter, options).await?;
                let mut documents = Vec::new();
                while cursor.advance().await? {
                    documents.push(cursor.deserialize_current()?);
                }
                // cursor dropped here, which closes it server-side
                Ok::<_, DocMongoError>(decode_each::<T>(collection, documents))
            })
            .await;

        match outcome {
            Ok((results, skipped)) => {
                info!(collection, returned = results.len(), skipped, "find_many done");
                Ok(results)
            }
            Err(e) => {
                error!(collection, error = %e, "find_many failed");
                Err(e)
            }
        }
    }
}

/// Decode every document into `T`, skipping (and logging) the ones that
/// do not fit. Returns the decoded values and the number skipped.
pub(crate) fn decode_each<T>(collection: &str, documents: Vec<Document>) -> (Vec<T>, usize)
where
    T: DeserializeOwned,
{
    let mut results = Vec::with_capacity(documents.len());
    let mut skipped = 0usize;

    for document in documents {
        match bson::from_document::<T>(document) {
            Ok(value) => results.push(value),
            Err(e) => {
                skipped += 1;
                error!(collection, error = %e, "failed to decode document, skipping");
            }
        }
    }
    (results, skipped)
}
