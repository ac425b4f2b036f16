// docmongo-core/src/crud/count.rs

use mongodb::bson::Document;
use mongodb::options::CountOptions;
use tracing::{error, info};

use crate::connection::DocStore;
use crate::error::{DocMongoError, Result};

impl DocStore {
    /// Number of documents matching `filter`
    pub async fn count(
        &self,
        collection: &str,
        filter: Document,
        options: impl Into<Option<CountOptions>>,
    ) -> Result<u64> {
        let (coll, ctx) = self.collection_for::<Document>(collection, "count")?;
        let options = options.into();

        let counted = ctx
            .run(async move {
                let result = coll.count_documents(filter, options).await?;
                Ok::<_, DocMongoError>(result)
            })
            .await;

        match counted {
            Ok(count) => {
                info!(collection, count, "count done");
                Ok(count)
            }
            Err(e) => {
                error!(collection, error = %e, "count failed");
                Err(e)
            }
        }
    }
}
