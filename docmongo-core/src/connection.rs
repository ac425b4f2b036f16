// docmongo-core/src/connection.rs
//! Shared connection handle
//!
//! One `DocStore` is built at startup and cloned into every caller; all
//! clones share the same session. Operations copy the client out under a
//! short read lock and never hold the lock across an `.await`.
//!
//! `connect` replaces the session wholesale. Call it once before concurrent
//! traffic starts: operations already running keep the previous client.

use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::context::OperationContext;
use crate::error::{DocMongoError, Result};

/// Live client plus the state every operation reads
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) client: Client,
    pub(crate) database_name: String,
    pub(crate) timeout: Duration,
}

impl Session {
    pub(crate) fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    pub(crate) fn context(&self, operation: &'static str) -> OperationContext {
        OperationContext::new(operation, self.timeout)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocStore {
    session: Arc<RwLock<Option<Session>>>,
}

impl DocStore {
    /// Unconnected handle; every operation fails with `NotConnected` until `connect`
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and connect from a loaded config
    pub async fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let store = DocStore::new();
        store.connect(&config.uri, config.timeout_secs).await?;
        Ok(store)
    }

    /// Connect to `uri`; the URI path names the logical database.
    ///
    /// `timeout_secs` bounds every later operation on this handle.
    pub async fn connect(&self, uri: &str, timeout_secs: u64) -> Result<()> {
        if timeout_secs == 0 {
            return Err(DocMongoError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let options = ClientOptions::parse(uri).await.map_err(|e| {
            if matches!(*e.kind, ErrorKind::InvalidArgument { .. }) {
                DocMongoError::InvalidUri(e.to_string())
            } else {
                DocMongoError::Driver(e)
            }
        })?;

        let database_name = database_name_from(&options)?;
        let client = Client::with_options(options)?;

        let session = Session {
            client,
            database_name,
            timeout: Duration::from_secs(timeout_secs),
        };
        info!(
            database = %session.database_name,
            timeout = ?session.timeout,
            "connected"
        );

        let previous = self.session.write().replace(session);
        if previous.is_some() {
            debug!("replaced previous session");
        }
        Ok(())
    }

    /// The underlying driver client, for other databases or driver features
    /// this layer does not wrap
    pub fn client(&self) -> Result<Client> {
        Ok(self.session()?.client)
    }

    /// Handle to the logical database named by the connection URI
    pub fn database(&self) -> Result<Database> {
        Ok(self.session()?.database())
    }

    /// Release the client. No-op when not connected; safe to repeat.
    pub async fn disconnect(&self) -> Result<()> {
        let session = self.session.write().take();
        match session {
            Some(session) => {
                let ctx = session.context("disconnect");
                let database = session.database_name;
                ctx.run(async move {
                    session.client.shutdown().await;
                    Ok::<_, DocMongoError>(())
                })
                .await?;
                info!(database = %database, "disconnected");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Round-trip `{ping: 1}` against the server
    pub async fn ping(&self) -> Result<()> {
        let session = self.session()?;
        let database = session.database();
        session
            .context("ping")
            .run(async move {
                database.run_command(doc! { "ping": 1 }, None).await?;
                Ok::<_, DocMongoError>(())
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn database_name(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.database_name.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.session.read().as_ref().map(|s| s.timeout)
    }

    pub(crate) fn session(&self) -> Result<Session> {
        self.session
            .read()
            .as_ref()
            .cloned()
            .ok_or(DocMongoError::NotConnected)
    }
}

fn database_name_from(options: &ClientOptions) -> Result<String> {
    match options.default_database.as_deref() {
        Some(name) if !name.trim_start_matches('/').is_empty() => {
            Ok(name.trim_start_matches('/').to_string())
        }
        _ => Err(DocMongoError::InvalidUri(
            "connection URI has no database name in its path".to_string(),
        )),
    }
}
