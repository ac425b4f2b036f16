// docmongo-core/src/context.rs
// Per-call deadline applied to every dispatched operation

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{DocMongoError, Result};

/// Bounded lifetime of a single operation.
///
/// Created per call, consumed by `run`; nothing outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext {
    operation: &'static str,
    timeout: Duration,
}

impl OperationContext {
    pub fn new(operation: &'static str, timeout: Duration) -> Self {
        OperationContext { operation, timeout }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drive `fut` to completion or fail with `Timeout` once the deadline passes.
    /// The future is dropped on expiry, which releases any cursor or
    /// connection it holds.
    pub async fn run<F, T>(self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation = self.operation,
                    timeout = ?self.timeout,
                    "operation deadline exceeded"
                );
                Err(DocMongoError::Timeout {
                    operation: self.operation,
                    timeout: self.timeout,
                })
            }
        }
    }
}
