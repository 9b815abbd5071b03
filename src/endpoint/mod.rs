mod handle;
mod limits;
mod reply;

use async_trait::async_trait;
use log::{info, warn};

use crate::bench::WriteTarget;
use crate::conf::TargetConfig;
use crate::core::BenchError;

pub use handle::{EndpointHandle, MongoConnector};
pub use limits::WriteLimits;
pub use reply::{check_write_reply, is_duplicate_key, reply_ok};

/// Opens a live, liveness-checked connection to one endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Target: WriteTarget;

    async fn connect(
        &self,
        name: &str,
        uri: &str,
        target: &TargetConfig,
    ) -> Result<Self::Target, BenchError>;
}

/// Connects every configured endpoint in order. If any endpoint fails its
/// liveness check the ones already opened are closed and the failure returned,
/// so no trial runs against either.
pub async fn register_endpoints<C: Connector>(
    connector: &C,
    target: &TargetConfig,
) -> Result<Vec<C::Target>, BenchError> {
    let mut handles: Vec<C::Target> = Vec::new();

    for (name, uri) in target.endpoints() {
        match connector.connect(name, uri, target).await {
            Ok(handle) => {
                info!("{} connection: Success", name);
                handles.push(handle);
            }
            Err(e) => {
                for handle in handles.iter_mut() {
                    if let Err(close_err) = handle.close().await {
                        warn!("{}: close failed: {}", handle.name(), close_err);
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(handles)
}
