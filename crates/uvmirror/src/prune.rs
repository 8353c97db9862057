use tracing::{info, warn};
use uvmirror_store::ObjectStore;

use crate::error::DeleteError;

/// Delete every stale key in one batch call. Returns how many keys were
/// removed; nothing is sent for an empty list.
pub async fn prune<S: ObjectStore>(store: &S, stale: &[String]) -> Result<usize, DeleteError> {
    if stale.is_empty() {
        return Ok(0);
    }

    match store.batch_delete(stale).await {
        Ok(()) => {
            info!(count = stale.len(), "pruned stale keys");
            Ok(stale.len())
        }
        Err(e) => {
            warn!(count = stale.len(), error = %e, "prune failed");
            Err(DeleteError(e))
        }
    }
}
