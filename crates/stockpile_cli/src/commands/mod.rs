//! CLI command implementations.

pub mod add;
pub mod backup;
pub mod delete_all;
pub mod edit;
pub mod list;
pub mod remove;
pub mod search;
pub mod stats;
pub mod status;
pub mod sync;

use crate::Service;

/// Pushes after a mutation when online; a failure just leaves the change
/// queued for the next cycle.
pub(crate) fn try_sync(service: &Service) {
    if let Err(e) = service.sync() {
        tracing::warn!(error = %e, "sync deferred, change stays queued");
    }
}
