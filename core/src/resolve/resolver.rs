//! Fixture resolution by service code

use tracing::{debug, warn};

use crate::fixture::Fixture;
use crate::store::FixtureClient;

/// Resolve the fixture for a service code.
///
/// Returns `None` when the code is empty, the store is not connected, the
/// lookup fails, or nothing matches. When several fixtures share the code the
/// first one in store order wins.
pub async fn resolve(client: &FixtureClient, service_code: &str) -> Option<Fixture> {
    if service_code.is_empty() {
        warn!("cannot resolve an empty service code");
        return None;
    }

    let found = match client.find_by_service_code(service_code).await {
        Ok(found) => found,
        Err(e) => {
            warn!(service_code, error = %e, "fixture lookup failed");
            return None;
        }
    };

    if found.len() > 1 {
        debug!(
            service_code,
            matches = found.len(),
            "several fixtures share a service code, using the first"
        );
    }

    let candidate = found.into_iter().next();
    if candidate.is_none() {
        debug!(service_code, "no fixture for service code");
    }
    candidate
}
