//! Simulated HTTP responses
//!
//! Replays decoded records as a delayed result. The returned future is lazy:
//! nothing happens until it is polled, and dropping it before the delay
//! elapses cancels the timer with no other effect.

use std::time::Duration;

use tracing::debug;

use crate::error::{ApiError, Result};
use crate::platform::Timer;

/// Wait `delay`, then succeed with the records (200), succeed empty (204), or
/// fail with a synthetic HTTP error carrying the status (anything else).
pub async fn simulate<T>(
    timer: &dyn Timer,
    records: Vec<T>,
    http_code: u16,
    delay: Duration,
) -> Result<Vec<T>> {
    timer.sleep(delay).await;
    debug!(http_code, delay_ms = delay.as_millis() as u64, "simulated response settled");

    match http_code {
        200 => Ok(records),
        204 => Ok(Vec::new()),
        code => Err(ApiError::simulated_http(code)),
    }
}
