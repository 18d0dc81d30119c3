//! Fixture resolution pipeline
//!
//! resolver (store lookup) -> decoder (pure) -> simulator (timed replay).

mod decoder;
mod resolver;
mod simulator;

pub use decoder::decode;
pub use resolver::resolve;
pub use simulator::simulate;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::fixture::Fixture;
use crate::platform::Timer;

/// Everything needed to replay one resolved fixture
#[derive(Debug, Clone, PartialEq)]
pub struct MockContext<T> {
    pub data: Vec<T>,
    pub http_code: u16,
    pub delay: Duration,
}

impl<T: DeserializeOwned> MockContext<T> {
    /// Build a context from a resolved fixture
    pub fn from_fixture(fixture: &Fixture, default_delay_ms: u64) -> Self {
        let data = fixture.response_body.as_ref().map(decode::<T>).unwrap_or_default();
        Self {
            data,
            http_code: fixture.http_code(),
            delay: Duration::from_millis(fixture.delay_or(default_delay_ms)),
        }
    }
}

impl<T> MockContext<T> {
    /// Context used when no fixture could be resolved
    pub fn fallback(data: Vec<T>, delay_ms: u64) -> Self {
        Self {
            data,
            http_code: 200,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub async fn replay(self, timer: &dyn Timer) -> Result<Vec<T>> {
        simulate(timer, self.data, self.http_code, self.delay).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, MockTimer};
    use serde_json::{json, Value};

    #[test]
    fn test_context_from_fixture() {
        let f = fixture("svc", 404, 250, json!("{\"data\":[{\"id\":1}]}"));
        let ctx: MockContext<Value> = MockContext::from_fixture(&f, 1000);

        assert_eq!(ctx.data, vec![json!({"id": 1})]);
        assert_eq!(ctx.http_code, 404);
        assert_eq!(ctx.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_context_defaults() {
        let f = Fixture {
            service_code: "svc".into(),
            ..Default::default()
        };
        let ctx: MockContext<Value> = MockContext::from_fixture(&f, 1000);

        assert!(ctx.data.is_empty());
        assert_eq!(ctx.http_code, 200);
        assert_eq!(ctx.delay, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_fallback_replays_as_success() {
        let timer = MockTimer::new();
        let ctx = MockContext::fallback(vec![7u32], 0);
        assert_eq!(ctx.replay(&timer).await.unwrap(), vec![7]);
        assert_eq!(timer.recorded(), vec![Duration::ZERO]);
    }
}
