//! Delayed gateway implementation - wraps another gateway with artificial latency.

use std::time::Duration;

use rag_core::{async_trait, GatewayError, GatewayRequest, LlmGateway, ModelReply};
use tokio::time::sleep;

/// A gateway that wraps another gateway and sleeps before every call.
///
/// Useful for testing timeouts and concurrent sessions against a slow model.
pub struct DelayedGateway<G: LlmGateway> {
    inner: G,
    delay: Duration,
}

impl<G: LlmGateway> DelayedGateway<G> {
    pub fn new(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a gateway with a delay in milliseconds.
    pub fn with_millis(inner: G, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// The wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: LlmGateway> LlmGateway for DelayedGateway<G> {
    async fn generate(&self, request: GatewayRequest) -> Result<ModelReply, GatewayError> {
        sleep(self.delay).await;
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        "DelayedGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedGateway;
    use rag_core::Turn;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_gateway() {
        let gateway = DelayedGateway::with_millis(ScriptedGateway::new().then_text("late"), 100);
        let request = GatewayRequest::without_tools("system", vec![Turn::user("q")]);

        let start = Instant::now();
        let reply = gateway.generate(request).await.unwrap();

        assert_eq!(reply.text(), Some("late"));
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(gateway.inner().call_count().await, 1);
    }

    #[test]
    fn test_gateway_name() {
        let gateway = DelayedGateway::with_millis(ScriptedGateway::new(), 0);
        assert_eq!(gateway.name(), "DelayedGateway");
    }
}
