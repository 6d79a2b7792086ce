//! Wall-clock [`Clock`] backed by tokio's timer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use streamhost_core::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
