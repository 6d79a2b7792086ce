//! Time source port.
//!
//! Polling loops measure wall-clock deadlines and sleep through this trait so
//! tests can run them against a virtual clock.

use std::time::{Duration, Instant};

use async_trait::async_trait;

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}
