//! Rate Limiter (Token Bucket Algorithm)
//!
//! Caps the request rate hitting the engine; a start flood must not turn
//! into a source-query flood.

use std::time::Instant;

use tokio::sync::Mutex;

/// Token bucket rate limiter
pub struct RateLimiter {
    state: Mutex<BucketState>,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Allow `refill_rate` requests per second with bursts up to `max_tokens`
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: max_tokens as f64,
                last_refill: Instant::now(),
            }),
            max_tokens: max_tokens as f64,
            refill_rate: refill_rate as f64,
        }
    }

    /// Check if a request is allowed (consumes 1 token)
    pub async fn check(&self) -> bool {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Remaining tokens (for monitoring)
    #[allow(dead_code)]
    pub async fn remaining(&self) -> f64 {
        self.state.lock().await.tokens
    }
}
