use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Process-wide per-second rate limiter for calls to a single upstream
/// host. A permit is acquired before the call and released one second
/// later on a detached task, bounding the in-flight concurrency to the
/// provider's advertised requests/sec.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let permits = requests_per_second.max(1) as usize;
        Self { semaphore: Arc::new(Semaphore::new(permits)) }
    }

    pub async fn acquire(&self) {
        let permit = self.semaphore.clone().acquire_owned().await.expect("semaphore never closed");
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            drop(permit);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_does_not_block_below_capacity() {
        let limiter = RateLimiter::new(5);
        for _ in 0..5 {
            limiter.acquire().await;
        }
    }
}
