use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// The awaited condition did not hold before the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("condition not met within {0:?}")]
pub struct WaitTimeout(pub Duration);

/// Polls `probe` until it yields a value or `timeout` elapses
///
/// The probe runs at least once, even with a zero timeout. Between probes the
/// task sleeps for `poll_interval` (never past the deadline).
///
/// # Example
///
/// ```
/// use image_harvester::render::wait_until;
/// use std::time::Duration;
///
/// # async fn example() {
/// let ready = wait_until(Duration::from_secs(1), Duration::from_millis(10), || async {
///     Some(42)
/// })
/// .await;
/// assert_eq!(ready, Ok(42));
/// # }
/// ```
pub async fn wait_until<T, F, Fut>(
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout(timeout));
        }

        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}
