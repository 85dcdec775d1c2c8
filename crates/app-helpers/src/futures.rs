use std::{fmt::Display, future::Future, time::Duration};

use futures::{executor, future};
use tokio::runtime::Handle;
use tracing::debug;
pub use tryhard;
use tryhard::RetryPolicy;

/// Block the current thread on `fut`, inside the ambient tokio runtime if there is one.
pub fn run_async<T>(fut: impl Future<Output = T>) -> T {
    match Handle::try_current() {
        Ok(handle) => {
            let _guard = handle.enter();
            executor::block_on(fut)
        }
        Err(_) => executor::block_on(fut),
    }
}

/// Retry `f` up to `max_attempts` times in total, back to back.
///
/// Errors for which `is_retryable` is false are returned right away.
/// A `max_attempts` of `0` is treated as `1`.
pub fn retry_fn<F, Fut, T, E, R>(
    max_attempts: u32,
    is_retryable: R,
    f: F,
) -> impl Future<Output = Result<T, E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display + 'static,
{
    tryhard::retry_fn(f)
        .retries(max_attempts.max(1) - 1)
        .custom_backoff(move |attempt: u32, e: &E| {
            if is_retryable(e) {
                debug!(attempt, error = %e, "Attempt failed, retrying");
                RetryPolicy::Delay(Duration::ZERO)
            } else {
                RetryPolicy::Break
            }
        })
}

/// Blocking form of [`retry_fn`]. `f` gets the 1-based attempt number.
pub fn retry_blocking<T, E, F, R>(max_attempts: u32, is_retryable: R, mut f: F) -> Result<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    R: Fn(&E) -> bool,
    E: Display + 'static,
{
    let mut attempt = 0;

    run_async(retry_fn(max_attempts, is_retryable, move || {
        attempt += 1;
        future::ready(f(attempt))
    }))
}
