//! Wait-for-db command - Polls the database until it answers.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::cli::args::WaitForDbArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the wait-for-db command
pub async fn execute(args: WaitForDbArgs, config: Config) -> AppResult<()> {
    println!("Waiting for database...");
    let interval = Duration::from_secs(args.interval_secs.max(1));

    let config = &config;
    let probe = || async move {
        let db = Database::connect_without_migrations(config).await?;
        db.ping().await
    };

    wait_until_ready(probe, interval, args.max_attempts).await?;
    println!("Database available!");
    Ok(())
}

/// Call `probe` until it succeeds, sleeping `interval` between failures.
///
/// `max_attempts == 0` retries forever. Returns the number of checks made.
pub async fn wait_until_ready<F, Fut, E>(
    mut probe: F,
    interval: Duration,
    max_attempts: u32,
) -> AppResult<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match probe().await {
            Ok(()) => return Ok(attempt),
            Err(e) if max_attempts != 0 && attempt >= max_attempts => {
                return Err(AppError::internal(format!(
                    "Database unavailable after {} attempts: {}",
                    attempt, e
                )));
            }
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Database not ready");
                println!("Database unavailable, waiting {}s...", interval.as_secs());
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{ready, Ready};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Probe that fails `failures` times, then answers.
    fn flaky(
        calls: &AtomicU32,
        failures: u32,
    ) -> impl FnMut() -> Ready<Result<(), &'static str>> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            ready(if n <= failures {
                Err("connection refused")
            } else {
                Ok(())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_database_is_checked_once() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let attempts = wait_until_ready(flaky(&calls, 0), Duration::from_secs(1), 0)
            .await
            .unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_database_answers() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let attempts = wait_until_ready(flaky(&calls, 5), Duration::from_secs(1), 0)
            .await
            .unwrap();

        assert_eq!(attempts, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result = wait_until_ready(flaky(&calls, u32::MAX), Duration::from_secs(2), 3).await;

        assert!(matches!(
            result,
            Err(AppError::Internal(msg)) if msg.contains("after 3 attempts")
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
