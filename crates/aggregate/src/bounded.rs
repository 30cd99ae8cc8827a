use std::future::Future;
use std::time::Duration;

use crate::error::{Result, UsageError};

/// Runs one external call under `limit`. Running out of time fails the call
/// like any other backend error.
pub(crate) async fn bounded<T, E, F>(limit: Duration, call: &str, future: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    UsageError: From<E>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(UsageError::from),
        Err(_) => Err(UsageError::Timeout {
            call: call.to_string(),
            after: limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, UsageError>(1u64)
        };
        let err = bounded(Duration::from_secs(5), "slow call", slow)
            .await
            .expect_err("timeout");
        match err {
            UsageError::Timeout { call, after } => {
                assert_eq!(call, "slow call");
                assert_eq!(after, Duration::from_secs(5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let value = bounded(Duration::from_secs(5), "fast call", async {
            Ok::<_, UsageError>(7u64)
        })
        .await
        .expect("value");
        assert_eq!(value, 7);
    }
}
