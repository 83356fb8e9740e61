// Deadline wrapper for async ADB operations
use crate::adb::{AdbError, AdbResult};
use std::future::Future;
use std::time::Duration;

/// Resolves with the output of `future`, or fails with `AdbError::Timeout`
/// carrying `description` if `duration` elapses first.
pub async fn with_timeout<F>(
    duration: Duration,
    future: F,
    description: impl Into<String>,
) -> AdbResult<F::Output>
where
    F: Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| AdbError::Timeout {
            duration,
            description: description.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn times_out_when_future_is_slower() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            "Executed"
        };
        let result = with_timeout(Duration::from_millis(200), slow, "Timed out").await;
        match result {
            Err(AdbError::Timeout {
                duration,
                description,
            }) => {
                assert_eq!(duration, Duration::from_millis(200));
                assert_eq!(description, "Timed out");
            }
            other => panic!("Expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_when_future_is_faster() {
        let fast = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            "Executed"
        };
        let result = with_timeout(Duration::from_millis(200), fast, "Timed out").await;
        assert_eq!(result.unwrap(), "Executed");
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let failing = async { Err::<(), _>(AdbError::LockPoisoned) };
        let result = with_timeout(Duration::from_millis(200), failing, "Timed out").await;
        assert!(matches!(result, Ok(Err(AdbError::LockPoisoned))));
    }
}
