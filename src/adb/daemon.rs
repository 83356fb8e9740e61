// Starts the ADB server through the `adb` executable
use super::error::{AdbError, AdbResult};
use std::path::Path;
use tokio::process::Command;

/// Runs `<adb> start-server` and waits for it to exit.
///
/// The server forks itself into the background, so a zero exit status means
/// it is accepting connections.
pub async fn start_server(adb: &Path) -> AdbResult<()> {
    log::debug!("Starting ADB server with '{} start-server'", adb.display());
    let output = Command::new(adb)
        .arg("start-server")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| AdbError::from_spawn(adb, e))?;

    if !output.status.success() {
        return Err(AdbError::StartServerExit {
            command: format!("{} start-server", adb.display()),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    log::debug!("ADB server started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_is_reported_as_not_found() {
        let path = Path::new("/nonexistent/platform-tools/adb");
        match start_server(path).await {
            Err(AdbError::AdbNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("Expected AdbNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        match start_server(Path::new("false")).await {
            Err(AdbError::StartServerExit { command, .. }) => {
                assert_eq!(command, "false start-server");
            }
            other => panic!("Expected StartServerExit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        assert!(start_server(Path::new("true")).await.is_ok());
    }
}
