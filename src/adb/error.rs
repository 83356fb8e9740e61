use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A specialized `Result` type for ADB bootstrap operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB bootstrap operations.
///
/// Cloneable because a cached bootstrap outcome is handed to every caller
/// that shares it; foreign sources are held behind `Arc` or flattened to text.
#[derive(Debug, Clone, Error)]
pub enum AdbError {
    #[error(
        "'{}' not found. Install Android Platform Tools (https://developer.android.com/tools/adb), add 'adb' to PATH or set ANDROID_HOME.",
        .path.display()
    )]
    AdbNotFound { path: PathBuf },

    #[error("Failed to spawn '{command}': {source}")]
    StartServerSpawn {
        command: String,
        source: Arc<std::io::Error>,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    StartServerExit {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("ADB server request '{operation}' failed: {description}")]
    ServerRequest {
        operation: &'static str,
        description: String,
    },

    #[error("ADB server did not respond after {attempts} attempts: {last}")]
    ProbeExhausted {
        attempts: u32,
        #[source]
        last: Box<AdbError>,
    },

    #[error("Invalid ADB_SERVER_SOCKET value '{value}', expected tcp:<host>:<port>")]
    InvalidServerSocket { value: String },

    #[error("Could not resolve ADB server host '{host}': {source}")]
    AddressResolution {
        host: String,
        source: Arc<std::io::Error>,
    },

    #[error("ADB server host '{host}' has no IPv4 address")]
    NoIpv4Address { host: String },

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: std::time::Duration,
        description: String,
    },

    #[error("Task failed to complete: {source}")]
    JoinError { source: Arc<tokio::task::JoinError> },

    #[error("ADB server handle lock poisoned")]
    LockPoisoned,

    #[error("Invalid watch expression '{expression}': {source}")]
    InvalidExpression {
        expression: String,
        source: regex::Error,
    },

    #[error("{feature} is not supported in this build")]
    NotSupported { feature: &'static str },
}

impl AdbError {
    /// Wraps an `adb_client` failure for the named server request.
    pub fn server(operation: &'static str, source: adb_client::RustADBError) -> Self {
        AdbError::ServerRequest {
            operation,
            description: source.to_string(),
        }
    }

    /// Maps a spawn failure of `command`, singling out a missing executable.
    pub fn from_spawn(command: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            AdbError::AdbNotFound {
                path: command.to_path_buf(),
            }
        } else {
            AdbError::StartServerSpawn {
                command: command.display().to_string(),
                source: Arc::new(source),
            }
        }
    }

    /// Whether the error came out of the bounded fallback probe loop.
    pub fn is_probe_exhausted(&self) -> bool {
        matches!(self, AdbError::ProbeExhausted { .. })
    }
}

impl From<tokio::task::JoinError> for AdbError {
    fn from(source: tokio::task::JoinError) -> Self {
        AdbError::JoinError {
            source: Arc::new(source),
        }
    }
}
