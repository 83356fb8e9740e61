// Environment-derived settings for reaching the ADB server
use super::error::{AdbError, AdbResult};
use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

pub const ANDROID_HOME_VAR: &str = "ANDROID_HOME";
pub const ADB_SERVER_PORT_VAR: &str = "ANDROID_ADB_SERVER_PORT";
pub const ADB_SERVER_SOCKET_VAR: &str = "ADB_SERVER_SOCKET";

pub const DEFAULT_ADB_HOST: &str = "localhost";
pub const DEFAULT_ADB_PORT: u16 = 5037;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub const MAX_PROBE_ATTEMPTS: u32 = 5;
pub const PROBE_RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdbConfig {
    /// Android SDK installation root; `adb` lives under `platform-tools/`.
    pub android_home: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// Upper bound for a single liveness probe against the server.
    pub probe_timeout: Duration,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            android_home: None,
            host: DEFAULT_ADB_HOST.to_string(),
            port: DEFAULT_ADB_PORT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl AdbConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = AdbConfig {
            android_home: var(ANDROID_HOME_VAR).map(PathBuf::from),
            ..AdbConfig::default()
        };

        if let Some(raw) = var(ADB_SERVER_PORT_VAR) {
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!(
                    "Ignoring {ADB_SERVER_PORT_VAR}='{raw}', using port {DEFAULT_ADB_PORT}"
                ),
            }
        }

        if let Some(raw) = var(ADB_SERVER_SOCKET_VAR) {
            match parse_server_socket(&raw) {
                Ok((host, port)) => {
                    config.host = host;
                    config.port = port;
                }
                Err(e) => log::warn!("Ignoring {ADB_SERVER_SOCKET_VAR}: {e}"),
            }
        }

        config
    }

    /// Path of the `adb` executable used for `start-server`.
    pub fn adb_path(&self) -> PathBuf {
        match &self.android_home {
            Some(root) => root.join("platform-tools").join("adb"),
            None => PathBuf::from("adb"),
        }
    }

    pub fn server_address(&self) -> AdbResult<SocketAddrV4> {
        if let Ok(ip) = self.host.parse::<Ipv4Addr>() {
            return Ok(SocketAddrV4::new(ip, self.port));
        }
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddrV4::new(Ipv4Addr::LOCALHOST, self.port));
        }
        let resolved = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| AdbError::AddressResolution {
                host: self.host.clone(),
                source: std::sync::Arc::new(e),
            })?;
        resolved
            .into_iter()
            .find_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(v4),
                SocketAddr::V6(_) => None,
            })
            .ok_or_else(|| AdbError::NoIpv4Address {
                host: self.host.clone(),
            })
    }
}

/// Parses `tcp:<host>:<port>`.
pub fn parse_server_socket(value: &str) -> AdbResult<(String, u16)> {
    let invalid = || AdbError::InvalidServerSocket {
        value: value.to_string(),
    };
    let rest = value.trim().strip_prefix("tcp:").ok_or_else(invalid)?;
    let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

/// Attempt budget for the fallback liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Fixed pause between two consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_PROBE_ATTEMPTS,
            delay: PROBE_RETRY_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> AdbConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AdbConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_with(&[]);
        assert_eq!(config, AdbConfig::default());
        assert_eq!(config.adb_path(), PathBuf::from("adb"));
        assert_eq!(
            config.server_address().unwrap(),
            SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5037)
        );
    }

    #[test]
    fn android_home_selects_platform_tools_adb() {
        let config = config_with(&[(ANDROID_HOME_VAR, "/opt/android-sdk")]);
        assert_eq!(
            config.adb_path(),
            PathBuf::from("/opt/android-sdk/platform-tools/adb")
        );
    }

    #[test]
    fn empty_android_home_is_ignored() {
        let config = config_with(&[(ANDROID_HOME_VAR, "  ")]);
        assert_eq!(config.android_home, None);
        assert_eq!(config.adb_path(), PathBuf::from("adb"));
    }

    #[test]
    fn port_variable_overrides_default() {
        let config = config_with(&[(ADB_SERVER_PORT_VAR, "5038")]);
        assert_eq!(config.port, 5038);
    }

    #[test]
    fn bad_port_variable_falls_back() {
        let config = config_with(&[(ADB_SERVER_PORT_VAR, "not-a-port")]);
        assert_eq!(config.port, DEFAULT_ADB_PORT);
    }

    #[test]
    fn server_socket_overrides_host_and_port() {
        let config = config_with(&[
            (ADB_SERVER_PORT_VAR, "5038"),
            (ADB_SERVER_SOCKET_VAR, "tcp:10.0.2.2:5040"),
        ]);
        assert_eq!(config.host, "10.0.2.2");
        assert_eq!(config.port, 5040);
        assert_eq!(
            config.server_address().unwrap(),
            SocketAddrV4::new(Ipv4Addr::new(10, 0, 2, 2), 5040)
        );
    }

    #[test]
    fn malformed_server_socket_is_ignored() {
        let config = config_with(&[(ADB_SERVER_SOCKET_VAR, "udp:host:1")]);
        assert_eq!(config.host, DEFAULT_ADB_HOST);
        assert_eq!(config.port, DEFAULT_ADB_PORT);
    }

    #[test]
    fn parse_server_socket_rejects_bad_values() {
        assert!(parse_server_socket("tcp:host").is_err());
        assert!(parse_server_socket("tcp::5037").is_err());
        assert!(parse_server_socket("tcp:host:99999").is_err());
        assert_eq!(
            parse_server_socket("tcp:adb-host:5037").unwrap(),
            ("adb-host".to_string(), 5037)
        );
    }

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(200));
    }
}
