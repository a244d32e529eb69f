//! Process configuration, read once at startup and passed down as an explicit value.
//!
//! Sources: an optional config file (`--config` / `CONFIG_PATH`), then `.env` in the
//! working directory, then the process environment. A `.yaml`/`.yml` file uses the
//! nested layout below; any other file is read as dotenv. Variables set in the
//! environment win over either file.
//!
//! ```yaml
//! env: "dev"
//! storage_path: "storage/storage.db"
//! http_server:
//!   address: "localhost:8082"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV: &str = "ENV";
pub const STORAGE_PATH: &str = "STORAGE_PATH";
pub const HTTP_ADDRESS: &str = "HTTP_ADDRESS";
pub const SHUTDOWN_GRACE_SECS: &str = "SHUTDOWN_GRACE_SECS";
pub const STORAGE_TIMEOUT_SECS: &str = "STORAGE_TIMEOUT_SECS";
pub const MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";

const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deployment name, e.g. `dev` or `production`. Logged at startup.
    pub env: String,
    pub storage_path: PathBuf,
    pub http_address: SocketAddr,
    /// How long in-flight requests may run after shutdown is requested.
    pub shutdown_grace: Duration,
    /// Bounds pool acquisition and SQLite busy waits.
    pub storage_timeout: Duration,
    pub max_body_bytes: usize,
}

/// Shape of a YAML config file. Every key is optional here; required ones are
/// checked after environment overrides are applied.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub env: Option<String>,
    pub storage_path: Option<String>,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    pub shutdown_grace_secs: Option<u64>,
    pub storage_timeout_secs: Option<u64>,
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpServerConfig {
    pub address: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::Load(format!("invalid YAML config: {}", e)))
    }

    /// Settings keyed by their environment variable names.
    fn into_values(self) -> HashMap<&'static str, String> {
        let mut values = HashMap::new();
        let mut put = |key: &'static str, value: Option<String>| {
            if let Some(v) = value {
                values.insert(key, v);
            }
        };
        put(ENV, self.env);
        put(STORAGE_PATH, self.storage_path);
        put(HTTP_ADDRESS, self.http_server.address);
        put(SHUTDOWN_GRACE_SECS, self.shutdown_grace_secs.map(|v| v.to_string()));
        put(STORAGE_TIMEOUT_SECS, self.storage_timeout_secs.map(|v| v.to_string()));
        put(MAX_BODY_BYTES, self.max_body_bytes.map(|v| v.to_string()));
        values
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

impl Config {
    /// Read the config file (if any) and `.env`, then resolve settings with the
    /// process environment taking precedence.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut file = FileConfig::default();
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::Load(format!("config file does not exist: {}", path.display())));
            }
            if is_yaml(path) {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Load(format!("cannot read config file {}: {}", path.display(), e)))?;
                file = FileConfig::from_yaml(&raw)?;
            } else {
                dotenvy::from_path(path)
                    .map_err(|e| ConfigError::Load(format!("cannot read config file {}: {}", path.display(), e)))?;
            }
        }
        dotenvy::dotenv().ok();
        Self::from_file(file, |key| std::env::var(key).ok())
    }

    /// Resolve `file` settings with `overrides` (normally the process environment) on top.
    pub fn from_file<F>(file: FileConfig, overrides: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = file.into_values();
        Self::from_lookup(|key| overrides(key).or_else(|| values.get(key).cloned()))
    }

    /// Build from any key lookup; `load` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let env = required(ENV)?;
        let storage_path = PathBuf::from(required(STORAGE_PATH)?);
        let http_address = resolve_address(&required(HTTP_ADDRESS)?)?;

        let shutdown_grace = Duration::from_secs(parse_or(&get, SHUTDOWN_GRACE_SECS, DEFAULT_SHUTDOWN_GRACE_SECS)?);
        let storage_timeout = Duration::from_secs(parse_or(&get, STORAGE_TIMEOUT_SECS, DEFAULT_STORAGE_TIMEOUT_SECS)?);
        let max_body_bytes = parse_or(&get, MAX_BODY_BYTES, DEFAULT_MAX_BODY_BYTES)?;

        Ok(Config {
            env,
            storage_path,
            http_address,
            shutdown_grace,
            storage_timeout,
            max_body_bytes,
        })
    }
}

/// Accepts `ip:port` or `host:port`; a host name resolves to its first address.
fn resolve_address(raw: &str) -> Result<SocketAddr, ConfigError> {
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return Ok(addr);
    }
    raw.to_socket_addrs()
        .map_err(|e| ConfigError::Invalid { key: HTTP_ADDRESS, reason: e.to_string() })?
        .next()
        .ok_or_else(|| ConfigError::Invalid { key: HTTP_ADDRESS, reason: format!("{} resolved to no address", raw) })
}

fn parse_or<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid { key, reason: e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn required_settings_and_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            (ENV, "dev"),
            (STORAGE_PATH, "storage/students.db"),
            (HTTP_ADDRESS, "127.0.0.1:8082"),
        ]))
        .unwrap();
        assert_eq!(cfg.env, "dev");
        assert_eq!(cfg.storage_path, PathBuf::from("storage/students.db"));
        assert_eq!(cfg.http_address.port(), 8082);
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(5));
        assert_eq!(cfg.storage_timeout, Duration::from_secs(5));
        assert_eq!(cfg.max_body_bytes, 64 * 1024);
    }

    #[test]
    fn missing_env_is_an_error() {
        let err = Config::from_lookup(lookup(&[(STORAGE_PATH, "x.db"), (HTTP_ADDRESS, "127.0.0.1:1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV)));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[(ENV, "dev"), (STORAGE_PATH, "  "), (HTTP_ADDRESS, "127.0.0.1:1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(STORAGE_PATH)));
    }

    #[test]
    fn bad_values_are_reported_by_key() {
        let err = Config::from_lookup(lookup(&[(ENV, "dev"), (STORAGE_PATH, "x.db"), (HTTP_ADDRESS, "localhost")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: HTTP_ADDRESS, .. }));

        let err = Config::from_lookup(lookup(&[
            (ENV, "dev"),
            (STORAGE_PATH, "x.db"),
            (HTTP_ADDRESS, "127.0.0.1:1"),
            (SHUTDOWN_GRACE_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: SHUTDOWN_GRACE_SECS, .. }));
    }

    #[test]
    fn overrides() {
        let cfg = Config::from_lookup(lookup(&[
            (ENV, "production"),
            (STORAGE_PATH, "/var/lib/students.db"),
            (HTTP_ADDRESS, "0.0.0.0:80"),
            (SHUTDOWN_GRACE_SECS, "30"),
            (STORAGE_TIMEOUT_SECS, "2"),
            (MAX_BODY_BYTES, "1024"),
        ]))
        .unwrap();
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(30));
        assert_eq!(cfg.storage_timeout, Duration::from_secs(2));
        assert_eq!(cfg.max_body_bytes, 1024);
    }

    const LOCAL_YAML: &str = "env: \"dev\"\nstorage_path: \"storage/storage.db\"\nhttp_server:\n  address: \"localhost:8082\"\n";

    #[test]
    fn yaml_layout_with_host_name_address() {
        let cfg = Config::from_file(FileConfig::from_yaml(LOCAL_YAML).unwrap(), lookup(&[])).unwrap();
        assert_eq!(cfg.env, "dev");
        assert_eq!(cfg.storage_path, PathBuf::from("storage/storage.db"));
        assert_eq!(cfg.http_address.port(), 8082);
        assert!(cfg.http_address.ip().is_loopback());
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn environment_overrides_yaml() {
        let file = FileConfig::from_yaml(LOCAL_YAML).unwrap();
        let cfg = Config::from_file(file, lookup(&[(ENV, "production"), (HTTP_ADDRESS, "0.0.0.0:9000")])).unwrap();
        assert_eq!(cfg.env, "production");
        assert_eq!(cfg.http_address, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.storage_path, PathBuf::from("storage/storage.db"));
    }

    #[test]
    fn yaml_missing_required_key() {
        let file = FileConfig::from_yaml("env: dev\nhttp_server:\n  address: 127.0.0.1:1\n").unwrap();
        let err = Config::from_file(file, lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(STORAGE_PATH)));
    }

    #[test]
    fn malformed_yaml_is_a_load_error() {
        let err = FileConfig::from_yaml("env: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn loads_yaml_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.yaml");
        std::fs::write(&path, LOCAL_YAML).unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert!(!cfg.env.is_empty());
        assert!(!cfg.storage_path.as_os_str().is_empty());
    }

    #[test]
    fn missing_config_file_fails_to_load() {
        let err = Config::load(Some(Path::new("/definitely/not/here.env"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
