//! Configuration types and loading
//!
//! Config file selected by `--config` flag or `CONFIG_PATH` env var. Client
//! secrets are never stored in the TOML: each provider resolves its secret
//! from an env var or a `client_secret_file`, env taking precedence.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use stream_auth::Secret;
use stream_auth::constants::DEFAULT_LOCAL_PORT;

use crate::error::{Error, Result};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listener: ListenerConfig,
    pub twitch: ProviderConfig,
    pub streamlabs: ProviderConfig,
}

/// Loopback listener settings. The port is the only knob the capture core
/// consumes; it must match the redirect URIs registered with the providers.
#[derive(Debug, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_LOCAL_PORT
}

/// Per-provider OAuth client settings
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to the env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Secret resolution order per provider:
    /// 1. `TWITCH_CLIENT_SECRET` / `STREAMLABS_CLIENT_SECRET` env var
    /// 2. `client_secret_file` path from config
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.listener.port == 0 {
            return Err(Error::Config("listener.port must be greater than 0".into()));
        }
        if config.twitch.client_id.is_empty() {
            return Err(Error::Config("twitch.client_id must not be empty".into()));
        }
        if config.streamlabs.client_id.is_empty() {
            return Err(Error::Config(
                "streamlabs.client_id must not be empty".into(),
            ));
        }

        config.twitch.client_secret = resolve_secret(
            "TWITCH_CLIENT_SECRET",
            config.twitch.client_secret_file.as_deref(),
        )?;
        config.streamlabs.client_secret = resolve_secret(
            "STREAMLABS_CLIENT_SECRET",
            config.streamlabs.client_secret_file.as_deref(),
        )?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("stream-oauth.toml")
    }
}

/// Resolve a client secret: env var takes precedence over the secret file.
fn resolve_secret(env_var: &str, file: Option<&Path>) -> Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(Some(Secret::new(value)));
    }
    if let Some(file) = file {
        let value = std::fs::read_to_string(file).map_err(|e| {
            Error::Config(format!(
                "failed to read client secret file {}: {e}",
                file.display()
            ))
        })?;
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn clear_secret_env() {
        unsafe {
            remove_env("TWITCH_CLIENT_SECRET");
            remove_env("STREAMLABS_CLIENT_SECRET");
        }
    }

    fn valid_toml() -> &'static str {
        r#"
[twitch]
client_id = "twitch-client-123"

[streamlabs]
client_id = "streamlabs-client-456"
"#
    }

    #[test]
    fn load_valid_config_applies_port_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-valid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        unsafe { clear_secret_env() };

        let config = Config::load(&path).unwrap();
        assert_eq!(config.listener.port, 7090);
        assert_eq!(config.twitch.client_id, "twitch-client-123");
        assert_eq!(config.streamlabs.client_id, "streamlabs-client-456");
        assert!(config.twitch.client_secret.is_none());
        assert!(config.streamlabs.client_secret.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_custom_port() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[listener]
port = 9099

[twitch]
client_id = "a"

[streamlabs]
client_id = "b"
"#;
        let dir = std::env::temp_dir().join("redirect-capture-test-port");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_content).unwrap();
        unsafe { clear_secret_env() };

        let config = Config::load(&path).unwrap();
        assert_eq!(config.listener.port, 9099);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zero_port_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[listener]
port = 0

[twitch]
client_id = "a"

[streamlabs]
client_id = "b"
"#;
        let dir = std::env::temp_dir().join("redirect-capture-test-zero-port");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_err(), "listener.port = 0 must be rejected");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_client_id_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[twitch]
client_id = ""

[streamlabs]
client_id = "b"
"#;
        let dir = std::env::temp_dir().join("redirect-capture-test-empty-id");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_err(), "empty client_id must be rejected");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_errors() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_errors() {
        let dir = std::env::temp_dir().join("redirect-capture-test-invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "not valid {{{{ toml").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn secret_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-env");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        unsafe {
            clear_secret_env();
            set_env("TWITCH_CLIENT_SECRET", "twitch-secret-env");
        }
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.twitch.client_secret.as_ref().unwrap().expose(),
            "twitch-secret-env"
        );
        assert!(config.streamlabs.client_secret.is_none());
        unsafe { clear_secret_env() };

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn secret_from_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-secretfile");
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("twitch_secret");
        std::fs::write(&secret_path, "twitch-secret-file\n").unwrap();

        let toml_content = format!(
            r#"
[twitch]
client_id = "a"
client_secret_file = "{}"

[streamlabs]
client_id = "b"
"#,
            secret_path.display()
        );
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, &toml_content).unwrap();

        unsafe { clear_secret_env() };
        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.twitch.client_secret.as_ref().unwrap().expose(),
            "twitch-secret-file"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn env_overrides_secret_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-override");
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("twitch_secret");
        std::fs::write(&secret_path, "file-value").unwrap();

        let toml_content = format!(
            r#"
[twitch]
client_id = "a"
client_secret_file = "{}"

[streamlabs]
client_id = "b"
"#,
            secret_path.display()
        );
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, &toml_content).unwrap();

        unsafe {
            clear_secret_env();
            set_env("TWITCH_CLIENT_SECRET", "env-value");
        }
        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.twitch.client_secret.as_ref().unwrap().expose(),
            "env-value"
        );
        unsafe { clear_secret_env() };

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn whitespace_only_secret_file_yields_none() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-empty-secret");
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("twitch_secret");
        std::fs::write(&secret_path, "  \n  ").unwrap();

        let toml_content = format!(
            r#"
[twitch]
client_id = "a"
client_secret_file = "{}"

[streamlabs]
client_id = "b"
"#,
            secret_path.display()
        );
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, &toml_content).unwrap();

        unsafe { clear_secret_env() };
        let config = Config::load(&config_path).unwrap();
        assert!(
            config.twitch.client_secret.is_none(),
            "whitespace-only secret file should result in no secret"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn nonexistent_secret_file_errors() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("redirect-capture-test-missing-secret");
        std::fs::create_dir_all(&dir).unwrap();

        let toml_content = r#"
[twitch]
client_id = "a"
client_secret_file = "/nonexistent/path/secret"

[streamlabs]
client_id = "b"
"#;
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, toml_content).unwrap();

        unsafe { clear_secret_env() };
        let result = Config::load(&config_path);
        assert!(
            result.is_err(),
            "nonexistent client_secret_file must return an error"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("stream-oauth.toml"));
    }

    #[test]
    fn resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
