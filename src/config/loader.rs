//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override file values.
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";
pub const ENV_CONFIG_FILE: &str = "RELAY_CONFIG_FILE";
pub const ENV_RELOAD_COMMAND: &str = "RELAY_RELOAD_COMMAND";
pub const ENV_LOG_LEVEL: &str = "RELAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load, apply environment overrides, and validate.
///
/// Without a path the built-in defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], with `customize` applied after the environment
/// overrides and before validation (command-line flags go here).
pub fn load_config_with<F>(path: Option<&Path>, customize: F) -> Result<ServiceConfig, ConfigError>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());
    customize(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides from `lookup` (normally the process environment).
///
/// Empty values are ignored so an exported-but-blank variable cannot wipe a setting.
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = v;
    }
    if let Some(v) = get(ENV_CONFIG_FILE) {
        config.relay.config_file = v;
    }
    if let Some(v) = get(ENV_RELOAD_COMMAND) {
        config.relay.reload_command = v;
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, ReloadFailurePolicy};
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:4100"

            [relay]
            config_file = "/etc/srs/relay.conf"
            reload_command = "killall -1 srs"
            reload_timeout_secs = 5
            on_reload_failure = "fail"

            [observability]
            log_format = "json"

            [preview]
            twitch_parent = "dashboard.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:4100");
        assert_eq!(config.relay.config_file, "/etc/srs/relay.conf");
        assert_eq!(config.relay.reload_command, "killall -1 srs");
        assert_eq!(config.relay.shell, "/bin/sh");
        assert_eq!(config.relay.on_reload_failure, ReloadFailurePolicy::Fail);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.preview.twitch_parent, "dashboard.example.com");
        assert!(config.security.strict_validation);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000");
        assert_eq!(config.relay.reload_command, "systemctl reload srs");
        assert_eq!(config.relay.on_reload_failure, ReloadFailurePolicy::Log);
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = parse_config("[relay]\non_reload_failure = \"retry\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CONFIG_FILE, "/tmp/relay.conf"),
            (ENV_RELOAD_COMMAND, "srs -s reload"),
            (ENV_BIND_ADDRESS, "   "),
        ]);

        let mut config = ServiceConfig::default();
        apply_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.relay.config_file, "/tmp/relay.conf");
        assert_eq!(config.relay.reload_command, "srs -s reload");
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000", "blank override ignored");
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay-sync.toml");
        fs::write(&path, "[listener]\nbind_address = \"nowhere\"\n").unwrap();

        match load_config(Some(&path)) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "listener.bind_address"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cli_override_is_validated() {
        let err = load_config_with(None, |config| {
            config.listener.bind_address = "not-an-address".into();
        })
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "listener.bind_address"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay-sync.toml");
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:4100\"\n").unwrap();

        let config = load_config_with(Some(&path), |config| {
            config.listener.bind_address = "127.0.0.1:4200".into();
        })
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4200");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_config(Path::new("/nonexistent/relay-sync.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
