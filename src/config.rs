//! Configuration loading and validation.

use std::path::Path;

use serde::Deserialize;

/// Top-level daemon configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// The upstream IRC server.
    pub upstream: UpstreamConfig,
    /// The local listening endpoint.
    pub listen: ListenConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// Structured JSON output.
    Json,
}

/// Upstream connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Server hostname.
    pub server: String,
    /// Server port.
    #[serde(default = "default_upstream_port")]
    pub port: u16,
    /// Optional server password, sent as PASS before registration.
    #[serde(default)]
    pub password: Option<String>,
    /// Username for the USER command.
    #[serde(default = "default_username")]
    pub username: String,
    /// Realname for the USER command.
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Nickname to register with. When absent a random eight-letter nick is
    /// generated at startup.
    #[serde(default)]
    pub nick: Option<String>,
}

/// Local listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenConfig {
    /// TCP port to accept clients on.
    pub port: u16,
    /// Password each client must supply via PASS before anything else.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_upstream_port() -> u16 {
    6667
}

fn default_username() -> String {
    "muxbnc".to_string()
}

fn default_realname() -> String {
    "muxbnc user".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(Path::new(path))?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Validate a loaded configuration, collecting every problem at once.
pub fn validate(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.upstream.server.is_empty() {
        errors.push("upstream.server must not be empty".to_string());
    }
    if config.upstream.port == 0 {
        errors.push("upstream.port must not be 0".to_string());
    }
    if config.listen.port == 0 {
        errors.push("listen.port must not be 0".to_string());
    }
    if let Some(nick) = &config.upstream.nick {
        if nick.is_empty() || nick.contains(' ') {
            errors.push(format!("upstream.nick {:?} is not a valid nickname", nick));
        }
    }
    if let Some(pass) = &config.listen.password {
        if pass.is_empty() {
            errors.push("listen.password must not be empty when set".to_string());
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: Config = toml::from_str(
            r#"
            [upstream]
            server = "irc.example.net"

            [listen]
            port = 16667
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.port, 6667);
        assert_eq!(config.upstream.username, "muxbnc");
        assert!(config.upstream.nick.is_none());
        assert!(config.listen.password.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            log_format = "json"

            [upstream]
            server = "irc.example.net"
            port = 6697
            password = "serverpass"
            username = "alice"
            realname = "Alice Example"
            nick = "alice"

            [listen]
            port = 16667
            password = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.upstream.password.as_deref(), Some("serverpass"));
        assert_eq!(config.upstream.nick.as_deref(), Some("alice"));
        assert_eq!(config.listen.password.as_deref(), Some("s3cret"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validation_collects_all_errors() {
        let config: Config = toml::from_str(
            r#"
            [upstream]
            server = ""
            port = 0
            nick = "has space"

            [listen]
            port = 0
            "#,
        )
        .unwrap();

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [upstream]
            server = "irc.example.net"
            tls = true

            [listen]
            port = 16667
            "#,
        );
        assert!(result.is_err());
    }
}
