//! Console connection configuration

use std::path::Path;
use std::time::Duration;

use console_protocol::{DEFAULT_CONSOLE_ADDR, DEFAULT_MAX_FRAME_LEN};
use crypto_session::SharedKey;
use serde::{Deserialize, Serialize};

use crate::{ConsoleError, ConsoleResult};

/// Where and how to reach a console
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console address, `host:port`
    pub target: String,
    /// Base64 of the 32-byte key given to dnsdist's `setKey()`
    pub secret: String,
    /// Give up connecting after this many milliseconds
    pub connect_timeout_ms: Option<u64>,
    /// Give up on a single command round trip after this many milliseconds
    pub command_timeout_ms: Option<u64>,
    /// Largest response frame accepted
    pub max_frame_len: usize,
}

impl ConsoleConfig {
    pub fn new(target: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Configuration(format!("reading {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ConsoleError::Configuration(format!("parsing {}: {}", path.display(), e))
        })
    }

    /// Check every field and decode the shared key
    pub fn validate(&self) -> ConsoleResult<SharedKey> {
        net_transport::parse_target(&self.target)?;

        if self.max_frame_len == 0 {
            return Err(ConsoleError::Configuration(
                "max_frame_len must be greater than zero".to_string(),
            ));
        }

        if self.secret.trim().is_empty() {
            return Err(ConsoleError::Configuration(
                "no shared secret configured".to_string(),
            ));
        }

        Ok(SharedKey::from_base64(&self.secret)?)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }

    /// Per-session settings that outlive the handshake
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_frame_len: self.max_frame_len,
            command_timeout: self.command_timeout(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_CONSOLE_ADDR.to_string(),
            secret: String::new(),
            connect_timeout_ms: None,
            command_timeout_ms: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl std::fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("target", &self.target)
            .field("secret", &"<redacted>")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("command_timeout_ms", &self.command_timeout_ms)
            .field("max_frame_len", &self.max_frame_len)
            .finish()
    }
}

/// Settings applied to every command of an established session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub max_frame_len: usize,
    pub command_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            command_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "FUih6Cj9mNbrHWavhyhUrUhsuWK0pXSXc/d10WeV3h4=";

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.target, "127.0.0.1:5199");
        assert_eq!(config.max_frame_len, DEFAULT_MAX_FRAME_LEN);
        assert!(config.connect_timeout().is_none());
        assert_eq!(config.session_options(), SessionOptions::default());
    }

    #[test]
    fn test_validate_decodes_key() {
        let config = ConsoleConfig::new("127.0.0.1:5199", SECRET);
        let key = config.validate().unwrap();
        assert_eq!(key.to_base64(), SECRET);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let missing_secret = ConsoleConfig::new("127.0.0.1:5199", "");
        assert!(matches!(
            missing_secret.validate(),
            Err(ConsoleError::Configuration(_))
        ));

        let short_secret = ConsoleConfig::new("127.0.0.1:5199", "c2hvcnQ=");
        assert!(matches!(
            short_secret.validate(),
            Err(ConsoleError::Configuration(_))
        ));

        let no_port = ConsoleConfig::new("localhost", SECRET);
        assert!(matches!(
            no_port.validate(),
            Err(ConsoleError::Configuration(_))
        ));

        let zero_frames = ConsoleConfig {
            max_frame_len: 0,
            ..ConsoleConfig::new("127.0.0.1:5199", SECRET)
        };
        assert!(matches!(
            zero_frames.validate(),
            Err(ConsoleError::Configuration(_))
        ));
    }

    #[test]
    fn test_json_partial_fields() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"secret": "abc", "command_timeout_ms": 2500}"#).unwrap();

        assert_eq!(config.target, DEFAULT_CONSOLE_ADDR);
        assert_eq!(config.secret, "abc");
        assert_eq!(config.command_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_json_file_errors_are_configuration() {
        let missing = std::env::temp_dir().join("dnsdist-console-no-such-config.json");
        assert!(matches!(
            ConsoleConfig::from_json_file(&missing),
            Err(ConsoleError::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", ConsoleConfig::new("127.0.0.1:5199", SECRET));
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
