use crate::error::{ChatError, Result};
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat server configuration
    pub server: ServerConfig,
    /// Per-connection chat configuration
    pub chat: ChatConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port for the chat server (default: 8080)
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Inbound message buffer per connection; 0 makes every frame a rendezvous
    pub buffer: usize,
    /// Message the bot says when a client connects
    pub greeting: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: get_env_or("SERVER_HOST", "0.0.0.0"),
                port: get_env_or("SERVER_PORT", "8080").parse().map_err(|_| {
                    ChatError::InvalidConfig("SERVER_PORT must be a valid port number".into())
                })?,
            },
            chat: ChatConfig {
                buffer: get_env_or("CHAT_BUFFER", "0").parse().map_err(|_| {
                    ChatError::InvalidConfig("CHAT_BUFFER must be a non-negative number".into())
                })?,
                greeting: get_env_or("CHAT_GREETING", "Online"),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: parse_log_format()?,
            },
        })
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

fn parse_log_format() -> Result<String> {
    let format = get_env_or("LOG_FORMAT", "pretty").to_lowercase();
    match format.as_str() {
        "json" | "pretty" => Ok(format),
        other => Err(ChatError::InvalidConfig(format!(
            "LOG_FORMAT must be json or pretty, got: {}",
            other
        ))),
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const CONFIG_ENV_KEYS: &[&str] = &[
        "SERVER_HOST",
        "SERVER_PORT",
        "CHAT_BUFFER",
        "CHAT_GREETING",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let saved = keys
                .iter()
                .map(|&key| {
                    let old = env::var(key).ok();
                    env::remove_var(key);
                    (key.to_string(), old)
                })
                .collect();

            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        let config = Config::from_env().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chat.buffer, 0);
        assert_eq!(config.chat.greeting, "Online");
        assert_eq!(config.log.level, "info");
        assert!(!config.log.is_json());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_config_from_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("SERVER_HOST", "127.0.0.1");
        env::set_var("SERVER_PORT", "9000");
        env::set_var("CHAT_BUFFER", "16");
        env::set_var("CHAT_GREETING", "Hello!");
        env::set_var("LOG_FORMAT", "JSON");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:9000");
        assert_eq!(config.chat.buffer, 16);
        assert_eq!(config.chat.greeting, "Hello!");
        assert!(config.log.is_json());
    }

    #[test]
    fn test_config_from_env_invalid_port() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("SERVER_PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_negative_buffer() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("CHAT_BUFFER", "-1");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_unknown_log_format() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("LOG_FORMAT", "xml");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }
}
