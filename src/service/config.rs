use std::{env, sync::Arc};

use crate::config::{Config, LogFormat, DEFAULT_CORS_ALLOWED_ORIGIN, DEFAULT_PORT};

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        let quoted = ['"', '\''].iter().any(|quote| {
            value.len() >= 2 && value.starts_with(*quote) && value.ends_with(*quote)
        });
        if quoted {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

    fn normalize(value: &str) -> Option<String> {
        let normalized = Self::strip_wrapping_quotes(value.trim()).trim();
        if normalized.is_empty() {
            None
        } else {
            Some(normalized.to_string())
        }
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| Self::normalize(&value))
    }

    fn env_u16(key: &str) -> Option<u16> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u16>().ok())
    }

    fn parse_log_format(value: &str) -> LogFormat {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }

    pub fn new() -> Self {
        let port = Self::env_u16("PORT").unwrap_or(DEFAULT_PORT);
        let database_url = Self::env_nonempty("DATABASE_URL");
        let cors_allowed_origin = Self::env_nonempty("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string());
        let log_format = Self::env_nonempty("LOG_FORMAT")
            .map(|value| Self::parse_log_format(&value))
            .unwrap_or_default();

        Self::from_config(Config {
            port,
            database_url,
            cors_allowed_origin,
            log_format,
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for ConfigServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}
