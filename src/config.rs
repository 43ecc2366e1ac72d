use dotenvy::dotenv;
use std::env;

/// Hard ceiling on message body length; MESSAGE_MAX_CHARS may lower it but
/// not raise it past what the column comfortably holds.
const DEFAULT_MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Cross-instance fanout transport. Absent means broadcasting stays
    /// in-process only, which is a supported configuration.
    pub redis_url: Option<String>,
    pub port: u16,
    pub max_message_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let max_message_chars = Self::parse_max_message_chars(env::var("MESSAGE_MAX_CHARS").ok());

        Ok(Self {
            database_url,
            redis_url,
            port,
            max_message_chars,
        })
    }

    fn parse_max_message_chars(value: Option<String>) -> usize {
        value
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0 && *n <= DEFAULT_MAX_MESSAGE_CHARS)
            .unwrap_or(DEFAULT_MAX_MESSAGE_CHARS)
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            redis_url: None,
            port: 3000,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_message_chars_defaults_when_unset() {
        assert_eq!(
            Config::parse_max_message_chars(None),
            DEFAULT_MAX_MESSAGE_CHARS
        );
    }

    #[test]
    fn max_message_chars_accepts_lower_values() {
        assert_eq!(
            Config::parse_max_message_chars(Some("500".to_string())),
            500
        );
    }

    #[test]
    fn max_message_chars_rejects_garbage_and_oversize() {
        assert_eq!(
            Config::parse_max_message_chars(Some("not-a-number".to_string())),
            DEFAULT_MAX_MESSAGE_CHARS
        );
        assert_eq!(
            Config::parse_max_message_chars(Some("0".to_string())),
            DEFAULT_MAX_MESSAGE_CHARS
        );
        assert_eq!(
            Config::parse_max_message_chars(Some("999999".to_string())),
            DEFAULT_MAX_MESSAGE_CHARS
        );
    }
}
