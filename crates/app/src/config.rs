use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub max_page_size: u32,
    pub revalidate_url: Option<String>,
    pub revalidate_secret: Option<String>,
    pub request_timeout: Duration,
    pub cors_allow_origins: Vec<String>,
    /// JSON file of users loaded into the in-memory store.
    pub seed_users: Option<PathBuf>,
    pub stale_paths_capacity: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("THREADLINE_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = read_optional_string("THREADLINE_DATABASE_URL");
        let db_max_connections = read_u32("THREADLINE_DB_MAX_CONNECTIONS", 5)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "THREADLINE_DB_MAX_CONNECTIONS",
                "0".to_string(),
            ));
        }
        let max_page_size = read_u32("THREADLINE_MAX_PAGE_SIZE", 100)?;
        if max_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "THREADLINE_MAX_PAGE_SIZE",
                "0".to_string(),
            ));
        }
        let revalidate_url = read_optional_string("THREADLINE_REVALIDATE_URL");
        if let Some(url) = revalidate_url.as_deref() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "THREADLINE_REVALIDATE_URL",
                    url.to_string(),
                ));
            }
        }
        let revalidate_secret = read_optional_string("THREADLINE_REVALIDATE_SECRET");
        let request_timeout_secs = read_u64("THREADLINE_REQUEST_TIMEOUT_SECS", 15)?;
        let cors_allow_origins =
            split_list(&read_string("THREADLINE_CORS_ALLOW_ORIGINS", ""));
        let seed_users = read_optional_string("THREADLINE_SEED_USERS").map(PathBuf::from);
        let stale_paths_capacity = read_u32("THREADLINE_STALE_PATHS_CAPACITY", 10_000)?;
        if stale_paths_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "THREADLINE_STALE_PATHS_CAPACITY",
                "0".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            max_page_size,
            revalidate_url,
            revalidate_secret,
            request_timeout: Duration::from_secs(request_timeout_secs),
            cors_allow_origins,
            seed_users,
            stale_paths_capacity: usize::try_from(stale_paths_capacity).unwrap_or(usize::MAX),
        })
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            db_max_connections: 1,
            max_page_size: 100,
            revalidate_url: None,
            revalidate_secret: None,
            request_timeout: Duration::from_secs(1),
            cors_allow_origins: Vec::new(),
            seed_users: None,
            stale_paths_capacity: 10_000,
        }
    }
}

/// Loads `KEY=value` lines from `./.env`; variables already set in the
/// environment are left alone.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u32(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = match (value.chars().next(), value.chars().last()) {
        (Some('"'), Some('"')) if value.len() >= 2 => unquote_double(&value[1..value.len() - 1]),
        (Some('\''), Some('\'')) if value.len() >= 2 => value[1..value.len() - 1].to_string(),
        _ => value.to_string(),
    };
    Some((key.to_string(), value))
}

fn unquote_double(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut escaped = false;
    for ch in value.chars() {
        if escaped {
            match ch {
                'n' => output.push('\n'),
                't' => output.push('\t'),
                '"' | '\\' => output.push(ch),
                other => {
                    output.push('\\');
                    output.push(other);
                }
            }
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            output.push(ch);
        }
    }
    if escaped {
        output.push('\\');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{parse_dotenv_line, split_list};

    #[test]
    fn dotenv_plain_and_exported() {
        assert_eq!(
            parse_dotenv_line("THREADLINE_HTTP_ADDR=0.0.0.0:80"),
            Some(("THREADLINE_HTTP_ADDR".to_string(), "0.0.0.0:80".to_string()))
        );
        assert_eq!(
            parse_dotenv_line("export A = b "),
            Some(("A".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn dotenv_quotes() {
        let (_, value) = parse_dotenv_line(r#"SECRET="two\nlines \"quoted\"""#).unwrap();
        assert_eq!(value, "two\nlines \"quoted\"");
        let (_, value) = parse_dotenv_line(r"RAW='a\nb'").unwrap();
        assert_eq!(value, r"a\nb");
    }

    #[test]
    fn dotenv_skips_comments_and_blank_keys() {
        assert!(parse_dotenv_line("# THREADLINE_DATABASE_URL=x").is_none());
        assert!(parse_dotenv_line("  ").is_none());
        assert!(parse_dotenv_line("=value").is_none());
    }

    #[test]
    fn cors_list_drops_empty_items() {
        assert_eq!(
            split_list(" https://a.example, ,https://b.example "),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
