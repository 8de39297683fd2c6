use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::course_team::save::DEFAULT_CLOSE_DELAY;
use crate::models::course_team::view::DEFAULT_PAGE_SIZE;

pub const MAX_PAGE_SIZE: usize = 500;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub fixture_path: PathBuf,
    pub page_size: usize,
    pub save_dialog_close: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env loaded: {e}");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let page_size: usize = parse_or(&lookup, "COURSE_TABLE_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let close_ms: u64 = parse_or(&lookup, "SAVE_DIALOG_CLOSE_MS", DEFAULT_CLOSE_DELAY.as_millis() as u64);
        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            session_key: lookup("SESSION_KEY"),
            fixture_path: lookup("COURSE_FIXTURE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/course_fixture.json")),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            save_dialog_close: Duration::from_millis(close_ms),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{key}={raw} is not valid; using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.bind_addr, "127.0.0.1:8080");
        assert_eq!(c.page_size, 100);
        assert_eq!(c.save_dialog_close, Duration::from_millis(1000));
        assert!(c.session_key.is_none());
    }

    #[test]
    fn overrides_and_clamping() {
        let c = config(&[("COURSE_TABLE_PAGE_SIZE", "10000"), ("SAVE_DIALOG_CLOSE_MS", "250")]);
        assert_eq!(c.page_size, MAX_PAGE_SIZE);
        assert_eq!(c.save_dialog_close, Duration::from_millis(250));
    }

    #[test]
    fn bad_values_fall_back() {
        let c = config(&[("COURSE_TABLE_PAGE_SIZE", "lots"), ("SAVE_DIALOG_CLOSE_MS", "-1")]);
        assert_eq!(c.page_size, 100);
        assert_eq!(c.save_dialog_close, Duration::from_millis(1000));
    }
}
