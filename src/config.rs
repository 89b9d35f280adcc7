use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://libgen.is";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://library.lol";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        base_url: get_env_or_default("LIBGEN_BASE_URL", DEFAULT_BASE_URL),
        download_base_url: get_env_or_default(
            "LIBGEN_DOWNLOAD_BASE_URL",
            DEFAULT_DOWNLOAD_BASE_URL,
        ),
        timeout: Duration::from_secs(get_env_parsed_or("LIBGEN_TIMEOUT_SECS", 60)),
        max_results: get_env_parsed_or("LIBGEN_MAX_RESULTS", crate::store::DEFAULT_MAX_RESULTS),
        user_agent: get_env_or_default("LIBGEN_USER_AGENT", DEFAULT_USER_AGENT),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Host serving the fiction catalog and search listing.
    pub base_url: String,
    /// Host serving the per-book download pages.
    pub download_base_url: String,
    pub timeout: Duration,
    pub max_results: usize,
    pub user_agent: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
