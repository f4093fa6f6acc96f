// Runtime configuration read once at startup

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://manage.talktolead.ai";
pub const DEFAULT_LINE_CALLBACK_URL: &str = "http://localhost:3000/auth/line/callback";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    /// `None` disables the LINE login path entirely
    pub channel_id: Option<String>,
    pub callback_url: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            callback_url: DEFAULT_LINE_CALLBACK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub line: LineConfig,
    pub data_dir: PathBuf,
    pub demo_mode: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = read("TALKTOLEAD_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = Duration::from_secs(parse_or(
            read("API_TIMEOUT_SECS"),
            "API_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ));
        let max_retries = parse_or(read("API_MAX_RETRIES"), "API_MAX_RETRIES", DEFAULT_MAX_RETRIES);

        let line = LineConfig {
            channel_id: read("LINE_CHANNEL_ID"),
            callback_url: read("LINE_CALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_LINE_CALLBACK_URL.to_string()),
        };

        let data_dir = read("TALKTOLEAD_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("talktolead")))
            .unwrap_or_else(|| PathBuf::from("./.talktolead"));

        let demo_mode = read("DEMO_MODE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            api_base_url,
            request_timeout,
            max_retries,
            line,
            data_dir,
            demo_mode,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %value, "Ignoring unparseable configuration value");
            default
        }),
        None => default,
    }
}
