use std::time::Duration;

use shared::PollPolicy;
use shared::history::HISTORY_PAGE_SIZE;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Build-time settings. Override with `SPINEVISION_API_URL`, `SPINEVISION_LOG_LEVEL`
/// and `SPINEVISION_POLL_INTERVAL_MS` when running `trunk build`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub log_level: log::Level,
    pub poll_policy: PollPolicy,
    pub history_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("SPINEVISION_API_URL"),
            option_env!("SPINEVISION_LOG_LEVEL"),
            option_env!("SPINEVISION_POLL_INTERVAL_MS"),
        )
    }

    fn from_values(api_url: Option<&str>, log_level: Option<&str>, poll_ms: Option<&str>) -> Self {
        let api_base_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let log_level = log_level
            .and_then(|level| level.parse().ok())
            .unwrap_or(log::Level::Info);

        let mut poll_policy = PollPolicy::default();
        if let Some(ms) = poll_ms.and_then(|ms| ms.parse::<u64>().ok()).filter(|ms| *ms > 0) {
            poll_policy.interval = Duration::from_millis(ms);
        }

        Self {
            api_base_url,
            log_level,
            poll_policy,
            history_page_size: HISTORY_PAGE_SIZE,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Resolves asset links such as `heatmap_url`, which the backend sends as paths.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
            path.to_string()
        } else {
            self.endpoint(path)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.log_level, log::Level::Info);
        assert_eq!(config.poll_policy.interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_values(Some("https://api.spine.example/ "), Some("debug"), Some("500"));
        assert_eq!(config.api_base_url, "https://api.spine.example");
        assert_eq!(config.log_level, log::Level::Debug);
        assert_eq!(config.poll_policy.interval, Duration::from_millis(500));
    }

    #[test]
    fn test_urls() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint("/history"), "http://localhost:8000/history");
        assert_eq!(
            config.asset_url("/files/heatmaps/a.png"),
            "http://localhost:8000/files/heatmaps/a.png"
        );
        assert_eq!(config.asset_url("https://cdn/x.png"), "https://cdn/x.png");
    }
}
