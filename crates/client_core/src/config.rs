use std::{fs, io::ErrorKind, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{
    error::{ClientError, ConfigError},
    PollPolicy,
};

pub const DEFAULT_SETTINGS_FILE: &str = "bee_advisor.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub max_poll_attempts: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            max_poll_attempts: 30,
            poll_interval_ms: 500,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.max_poll_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    max_poll_attempts: Option<u32>,
    poll_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `bee_advisor.toml` in the working directory, then
/// environment. A missing file is normal; any other read failure is logged.
pub fn load_settings() -> Settings {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw, path),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
    }
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    settings
}

/// Like [`load_settings`], but the file at `path` was named explicitly and
/// must be readable.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, &raw, path);
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    Ok(settings)
}

fn apply_file_overrides(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), "ignoring malformed settings file: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.max_poll_attempts {
        settings.max_poll_attempts = v;
    }
    if let Some(v) = file_cfg.poll_interval_ms {
        settings.poll_interval_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BEE_ADVISOR_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__MAX_POLL_ATTEMPTS") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.max_poll_attempts = parsed,
            Err(err) => warn!("ignoring APP__MAX_POLL_ATTEMPTS={v}: {err}"),
        }
    }
    if let Some(v) = lookup("APP__POLL_INTERVAL_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.poll_interval_ms = parsed,
            Err(err) => warn!("ignoring APP__POLL_INTERVAL_MS={v}: {err}"),
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v}: {err}"),
        }
    }
}

/// Checks the base URL and strips trailing slashes so paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(trimmed.to_string())
}
