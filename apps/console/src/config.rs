use std::fs;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub gateway_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:5000".into(),
            request_timeout_seconds: 30,
        }
    }
}

/// Keys read from `console.toml`; anything absent falls back to the
/// defaults, anything unknown is ignored.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    gateway_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.gateway_url {
                    settings.gateway_url = v;
                }
                if let Some(v) = file_cfg.request_timeout_seconds {
                    settings.request_timeout_seconds = v;
                }
            }
            Err(err) => warn!("ignoring unreadable console.toml: {err}"),
        }
    }

    if let Ok(v) = std::env::var("ASK_GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Ok(v) = std::env::var("APP__GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn default_settings_point_at_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.gateway_url, "http://127.0.0.1:5000");
        assert_eq!(settings.request_timeout_seconds, 30);
    }

    #[test]
    fn file_settings_accept_integer_timeout_alongside_other_keys() {
        let parsed: FileSettings = toml::from_str(
            "gateway_url = \"http://10.0.0.7:5000\"\nrequest_timeout_seconds = 5\n",
        )
        .expect("parse");
        assert_eq!(parsed.gateway_url.as_deref(), Some("http://10.0.0.7:5000"));
        assert_eq!(parsed.request_timeout_seconds, Some(5));
    }

    #[test]
    fn partial_file_leaves_missing_keys_at_defaults() {
        let parsed: FileSettings =
            toml::from_str("gateway_url = \"http://10.0.0.7:5000\"\n").expect("parse");
        assert_eq!(parsed.gateway_url.as_deref(), Some("http://10.0.0.7:5000"));
        assert!(parsed.request_timeout_seconds.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();

        let temp_root = env::temp_dir().join(format!("ask_console_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");

        let original_dir = env::current_dir().expect("cwd");
        env::set_current_dir(&temp_root).expect("set cwd");

        fs::write(
            "console.toml",
            "gateway_url = \"http://10.0.0.7:5000\"\nrequest_timeout_seconds = 5\n",
        )
        .expect("write config");

        let settings = load_settings();
        assert_eq!(settings.gateway_url, "http://10.0.0.7:5000");
        assert_eq!(settings.request_timeout_seconds, 5);

        env::set_current_dir(original_dir).expect("restore cwd");
        fs::remove_dir_all(temp_root).expect("cleanup");
    }
}
