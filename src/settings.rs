//! Runtime settings read from the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Endpoint every action is sent to.
pub const DEFAULT_API_URL: &str = "https://api.sms-activate.io/stubs/handler_api.php";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where to talk to and where to keep state between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the handler endpoint.
    pub api_url: String,
    /// Append-only `KEY=value` file holding the credential and email id.
    pub env_file: PathBuf,
    /// Directory containing `First_Name_DB.txt` and `Last_Name_DB.txt`.
    pub names_dir: PathBuf,
    /// Transport timeout for a single request.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            env_file: PathBuf::from(".env"),
            names_dir: PathBuf::from("scripts"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Build settings from `SMS_ACTIVATE_*` variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = non_empty("SMS_ACTIVATE_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_url: non_empty("SMS_ACTIVATE_URL").unwrap_or(defaults.api_url),
            env_file: non_empty("SMS_ACTIVATE_ENV_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.env_file),
            names_dir: non_empty("SMS_ACTIVATE_NAMES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.names_dir),
            timeout,
        }
    }
}
