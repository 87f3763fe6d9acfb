//! Configuration loading and types

use std::fmt;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use hostprobe_core::{ProbeConfig, parse_port_list};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "HOSTPROBE_CONFIG";

/// Top-level configuration for hostprobe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Asset API connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Resolution and probing settings
    #[serde(default)]
    pub probe: ProbeConfig,
    /// CSV output settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Asset API connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://glpi.example.com/apirest.php`
    #[serde(default)]
    pub url: String,
    /// Personal API token of the inventory user
    #[serde(default)]
    pub user_token: String,
    /// Token of the registered API client
    #[serde(default)]
    pub app_token: String,
    /// Raw criteria query string appended to the computer search
    #[serde(default)]
    pub search_criteria: String,
    /// Rows requested per search page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_token: String::new(),
            app_token: String::new(),
            search_criteria: String::new(),
            page_size: default_page_size(),
            accept_invalid_certs: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("user_token", &"<redacted>")
            .field("app_token", &"<redacted>")
            .field("search_criteria", &self.search_criteria)
            .field("page_size", &self.page_size)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Largest search page the API is asked for
pub const MAX_PAGE_SIZE: u64 = 10_000;

fn default_page_size() -> u64 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

/// CSV output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination file, replaced on every run
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from("machines_export.csv")
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Find the config file to use, if any
    ///
    /// An explicit path wins, then `HOSTPROBE_CONFIG`, then the first existing
    /// file among the common locations.
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let mut paths = vec![
            PathBuf::from("hostprobe.toml"),
            PathBuf::from("/etc/hostprobe/hostprobe.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("hostprobe/hostprobe.toml"));
        }

        paths.into_iter().find(|path| path.exists())
    }

    /// Apply the connector's environment variables on top of the file values
    ///
    /// `lookup` returns the value of a variable, if set.
    ///
    /// # Errors
    /// Returns error if a port list variable cannot be parsed
    pub fn apply_env<F>(&mut self, lookup: F) -> eyre::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_URL") {
            self.api.url = url;
        }
        if let Some(token) = lookup("USER_TOKEN") {
            self.api.user_token = token;
        }
        if let Some(token) = lookup("APP_TOKEN") {
            self.api.app_token = token;
        }
        if let Some(criteria) = lookup("SEARCH_CRITERIA") {
            self.api.search_criteria = criteria;
        }
        if let Some(path) = lookup("CSV_FILE_PATH") {
            self.export.path = PathBuf::from(path);
        }
        if let Some(domain) = lookup("LOCAL_DOMAIN") {
            self.probe.local_domain = domain;
        }
        if let Some(ports) = lookup("WINDOWS_PORTS") {
            self.probe.windows_ports = parse_port_list(&ports).wrap_err("WINDOWS_PORTS")?;
        }
        if let Some(ports) = lookup("LINUX_PORTS") {
            self.probe.linux_ports = parse_port_list(&ports).wrap_err("LINUX_PORTS")?;
        }
        Ok(())
    }

    /// Check that a run can start
    ///
    /// # Errors
    /// Returns error if API credentials are missing, API transport settings are
    /// out of range, or probe settings are invalid
    pub fn validate(&self) -> eyre::Result<()> {
        let required = [
            ("api.url / API_URL", &self.api.url),
            ("api.user_token / USER_TOKEN", &self.api.user_token),
            ("api.app_token / APP_TOKEN", &self.api.app_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                eyre::bail!("missing required setting {name}");
            }
        }

        if self.api.timeout_secs == 0 {
            eyre::bail!("api.timeout_secs must be greater than zero");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.api.page_size) {
            eyre::bail!("api.page_size must be between 1 and {MAX_PAGE_SIZE}");
        }

        self.probe.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.export.path, PathBuf::from("machines_export.csv"));
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.log.level, "info");
        assert!(!config.api.accept_invalid_certs);
    }

    #[test]
    fn test_parse_full_file() {
        let config: Config = toml::from_str(
            r#"
            [api]
            url = "https://glpi.example.com/apirest.php"
            user_token = "u"
            app_token = "a"
            search_criteria = "criteria[0][field]=31"
            page_size = 200
            accept_invalid_certs = true

            [probe]
            local_domain = "example.com"
            windows_ports = [3389, 445]
            linux_ports = [22]
            probe_timeout_ms = 1500
            concurrency = 16
            deadline_secs = 600

            [export]
            path = "/tmp/hosts.csv"

            [log]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api.page_size, 200);
        assert!(config.api.accept_invalid_certs);
        assert_eq!(config.probe.local_domain, "example.com");
        assert_eq!(config.probe.windows_ports, vec![3389, 445]);
        assert_eq!(config.probe.probe_timeout_ms, 1500);
        assert_eq!(config.probe.deadline_secs, Some(600));
        assert_eq!(config.export.path, PathBuf::from("/tmp/hosts.csv"));
        assert!(config.log.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [probe]
            local_domain = "corp.local"
            "#,
        )
        .unwrap();

        assert_eq!(config.probe.local_domain, "corp.local");
        assert_eq!(config.probe.windows_ports, vec![3389, 445, 135]);
        assert_eq!(config.probe.probe_timeout_ms, 2000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nurl = \"http://inventory.local/apirest.php\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.url, "http://inventory.local/apirest.php");
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[probe]\nwindows_ports = \"3389\"").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_discover_prefers_explicit_path() {
        let path = Path::new("/nonexistent/custom.toml");
        assert_eq!(Config::discover(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("API_URL", "https://glpi.example.com/apirest.php"),
            ("USER_TOKEN", "user"),
            ("APP_TOKEN", "app"),
            ("CSV_FILE_PATH", "out.csv"),
            ("SEARCH_CRITERIA", "is_deleted=0"),
            ("LOCAL_DOMAIN", "example.com"),
            ("WINDOWS_PORTS", "3389,445"),
            ("LINUX_PORTS", "22"),
        ]);

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.api.url, "https://glpi.example.com/apirest.php");
        assert_eq!(config.api.user_token, "user");
        assert_eq!(config.api.search_criteria, "is_deleted=0");
        assert_eq!(config.export.path, PathBuf::from("out.csv"));
        assert_eq!(config.probe.local_domain, "example.com");
        assert_eq!(config.probe.windows_ports, vec![3389, 445]);
        assert_eq!(config.probe.linux_ports, vec![22]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_rejects_bad_ports() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "LINUX_PORTS").then(|| "ssh".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let mut config = Config::default();
        config.api.url = "https://glpi.example.com/apirest.php".to_string();
        config.api.user_token = "user".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("APP_TOKEN"));
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.api.url = "https://glpi.example.com/apirest.php".to_string();
        config.api.user_token = "user".to_string();
        config.api.app_token = "app".to_string();
        config
    }

    #[test]
    fn test_zero_api_timeout_fails_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.api.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_page_size_out_of_range_fails_validation() {
        let mut config = valid_config();

        config.api.page_size = 0;
        assert!(config.validate().is_err());

        config.api.page_size = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));

        config.api.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut config = Config::default();
        config.api.user_token = "very-secret".to_string();
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
