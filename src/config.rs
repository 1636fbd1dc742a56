//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory site root; relative links are joined to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the top-level region listing
    #[serde(default = "default_start_path")]
    pub start_path: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (5xx, 429, transport)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Entities checked and extracted at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Stop after this many records across the whole crawl
    #[serde(default)]
    pub max_records: Option<usize>,

    /// Only crawl regions with these names (case-insensitive); empty means all
    #[serde(default)]
    pub regions: Vec<String>,

    /// Workbook file name, without extension
    #[serde(default = "default_workbook")]
    pub workbook: String,

    /// Directory the workbook is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_base_url() -> String {
    "https://www.residentadvisor.net".to_string()
}

fn default_start_path() -> String {
    "/promoters.aspx".to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_concurrency() -> usize {
    1
}

fn default_workbook() -> String {
    "promoters".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_path: default_start_path(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
            max_records: None,
            regions: Vec::new(),
            workbook: default_workbook(),
            output_dir: default_output_dir(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("promoter-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("PROMO_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("PROMO_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("PROMO_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(concurrency) = std::env::var("PROMO_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }

        if let Ok(max) = std::env::var("PROMO_MAX_RECORDS") {
            if let Ok(m) = max.parse() {
                self.max_records = Some(m);
            }
        }

        self
    }

    /// Sets the record limit; 0 means unbounded.
    pub fn set_max_records(&mut self, max: usize) {
        self.max_records = (max > 0).then_some(max);
    }

    /// Full path of the workbook file.
    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.xlsx", self.workbook))
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.residentadvisor.net");
        assert_eq!(config.start_path, "/promoters.aspx");
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 1500);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.workbook, "promoters");
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
        assert!(config.max_records.is_none());
        assert!(config.regions.is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "xlsx".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            base_url = "http://localhost:8080"
            concurrency = 4
            max_records = 250
            regions = ["Germany", "united kingdom"]
            workbook = "leads"
            output_dir = "/tmp/out"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_records, Some(250));
        assert_eq!(config.regions, vec!["Germany", "united kingdom"]);
        assert_eq!(config.workbook_path(), PathBuf::from("/tmp/out/leads.xlsx"));
        assert_eq!(config.format, OutputFormat::Json);
        // Unset fields keep their defaults
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.start_path, "/promoters.aspx");
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            delay_ms = 4000
            timeout_secs = 10
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_ms, 4000);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "workbook = \"berlin\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.workbook, "berlin");
    }

    #[test]
    fn test_set_max_records() {
        let mut config = Config::new();
        config.set_max_records(10);
        assert_eq!(config.max_records, Some(10));
        config.set_max_records(0);
        assert_eq!(config.max_records, None);
    }

    #[test]
    fn test_config_with_env() {
        let keys = [
            "PROMO_BASE_URL",
            "PROMO_PROXY",
            "PROMO_DELAY",
            "PROMO_CONCURRENCY",
            "PROMO_MAX_RECORDS",
        ];
        let originals: Vec<_> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var("PROMO_BASE_URL", "http://mirror.example");
        std::env::set_var("PROMO_PROXY", "http://proxy:8080");
        std::env::set_var("PROMO_DELAY", "not_a_number");
        std::env::set_var("PROMO_CONCURRENCY", "3");
        std::env::set_var("PROMO_MAX_RECORDS", "40");

        let config = Config::new().with_env();
        assert_eq!(config.base_url, "http://mirror.example");
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        // Invalid values are ignored
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_records, Some(40));

        for (key, original) in keys.iter().zip(originals) {
            match original {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}
