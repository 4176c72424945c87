use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
    pub static_config: StaticConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

/// LLM provider settings (Gemini `generateContent` API)
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider API key. A missing key does not stop the server; every
    /// analysis request fails with a configuration error instead.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    /// Request timeout in seconds. `None` leaves the transport default in place.
    #[serde(deserialize_with = "deserialize_optional_duration_secs")]
    pub timeout_secs: Option<u64>,
}

// Manual Debug so the API key never ends up in logs
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Bounds on submitted snippets and history listings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of a submitted code snippet in bytes (default: 64 KiB)
    pub max_code_bytes: usize,
    /// Maximum number of records returned by the history listing (default: 500)
    pub max_history: u32,
}

impl LimitsConfig {
    /// HTTP body limit: the code bound plus room for title, language and JSON framing
    pub fn max_body_bytes(&self) -> usize {
        self.max_code_bytes.saturating_mul(2).saturating_add(16 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub enabled: bool,
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "codeintel")]
#[command(version, about = "CodeIntel - LLM-backed code snippet review service")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Server host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// LLM model name (overrides config file, e.g., "gemini-2.0-flash")
    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    /// LLM request timeout (overrides config file, e.g., "30s", "2m")
    #[arg(long, value_name = "DURATION")]
    pub llm_timeout: Option<String>,

    /// Maximum code snippet size in bytes (overrides config file)
    #[arg(long, value_name = "BYTES")]
    pub max_code_bytes: Option<usize>,

    /// Maximum number of history records returned (overrides config file)
    #[arg(long, value_name = "COUNT")]
    pub max_history: Option<u32>,

    /// Logging level (overrides config file, e.g., "info,codeintel=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Send one minimal request to the LLM provider and exit
    #[arg(long)]
    pub check_provider: bool,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (`.env` is loaded first when present)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!("Loaded environment from {}", path.display());
        }

        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT / PORT: Server port (default: 5000)
    /// - APP_DATABASE_URL: Database URL (default: sqlite://data/codeintel.db)
    /// - APP_LLM_API_KEY / GEMINI_API_KEY: Provider API key
    /// - APP_LLM_API_BASE: Provider API base URL
    /// - APP_LLM_MODEL: Provider model name
    /// - APP_LLM_TIMEOUT_SECS: Provider request timeout (accepts "30s", "2m")
    /// - APP_MAX_CODE_BYTES: Maximum code snippet size
    /// - APP_MAX_HISTORY: Maximum number of history records
    /// - APP_LOG_LEVEL: Logging level
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        // The bare PORT is honoured for PaaS-style deployments; APP_SERVER_PORT wins
        let port = var("APP_SERVER_PORT").or_else(|| var("PORT"));
        if let Some(port) = port {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::info!("Override server.port from env: {}", self.server.port);
                },
                Err(_) => tracing::warn!("Invalid port '{}' in env (keep {})", port, self.server.port),
            }
        }

        if let Some(db_url) = var("APP_DATABASE_URL") {
            self.database.url = db_url;
            tracing::info!("Override database.url from env");
        }

        if let Some(key) = var("APP_LLM_API_KEY").or_else(|| var("GEMINI_API_KEY"))
            && !key.trim().is_empty()
        {
            self.llm.api_key = Some(key.trim().to_string());
            tracing::info!("Override llm.api_key from env");
        }

        if let Some(base) = var("APP_LLM_API_BASE") {
            self.llm.api_base = base;
            tracing::info!("Override llm.api_base from env: {}", self.llm.api_base);
        }

        if let Some(model) = var("APP_LLM_MODEL") {
            self.llm.model = model;
            tracing::info!("Override llm.model from env: {}", self.llm.model);
        }

        if let Some(timeout) = var("APP_LLM_TIMEOUT_SECS") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = Some(val);
                    tracing::info!("Override llm.timeout_secs from env: {}", val);
                },
                Err(e) => tracing::warn!("Invalid APP_LLM_TIMEOUT_SECS '{}': {}", timeout, e),
            }
        }

        if let Some(max) = var("APP_MAX_CODE_BYTES")
            && let Ok(max) = max.parse()
        {
            self.limits.max_code_bytes = max;
            tracing::info!("Override limits.max_code_bytes from env: {}", max);
        }

        if let Some(max) = var("APP_MAX_HISTORY")
            && let Ok(max) = max.parse()
        {
            self.limits.max_history = max;
            tracing::info!("Override limits.max_history from env: {}", max);
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
            tracing::info!("Override server.host from CLI: {}", self.server.host);
        }

        if let Some(port) = args.server_port {
            self.server.port = port;
            tracing::info!("Override server.port from CLI: {}", self.server.port);
        }

        if let Some(db_url) = &args.database_url {
            self.database.url = db_url.clone();
            tracing::info!("Override database.url from CLI");
        }

        if let Some(model) = &args.llm_model {
            self.llm.model = model.clone();
            tracing::info!("Override llm.model from CLI: {}", self.llm.model);
        }

        if let Some(timeout) = &args.llm_timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = Some(val);
                    tracing::info!("Override llm.timeout_secs from CLI: {}", val);
                },
                Err(e) => tracing::warn!("Invalid --llm-timeout '{}': {}", timeout, e),
            }
        }

        if let Some(max) = args.max_code_bytes {
            self.limits.max_code_bytes = max;
            tracing::info!("Override limits.max_code_bytes from CLI: {}", max);
        }

        if let Some(max) = args.max_history {
            self.limits.max_history = max;
            tracing::info!("Override limits.max_history from CLI: {}", max);
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.llm.api_base.trim().is_empty() {
            anyhow::bail!("llm.api_base cannot be empty");
        }

        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model cannot be empty");
        }

        if self.llm.timeout_secs == Some(0) {
            anyhow::bail!("llm.timeout_secs must be > 0 when set");
        }

        if self.limits.max_code_bytes == 0 {
            anyhow::bail!("limits.max_code_bytes must be > 0");
        }
        if self.limits.max_history == 0 {
            anyhow::bail!("limits.max_history must be > 0");
        }

        Ok(())
    }

    /// Non-fatal problems, logged once the subscriber is installed
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.llm.api_key.is_none() {
            warnings.push(
                "No LLM API key configured (set GEMINI_API_KEY or APP_LLM_API_KEY); \
                 snippet analysis requests will fail until a key is provided"
                    .to_string(),
            );
        }
        warnings
    }

    fn find_config_file() -> Option<String> {
        let possible_paths = ["conf/config.toml", "config.toml"];

        possible_paths
            .iter()
            .find(|path| Path::new(path).exists())
            .map(|path| path.to_string())
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 5000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://data/codeintel.db".to_string() }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_code_bytes: 64 * 1024, max_history: 500 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,codeintel=debug".to_string(), file: None }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Plain numbers are seconds
    if let Ok(val) = input.trim().parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Accepts a number of seconds or a human-friendly string like "30s"
fn deserialize_optional_duration_secs<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Option<u64>;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '2m'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(Some(v as u64)) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map(Some).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
