use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per upload (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// Deployment readiness polling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to wait between status fetches.
    pub interval_secs: u64,
    /// Maximum number of status fetches before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: 60,
        }
    }
}

/// How staged files reach the object store: one PUT per file, or a single
/// gzipped tar of the source list (artifacts are always PUT individually).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Files,
    Archive,
}

/// Platform API endpoint and project identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API, e.g. "https://api.example.dev".
    pub base_url: String,
    /// Project slug deployments are created under.
    pub project: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.example.dev".to_string(),
            project: "default".to_string(),
        }
    }
}

/// S3-compatible object store endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the object store, e.g. "https://objects.example.dev".
    pub endpoint: String,
    /// Bucket that receives upload keys.
    pub bucket: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://objects.example.dev".to_string(),
            bucket: "deployments".to_string(),
        }
    }
}

/// File staging rules for the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Path segment that marks build output (stripped from destination keys).
    pub output_marker: String,
    /// Directory names skipped entirely during the walk.
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are skipped with a warning.
    pub max_file_bytes: u64,
    /// Per-file PUTs or a single source archive.
    #[serde(default)]
    pub upload_mode: UploadMode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_marker: "dist".to_string(),
            exclude_dirs: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
            ],
            max_file_bytes: 50 * 1024 * 1024,
            upload_mode: UploadMode::Files,
        }
    }
}

/// Migration runner settings. The tracking table is append-only: a filename
/// recorded there is never reapplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Directory containing `*.sql` migration files.
    pub migrations_dir: PathBuf,
    /// Name of the tracking table in the target database.
    pub tracking_table: String,
    /// psql binary to invoke (resolved via PATH unless absolute).
    pub psql_bin: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            tracking_table: "slipway_migrations".to_string(),
            psql_bin: "psql".to_string(),
        }
    }
}

/// Schema-pull tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Command line for the schema-pull tool, program first.
    pub command: Vec<String>,
    /// Flag appended when the tool supports a non-interactive run.
    /// When absent, confirmation keystrokes are piped to stdin instead.
    #[serde(default)]
    pub non_interactive_flag: Option<String>,
    /// Keystrokes fed to stdin in the fallback path.
    pub confirm_input: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            command: vec!["drizzle-kit".to_string(), "pull".to_string()],
            non_interactive_flag: None,
            confirm_input: "y\n".to_string(),
        }
    }
}

/// Secrets pulled from the process environment exactly once, at load time.
/// Nothing downstream reads the environment; fragments receive these by value.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Bearer token for the platform API (SLIPWAY_API_TOKEN).
    pub platform_token: Option<String>,
    /// Bearer token for the object store (SLIPWAY_STORE_TOKEN), if required.
    pub store_token: Option<String>,
    /// Connection string handed to psql (DATABASE_URL).
    pub database_url: Option<String>,
}

impl Secrets {
    /// Read secrets through a lookup function (injectable for tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            platform_token: lookup("SLIPWAY_API_TOKEN"),
            store_token: lookup("SLIPWAY_STORE_TOKEN"),
            database_url: lookup("DATABASE_URL"),
        }
    }

    /// Read secrets from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Global configuration loaded from `~/.config/slipway/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlipwayConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Filled in by the loader, never serialized.
    #[serde(skip)]
    pub secrets: Secrets,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("slipway")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Secrets come from the environment here and nowhere else.
pub fn load_or_init() -> Result<SlipwayConfig> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    } else {
        let default_cfg = SlipwayConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    };
    cfg.secrets = Secrets::from_env();
    Ok(cfg)
}
