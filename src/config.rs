use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the CSV dataset loaded at startup
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of movies returned when a request does not specify a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Optional upper bound applied to every requested limit. Unset means unbounded.
    #[serde(default)]
    pub max_limit: Option<usize>,

    /// Fixed seed for the sampling RNG. Unset means seeded from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Comma separated list of allowed CORS origins. Unset allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_dataset_path() -> String {
    "data/movies.csv".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_limit() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            host: default_host(),
            port: default_port(),
            default_limit: default_limit(),
            max_limit: None,
            rng_seed: None,
            cors_allowed_origins: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves an optional requested limit against the configured default and maximum
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        let limit = requested.unwrap_or(self.default_limit);
        match self.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        }
    }

    /// Parsed CORS origins, `None` when any origin is allowed
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        self.cors_allowed_origins.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
