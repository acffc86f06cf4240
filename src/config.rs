use serde::Deserialize;

/// Main configuration for the persona service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Object store configuration
    #[serde(default)]
    pub s3: S3Config,
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// S3 bucket holding the CSV document
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Object key of the CSV document
    #[serde(default = "default_key")]
    pub key: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API listen address
    #[serde(default = "default_api_host")]
    pub host: String,
    /// API listen port
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Allowed CORS origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

// Default value functions
fn default_service_name() -> String {
    "persona-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bucket() -> String {
    "your-bucket-eia".to_string()
}

fn default_key() -> String {
    "personas.csv".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from defaults, optional config files, and
    /// environment variables
    ///
    /// Environment variables use the `PERSONA` prefix with `__` as the
    /// section separator, e.g. `PERSONA__S3__BUCKET` -> `s3.bucket`.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Add config file if present
            .add_source(config::File::with_name("config/persona").required(false))
            .add_source(config::File::with_name("/etc/persona/persona").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("PERSONA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            key: default_key(),
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let s3 = S3Config::default();
        assert_eq!(s3.bucket, "your-bucket-eia");
        assert_eq!(s3.key, "personas.csv");
        assert_eq!(s3.region, "us-east-1");
        assert!(!s3.force_path_style);
    }

    #[test]
    fn test_default_api_values() {
        let api = ApiConfig::default();
        assert_eq!(api.host, "0.0.0.0");
        assert_eq!(api.port, 8080);
        assert!(api.cors_enabled);
    }
}
