use serde::Deserialize;

/// Default location of the external mortgage calculator.
pub const DEFAULT_CALCULATOR_BASE_URL: &str = "https://mortgage-calculator-service.herokuapp.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub calculator_base_url: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            calculator_base_url: validate_calculator_url(
                std::env::var("CALCULATOR_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CALCULATOR_BASE_URL.to_string()),
            )?,
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| (1024 * 1024).to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_prefix(&config.database_url));
        tracing::debug!("Calculator Base URL: {}", config.calculator_base_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// First 20 characters of a URL, for logging without credentials.
pub fn url_prefix(url: &str) -> String {
    url.chars().take(20).collect()
}

/// Checks that the calculator base URL is an absolute http(s) URL and strips
/// any trailing slash so `/calculate` can be appended.
pub fn validate_calculator_url(raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("CALCULATOR_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("CALCULATOR_BASE_URL must start with http:// or https://");
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}
