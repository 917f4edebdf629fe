use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_CLIENTS_SHEET: &str = "Recepcion";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub sheets_base_url: String,
    pub spreadsheet_id: String,
    pub sheets_api_key: String,
    /// Sheet holding the visit log.
    pub clients_sheet: String,
    /// Maximum age of the profile snapshot before a recompute.
    pub cache_ttl_secs: u64,
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value.trim().to_string())
        })
}

fn validate_base_url(url: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&url)
        .map_err(|e| anyhow::anyhow!("SHEETS_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("SHEETS_BASE_URL must start with http:// or https://");
    }
    Ok(url.trim_end_matches('/').to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            sheets_base_url: validate_base_url(
                std::env::var("SHEETS_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
            )?,
            spreadsheet_id: required("SPREADSHEET_ID")?,
            sheets_api_key: required("SHEETS_API_KEY")?,
            clients_sheet: std::env::var("CLIENTS_SHEET")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CLIENTS_SHEET.to_string()),
            cache_ttl_secs: std::env::var("CLIENT_CACHE_TTL_SECS")
                .ok()
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| {
                            anyhow::anyhow!("CLIENT_CACHE_TTL_SECS must be a positive integer")
                        })
                })
                .transpose()?
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        };

        // Log successful configuration load (without sensitive values)
        tracing::debug!("Sheets Base URL: {}", config.sheets_base_url);
        tracing::debug!(
            "Spreadsheet: {}, sheet: {}",
            config.spreadsheet_id,
            config.clients_sheet
        );
        tracing::debug!("Client cache TTL: {}s", config.cache_ttl_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("https://sheets.example.com/".to_string()).unwrap(),
            "https://sheets.example.com"
        );
        assert!(validate_base_url("ftp://sheets.example.com".to_string()).is_err());
        assert!(validate_base_url("not a url".to_string()).is_err());
    }

    #[test]
    fn test_cache_ttl() {
        let config = Config {
            port: 3000,
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            spreadsheet_id: "sheet-id".to_string(),
            sheets_api_key: "key".to_string(),
            clients_sheet: DEFAULT_CLIENTS_SHEET.to_string(),
            cache_ttl_secs: 90,
        };
        assert_eq!(config.cache_ttl(), Duration::from_secs(90));
    }
}
