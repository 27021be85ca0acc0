use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::charts::ChartKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Dashboard page
    pub dashboard_url: Url,

    // Layout
    pub charts: Vec<ChartKind>,
    pub include_internal_temperature: bool,
    pub refresh_interval_seconds: u64,

    // HTTP client
    pub http_timeout_seconds: u64,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the dashboard URL or chart list cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the dashboard URL or chart list cannot be parsed.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("DASHBOARD_URL")
            .unwrap_or_else(|| "http://localhost/meteo/index.html".to_string());
        let dashboard_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: "DASHBOARD_URL",
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let raw_charts = lookup("DASHBOARD_CHARTS").unwrap_or_else(|| "pressure,light".to_string());
        let charts = parse_chart_list(&raw_charts)?;

        Ok(Self {
            dashboard_url,

            charts,
            include_internal_temperature: lookup("DASHBOARD_INTERNAL_TEMPERATURE")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .unwrap_or(true),
            refresh_interval_seconds: lookup("DASHBOARD_REFRESH_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(300), // 5 minutes default

            http_timeout_seconds: lookup("HTTP_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),

            deployment: Deployment::from_str(
                &lookup("DEPLOYMENT").unwrap_or_else(|| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

fn parse_chart_list(raw: &str) -> Result<Vec<ChartKind>, ConfigError> {
    let charts = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ChartKind::from_name(name).ok_or_else(|| ConfigError::Invalid {
                name: "DASHBOARD_CHARTS",
                value: raw.to_string(),
                reason: format!("unknown chart '{name}'"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if charts.is_empty() {
        return Err(ConfigError::Invalid {
            name: "DASHBOARD_CHARTS",
            value: raw.to_string(),
            reason: "no charts configured".to_string(),
        });
    }

    Ok(charts)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name} ({value:?}): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
