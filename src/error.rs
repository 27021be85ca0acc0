#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    #[error("Invalid source path: {0}")]
    InvalidSource(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid dashboard state: {0}")]
    Lifecycle(String),
}

impl AppError {
    /// Whether this error came from fetching or parsing a data source.
    ///
    /// The updater swallows these; everything else is a programming or
    /// configuration mistake.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::Csv(_)
                | Self::MalformedCsv(_)
                | Self::InvalidSource(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
