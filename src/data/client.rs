use reqwest::{Client, Url};
use std::future::Future;
use std::time::Duration;

use crate::charts::ChartSpec;
use crate::config::Config;
use crate::data::SeriesTable;
use crate::error::{AppError, AppResult};

/// Where chart data comes from.
pub trait DataSource: Send + Sync + 'static {
    /// Absolute location of the chart's source, for logging and options.
    fn locate(&self, spec: &ChartSpec) -> String;

    /// Fetch and parse the chart's source.
    fn fetch(&self, spec: &ChartSpec) -> impl Future<Output = AppResult<SeriesTable>> + Send;
}

/// CSV files served next to the dashboard page.
pub struct HttpSource {
    http_client: Client,
    page_url: Url,
}

impl HttpSource {
    /// Create a source resolving chart paths against `page_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the HTTP client cannot be built.
    pub fn new(page_url: Url, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            page_url,
        })
    }

    /// # Errors
    ///
    /// Returns `AppError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.dashboard_url.clone(), config.http_timeout())
    }

    fn resolve(&self, path: &str) -> AppResult<Url> {
        self.page_url
            .join(path)
            .map_err(|e| AppError::InvalidSource(format!("{path:?}: {e}")))
    }
}

impl DataSource for HttpSource {
    fn locate(&self, spec: &ChartSpec) -> String {
        self.resolve(&spec.source_path)
            .map_or_else(|_| spec.source_path.clone(), String::from)
    }

    async fn fetch(&self, spec: &ChartSpec) -> AppResult<SeriesTable> {
        let url = self.resolve(&spec.source_path)?;

        let response = self.http_client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;

        SeriesTable::parse(&body, &spec.x_column, &spec.x_format).inspect_err(|e| {
            tracing::debug!(
                error = %e,
                url = %url,
                body_preview = %String::from_utf8_lossy(&body).chars().take(200).collect::<String>(),
                "Failed to parse data source"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use mockito::Server;
    use tokio_test::{assert_err, assert_ok};

    fn source_for(server: &Server) -> HttpSource {
        let page = Url::parse(&format!("{}/meteo/index.html?lasthours=24", server.url())).unwrap();
        HttpSource::new(page, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetches_csv_relative_to_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/meteo/presence.csv")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body("date,count\n2016-03-01 10:00:00,3\n2016-03-01 11:00:00,5\n")
            .create_async()
            .await;

        let source = source_for(&server);
        let spec = ChartSpec::for_kind(ChartKind::Presence, false);

        assert_eq!(source.locate(&spec), format!("{}/meteo/presence.csv", server.url()));

        let table = assert_ok!(source.fetch(&spec).await);
        assert_eq!(table.len(), 2);
        assert_eq!(table.latest("count").map(|(_, v)| v), Some(5.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_is_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/meteo/light.csv")
            .with_status(404)
            .create_async()
            .await;

        let source = source_for(&server);
        let err = assert_err!(source.fetch(&ChartSpec::for_kind(ChartKind::Light, true)).await);
        assert!(matches!(err, AppError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/meteo/pressure.csv")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let source = source_for(&server);
        let err = assert_err!(source.fetch(&ChartSpec::for_kind(ChartKind::Pressure, true)).await);
        assert!(matches!(err, AppError::MalformedCsv(_)));
    }
}
