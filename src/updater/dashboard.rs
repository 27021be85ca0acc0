use futures::future::join_all;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use crate::charts::{ChartSpec, DashboardLayout};
use crate::data::DataSource;
use crate::error::{AppError, AppResult};
use crate::render::{ChartBackend, ChartHandle};
use crate::updater::RefreshTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Disposed,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub loaded: usize,
    pub skipped: usize,
}

struct ChartInstance<H> {
    spec: ChartSpec,
    source_url: String,
    handle: H,
}

struct Inner<S: DataSource, B: ChartBackend> {
    session_id: Uuid,
    layout: DashboardLayout,
    last_hours: i64,
    source: S,
    backend: B,
    charts: tokio::sync::Mutex<Vec<ChartInstance<B::Handle>>>,
    state: Mutex<Lifecycle>,
    timer: Arc<RefreshTimer>,
}

/// Owns the charts of one dashboard session and keeps them fresh.
///
/// Dropping the dashboard disposes it.
pub struct Dashboard<S: DataSource, B: ChartBackend> {
    inner: Arc<Inner<S, B>>,
}

impl<S: DataSource, B: ChartBackend> Dashboard<S, B> {
    /// Build the dashboard. No chart is drawn and nothing is fetched until
    /// [`initialize`](Self::initialize).
    #[must_use]
    pub fn create(layout: DashboardLayout, last_hours: i64, source: S, backend: B) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(
            session = %session_id,
            charts = layout.charts.len(),
            last_hours,
            "Dashboard created"
        );

        Self {
            inner: Arc::new(Inner {
                session_id,
                layout,
                last_hours,
                source,
                backend,
                charts: tokio::sync::Mutex::new(Vec::new()),
                state: Mutex::new(Lifecycle::Uninitialized),
                timer: RefreshTimer::new(),
            }),
        }
    }

    /// Generate every chart with its initial data, then schedule the first refresh.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Lifecycle` if the dashboard was already initialized or disposed.
    pub async fn initialize(&self) -> AppResult<()> {
        self.inner.initialize().await
    }

    /// Schedule the next refresh, then reload every chart.
    ///
    /// Failed fetches are skipped; they never surface as errors.
    pub async fn refresh(&self) -> RefreshSummary {
        self.inner.refresh().await
    }

    /// Run one refresh after `interval`, replacing any pending one.
    pub fn schedule_next(&self, interval: Duration) {
        self.inner.schedule_next(interval);
    }

    /// Cancel the pending refresh and stop the refresh loop.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.inner.state()
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Requested display window in hours.
    ///
    /// Parsed from the page URL but not applied to fetching or rendering.
    #[must_use]
    pub fn last_hours(&self) -> i64 {
        self.inner.last_hours
    }

    #[must_use]
    pub fn layout(&self) -> &DashboardLayout {
        &self.inner.layout
    }

    #[must_use]
    pub fn refresh_pending(&self) -> bool {
        self.inner.timer.is_pending()
    }

    /// Number of refreshes scheduled over the dashboard's lifetime.
    #[must_use]
    pub fn refreshes_scheduled(&self) -> u64 {
        self.inner.timer.generation()
    }
}

impl<S: DataSource, B: ChartBackend> Drop for Dashboard<S, B> {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl<S: DataSource, B: ChartBackend> Inner<S, B> {
    fn state(&self) -> Lifecycle {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn initialize(self: &Arc<Self>) -> AppResult<()> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != Lifecycle::Uninitialized {
                return Err(AppError::Lifecycle(format!(
                    "cannot initialize a dashboard in state {:?}",
                    *state
                )));
            }
            *state = Lifecycle::Initialized;
        }

        let mut charts = self.charts.lock().await;

        let initial = join_all(self.layout.charts.iter().map(|spec| self.source.fetch(spec))).await;

        for (spec, result) in self.layout.charts.iter().zip(initial) {
            let source_url = self.source.locate(spec);
            tracing::info!(
                session = %self.session_id,
                chart = %spec.id,
                source = %source_url,
                "Loading chart"
            );

            let data = match result {
                Ok(table) => Some(table),
                Err(e) => {
                    tracing::warn!(
                        session = %self.session_id,
                        chart = %spec.id,
                        error = %e,
                        "Initial fetch failed, chart starts empty"
                    );
                    None
                }
            };

            let handle = self.backend.generate(spec, &source_url, data);
            charts.push(ChartInstance {
                spec: spec.clone(),
                source_url,
                handle,
            });
        }
        drop(charts);

        tracing::info!(
            session = %self.session_id,
            charts = self.layout.charts.len(),
            interval_secs = self.layout.refresh_interval.as_secs(),
            last_hours = self.last_hours,
            "Dashboard initialized"
        );

        self.schedule_next(self.layout.refresh_interval);
        Ok(())
    }

    async fn refresh(self: &Arc<Self>) -> RefreshSummary {
        if self.state() != Lifecycle::Initialized {
            tracing::debug!(session = %self.session_id, "Refresh skipped, dashboard not running");
            return RefreshSummary::default();
        }

        // the cadence does not stretch with fetch latency
        self.schedule_next(self.layout.refresh_interval);

        let mut summary = RefreshSummary::default();
        {
            let mut charts = self.charts.lock().await;

            let results =
                join_all(charts.iter().map(|chart| self.source.fetch(&chart.spec))).await;

            if self.state() != Lifecycle::Initialized {
                tracing::debug!(
                    session = %self.session_id,
                    "Dashboard disposed during refresh, dropping fetched data"
                );
                return summary;
            }

            for (chart, result) in charts.iter_mut().zip(results) {
                match result {
                    Ok(table) => {
                        tracing::info!(
                            session = %self.session_id,
                            chart = %chart.spec.id,
                            rows = table.len(),
                            "Updating chart"
                        );
                        chart.handle.load(table);
                        summary.loaded += 1;
                    }
                    Err(e) if e.is_fetch_failure() => {
                        tracing::warn!(
                            session = %self.session_id,
                            chart = %chart.spec.id,
                            source = %chart.source_url,
                            error = %e,
                            "Skipping chart update"
                        );
                        summary.skipped += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            session = %self.session_id,
                            chart = %chart.spec.id,
                            error = %e,
                            "Unexpected error while refreshing chart"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        summary
    }

    fn schedule_next(self: &Arc<Self>, interval: Duration) {
        let inner = Arc::clone(self);
        let scheduled = self.timer.schedule(interval, move || async move {
            inner.refresh().await;
        });

        if scheduled {
            tracing::debug!(
                session = %self.session_id,
                interval_secs = interval.as_secs(),
                "Next refresh scheduled"
            );
        }
    }

    fn dispose(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Lifecycle::Disposed;
        self.timer.close();
        tracing::debug!(session = %self.session_id, "Dashboard disposed");
    }
}
