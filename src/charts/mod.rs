//! Chart configuration.
//!
//! A dashboard is a list of [`ChartSpec`]s plus a refresh interval. Each spec
//! carries everything the rendering backend needs: where to draw, which CSV
//! to read, how to parse its timestamps, and which series go on which axis.

mod options;

use serde::Serialize;
use std::time::Duration;

use crate::config::Config;

/// Timestamp format of the `date` column in every CSV source.
pub const X_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tick label format on the time axis.
pub const X_TICK_FORMAT: &str = "%Y-%m-%d %H:%M";

const X_COLUMN: &str = "date";
const X_TICK_COUNT: u32 = 8;
const CHART_HEIGHT: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Pressure,
    Light,
    Presence,
}

impl ChartKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pressure" => Some(Self::Pressure),
            "light" => Some(Self::Light),
            "presence" => Some(Self::Presence),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Light => "light",
            Self::Presence => "presence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Y,
    Y2,
}

/// One CSV column drawn as a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesBinding {
    /// CSV header of the column
    pub key: String,
    /// Legend name
    pub name: String,
    pub axis: Axis,
}

impl SeriesBinding {
    fn new(key: &str, name: &str, axis: Axis) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            axis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSpec {
    pub label: String,
    /// Appended verbatim to tick values, e.g. `°C` or ` Pa`
    pub unit: String,
}

impl AxisSpec {
    fn new(label: &str, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
        }
    }

    /// Tick label for `value`: two decimals at most, no trailing zeros, unit suffix.
    ///
    /// Halves round toward positive infinity, so `-1.125` is `-1.12`.
    #[must_use]
    pub fn format_tick(&self, value: f64) -> String {
        let rounded = (value * 100.0 + 0.5).floor() / 100.0;
        // avoid "-0" for tiny negatives
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        format!("{rounded}{}", self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: String,
    /// Rendering target, e.g. `#pressure-chart`
    pub container: String,
    /// Data source, relative to the dashboard page
    pub source_path: String,
    pub x_column: String,
    pub x_format: String,
    pub x_tick_format: String,
    pub x_tick_count: u32,
    pub height: u32,
    pub series: Vec<SeriesBinding>,
    pub y: AxisSpec,
    pub y2: Option<AxisSpec>,
    pub subchart: bool,
    pub zoom: bool,
}

impl ChartSpec {
    fn base(kind: ChartKind, series: Vec<SeriesBinding>, y: AxisSpec, y2: Option<AxisSpec>) -> Self {
        let id = kind.id();
        Self {
            id: id.to_string(),
            container: format!("#{id}-chart"),
            source_path: format!("./{id}.csv"),
            x_column: X_COLUMN.to_string(),
            x_format: X_FORMAT.to_string(),
            x_tick_format: X_TICK_FORMAT.to_string(),
            x_tick_count: X_TICK_COUNT,
            height: CHART_HEIGHT,
            series,
            y,
            y2,
            subchart: true,
            zoom: true,
        }
    }

    /// Standard chart for `kind`.
    ///
    /// Pressure and light charts share the temperature axis; the internal
    /// (board) temperature line is optional since not every station has the
    /// sensor.
    #[must_use]
    pub fn for_kind(kind: ChartKind, include_internal_temperature: bool) -> Self {
        let temperature_lines = || {
            let mut lines = Vec::with_capacity(3);
            if include_internal_temperature {
                lines.push(SeriesBinding::new(
                    "internal_temperature",
                    "Internal Temperature",
                    Axis::Y,
                ));
            }
            lines.push(SeriesBinding::new("temperature", "External Temperature", Axis::Y));
            lines
        };

        match kind {
            ChartKind::Pressure => {
                let mut series = temperature_lines();
                series.push(SeriesBinding::new("pressure", "Pressure", Axis::Y2));
                Self::base(
                    kind,
                    series,
                    AxisSpec::new("Temperature", "°C"),
                    Some(AxisSpec::new("Pressure", " Pa")),
                )
            }
            ChartKind::Light => {
                let mut series = temperature_lines();
                series.push(SeriesBinding::new("light", "Light", Axis::Y2));
                Self::base(
                    kind,
                    series,
                    AxisSpec::new("Temperature", "°C"),
                    Some(AxisSpec::new("Light Intensity", " lx")),
                )
            }
            ChartKind::Presence => Self::base(
                kind,
                vec![SeriesBinding::new("count", "Presence", Axis::Y)],
                AxisSpec::new("Presence Count", ""),
                None,
            ),
        }
    }

    #[must_use]
    pub fn axis(&self, axis: Axis) -> Option<&AxisSpec> {
        match axis {
            Axis::Y => Some(&self.y),
            Axis::Y2 => self.y2.as_ref(),
        }
    }
}

/// Charts shown on one page and how often they reload.
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    pub charts: Vec<ChartSpec>,
    pub refresh_interval: Duration,
}

impl DashboardLayout {
    #[must_use]
    pub fn new(charts: Vec<ChartSpec>, refresh_interval: Duration) -> Self {
        Self {
            charts,
            refresh_interval,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let charts = config
            .charts
            .iter()
            .map(|kind| ChartSpec::for_kind(*kind, config.include_internal_temperature))
            .collect();
        Self::new(charts, config.refresh_interval())
    }
}
