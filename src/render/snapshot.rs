use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::charts::ChartSpec;
use crate::data::SeriesTable;
use crate::render::{ChartBackend, ChartHandle};

/// Last rendered state of one chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub id: String,
    pub container: String,
    pub source_url: String,
    /// Options document the chart was generated with
    pub options: Value,
    pub rows: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    /// Legend name and formatted latest value, per series
    pub latest: Vec<(String, String)>,
    /// Data loads after generation
    pub reloads: u32,
    pub updated_at: DateTime<Utc>,
}

type SnapshotStore = Arc<RwLock<HashMap<String, ChartSnapshot>>>;

/// Headless backend: keeps an in-memory snapshot per chart and logs each
/// render, formatted with the chart's axis units.
#[derive(Clone, Default)]
pub struct SnapshotBackend {
    store: SnapshotStore,
}

impl SnapshotBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self, id: &str) -> Option<ChartSnapshot> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// All snapshots, ordered by chart id.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ChartSnapshot> {
        let mut all: Vec<_> = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl ChartBackend for SnapshotBackend {
    type Handle = SnapshotHandle;

    fn generate(
        &self,
        spec: &ChartSpec,
        source_url: &str,
        data: Option<SeriesTable>,
    ) -> SnapshotHandle {
        let mut snapshot = ChartSnapshot {
            id: spec.id.clone(),
            container: spec.container.clone(),
            source_url: source_url.to_string(),
            options: spec.options(source_url),
            rows: 0,
            first: None,
            last: None,
            latest: Vec::new(),
            reloads: 0,
            updated_at: Utc::now(),
        };
        if let Some(table) = &data {
            apply(&mut snapshot, spec, table);
        }

        tracing::info!(
            chart = %spec.id,
            container = %spec.container,
            rows = snapshot.rows,
            "Chart generated"
        );

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(spec.id.clone(), snapshot);

        SnapshotHandle {
            spec: spec.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

pub struct SnapshotHandle {
    spec: ChartSpec,
    store: SnapshotStore,
}

impl ChartHandle for SnapshotHandle {
    fn load(&mut self, data: SeriesTable) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let Some(snapshot) = store.get_mut(&self.spec.id) else {
            return;
        };

        apply(snapshot, &self.spec, &data);
        snapshot.reloads += 1;

        tracing::info!(
            chart = %self.spec.id,
            rows = snapshot.rows,
            last = ?snapshot.last,
            latest = ?snapshot.latest,
            "Chart data loaded"
        );
    }
}

fn apply(snapshot: &mut ChartSnapshot, spec: &ChartSpec, table: &SeriesTable) {
    let range = table.time_range();
    snapshot.rows = table.len();
    snapshot.first = range.map(|(first, _)| first);
    snapshot.last = range.map(|(_, last)| last);
    snapshot.latest = spec
        .series
        .iter()
        .filter_map(|binding| {
            let (_, value) = table.latest(&binding.key)?;
            let axis = spec.axis(binding.axis)?;
            Some((binding.name.clone(), axis.format_tick(value)))
        })
        .collect();
    snapshot.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, X_FORMAT};

    fn table(csv: &str) -> SeriesTable {
        SeriesTable::parse(csv.as_bytes(), "date", X_FORMAT).unwrap()
    }

    #[test]
    fn generate_then_load_updates_snapshot() {
        let backend = SnapshotBackend::new();
        let spec = ChartSpec::for_kind(ChartKind::Light, false);

        let mut handle = backend.generate(&spec, "http://station.local/light.csv", None);
        let empty = backend.snapshot("light").unwrap();
        assert_eq!(empty.container, "#light-chart");
        assert_eq!(empty.rows, 0);
        assert_eq!(empty.options["bindto"], "#light-chart");

        handle.load(table(
            "date,temperature,light\n2016-03-01 12:00:00,18.456,230\n2016-03-01 12:05:00,18.5,\n",
        ));
        let loaded = backend.snapshot("light").unwrap();
        assert_eq!(loaded.rows, 2);
        assert_eq!(loaded.reloads, 1);
        assert_eq!(
            loaded.latest,
            vec![
                ("External Temperature".to_string(), "18.5°C".to_string()),
                ("Light".to_string(), "230 lx".to_string()),
            ]
        );
    }

    #[test]
    fn snapshots_are_sorted_by_id() {
        let backend = SnapshotBackend::new();
        for kind in [ChartKind::Pressure, ChartKind::Light] {
            let spec = ChartSpec::for_kind(kind, true);
            let _handle = backend.generate(&spec, &spec.source_path, None);
        }
        let ids: Vec<_> = backend.snapshots().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["light", "pressure"]);
    }
}
