use chrono::NaiveDateTime;

use crate::error::{AppError, AppResult};

/// One CSV row: a timestamp and one value per series column.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    /// Aligned with [`SeriesTable::columns`]; `None` marks a gap
    pub values: Vec<Option<f64>>,
}

/// Parsed contents of one CSV data source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTable {
    columns: Vec<String>,
    rows: Vec<Sample>,
}

impl SeriesTable {
    /// Parse a CSV document with a header row.
    ///
    /// `x_column` names the timestamp column, parsed with `x_format`
    /// (local wall-clock time). Every other column must hold numbers; empty
    /// cells and the `None`/`null`/`NaN` placeholders written by the station
    /// exporter are gaps.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedCsv` if the header lacks `x_column` or a row
    /// holds an unparseable timestamp or value, and `AppError::Csv` for
    /// reader-level failures such as a row with the wrong number of fields.
    pub fn parse(data: &[u8], x_column: &str, x_format: &str) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let x_index = headers
            .iter()
            .position(|h| h == x_column)
            .ok_or_else(|| AppError::MalformedCsv(format!("missing '{x_column}' column")))?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != x_index)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);

            let raw_time = record.get(x_index).unwrap_or_default();
            let timestamp = NaiveDateTime::parse_from_str(raw_time, x_format).map_err(|e| {
                AppError::MalformedCsv(format!("line {line}: bad timestamp {raw_time:?}: {e}"))
            })?;

            let values = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != x_index)
                .map(|(_, cell)| parse_cell(cell, line))
                .collect::<AppResult<Vec<_>>>()?;

            rows.push(Sample { timestamp, values });
        }

        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Sample] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First and last timestamps, in file order.
    #[must_use]
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    /// Most recent non-gap value of `key`.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<(NaiveDateTime, f64)> {
        let index = self.columns.iter().position(|c| c == key)?;
        self.rows
            .iter()
            .rev()
            .find_map(|row| row.values.get(index).copied().flatten().map(|v| (row.timestamp, v)))
    }
}

fn parse_cell(cell: &str, line: u64) -> AppResult<Option<f64>> {
    if cell.is_empty() || ["none", "null", "nan"].contains(&cell.to_lowercase().as_str()) {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| AppError::MalformedCsv(format!("line {line}: bad value {cell:?}: {e}")))
}
