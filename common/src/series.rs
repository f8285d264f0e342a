use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{EFFICIENCY, NUM_CLIENTS, THROUGHPUT, error::DataLoadError};

/// One row of a results table. Values are addressed through the owning
/// [`ResultSeries`] schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    values: Vec<f64>,
}

impl ResultRecord {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Records loaded from a single source, all sharing one set of columns
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSeries {
    source: PathBuf,
    label: String,
    columns: Vec<String>,
    records: Vec<ResultRecord>,
}

impl ResultSeries {
    /// The label defaults to the file stem of `source`
    pub fn new(source: impl Into<PathBuf>, columns: Vec<String>, records: Vec<ResultRecord>) -> Self {
        let source = source.into();
        let label = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source,
            label,
            columns,
            records,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize, DataLoadError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DataLoadError::MissingColumn {
                path: self.source.clone(),
                column: column.to_owned(),
            })
    }

    pub fn column(&self, column: &str) -> Result<Vec<f64>, DataLoadError> {
        let idx = self.column_index(column)?;
        Ok(self.records.iter().map(|r| r.values[idx]).collect())
    }

    /// (x, y) pairs in load order
    pub fn points(&self, x_column: &str, y_column: &str) -> Result<Vec<(f64, f64)>, DataLoadError> {
        let x = self.column_index(x_column)?;
        let y = self.column_index(y_column)?;
        Ok(self
            .records
            .iter()
            .map(|r| (r.values[x], r.values[y]))
            .collect())
    }

    /// Appends `column`, replacing it if the schema already has one by that name
    pub fn push_column(&mut self, column: &str, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.records.len());
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => {
                for (record, value) in self.records.iter_mut().zip(values) {
                    record.values[idx] = value;
                }
            }
            None => {
                self.columns.push(column.to_owned());
                for (record, value) in self.records.iter_mut().zip(values) {
                    record.values.push(value);
                }
            }
        }
    }
}

pub fn load_series(path: impl AsRef<Path>) -> Result<ResultSeries, DataLoadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let csv_error = |source: csv::Error| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    let columns = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    debug!("{} columns: {columns:?}", path.display());

    let mut records = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let values = record
            .iter()
            .zip(&columns)
            .map(|(field, column)| {
                field
                    .parse::<f64>()
                    .map_err(|_| DataLoadError::InvalidValue {
                        path: path.to_path_buf(),
                        row: row + 1,
                        column: column.clone(),
                        value: field.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        records.push(ResultRecord::new(values));
    }

    debug!("{} rows in {}", records.len(), path.display());
    if records.is_empty() {
        warn!("{} has a header but no data rows", path.display());
    }
    Ok(ResultSeries::new(path, columns, records))
}

/// Loads every source, keeping the order they were given in
pub fn load_all<I, P>(paths: I) -> Result<Vec<ResultSeries>, DataLoadError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(load_series).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedColumn {
    /// `throughput_ops_per_sec / numClients`
    Efficiency,
}

impl DerivedColumn {
    pub fn name(&self) -> &'static str {
        match self {
            DerivedColumn::Efficiency => EFFICIENCY,
        }
    }
}

/// Returns a copy of `series` with the derived column appended. A zero
/// client count is not rejected and yields `inf` or `NaN`.
pub fn compute_derived_column(
    series: &ResultSeries,
    op: DerivedColumn,
) -> Result<ResultSeries, DataLoadError> {
    let values = match op {
        DerivedColumn::Efficiency => {
            let throughput = series.column(THROUGHPUT)?;
            let clients = series.column(NUM_CLIENTS)?;
            if clients.iter().any(|c| *c == 0.0) {
                warn!(
                    "{} has a zero client count, efficiency is undefined for that row",
                    series.source().display()
                );
            }
            throughput
                .iter()
                .zip(&clients)
                .map(|(t, c)| t / c)
                .collect::<Vec<_>>()
        }
    };

    let mut derived = series.clone();
    derived.push_column(op.name(), values);
    Ok(derived)
}
