use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Results file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("Error reading CSV file '{}'", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "Invalid value '{value}' in column '{column}' at row {row} of '{}'",
        .path.display()
    )]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Column '{column}' not found in '{}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Figure has no charts")]
    EmptyFigure,
    #[error("Chart '{0}' has no series")]
    EmptyChart(String),
    #[error("Series '{label}' has non-positive value {value} in log-scaled column '{column}'")]
    NonPositiveX {
        label: String,
        column: String,
        value: f64,
    },
    #[error("Unsupported output format: '{}'", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Viewer for '{}' exited with {status}", .path.display())]
    Viewer { path: PathBuf, status: String },
    #[error(transparent)]
    Data(#[from] DataLoadError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
