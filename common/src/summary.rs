use std::fmt;

use crate::{
    EFFICIENCY, THROUGHPUT,
    error::DataLoadError,
    series::ResultSeries,
    util::{format_table, format_value},
};

/// Row holding the largest value of a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub row: usize,
    pub x: f64,
    pub y: f64,
}

/// Finds the maximum of `y_column`. Ties go to the earliest row, NaN rows are skipped.
pub fn peak(
    series: &ResultSeries,
    x_column: &str,
    y_column: &str,
) -> Result<Option<Peak>, DataLoadError> {
    let points = series.points(x_column, y_column)?;
    Ok(points
        .into_iter()
        .enumerate()
        .filter(|(_, (_, y))| !y.is_nan())
        .fold(None, |best: Option<Peak>, (row, (x, y))| match best {
            Some(best) if best.y >= y => Some(best),
            _ => Some(Peak { row, x, y }),
        }))
}

/// How the x value of a peak reads in a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XPhrase {
    /// `with batch size 4`
    Prefix(&'static str),
    /// `with 4 clients`
    Suffix(&'static str),
}

impl XPhrase {
    fn describe(&self, x: f64) -> String {
        match self {
            XPhrase::Prefix(name) => format!("with {name} {}", format_value(x)),
            XPhrase::Suffix(name) => format!("with {} {name}", format_value(x)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakMetric {
    pub title: &'static str,
    pub column: String,
    pub unit: &'static str,
    pub x_phrase: XPhrase,
}

impl PeakMetric {
    pub fn throughput(x_phrase: XPhrase) -> Self {
        Self {
            title: "Peak throughput",
            column: THROUGHPUT.to_owned(),
            unit: "ops/s",
            x_phrase,
        }
    }

    /// Picks the wording for the well-known columns, a plain `Peak value` otherwise
    pub fn for_column(column: &str, x_phrase: XPhrase) -> Self {
        match column {
            THROUGHPUT => Self::throughput(x_phrase),
            EFFICIENCY => Self::efficiency(x_phrase),
            _ => Self {
                title: "Peak value",
                column: column.to_owned(),
                unit: "",
                x_phrase,
            },
        }
    }

    pub fn efficiency(x_phrase: XPhrase) -> Self {
        Self {
            title: "Best efficiency",
            column: EFFICIENCY.to_owned(),
            unit: "ops/s per client",
            x_phrase,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakLine {
    pub metric: PeakMetric,
    pub peak: Option<Peak>,
}

impl fmt::Display for PeakLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(peak) = &self.peak else {
            return write!(f, "{}: no data", self.metric.title);
        };
        write!(f, "{}: {:.2}", self.metric.title, peak.y)?;
        if !self.metric.unit.is_empty() {
            write!(f, " {}", self.metric.unit)?;
        }
        write!(f, " {}", self.metric.x_phrase.describe(peak.x))
    }
}

/// Text report printed after a chart is rendered
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub label: Option<String>,
    pub table: String,
    pub peaks: Vec<PeakLine>,
}

impl Summary {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => writeln!(f, "=== Results Summary: {label} ===")?,
            None => writeln!(f, "=== Results Summary ===")?,
        }
        writeln!(f, "{}", self.table)?;
        writeln!(f)?;
        for line in &self.peaks {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub fn summarize(
    series: &ResultSeries,
    x_column: &str,
    metrics: &[PeakMetric],
) -> Result<Summary, DataLoadError> {
    let peaks = metrics
        .iter()
        .map(|metric| {
            Ok(PeakLine {
                metric: metric.clone(),
                peak: peak(series, x_column, &metric.column)?,
            })
        })
        .collect::<Result<Vec<_>, DataLoadError>>()?;
    Ok(Summary {
        label: None,
        table: format_table(series),
        peaks,
    })
}
