use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::debug;

use crate::{error::DataLoadError, series::ResultSeries};

/// Integral values without decimals, anything else in its shortest form
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Renders the series as a right-aligned text table, header first
pub fn format_table(series: &ResultSeries) -> String {
    let rows = series
        .records()
        .iter()
        .map(|r| r.values().iter().map(|v| format_value(*v)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let widths = series
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|row| row[idx].len())
                .chain([column.len()])
                .max()
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();

    let header = series
        .columns()
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{column:>width$}"))
        .join(" ");
    let body = rows.iter().map(|row| {
        row.iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:>width$}"))
            .join(" ")
    });
    [header].into_iter().chain(body).join("\n")
}

/// CSV files in `dir` whose name starts with `prefix`, sorted by name
pub fn find_sources(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, DataLoadError> {
    if !dir.is_dir() {
        return Err(DataLoadError::NotFound(dir.to_path_buf()));
    }

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(".csv") {
            sources.push(entry.path());
        }
    }
    sources.sort();
    debug!("{} {prefix}*.csv files in {}", sources.len(), dir.display());
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BATCH_SIZE, THROUGHPUT, series::ResultRecord};

    #[test]
    fn values_format_like_the_table() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(1234.5), "1234.5");
        assert_eq!(format_value(-0.25), "-0.25");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }

    #[test]
    fn table_is_right_aligned() {
        let series = ResultSeries::new(
            "batch.csv",
            vec![BATCH_SIZE.to_owned(), THROUGHPUT.to_owned()],
            vec![
                ResultRecord::new(vec![1.0, 1000.0]),
                ResultRecord::new(vec![1024.0, 123456.5]),
            ],
        );
        let expected = "\
batchSize throughput_ops_per_sec
        1                   1000
     1024               123456.5";
        assert_eq!(format_table(&series), expected);
    }

    #[test]
    fn sources_are_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "client_scaling_4_servers_8_clients.csv",
            "batch_scaling_4_servers_4_clients.csv",
            "client_scaling_4_servers_4_clients.csv",
            "client_notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "numClients,throughput_ops_per_sec\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("client_dir.csv")).unwrap();

        let names = find_sources(dir.path(), "client")
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "client_scaling_4_servers_4_clients.csv",
                "client_scaling_4_servers_8_clients.csv",
            ]
        );
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = find_sources(Path::new("no_such_experiment_dir"), "batch").unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }
}
