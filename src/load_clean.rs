use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{MapError, Result};
use crate::models::{IndicatorRow, IndicatorTable, ObservationKey};

// Cells read as missing, besides the empty cell.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || MISSING_MARKERS.contains(&raw)
}

/// A CSV file held in memory: header names and records in file order.
#[derive(Debug, Clone)]
pub struct Table {
    pub source: PathBuf,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

// Load Data
pub fn load_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_error = |source| MapError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(csv_error)?);
    }

    debug!(path = %path.display(), rows = records.len(), "loaded table");
    Ok(Table {
        source: path.to_path_buf(),
        headers,
        records,
    })
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| MapError::MissingColumn {
                path: self.source.clone(),
                column: name.to_string(),
            })
    }

    /// Project onto `{Entity, Code, Year, value_column}`. Empty cells, the
    /// usual missing markers (`NA`, `N/A`, `null`, ...) and NaN become `None`.
    pub fn indicator(&self, value_column: &str) -> Result<IndicatorTable> {
        for key in ["Entity", "Code", "Year"] {
            self.column(key)?;
        }
        let value_index = self.column(value_column)?;

        let mut rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let key: ObservationKey = record
                .deserialize(Some(&self.headers))
                .map_err(|source| MapError::Csv {
                    path: self.source.clone(),
                    source,
                })?;

            let raw = record.get(value_index).unwrap_or("").trim();
            let value = if is_missing(raw) {
                None
            } else {
                let parsed = raw.parse::<f64>().map_err(|_| MapError::InvalidField {
                    path: self.source.clone(),
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    column: value_column.to_string(),
                    value: raw.to_string(),
                })?;
                Some(parsed).filter(|v| !v.is_nan())
            };

            rows.push(IndicatorRow {
                entity: key.entity,
                code: key.code,
                year: key.year,
                value,
            });
        }

        Ok(IndicatorTable::new(value_column, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "Entity,Code,Year,Human Development Index (UNDP)\n";

    #[test]
    fn keeps_row_order_and_empty_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hdi.csv");
        fs::write(
            &path,
            format!(
                "{HEADER}Norway,NOR,2021,0.961\nWorld,,2021,0.732\nChad,TCD,2021,\n\
                 Mali,MLI,2021,NA\nNiger,NER,2021,N/A\nPeru,PER,2021,nan\n\
                 Oman,OMN,2021,null\nCuba,CUB,2021,#N/A\nFiji,FJI,2021,NaN\n"
            ),
        )
        .unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 9);

        let indicator = table.indicator("Human Development Index (UNDP)").unwrap();
        let codes: Vec<&str> = indicator.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["NOR", "", "TCD", "MLI", "NER", "PER", "OMN", "CUB", "FJI"]);
        assert_eq!(indicator.rows[0].value, Some(0.961));
        for row in &indicator.rows[2..] {
            assert_eq!(row.value, None, "{} should be missing", row.code);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }

    #[test]
    fn absent_column_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hdi.csv");
        fs::write(&path, format!("{HEADER}Norway,NOR,2021,0.961\n")).unwrap();

        let table = load_table(&path).unwrap();
        match table.indicator("Population, female (% of total population)") {
            Err(MapError::MissingColumn { column, .. }) => {
                assert_eq!(column, "Population, female (% of total population)")
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hdi.csv");
        fs::write(&path, format!("{HEADER}Norway,NOR,2021,0.961\nChad,TCD,2021,high\n")).unwrap();

        let table = load_table(&path).unwrap();
        match table.indicator("Human Development Index (UNDP)") {
            Err(MapError::InvalidField { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "high");
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }
}
