use std::collections::HashMap;

use itertools::Itertools;
use ordered_float::NotNan;
use serde::Deserialize;

// The three key columns every Our World in Data indicator export shares.
#[derive(Debug, Deserialize)]
pub(crate) struct ObservationKey {
    #[serde(rename = "Entity")]
    pub(crate) entity: String,
    #[serde(rename = "Code", default)]
    pub(crate) code: String,
    #[serde(rename = "Year")]
    pub(crate) year: i32,
}

/// One observation: a country (or aggregate region) in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub entity: String,
    /// ISO-3 code, empty for aggregates like "World".
    pub code: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// An indicator table projected onto `{Entity, Code, Year, <value_column>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    pub value_column: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn new(value_column: impl Into<String>, rows: Vec<IndicatorRow>) -> Self {
        Self {
            value_column: value_column.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rename_value(mut self, new_name: impl Into<String>) -> Self {
        self.value_column = new_name.into();
        self
    }

    /// Rows with `year >= cutoff`, order kept.
    pub fn since(&self, cutoff: i32) -> IndicatorTable {
        IndicatorTable {
            value_column: self.value_column.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.year >= cutoff)
                .cloned()
                .collect(),
        }
    }

    /// Value per code, for joining against geometry. When a code appears more
    /// than once the last row wins.
    pub fn values_by_code(&self) -> HashMap<&str, f64> {
        self.rows
            .iter()
            .filter(|row| !row.code.is_empty())
            .filter_map(|row| {
                let value = row.value.filter(|v| !v.is_nan())?;
                Some((row.code.as_str(), value))
            })
            .collect()
    }

    pub fn value_extent(&self) -> Option<(f64, f64)> {
        value_extent(self.rows.iter().map(|row| row.value))
    }

    /// Every row becomes part of the frame labelled with its year.
    pub fn to_frames(&self) -> FrameTable {
        FrameTable {
            value_column: self.value_column.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !row.code.is_empty())
                .map(|row| FrameRow {
                    frame: row.year.to_string(),
                    code: row.code.clone(),
                    value: row.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub frame: String,
    pub code: String,
    pub value: Option<f64>,
}

/// Input of the animated renderer: rows tagged with a discrete frame label.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    pub value_column: String,
    pub rows: Vec<FrameRow>,
}

impl FrameTable {
    /// Distinct labels in order of first appearance.
    pub fn frame_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.frame.as_str()).unique().collect()
    }

    /// Rows grouped by frame, groups in first-appearance order.
    pub fn frames(&self) -> Vec<(&str, Vec<&FrameRow>)> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut grouped: Vec<(&str, Vec<&FrameRow>)> = Vec::new();
        for row in &self.rows {
            let slot = *slots.entry(row.frame.as_str()).or_insert_with(|| {
                grouped.push((row.frame.as_str(), Vec::new()));
                grouped.len() - 1
            });
            grouped[slot].1.push(row);
        }
        grouped
    }

    pub fn value_extent(&self) -> Option<(f64, f64)> {
        value_extent(self.rows.iter().map(|row| row.value))
    }
}

/// Smallest and largest value, skipping missing and NaN entries.
pub fn value_extent(values: impl Iterator<Item = Option<f64>>) -> Option<(f64, f64)> {
    values
        .flatten()
        .filter_map(|v| NotNan::new(v).ok())
        .minmax()
        .into_option()
        .map(|(lo, hi)| (lo.into_inner(), hi.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, year: i32, value: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            entity: code.to_lowercase(),
            code: code.to_string(),
            year,
            value,
        }
    }

    #[test]
    fn extent_skips_missing_and_nan() {
        let values = vec![Some(3.0), None, Some(f64::NAN), Some(-1.0), Some(7.5)];
        assert_eq!(value_extent(values.into_iter()), Some((-1.0, 7.5)));
        assert_eq!(value_extent(vec![None, Some(f64::NAN)].into_iter()), None);
    }

    #[test]
    fn frames_follow_first_appearance() {
        let table = IndicatorTable::new(
            "v",
            vec![
                row("AAA", 2001, Some(1.0)),
                row("AAA", 2000, Some(2.0)),
                row("BBB", 2000, None),
                row("", 2000, Some(9.0)),
            ],
        );
        let frames = table.to_frames();
        assert_eq!(frames.frame_labels(), vec!["2001", "2000"]);

        let grouped = frames.frames();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[1].0, "2000");
        let codes: Vec<&str> = grouped[1].1.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["AAA", "BBB"]);
    }

    #[test]
    fn since_and_rename() {
        let table = IndicatorTable::new(
            "long name",
            vec![row("AAA", 1989, Some(1.0)), row("AAA", 1990, Some(2.0))],
        );
        let recent = table.since(1990).rename_value("short");
        assert_eq!(recent.value_column, "short");
        assert_eq!(recent.rows, vec![row("AAA", 1990, Some(2.0))]);
    }
}
