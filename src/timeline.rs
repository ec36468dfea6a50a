use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};
use ndarray::Array2;

use crate::error::{MapError, Result};
use crate::models::{FrameRow, FrameTable, IndicatorTable};

/// Dense (Year, Code) grid. `values[[y, c]]` is NaN where the source had no
/// observation.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    pub value_column: String,
    pub years: Vec<i32>,
    pub codes: Vec<String>,
    pub values: Array2<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub code: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Reindex to every year between the first and last observed one, for every
/// code, filling holes with NaN.
pub fn complete_time_axis(table: &IndicatorTable) -> Result<TimeGrid> {
    let observed = || table.rows.iter().filter(|row| !row.code.is_empty());

    let years: Vec<i32> = match observed().map(|row| row.year).minmax() {
        MinMaxResult::NoElements => Vec::new(),
        MinMaxResult::OneElement(year) => vec![year],
        MinMaxResult::MinMax(first, last) => (first..=last).collect(),
    };
    let codes: Vec<String> = observed()
        .map(|row| row.code.clone())
        .sorted()
        .dedup()
        .collect();

    let code_slot: HashMap<&str, usize> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.as_str(), i))
        .collect();
    let first_year = years.first().copied().unwrap_or_default();

    let mut values = Array2::from_elem((years.len(), codes.len()), f64::NAN);
    let mut seen = Array2::from_elem((years.len(), codes.len()), false);
    for row in observed() {
        let y = (row.year - first_year) as usize;
        let c = code_slot[row.code.as_str()];
        if seen[[y, c]] {
            return Err(MapError::DuplicateObservation {
                code: row.code.clone(),
                year: row.year,
            });
        }
        seen[[y, c]] = true;
        values[[y, c]] = row.value.unwrap_or(f64::NAN);
    }

    Ok(TimeGrid {
        value_column: table.value_column.clone(),
        years,
        codes,
        values,
    })
}

impl TimeGrid {
    /// Code-major, year-minor.
    pub fn rows(&self) -> impl Iterator<Item = GridRow> + '_ {
        self.codes.iter().enumerate().flat_map(move |(c, code)| {
            self.years.iter().enumerate().map(move |(y, year)| {
                let value = self.values[[y, c]];
                GridRow {
                    code: code.clone(),
                    year: *year,
                    value: (!value.is_nan()).then_some(value),
                }
            })
        })
    }

    /// Number of cells holding a real observation.
    pub fn observed(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Frame labels are the bare year text, since the animation slider needs
    /// discrete labels.
    pub fn to_frames(&self) -> FrameTable {
        FrameTable {
            value_column: self.value_column.clone(),
            rows: self
                .rows()
                .map(|row| FrameRow {
                    frame: row.year.to_string(),
                    code: row.code,
                    value: row.value,
                })
                .collect(),
        }
    }
}
