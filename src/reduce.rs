use std::collections::HashMap;

use crate::models::IndicatorTable;

/// Keep, per country code, only the rows from that code's most recent year.
///
/// Ties on the maximum year are all kept, and kept rows stay in their input
/// order. Rows without a code belong to no group and are dropped.
pub fn latest_year_per_code(table: &IndicatorTable) -> IndicatorTable {
    let mut latest: HashMap<&str, i32> = HashMap::new();
    for row in table.rows.iter().filter(|row| !row.code.is_empty()) {
        latest
            .entry(row.code.as_str())
            .and_modify(|year| *year = (*year).max(row.year))
            .or_insert(row.year);
    }

    let rows = table
        .rows
        .iter()
        .filter(|row| latest.get(row.code.as_str()) == Some(&row.year))
        .cloned()
        .collect();

    IndicatorTable::new(table.value_column.clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorRow;

    fn row(code: &str, year: i32, value: f64) -> IndicatorRow {
        IndicatorRow {
            entity: format!("Country {code}"),
            code: code.to_string(),
            year,
            value: Some(value),
        }
    }

    fn table(rows: Vec<IndicatorRow>) -> IndicatorTable {
        IndicatorTable::new("value", rows)
    }

    #[test]
    fn keeps_latest_year_per_code() {
        let input = table(vec![
            row("AAA", 1990, 0.5),
            row("BBB", 1990, 0.3),
            row("BBB", 1991, 0.4),
        ]);
        let reduced = latest_year_per_code(&input);
        assert_eq!(reduced.rows, vec![row("AAA", 1990, 0.5), row("BBB", 1991, 0.4)]);
    }

    #[test]
    fn ties_are_all_retained_in_order() {
        let input = table(vec![
            row("AAA", 2020, 1.0),
            row("BBB", 2019, 2.0),
            row("AAA", 2019, 3.0),
            row("AAA", 2020, 4.0),
        ]);
        let reduced = latest_year_per_code(&input);
        assert_eq!(
            reduced.rows,
            vec![row("AAA", 2020, 1.0), row("BBB", 2019, 2.0), row("AAA", 2020, 4.0)]
        );
    }

    #[test]
    fn every_code_survives_with_its_max_year() {
        let input = table(vec![
            row("CCC", 2001, 1.0),
            row("AAA", 1995, 1.0),
            row("CCC", 2010, 1.0),
            row("BBB", 2003, 1.0),
            row("CCC", 2005, 1.0),
            row("AAA", 1999, 1.0),
        ]);
        let reduced = latest_year_per_code(&input);

        for code in ["AAA", "BBB", "CCC"] {
            let max_year = input.rows.iter().filter(|r| r.code == code).map(|r| r.year).max();
            let kept: Vec<i32> = reduced.rows.iter().filter(|r| r.code == code).map(|r| r.year).collect();
            assert!(!kept.is_empty(), "{code} vanished");
            assert!(kept.iter().all(|y| Some(*y) == max_year));
        }
    }

    #[test]
    fn reduction_is_idempotent() {
        let input = table(vec![
            row("AAA", 2000, 1.0),
            row("AAA", 2001, 2.0),
            row("BBB", 2001, 3.0),
            row("BBB", 2001, 4.0),
        ]);
        let once = latest_year_per_code(&input);
        let twice = latest_year_per_code(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn rows_without_code_are_dropped() {
        let mut world = row("", 2021, 9.0);
        world.entity = "World".to_string();
        let input = table(vec![world, row("AAA", 2021, 1.0)]);
        let reduced = latest_year_per_code(&input);
        assert_eq!(reduced.rows, vec![row("AAA", 2021, 1.0)]);
    }
}
