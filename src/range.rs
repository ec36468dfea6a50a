use tracing::warn;

use crate::error::{MapError, Result};

/// One end of a color range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBound {
    DataMin,
    DataMax,
    /// Data maximum divided by the given factor. Pulls the top of the scale
    /// down so a few outliers do not wash out everything else. If that lands
    /// at or below the lower bound, the plain data maximum is used instead.
    DataMaxOver(f64),
    Fixed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub lower: RangeBound,
    pub upper: RangeBound,
}

impl Default for RangeSpec {
    fn default() -> Self {
        RangeSpec {
            lower: RangeBound::DataMin,
            upper: RangeBound::DataMax,
        }
    }
}

impl RangeSpec {
    pub fn from_zero() -> Self {
        RangeSpec {
            lower: RangeBound::Fixed(0.0),
            upper: RangeBound::DataMax,
        }
    }

    pub fn max_over(divisor: f64) -> Self {
        RangeSpec {
            lower: RangeBound::DataMin,
            upper: RangeBound::DataMaxOver(divisor),
        }
    }

    /// Turn the spec into concrete numbers given the data extent.
    pub fn resolve(&self, column: &str, extent: Option<(f64, f64)>) -> Result<ValueRange> {
        let needs_data = |bound: RangeBound| !matches!(bound, RangeBound::Fixed(_));
        let (data_min, data_max) = match extent {
            Some(extent) => extent,
            None if needs_data(self.lower) || needs_data(self.upper) => {
                return Err(MapError::NoValues {
                    column: column.to_string(),
                })
            }
            None => (f64::NAN, f64::NAN),
        };

        let pick = |bound: RangeBound| match bound {
            RangeBound::DataMin => data_min,
            RangeBound::DataMax => data_max,
            RangeBound::DataMaxOver(divisor) => data_max / divisor,
            RangeBound::Fixed(value) => value,
        };
        let (min, mut max) = (pick(self.lower), pick(self.upper));
        if let RangeBound::DataMaxOver(divisor) = self.upper {
            if max.is_finite() && max <= min && data_max > min {
                warn!(
                    column,
                    divisor,
                    min,
                    max,
                    data_max,
                    "scaled maximum below minimum, using data maximum"
                );
                max = data_max;
            }
        }

        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(MapError::EmptyValueRange {
                column: column.to_string(),
                min,
                max,
            });
        }
        Ok(ValueRange { min, max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Position of `value` within the range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// `count` evenly spaced values from min to max inclusive.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => (0..count)
                .map(|i| self.min + (self.max - self.min) * i as f64 / (count - 1) as f64)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spans_the_data() {
        let range = RangeSpec::default().resolve("v", Some((0.2, 0.9))).unwrap();
        assert_eq!(range, ValueRange { min: 0.2, max: 0.9 });
    }

    #[test]
    fn tighter_upper_bound_for_outliers() {
        let range = RangeSpec::max_over(10.0).resolve("deaths", Some((0.0, 250.0))).unwrap();
        assert_eq!(range, ValueRange { min: 0.0, max: 25.0 });
        assert_eq!(range.normalize(100.0), 1.0);
        assert_eq!(range.normalize(12.5), 0.5);
    }

    #[test]
    fn scaled_maximum_below_minimum_falls_back_to_data_max() {
        let range = RangeSpec::max_over(10.0).resolve("deaths", Some((0.5, 4.0))).unwrap();
        assert_eq!(range, ValueRange { min: 0.5, max: 4.0 });
    }

    #[test]
    fn from_zero_ignores_data_min() {
        let range = RangeSpec::from_zero().resolve("v", Some((2.0, 8.0))).unwrap();
        assert_eq!(range, ValueRange { min: 0.0, max: 8.0 });
    }

    #[test]
    fn degenerate_range_is_an_error() {
        assert!(matches!(
            RangeSpec::default().resolve("flat", Some((3.0, 3.0))),
            Err(MapError::EmptyValueRange { .. })
        ));
        assert!(matches!(
            RangeSpec::default().resolve("empty", None),
            Err(MapError::NoValues { .. })
        ));
        assert!(matches!(
            RangeSpec::max_over(0.0).resolve("v", Some((1.0, 5.0))),
            Err(MapError::EmptyValueRange { .. })
        ));
    }

    #[test]
    fn fixed_range_needs_no_data() {
        let spec = RangeSpec {
            lower: RangeBound::Fixed(0.0),
            upper: RangeBound::Fixed(1.0),
        };
        assert_eq!(spec.resolve("v", None).unwrap().ticks(3), vec![0.0, 0.5, 1.0]);
    }
}
