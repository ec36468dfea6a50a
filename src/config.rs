use std::path::PathBuf;

use crate::projection::Projection;
use crate::range::RangeSpec;

pub const EDUCATION_CSV: &str = "total-government-expenditure-on-education-gdp.csv";
pub const DEVELOPMENT_CSV: &str = "human-development-index.csv";
pub const LEARNING_VS_EXPENDITURE_CSV: &str =
    "national-average-learning-outcomes-vs-government-expenditure-per-primary-student.csv";
pub const MINIMUM_OUTCOMES_CSV: &str =
    "share-of-students-achieving-no-or-minimum-learning-outcomes-by-expenditure-per-student.csv";
pub const FEMALE_POPULATION_CSV: &str = "share-population-female.csv";
pub const CONFLICT_DEATHS_CSV: &str = "deaths-conflict-terrorism-per-100000.csv";

pub const EDUCATION_COLUMN: &str = "Government expenditure on education, total (% of GDP)";
pub const DEVELOPMENT_COLUMN: &str = "Human Development Index (UNDP)";
pub const FEMALE_POPULATION_COLUMN: &str = "Population, female (% of total population)";
pub const CONFLICT_DEATHS_COLUMN: &str =
    "Deaths - Conflict and terrorism - Sex: Both - Age: All Ages (Rate)";
pub const CONFLICT_DEATHS_ALIAS: &str = "Deaths - Conflict and terrorism";

/// A CSV input and the indicator column read from it.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub file: String,
    pub value_column: String,
}

impl DatasetSpec {
    pub fn new(file: &str, value_column: &str) -> Self {
        DatasetSpec {
            file: file.to_string(),
            value_column: value_column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarLayout {
    pub thickness: u32,
    pub length: u32,
    pub ticks: usize,
    pub tick_suffix: Option<String>,
}

impl Default for ColorbarLayout {
    fn default() -> Self {
        ColorbarLayout {
            thickness: 20,
            length: 200,
            ticks: 5,
            tick_suffix: None,
        }
    }
}

/// Cosmetics of one choropleth. `title_x`/`title_y` are fractions of the
/// image, measured from the left and from the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethStyle {
    pub color_scale: String,
    pub range: RangeSpec,
    pub title: Option<String>,
    pub title_x: f64,
    pub title_y: f64,
    pub colorbar: ColorbarLayout,
    pub projection: Projection,
    pub size: (u32, u32),
}

impl ChoroplethStyle {
    pub fn new(color_scale: &str, range: RangeSpec) -> Self {
        ChoroplethStyle {
            color_scale: color_scale.to_string(),
            range,
            title: None,
            title_x: 0.5,
            title_y: 0.85,
            colorbar: ColorbarLayout::default(),
            projection: Projection::Equirectangular,
            size: (700, 500),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleStyle {
    pub title: Option<String>,
    pub projection: Projection,
    pub size: (u32, u32),
    /// Radius in pixels of the bubble for the largest value.
    pub max_radius: f64,
    pub fill: (u8, u8, u8),
    pub opacity: f64,
}

impl Default for BubbleStyle {
    fn default() -> Self {
        BubbleStyle {
            title: None,
            projection: Projection::NaturalEarth,
            size: (700, 500),
            max_radius: 20.0,
            fill: (0x63, 0x6e, 0xfa),
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStyle {
    pub map: ChoroplethStyle,
    /// Name shown on the slider, e.g. `Year=1990`.
    pub frame_field: String,
    pub frame_duration_ms: u32,
}

impl AnimationStyle {
    pub fn new(map: ChoroplethStyle) -> Self {
        AnimationStyle {
            map,
            frame_field: "Year".to_string(),
            frame_duration_ms: 500,
        }
    }
}

/// Everything a run needs. `Default` reproduces the stock set of maps.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub geometry_path: PathBuf,
    /// GeoJSON property holding the ISO-3 code.
    pub feature_key: String,
    pub output_dir: PathBuf,

    pub education: DatasetSpec,
    pub development: DatasetSpec,
    /// Loaded for completeness; no map uses them.
    pub learning_vs_expenditure_file: String,
    pub minimum_outcomes_file: String,
    pub female_population: DatasetSpec,
    pub conflict_deaths: DatasetSpec,
    pub conflict_deaths_alias: String,

    /// Earliest year kept for the development animation.
    pub animation_since_year: i32,

    pub education_bubbles: BubbleStyle,
    pub education_map: ChoroplethStyle,
    pub female_population_map: ChoroplethStyle,
    pub development_map: ChoroplethStyle,
    pub development_animation: AnimationStyle,
    pub conflict_deaths_animation: AnimationStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("../../Daten/OurWorldInData/"),
            geometry_path: PathBuf::from("../../Daten/countries.geojson"),
            feature_key: "ISO_A3".to_string(),
            output_dir: PathBuf::from("output"),

            education: DatasetSpec::new(EDUCATION_CSV, EDUCATION_COLUMN),
            development: DatasetSpec::new(DEVELOPMENT_CSV, DEVELOPMENT_COLUMN),
            learning_vs_expenditure_file: LEARNING_VS_EXPENDITURE_CSV.to_string(),
            minimum_outcomes_file: MINIMUM_OUTCOMES_CSV.to_string(),
            female_population: DatasetSpec::new(FEMALE_POPULATION_CSV, FEMALE_POPULATION_COLUMN),
            conflict_deaths: DatasetSpec::new(CONFLICT_DEATHS_CSV, CONFLICT_DEATHS_COLUMN),
            conflict_deaths_alias: CONFLICT_DEATHS_ALIAS.to_string(),

            animation_since_year: 1990,

            education_bubbles: BubbleStyle::default(),
            education_map: ChoroplethStyle::new("OrRd", RangeSpec::from_zero()).titled(EDUCATION_COLUMN),
            female_population_map: ChoroplethStyle::new("teal", RangeSpec::default())
                .titled(FEMALE_POPULATION_COLUMN),
            development_map: ChoroplethStyle::new("viridis", RangeSpec::default())
                .titled(DEVELOPMENT_COLUMN),
            development_animation: AnimationStyle::new(ChoroplethStyle::new(
                "viridis",
                RangeSpec::default(),
            )),
            conflict_deaths_animation: AnimationStyle::new(ChoroplethStyle::new(
                "YlOrRd",
                RangeSpec::max_over(10.0),
            )),
        }
    }
}

impl PipelineConfig {
    /// Config rooted at `base`: inputs in `base/data`, geometry at
    /// `base/data/countries.geojson`, outputs in `base/output`.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        PipelineConfig {
            data_dir: base.join("data"),
            geometry_path: base.join("data").join("countries.geojson"),
            output_dir: base.join("output"),
            ..PipelineConfig::default()
        }
    }

    pub fn input_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.output_dir.join("maps")
    }

    pub fn gifs_dir(&self) -> PathBuf {
        self.output_dir.join("gifs")
    }
}
