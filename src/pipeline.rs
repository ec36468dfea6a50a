use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{info, info_span};

use crate::config::{DatasetSpec, PipelineConfig};
use crate::error::Result;
use crate::geometry::BorderGeometry;
use crate::load_clean::{load_table, Table};
use crate::models::IndicatorTable;
use crate::output::ensure_dirs;
use crate::reduce::latest_year_per_code;
use crate::render::{render_animation, render_bubble_map, render_choropleth, RenderSummary};
use crate::timeline::complete_time_axis;

pub const BUBBLE_EDUCATION_PNG: &str = "bubble_expenditure_education_PercentageGDP.png";
pub const HEATMAP_EDUCATION_PNG: &str = "heatmap_expenditure_education_PercentageGDP.png";
pub const HEATMAP_FEMALE_PNG: &str = "heatmap_pop_females.png";
pub const HEATMAP_DEVELOPMENT_PNG: &str = "heatmap_developments.png";
pub const ANIMATION_DEVELOPMENT_HTML: &str = "heatmap_developments.html";
pub const ANIMATION_CONFLICT_HTML: &str = "heatmap_deaths_conflicts.html";

/// All six input tables, as loaded.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub education: IndicatorTable,
    pub development: IndicatorTable,
    pub learning_vs_expenditure: Table,
    pub minimum_outcomes: Table,
    pub female_population: IndicatorTable,
    pub conflict_deaths: IndicatorTable,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub outputs: Vec<RenderSummary>,
    pub unmatched: BTreeSet<String>,
}

impl PipelineReport {
    fn record(&mut self, summary: RenderSummary) {
        self.unmatched.extend(summary.unmatched.iter().cloned());
        self.outputs.push(summary);
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.outputs.iter().map(|summary| summary.path.clone()).collect()
    }
}

fn load_raw(config: &PipelineConfig, file: &str) -> Result<Table> {
    let table = load_table(&config.input_path(file))?;
    info!(file, rows = table.len(), "loaded");
    Ok(table)
}

fn load_indicator(config: &PipelineConfig, dataset: &DatasetSpec) -> Result<IndicatorTable> {
    load_raw(config, &dataset.file)?.indicator(&dataset.value_column)
}

pub fn load_inputs(config: &PipelineConfig) -> Result<Inputs> {
    let _span = info_span!("load", dir = %config.data_dir.display()).entered();
    Ok(Inputs {
        education: load_indicator(config, &config.education)?,
        development: load_indicator(config, &config.development)?,
        learning_vs_expenditure: load_raw(config, &config.learning_vs_expenditure_file)?,
        minimum_outcomes: load_raw(config, &config.minimum_outcomes_file)?,
        female_population: load_indicator(config, &config.female_population)?,
        conflict_deaths: load_indicator(config, &config.conflict_deaths)?
            .rename_value(config.conflict_deaths_alias.clone()),
    })
}

/// Load, reduce, render. Outputs are written under `config.output_dir`.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let inputs = load_inputs(config)?;

    // Step 1: most recent year per country
    let education_latest = latest_year_per_code(&inputs.education);
    let female_latest = latest_year_per_code(&inputs.female_population);
    let development_latest = latest_year_per_code(&inputs.development);
    info!(
        education = education_latest.len(),
        female_population = female_latest.len(),
        development = development_latest.len(),
        "reduced to latest year per code"
    );

    // Step 2: output folders and borders
    let maps_dir = config.maps_dir();
    let gifs_dir = config.gifs_dir();
    ensure_dirs(&[&maps_dir, &gifs_dir])?;
    let geometry = BorderGeometry::load(&config.geometry_path, &config.feature_key)?;

    let mut report = PipelineReport::default();

    // Step 3: static maps
    {
        let _span = info_span!("static").entered();
        report.record(render_bubble_map(
            &education_latest,
            &geometry,
            &config.education_bubbles,
            &maps_dir.join(BUBBLE_EDUCATION_PNG),
        )?);
        report.record(render_choropleth(
            &education_latest,
            &geometry,
            &config.education_map,
            &maps_dir.join(HEATMAP_EDUCATION_PNG),
        )?);
        report.record(render_choropleth(
            &female_latest,
            &geometry,
            &config.female_population_map,
            &maps_dir.join(HEATMAP_FEMALE_PNG),
        )?);
        report.record(render_choropleth(
            &development_latest,
            &geometry,
            &config.development_map,
            &maps_dir.join(HEATMAP_DEVELOPMENT_PNG),
        )?);
    }

    // Step 4: animations
    {
        let _span = info_span!("animated").entered();
        let development_grid = complete_time_axis(&inputs.development.since(config.animation_since_year))?;
        info!(
            years = development_grid.years.len(),
            codes = development_grid.codes.len(),
            observed = development_grid.observed(),
            "completed time axis"
        );
        report.record(render_animation(
            &development_grid.to_frames(),
            &geometry,
            &config.development_animation,
            &gifs_dir.join(ANIMATION_DEVELOPMENT_HTML),
        )?);
        report.record(render_animation(
            &inputs.conflict_deaths.to_frames(),
            &geometry,
            &config.conflict_deaths_animation,
            &gifs_dir.join(ANIMATION_CONFLICT_HTML),
        )?);
    }

    Ok(report)
}
