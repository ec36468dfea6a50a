use std::path::Path;

use ordered_float::OrderedFloat;
use plotters::prelude::*;
use tracing::info;

use super::{
    draw_borders, draw_choropleth_figure, draw_title, pixel_frame, render_error, report_unmatched,
    unmatched_codes, RenderSummary,
};
use crate::colorscale::ColorScale;
use crate::config::{BubbleStyle, ChoroplethStyle};
use crate::error::{MapError, Result};
use crate::geometry::BorderGeometry;
use crate::models::IndicatorTable;
use crate::output::ensure_parent;

/// Color each country by its value and save the figure as a PNG.
///
/// Countries are joined to borders by ISO-3 code. Codes missing from the
/// geometry are reported in the summary and simply not drawn.
pub fn render_choropleth(
    table: &IndicatorTable,
    geometry: &BorderGeometry,
    style: &ChoroplethStyle,
    path: &Path,
) -> Result<RenderSummary> {
    let scale = ColorScale::named(&style.color_scale)?;
    let range = style.range.resolve(&table.value_column, table.value_extent())?;
    let values = table.values_by_code();
    let unmatched = unmatched_codes(table.rows.iter().map(|row| row.code.as_str()), geometry);

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    let colored = draw_choropleth_figure(&root, geometry, &values, style, &scale, &range, None)?;
    root.present().map_err(render_error)?;

    report_unmatched(path, &unmatched);
    info!(
        path = %path.display(),
        colored,
        min = range.min,
        max = range.max,
        "choropleth saved"
    );
    Ok(RenderSummary {
        path: path.to_path_buf(),
        drawn: colored,
        unmatched,
    })
}

/// Place a circle on each country's centroid, its area proportional to the
/// value, and save the figure as a PNG.
pub fn render_bubble_map(
    table: &IndicatorTable,
    geometry: &BorderGeometry,
    style: &BubbleStyle,
    path: &Path,
) -> Result<RenderSummary> {
    let bubbles = bubble_layout(table, geometry, style)?;
    let unmatched = unmatched_codes(table.rows.iter().map(|row| row.code.as_str()), geometry);

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    draw_bubble_figure(&root, geometry, &bubbles, style)?;
    root.present().map_err(render_error)?;

    report_unmatched(path, &unmatched);
    info!(path = %path.display(), bubbles = bubbles.len(), "bubble map saved");
    Ok(RenderSummary {
        path: path.to_path_buf(),
        drawn: bubbles.len(),
        unmatched,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bubble {
    pub(crate) code: String,
    pub(crate) center: (i32, i32),
    pub(crate) radius: i32,
}

/// Bubbles largest first, so smaller ones end up drawn on top.
pub(crate) fn bubble_layout(
    table: &IndicatorTable,
    geometry: &BorderGeometry,
    style: &BubbleStyle,
) -> Result<Vec<Bubble>> {
    let frame = pixel_frame(style.projection, style.size);
    let mut sized: Vec<(&str, f64)> = table
        .values_by_code()
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .collect();
    let largest = sized
        .iter()
        .map(|(_, value)| OrderedFloat(*value))
        .max()
        .ok_or_else(|| MapError::NoValues {
            column: table.value_column.clone(),
        })?
        .into_inner();

    sized.sort_by_key(|(code, value)| (std::cmp::Reverse(OrderedFloat(*value)), *code));

    Ok(sized
        .into_iter()
        .filter_map(|(code, value)| {
            let (lon, lat) = geometry.get(code)?.centroid()?;
            let radius = (style.max_radius * (value / largest).sqrt()).round().max(1.0) as i32;
            Some(Bubble {
                code: code.to_string(),
                center: frame.to_pixel(lon, lat),
                radius,
            })
        })
        .collect())
}

fn draw_bubble_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    geometry: &BorderGeometry,
    bubbles: &[Bubble],
    style: &BubbleStyle,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    let frame = pixel_frame(style.projection, style.size);
    draw_borders(root, geometry, &frame, |_| None)?;

    let (r, g, b) = style.fill;
    let fill = RGBColor(r, g, b).mix(style.opacity);
    for bubble in bubbles {
        root.draw(&Circle::new(bubble.center, bubble.radius, fill.filled()))
            .map_err(render_error)?;
        root.draw(&Circle::new(bubble.center, bubble.radius, WHITE.stroke_width(1)))
            .map_err(render_error)?;
    }

    if let Some(title) = &style.title {
        draw_title(root, title, style.size, (0.5, 0.9))?;
    }
    Ok(())
}
