use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Once;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingErrorKind;
use tracing::warn;

use crate::colorscale::ColorScale;
use crate::config::{ChoroplethStyle, ColorbarLayout};
use crate::error::{MapError, Result};
use crate::geometry::BorderGeometry;
use crate::projection::{PixelFrame, Projection};
use crate::range::ValueRange;

pub mod animation;
pub mod static_map;

pub use animation::render_animation;
pub use static_map::{render_bubble_map, render_choropleth};

const BASE_FILL: RGBColor = RGBColor(229, 229, 229);
const BORDER: RGBColor = RGBColor(255, 255, 255);
const INK: RGBColor = RGBColor(42, 63, 95);

// Plot margins in pixels: left, right, top, bottom.
const MARGINS: (u32, u32, u32, u32) = (80, 80, 100, 80);

/// What a render call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub path: PathBuf,
    /// Countries colored, or bubbles drawn.
    pub drawn: usize,
    /// Data codes with no matching border, left uncolored.
    pub unmatched: Vec<String>,
}

pub(crate) fn render_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> MapError {
    MapError::Render(err.to_string())
}

/// Codes present in the data but absent from the geometry, sorted.
pub(crate) fn unmatched_codes<'a>(
    codes: impl Iterator<Item = &'a str>,
    geometry: &BorderGeometry,
) -> Vec<String> {
    codes
        .filter(|code| !code.is_empty() && !geometry.contains(code))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn report_unmatched(output: &std::path::Path, unmatched: &[String]) {
    if !unmatched.is_empty() {
        warn!(
            output = %output.display(),
            count = unmatched.len(),
            codes = %unmatched.join(","),
            "codes without border geometry left uncolored"
        );
    }
}

/// Pixel rectangle the map is fitted into.
pub(crate) fn plot_area(size: (u32, u32)) -> ((i32, i32), (u32, u32)) {
    let (left, right, top, bottom) = MARGINS;
    let width = size.0.saturating_sub(left + right).max(1);
    let height = size.1.saturating_sub(top + bottom).max(1);
    ((left as i32, top as i32), (width, height))
}

pub(crate) fn pixel_frame(projection: Projection, size: (u32, u32)) -> PixelFrame {
    let (origin, plot) = plot_area(size);
    PixelFrame::fit(projection, origin, plot)
}

static FONT_WARNING: Once = Once::new();

// Text needs a system font on raster backends. Without one the map is still
// worth writing, so font failures only drop the label.
pub(crate) fn draw_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    pos: (i32, i32),
    style: &TextStyle,
) -> Result<()> {
    match area.draw(&Text::new(text, pos, style.clone())) {
        Ok(()) => Ok(()),
        Err(DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(err))) => {
            FONT_WARNING.call_once(|| warn!(error = %err, "no usable font, labels are skipped"));
            Ok(())
        }
        Err(err) => Err(render_error(err)),
    }
}

/// Fill every border polygon, colored by `fill_for(code)` or the base fill.
/// Returns how many countries got a data color on at least one visible polygon.
pub(crate) fn draw_borders<DB, F>(
    area: &DrawingArea<DB, Shift>,
    geometry: &BorderGeometry,
    frame: &PixelFrame,
    fill_for: F,
) -> Result<usize>
where
    DB: DrawingBackend,
    F: Fn(&str) -> Option<RGBColor>,
{
    let mut colored = 0;
    for (code, shape) in geometry.iter() {
        let fill = fill_for(code);
        let mut drawn = false;
        // interior rings are not punched out; enclaves are features of their own
        for polygon in &shape.polygons {
            let Some(pixels) = frame.ring_to_pixels(polygon.exterior()) else {
                continue;
            };
            area.draw(&Polygon::new(pixels.clone(), fill.unwrap_or(BASE_FILL).filled()))
                .map_err(render_error)?;
            area.draw(&PathElement::new(pixels, BORDER.stroke_width(1)))
                .map_err(render_error)?;
            drawn = true;
        }
        if drawn && fill.is_some() {
            colored += 1;
        }
    }
    Ok(colored)
}

fn format_tick(value: f64, range: &ValueRange, suffix: Option<&str>) -> String {
    let span = range.max - range.min;
    let decimals = if span >= 10.0 {
        0
    } else if span >= 1.0 {
        1
    } else {
        2
    };
    format!("{:.*}{}", decimals, value, suffix.unwrap_or(""))
}

/// Vertical colorbar with its top-left corner at `origin`.
pub(crate) fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    origin: (i32, i32),
    layout: &ColorbarLayout,
    scale: &ColorScale,
    range: &ValueRange,
) -> Result<()> {
    let (x, top) = origin;
    let thickness = layout.thickness as i32;
    let length = layout.length.max(2) as i32;

    for i in 0..length {
        let t = 1.0 - i as f64 / (length - 1) as f64;
        area.draw(&Rectangle::new(
            [(x, top + i), (x + thickness, top + i + 1)],
            scale.color_at(t).filled(),
        ))
        .map_err(render_error)?;
    }
    area.draw(&Rectangle::new(
        [(x, top), (x + thickness, top + length)],
        INK.stroke_width(1),
    ))
    .map_err(render_error)?;

    let tick_style = ("sans-serif", 12)
        .into_font()
        .color(&INK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for value in range.ticks(layout.ticks) {
        let y = top + ((1.0 - range.normalize(value)) * (length - 1) as f64).round() as i32;
        area.draw(&PathElement::new(
            vec![(x + thickness, y), (x + thickness + 4, y)],
            INK.stroke_width(1),
        ))
        .map_err(render_error)?;
        let label = format_tick(value, range, layout.tick_suffix.as_deref());
        draw_label(area, &label, (x + thickness + 6, y), &tick_style)?;
    }
    Ok(())
}

/// Whole choropleth figure: background, title, colored borders, colorbar and
/// an optional caption in the lower-left corner. Returns colored countries.
pub(crate) fn draw_choropleth_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    geometry: &BorderGeometry,
    values: &HashMap<&str, f64>,
    style: &ChoroplethStyle,
    scale: &ColorScale,
    range: &ValueRange,
    caption: Option<&str>,
) -> Result<usize> {
    root.fill(&WHITE).map_err(render_error)?;

    let frame = pixel_frame(style.projection, style.size);
    let colored = draw_borders(root, geometry, &frame, |code| {
        values.get(code).map(|value| scale.color_at(range.normalize(*value)))
    })?;

    let ((left, top), (width, height)) = plot_area(style.size);
    let bar_x = left + width as i32 + (width as f64 * 0.02).round() as i32;
    let bar_top = top + (height as i32 - style.colorbar.length as i32) / 2;
    draw_colorbar(root, (bar_x, bar_top), &style.colorbar, scale, range)?;

    if let Some(title) = &style.title {
        draw_title(root, title, style.size, (style.title_x, style.title_y))?;
    }
    if let Some(caption) = caption {
        let caption_style = ("sans-serif", 14)
            .into_font()
            .color(&INK)
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        draw_label(root, caption, (left, style.size.1 as i32 - 20), &caption_style)?;
    }
    Ok(colored)
}

/// `placement` is (x, y) as fractions of the image, y measured from the bottom.
pub(crate) fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    size: (u32, u32),
    placement: (f64, f64),
) -> Result<()> {
    let x = (placement.0 * size.0 as f64).round() as i32;
    let y = ((1.0 - placement.1) * size.1 as f64).round() as i32;
    let title_style = ("sans-serif", 17)
        .into_font()
        .color(&INK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    draw_label(root, title, (x, y), &title_style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_precision_follows_span() {
        let wide = ValueRange { min: 0.0, max: 25.0 };
        let narrow = ValueRange { min: 48.2, max: 54.9 };
        let unit = ValueRange { min: 0.39, max: 0.96 };
        assert_eq!(format_tick(12.4, &wide, None), "12");
        assert_eq!(format_tick(50.0, &narrow, Some("%")), "50.0%");
        assert_eq!(format_tick(0.676, &unit, None), "0.68");
    }

    #[test]
    fn plot_area_respects_margins() {
        assert_eq!(plot_area((700, 500)), ((80, 100), (540, 320)));
        assert_eq!(plot_area((100, 100)), ((80, 100), (1, 1)));
    }

    #[test]
    fn collapsed_countries_are_not_counted() {
        let geometry = BorderGeometry::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"ISO_A3":"AAA"},
                 "geometry":{"type":"Polygon","coordinates":[[[-20,-10],[0,-10],[0,10],[-20,10],[-20,-10]]]}},
                {"type":"Feature","properties":{"ISO_A3":"DOT"},
                 "geometry":{"type":"Polygon","coordinates":[[[50,5],[50.001,5],[50.001,5.001],[50,5]]]}},
                {"type":"Feature","properties":{"ISO_A3":"NUL"},"geometry":null}]}"#,
            "ISO_A3",
        )
        .unwrap();
        let frame = pixel_frame(Projection::Equirectangular, (700, 500));

        let mut svg = String::new();
        let colored = {
            let root = SVGBackend::with_string(&mut svg, (700, 500)).into_drawing_area();
            let colored = draw_borders(&root, &geometry, &frame, |_| Some(INK)).unwrap();
            root.present().unwrap();
            colored
        };
        assert_eq!(colored, 1);
    }

    #[test]
    fn unmatched_codes_are_sorted_and_unique() {
        let geometry = BorderGeometry::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"ISO_A3":"AAA"},"geometry":null}]}"#,
            "ISO_A3",
        )
        .unwrap();
        let codes = ["ZZZ", "AAA", "", "OWID_WRL", "ZZZ"];
        assert_eq!(
            unmatched_codes(codes.into_iter(), &geometry),
            vec!["OWID_WRL".to_string(), "ZZZ".to_string()]
        );
    }
}
