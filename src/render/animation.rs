use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, info};

use super::{draw_choropleth_figure, render_error, report_unmatched, RenderSummary};
use crate::colorscale::ColorScale;
use crate::config::{AnimationStyle, ChoroplethStyle};
use crate::error::Result;
use crate::geometry::BorderGeometry;
use crate::models::FrameTable;
use crate::output::write_file;
use crate::range::ValueRange;

const PLAYER_CSS: &str = "body { font-family: sans-serif; margin: 0; }
.figure { display: inline-block; padding: 8px; }
.controls { display: flex; align-items: center; gap: 8px; margin-top: 4px; }
.controls input { flex: 1; }";

// Frames, slider and buttons are wired up by index; the field name and delay
// come from data attributes on the figure.
const PLAYER_JS: &str = "(function () {
  var figure = document.querySelector('.figure');
  var frames = Array.prototype.slice.call(document.querySelectorAll('.frame'));
  var slider = document.getElementById('slider');
  var label = document.getElementById('frame-label');
  var field = figure.dataset.field;
  var delay = Number(figure.dataset.delay);
  var timer = null;
  function show(i) {
    frames.forEach(function (frame, j) { frame.hidden = j !== i; });
    slider.value = i;
    label.textContent = field + '=' + frames[i].dataset.label;
  }
  function stop() { if (timer) { clearInterval(timer); timer = null; } }
  slider.addEventListener('input', function () { stop(); show(Number(slider.value)); });
  document.getElementById('play').addEventListener('click', function () {
    if (timer || frames.length === 0) { return; }
    if (Number(slider.value) >= frames.length - 1) { show(0); }
    timer = setInterval(function () {
      var next = Number(slider.value) + 1;
      if (next >= frames.length) { stop(); return; }
      show(next);
    }, delay);
  });
  document.getElementById('stop').addEventListener('click', stop);
  if (frames.length > 0) { show(0); }
})();";

/// One choropleth per frame label, bundled into a single self-contained HTML
/// page with a slider and play/stop buttons.
///
/// All frames share one color range so colors are comparable across years.
pub fn render_animation(
    frames: &FrameTable,
    geometry: &BorderGeometry,
    style: &AnimationStyle,
    path: &Path,
) -> Result<RenderSummary> {
    let scale = ColorScale::named(&style.map.color_scale)?;
    let range = style.map.range.resolve(&frames.value_column, frames.value_extent())?;
    // untitled animations name the variable they show
    let map_style = match style.map.title {
        Some(_) => style.map.clone(),
        None => style.map.clone().titled(&frames.value_column),
    };

    let mut unmatched = BTreeSet::new();
    let mut rendered = Vec::new();
    let mut colored = 0;
    for (label, rows) in frames.frames() {
        let values: HashMap<&str, f64> = rows
            .iter()
            .filter_map(|row| row.value.filter(|v| !v.is_nan()).map(|v| (row.code.as_str(), v)))
            .collect();
        unmatched.extend(
            rows.iter()
                .filter(|row| !geometry.contains(&row.code))
                .map(|row| row.code.clone()),
        );

        let caption = format!("{}={}", style.frame_field, label);
        let (svg, count) = render_svg_frame(geometry, &values, &map_style, &scale, &range, &caption)?;
        debug!(frame = label, colored = count, "frame rendered");
        colored = colored.max(count);
        rendered.push((label.to_string(), svg));
    }

    let html = player_html(&frames.value_column, &rendered, style);
    write_file(path, html.as_bytes())?;

    let unmatched: Vec<String> = unmatched.into_iter().collect();
    report_unmatched(path, &unmatched);
    info!(
        path = %path.display(),
        frames = rendered.len(),
        min = range.min,
        max = range.max,
        "animation saved"
    );
    Ok(RenderSummary {
        path: path.to_path_buf(),
        drawn: colored,
        unmatched,
    })
}

pub(crate) fn render_svg_frame(
    geometry: &BorderGeometry,
    values: &HashMap<&str, f64>,
    style: &ChoroplethStyle,
    scale: &ColorScale,
    range: &ValueRange,
    caption: &str,
) -> Result<(String, usize)> {
    let mut svg = String::new();
    let colored = {
        let root = SVGBackend::with_string(&mut svg, style.size).into_drawing_area();
        let colored = draw_choropleth_figure(&root, geometry, values, style, scale, range, Some(caption))?;
        root.present().map_err(render_error)?;
        colored
    };
    Ok((svg, colored))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn player_html(title: &str, frames: &[(String, String)], style: &AnimationStyle) -> String {
    let field = escape_html(&style.frame_field);
    let last = frames.len().saturating_sub(1);
    let first_label = frames.first().map(|(label, _)| label.as_str()).unwrap_or("");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(&format!("<style>\n{PLAYER_CSS}\n</style>\n</head>\n<body>\n"));
    html.push_str(&format!(
        "<div class=\"figure\" data-field=\"{field}\" data-delay=\"{}\">\n",
        style.frame_duration_ms
    ));
    for (i, (label, svg)) in frames.iter().enumerate() {
        let hidden = if i == 0 { "" } else { " hidden" };
        html.push_str(&format!(
            "<div class=\"frame\" data-label=\"{}\"{hidden}>\n{svg}\n</div>\n",
            escape_html(label)
        ));
    }
    html.push_str("<div class=\"controls\">\n");
    html.push_str("<button id=\"play\" type=\"button\">&#9654;</button>\n");
    html.push_str("<button id=\"stop\" type=\"button\">&#9632;</button>\n");
    html.push_str(&format!(
        "<input id=\"slider\" type=\"range\" min=\"0\" max=\"{last}\" step=\"1\" value=\"0\">\n"
    ));
    html.push_str(&format!(
        "<span id=\"frame-label\">{field}={}</span>\n",
        escape_html(first_label)
    ));
    html.push_str("</div>\n</div>\n");
    html.push_str(&format!("<script>\n{PLAYER_JS}\n</script>\n</body>\n</html>\n"));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrameRow;
    use crate::range::RangeSpec;
    use tempfile::tempdir;

    const GEOJSON: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"ISO_A3":"AAA"},
         "geometry":{"type":"Polygon","coordinates":[[[-20,-10],[0,-10],[0,10],[-20,10],[-20,-10]]]}}
    ]}"#;

    fn frame_row(frame: &str, code: &str, value: Option<f64>) -> FrameRow {
        FrameRow {
            frame: frame.to_string(),
            code: code.to_string(),
            value,
        }
    }

    #[test]
    fn one_frame_per_label_in_a_single_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gifs/anim.html");
        let geometry = BorderGeometry::from_geojson_str(GEOJSON, "ISO_A3").unwrap();
        let frames = FrameTable {
            value_column: "Deaths <rate>".to_string(),
            rows: vec![
                frame_row("1990", "AAA", Some(1.0)),
                frame_row("1990", "ZZZ", Some(50.0)),
                frame_row("1991", "AAA", None),
                frame_row("1992", "AAA", Some(3.0)),
            ],
        };
        let style = AnimationStyle::new(ChoroplethStyle::new("YlOrRd", RangeSpec::max_over(10.0)));

        let summary = render_animation(&frames, &geometry, &style, &path).unwrap();
        assert_eq!(summary.unmatched, vec!["ZZZ".to_string()]);

        let html = std::fs::read_to_string(&path).unwrap();
        assert_eq!(html.matches("class=\"frame\"").count(), 3);
        assert_eq!(html.matches("<svg").count(), 3);
        assert!(html.contains("data-label=\"1991\" hidden"));
        assert!(html.contains("<title>Deaths &lt;rate&gt;</title>"));
        assert!(html.contains("max=\"2\""));
        assert!(!html.contains("<script src"));
    }

    #[test]
    fn every_frame_names_the_variable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hdi.html");
        let geometry = BorderGeometry::from_geojson_str(GEOJSON, "ISO_A3").unwrap();
        let frames = FrameTable {
            value_column: "Human Development Index".to_string(),
            rows: vec![
                frame_row("2000", "AAA", Some(0.4)),
                frame_row("2001", "AAA", Some(0.6)),
            ],
        };
        let style = AnimationStyle::new(ChoroplethStyle::new("viridis", RangeSpec::from_zero()));

        render_animation(&frames, &geometry, &style, &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        // page title plus one figure title per frame
        assert_eq!(html.matches("Human Development Index").count(), 3);
        assert!(style.map.title.is_none());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
