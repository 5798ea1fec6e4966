//! Price history chart rendering.
//!
//! Turns a `(timestamp millis, price)` series into a PNG for upload.
//! Rendering happens in-memory; callers get the encoded bytes back.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{TimeZone, Utc};
use plotters::prelude::*;

/// Output image dimensions in pixels.
const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;

/// Line color, matching the site's chart styling.
const LINE_COLOR: RGBColor = RGBColor(0x2f, 0xa4, 0xe7);

/// Renders a price chart for `short` over the trailing `days`-day window.
pub fn render_price_chart(history: &[(i64, f64)], short: &str, days: u32) -> Result<Vec<u8>> {
    if history.is_empty() {
        bail!("No history points for {}", short);
    }

    let (min_ts, max_ts) = span(history.iter().map(|(ts, _)| *ts as f64));
    let (min_price, max_price) = span(history.iter().map(|(_, price)| *price));

    // A flat series still needs a non-degenerate axis range.
    let price_pad = ((max_price - min_price) * 0.05).max(max_price.abs() * 0.01).max(0.01);
    let ts_pad = ((max_ts - min_ts) * 0.01).max(1.0);

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to fill chart background: {}", e))?;

        let caption = format!("{} / USD ({}d)", short.to_uppercase(), days);
        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(64)
            .build_cartesian_2d(
                (min_ts - ts_pad)..(max_ts + ts_pad),
                (min_price - price_pad)..(max_price + price_pad),
            )
            .map_err(|e| anyhow!("Failed to build chart axes: {}", e))?;

        chart
            .configure_mesh()
            .x_labels(6)
            .y_labels(8)
            .x_label_formatter(&|ts| format_axis_date(*ts))
            .y_label_formatter(&|price| format!("${:.2}", price))
            .draw()
            .map_err(|e| anyhow!("Failed to draw chart mesh: {}", e))?;

        chart
            .draw_series(LineSeries::new(
                history.iter().map(|(ts, price)| (*ts as f64, *price)),
                &LINE_COLOR,
            ))
            .map_err(|e| anyhow!("Failed to draw price series: {}", e))?;

        root.present()
            .map_err(|e| anyhow!("Failed to finalize chart: {}", e))?;
    }

    encode_png(&buffer).context("Failed to encode chart PNG")
}

/// Min and max of a non-empty series.
fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}

/// Formats a millisecond timestamp for the x axis.
fn format_axis_date(ts_millis: f64) -> String {
    match Utc.timestamp_millis_opt(ts_millis as i64).single() {
        Some(dt) => dt.format("%b %d").to_string(),
        None => String::new(),
    }
}

/// Encodes the raw RGB framebuffer as a PNG.
fn encode_png(rgb: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, WIDTH, HEIGHT);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgb)?;
    }
    Ok(out)
}
