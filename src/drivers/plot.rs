use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb as ImageRgb};
use plotters::prelude::*;
use crate::drivers::{Curve, PlotterError, RenderFrame};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub columns: usize,
    pub background: RGBColor,
    /// Captions and axis labels need a system font; turn them off when none is available.
    pub labels: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            columns: 2,
            background: RGBColor(30, 30, 30),
            labels: true,
        }
    }
}
/// Renders every plot slot of `frame` into a grid of panels and encodes it as PNG.
pub fn render_frame_png(frame: &RenderFrame, style: PlotStyle) -> Result<Vec<u8>, PlotterError> {
    if frame.slot_count() == 0 {
        return Err(PlotterError::Plot("frame has no plot slots".into()));
    }
    let columns = style.columns.clamp(1, frame.slot_count());
    let rows = frame.slot_count().div_ceil(columns);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((rows, columns));
        for (index, (panel, curves)) in panels.iter().zip(frame.slots()).enumerate() {
            draw_slot(panel, index, curves, &style)?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn draw_slot(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    index: usize,
    curves: &[Curve],
    style: &PlotStyle,
) -> Result<(), PlotterError> {
    let x_max = curves.iter().map(|c| c.values.len()).max().unwrap_or(0).max(1);
    let (y_min, y_max) = curves
        .iter()
        .flat_map(|c| c.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    // Empty or flat slots fall back to the window's default +/-1.1 range.
    let y_bounds = if y_min.is_finite() && (y_max - y_min).abs() > f64::EPSILON {
        (y_min, y_max)
    } else {
        (-1.1, 1.1)
    };
    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.labels {
        builder
            .caption(
                format!("Plot {}", index + 1),
                ("sans-serif", 16).into_font().color(&WHITE),
            )
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 30);
    }
    let mut chart = builder.build_cartesian_2d(0f64..x_max as f64, y_bounds.0..y_bounds.1)?;
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(&WHITE.mix(0.1));
    if style.labels {
        mesh.label_style(("sans-serif", 12).into_font().color(&WHITE));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;
    for curve in curves {
        let color = RGBColor(curve.color.0, curve.color.1, curve.color.2);
        let series = curve
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (i as f64, *v));
        chart.draw_series(LineSeries::new(series, color.stroke_width(2)))?;
    }
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PlotterError> {
    let image = ImageBuffer::<ImageRgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| PlotterError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
