use plotters::prelude::*;

use super::ChartData;
use crate::error::{Error, Result};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 500;
const TREND: RGBColor = RGBColor(0x28, 0xDE, 0xD8);

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Padded `[min, max]` over all series so nothing sits on the frame.
fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// Static two-panel chart: price by sequence on the left with the trend and
/// mean overlay, price by serial number on the right.
pub fn to_svg(data: &ChartData) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let root = root.titled(&data.title, ("sans-serif", 22)).map_err(render_err)?;
        let (left, right) = root.split_horizontally((WIDTH / 2) as i32);

        let (y_lo, y_hi) = value_range(data.prices.iter().chain(&data.trend));
        let x_hi = data.prices.len().saturating_sub(1).max(1) as f64;
        let euro = |y: &f64| format!("{:.2}€", y);

        let mut trend = ChartBuilder::on(&left)
            .margin(10)
            .x_label_area_size(10)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_hi, y_lo..y_hi)
            .map_err(render_err)?;
        trend
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_label_formatter(&euro)
            .y_desc("price")
            .draw()
            .map_err(render_err)?;

        let points: Vec<(f64, f64)> = data
            .prices
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, *p))
            .collect();
        trend
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(render_err)?;
        trend
            .draw_series(points.iter().map(|&p| Cross::new(p, 4, &BLUE)))
            .map_err(render_err)?;
        trend
            .draw_series(LineSeries::new(
                data.trend.iter().enumerate().map(|(i, y)| (i as f64, *y)),
                TREND.stroke_width(2),
            ))
            .map_err(render_err)?;
        trend
            .draw_series(LineSeries::new(
                vec![(0.0, data.mean), (x_hi, data.mean)],
                &RED,
            ))
            .map_err(render_err)?
            .label(data.mean_label())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        trend
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        let serials: Vec<f64> = data.serial_numbers.iter().map(|s| *s as f64).collect();
        let (s_lo, s_hi) = value_range(serials.iter());
        let mut scatter = ChartBuilder::on(&right)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(s_lo..s_hi, y_lo..y_hi)
            .map_err(render_err)?;
        scatter
            .configure_mesh()
            .x_desc("card number")
            .y_label_formatter(&euro)
            .draw()
            .map_err(render_err)?;
        scatter
            .draw_series(
                serials
                    .iter()
                    .zip(&data.prices)
                    .map(|(s, p)| Circle::new((*s, *p), 3, BLUE.mix(0.5).filled())),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
