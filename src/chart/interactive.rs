use plotly::common::{DashType, HoverInfo, Line, Marker, MarkerSymbol, Mode, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

use super::ChartData;
use crate::constants::{CURRENCY_GLYPH, TREND_COLOR};

/// Interactive price trend: sales with hover text, the fitted trend and the
/// mean price. plotly.js is inlined so the page works offline.
pub fn to_html(data: &ChartData) -> String {
    let xs: Vec<usize> = (0..data.prices.len()).collect();
    let last = xs.len().saturating_sub(1);

    let sales = Scatter::new(xs.clone(), data.prices.clone())
        .name("price")
        .mode(Mode::LinesMarkers)
        .marker(Marker::new().symbol(MarkerSymbol::X))
        .hover_text_array(data.hover_text())
        .hover_info(HoverInfo::Text);

    let trend = Scatter::new(xs, data.trend.clone())
        .name("trend")
        .mode(Mode::Lines)
        .line(Line::new().color(TREND_COLOR).dash(DashType::Dot));

    let mean = Scatter::new(vec![0, last], vec![data.mean, data.mean])
        .name(&data.mean_label())
        .mode(Mode::Lines)
        .line(Line::new().color("red"));

    let layout = Layout::new()
        .title(Title::new(&data.title))
        .x_axis(Axis::new().tick_values(vec![]))
        .y_axis(Axis::new().tick_suffix(CURRENCY_GLYPH));

    let mut plot = Plot::new();
    plot.use_local_plotly();
    plot.add_trace(sales);
    plot.add_trace(trend);
    plot.add_trace(mean);
    plot.set_layout(layout);
    strip_remote_scripts(&plot.to_html())
}

/// Drop every `<script src="http...">` tag. The plotly template always links
/// MathJax from a CDN; titles here never use LaTeX.
fn strip_remote_scripts(html: &str) -> String {
    const OPEN: &str = "<script src=\"http";
    const CLOSE: &str = "</script>";

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        match rest[start..].find(CLOSE) {
            Some(end) => rest = &rest[start + end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
