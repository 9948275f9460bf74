//! Price charts rendered from persisted sales history.

pub mod interactive;
pub mod stats;
pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::prelude::ToPrimitive;

use crate::config::ChartFormat;
use crate::constants::CURRENCY_GLYPH;
use crate::error::{Error, Result};
use crate::records::{DatasetKey, SaleRecord};

/// Everything a chart needs, computed once from a dataset.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub title: String,
    pub prices: Vec<f64>,
    pub serial_numbers: Vec<u64>,
    pub mean: f64,
    pub std_dev: f64,
    /// Fitted trend evaluated at each sale's index.
    pub trend: Vec<f64>,
}

impl ChartData {
    /// Chart the first `last_n` sales (all when `None`). Fails with a render
    /// error when fewer than 2 sales remain.
    pub fn from_sales(key: &DatasetKey, sales: &[SaleRecord], last_n: Option<usize>) -> Result<Self> {
        let sales = match last_n {
            Some(n) if n < sales.len() => &sales[..n],
            _ => sales,
        };

        let prices = sales
            .iter()
            .map(|s| {
                s.price.to_f64().ok_or_else(|| {
                    Error::Render(format!("price {} does not fit in f64", s.price))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let mean = stats::mean(&prices)?;
        let std_dev = stats::sample_std_dev(&prices)?;
        let fit = stats::trend_fit(&prices)?;
        let trend = (0..prices.len()).map(|i| fit.eval(i as f64)).collect();

        Ok(Self {
            title: format!(
                "{} {} (last {} sales)",
                title_case(&key.entity_name),
                title_case(&key.card_type),
                prices.len()
            ),
            serial_numbers: sales.iter().map(|s| s.serial_number).collect(),
            prices,
            mean,
            std_dev,
            trend,
        })
    }

    /// Per-sale hover labels, `10.50€<br>#12`.
    pub fn hover_text(&self) -> Vec<String> {
        self.prices
            .iter()
            .zip(&self.serial_numbers)
            .map(|(p, s)| format!("{:.2}{}<br>#{}", p, CURRENCY_GLYPH, s))
            .collect()
    }

    pub fn mean_label(&self) -> String {
        format!(
            "p_avg = {:.2}{} ± {:.2}",
            self.mean, CURRENCY_GLYPH, self.std_dev
        )
    }
}

/// Capitalise the first letter of every alphabetic run: `spider-zed` -> `Spider-Zed`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// `<image_root>/<card_type>/<season>/<entity_name>.<ext>`
pub fn chart_path(image_root: &Path, key: &DatasetKey, format: ChartFormat) -> PathBuf {
    image_root
        .join(&key.card_type)
        .join(key.season.to_string())
        .join(format!("{}.{}", key.entity_name, format.extension()))
}

pub fn render(data: &ChartData, format: ChartFormat) -> Result<String> {
    match format {
        ChartFormat::Html => Ok(interactive::to_html(data)),
        ChartFormat::Svg => svg::to_svg(data),
    }
}

/// Render and write the chart, creating parent directories as needed.
pub fn render_to_file(data: &ChartData, format: ChartFormat, path: &Path) -> Result<()> {
    let document = render(data, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sales(prices: &[(i64, u32)]) -> Vec<SaleRecord> {
        prices
            .iter()
            .enumerate()
            .map(|(i, (cents, scale))| SaleRecord {
                buyer: format!("buyer{}", i),
                seller: "seller".into(),
                date: "2024-01-01".into(),
                serial_number: i as u64 + 1,
                price: Decimal::new(*cents, *scale),
            })
            .collect()
    }

    fn key() -> DatasetKey {
        DatasetKey::new("common", 1, "spider-zed")
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("spider-zed"), "Spider-Zed");
        assert_eq!(title_case("moji-x-sboy"), "Moji-X-Sboy");
        assert_eq!(title_case("8ruki"), "8Ruki");
        assert_eq!(title_case("PLATINIUM"), "Platinium");
    }

    #[test]
    fn chart_data_summarises_prices() {
        let data = ChartData::from_sales(&key(), &sales(&[(1000, 2), (1200, 2), (1400, 2)]), None).unwrap();

        assert_eq!(data.title, "Spider-Zed Common (last 3 sales)");
        assert!((data.mean - 12.0).abs() < 1e-9);
        assert!((data.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(data.trend.len(), 3);
        assert!((data.trend[2] - 14.0).abs() < 1e-9);
        assert_eq!(data.hover_text()[0], "10.00€<br>#1");
    }

    #[test]
    fn last_n_keeps_the_head_of_the_dataset() {
        let all = sales(&[(500, 2), (600, 2), (700, 2), (800, 2)]);
        let data = ChartData::from_sales(&key(), &all, Some(2)).unwrap();

        assert_eq!(data.prices, vec![5.0, 6.0]);
        assert_eq!(data.title, "Spider-Zed Common (last 2 sales)");
    }

    #[test]
    fn single_sale_cannot_be_charted() {
        let err = ChartData::from_sales(&key(), &sales(&[(1050, 2)]), None).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn chart_path_mirrors_dataset_layout() {
        let path = chart_path(Path::new("dashboards"), &key(), ChartFormat::Html);
        assert_eq!(path, PathBuf::from("dashboards/common/1/spider-zed.html"));
    }

    #[test]
    fn html_chart_contains_title_and_trend_color() {
        let data = ChartData::from_sales(&key(), &sales(&[(1000, 2), (1250, 2), (900, 2)]), None).unwrap();
        let html = render(&data, ChartFormat::Html).unwrap();

        assert!(html.contains("Spider-Zed Common (last 3 sales)"));
        assert!(html.contains("#28DED8"));
    }

    #[test]
    fn html_chart_needs_no_network() {
        let data = ChartData::from_sales(&key(), &sales(&[(1000, 2), (1250, 2), (900, 2)]), None).unwrap();
        let html = render(&data, ChartFormat::Html).unwrap();

        assert!(!html.contains("<script src="));
        assert!(!html.contains("plotly-2.12.1.min.js"));
        assert!(!html.contains("mathjax@"));
        assert!(html.contains("Plotly.newPlot"));
        // plotly.min.js itself is several megabytes.
        assert!(html.len() > 1_000_000);
    }

    #[test]
    fn svg_chart_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let data = ChartData::from_sales(&key(), &sales(&[(1000, 2), (1250, 2), (900, 2)]), None).unwrap();
        let path = chart_path(dir.path(), &key(), ChartFormat::Svg);

        render_to_file(&data, ChartFormat::Svg, &path).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("card number"));
    }
}
