use plotters::prelude::*;

use crate::models::{RenderSpec, Series};
use crate::utils::RenderError;

const UP_COLOR: RGBColor = RGBColor(38, 166, 154);
const DOWN_COLOR: RGBColor = RGBColor(239, 83, 80);
const MA_PALETTE: [RGBColor; 4] = [
    RGBColor(255, 152, 0),
    RGBColor(33, 150, 243),
    RGBColor(156, 39, 176),
    RGBColor(121, 85, 72),
];

/// Turns a series into exactly one image file
pub trait ChartRenderer {
    fn render(&self, series: &Series, spec: &RenderSpec) -> Result<(), RenderError>;
}

/// Candlestick chart with moving-average overlays and a volume panel
pub struct CandlestickRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for CandlestickRenderer {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1000,
        }
    }
}

impl ChartRenderer for CandlestickRenderer {
    fn render(&self, series: &Series, spec: &RenderSpec) -> Result<(), RenderError> {
        ensure_enough_points(series, spec)?;
        draw_chart(series, spec, self.width, self.height)
    }
}

/// Refuse to render when the series cannot fill the largest moving-average window.
///
/// Checked before any file is created so a skipped symbol leaves nothing behind.
pub fn ensure_enough_points(series: &Series, spec: &RenderSpec) -> Result<(), RenderError> {
    let window = spec.largest_window().max(1);
    if series.len() < window {
        return Err(RenderError::InsufficientData {
            points: series.len(),
            window,
        });
    }
    Ok(())
}

/// Trailing simple moving average; `None` until the window is full
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut averages = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            averages.push(Some(sum / window as f64));
        } else {
            averages.push(None);
        }
    }
    averages
}

fn format_volume(volume: f64) -> String {
    if volume >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if volume >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if volume >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{:.0}", volume)
    }
}

fn drawing_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn draw_chart(series: &Series, spec: &RenderSpec, width: u32, height: u32) -> Result<(), RenderError> {
    let candles = series.candles();
    let count = candles.len();

    // Bars are placed by index so weekends and holidays leave no gaps
    let x_range = -0.5f64..(count as f64 - 0.5);
    let date_format = if spec.timeframe.is_intraday() {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    let label_for = |x: &f64| -> String {
        let index = x.round();
        if index < 0.0 {
            return String::new();
        }
        candles
            .get(index as usize)
            .map(|c| c.timestamp.format(date_format).to_string())
            .unwrap_or_default()
    };

    let root = BitMapBackend::new(&spec.output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let titled = root
        .titled(&spec.title(), ("sans-serif", 32).into_font())
        .map_err(drawing_error)?;
    let (_, area_height) = titled.dim_in_pixel();
    let (upper, lower) = titled.split_vertically((area_height * 72 / 100) as i32);

    let (low, high) = series.price_range().unwrap_or((0.0, 1.0));
    let padding = ((high - low) * 0.05).max(1e-6);

    let mut price_chart = ChartBuilder::on(&upper)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), (low - padding)..(high + padding))
        .map_err(drawing_error)?;

    price_chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&label_for)
        .y_desc("Price")
        .draw()
        .map_err(drawing_error)?;

    let plot_width = upper.dim_in_pixel().0.saturating_sub(90);
    let candle_width = ((plot_width as f64 / count.max(1) as f64) * 0.7).max(1.0) as u32;

    price_chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            CandleStick::new(
                i as f64,
                c.open,
                c.high,
                c.low,
                c.close,
                UP_COLOR.filled(),
                DOWN_COLOR.filled(),
                candle_width,
            )
        }))
        .map_err(drawing_error)?;

    let closes = series.closes();
    for (slot, &window) in spec.moving_averages.iter().enumerate() {
        let color = MA_PALETTE[slot % MA_PALETTE.len()];
        let points = moving_average(&closes, window)
            .into_iter()
            .enumerate()
            .filter_map(|(i, avg)| avg.map(|v| (i as f64, v)));

        price_chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(drawing_error)?
            .label(format!("MA{}", window))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !spec.moving_averages.is_empty() {
        price_chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;
    }

    let max_volume = series.max_volume().max(1.0);
    let mut volume_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0f64..max_volume * 1.1)
        .map_err(drawing_error)?;

    volume_chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&label_for)
        .y_labels(4)
        .y_label_formatter(&|v: &f64| format_volume(*v))
        .y_desc("Volume")
        .draw()
        .map_err(drawing_error)?;

    volume_chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            let color = if c.is_bullish() { UP_COLOR } else { DOWN_COLOR };
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, c.volume)], color.filled())
        }))
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}
