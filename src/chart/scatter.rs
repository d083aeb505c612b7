use plotters::{
    coord::Shift,
    prelude::*,
    style::colors::colormaps::{ColorMap, ViridisRGB},
};

use super::DemoContext;
use crate::{
    error::{Error, Result},
    figure::{Figure, FigureSize},
    price_data::{PriceRecord, PriceSource},
};

/// Most recent trading days used
pub const WINDOW: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    /// relative change from day i to i+1
    pub delta: f64,
    /// relative change from day i+1 to i+2
    pub next_delta: f64,
    /// marker area in pt²
    pub area: f64,
    /// close price of day i
    pub price: f64,
}

/// Consecutive relative price changes of the last [`WINDOW`] records,
/// sized by volume relative to the window's first day.
pub fn scatter_points(prices: &[PriceRecord]) -> Result<Vec<ScatterPoint>> {
    if prices.len() < 3 {
        return Err(Error::InsufficientData {
            needed: 3,
            got: prices.len(),
        });
    }
    let recent = &prices[prices.len().saturating_sub(WINDOW)..];
    for day in recent {
        // adj_close divides the deltas
        if !(day.adj_close.is_finite() && day.adj_close > 0.) {
            return Err(Error::InvalidPrice {
                date: day.date,
                field: "adj_close",
                value: day.adj_close,
            });
        }
        if !day.close.is_finite() {
            return Err(Error::InvalidPrice {
                date: day.date,
                field: "close",
                value: day.close,
            });
        }
        if !(day.volume.is_finite() && day.volume >= 0.) {
            return Err(Error::InvalidPrice {
                date: day.date,
                field: "volume",
                value: day.volume,
            });
        }
    }
    let deltas: Vec<f64> = recent
        .windows(2)
        .map(|w| (w[1].adj_close - w[0].adj_close) / w[0].adj_close)
        .collect();
    let base_volume = recent[0].volume;
    if base_volume <= 0. {
        return Err(Error::InvalidPrice {
            date: recent[0].date,
            field: "volume",
            value: base_volume,
        });
    }
    Ok(deltas
        .windows(2)
        .zip(recent)
        .map(|(d, day)| ScatterPoint {
            delta: d[0],
            next_delta: d[1],
            area: (15. * day.volume / base_volume).powi(2),
            price: day.close,
        })
        .collect())
}

/// Viridis colour of `price` within `[min, max]`; mid-scale when the range is empty.
pub fn price_color(price: f64, min: f64, max: f64) -> RGBColor {
    if max > min {
        ViridisRGB.get_color_normalized(price.clamp(min, max), min, max)
    } else {
        ViridisRGB.get_color(0.5)
    }
}

pub fn draw(ctx: &mut DemoContext) -> Result<Figure> {
    let prices = ctx.prices.load_price_series()?;
    let points = scatter_points(&prices)?;
    let size = ctx.size;
    Figure::render(size, |root| draw_on(root, size, &points))
}

pub fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    size: FigureSize,
    points: &[ScatterPoint],
) -> Result<()> {
    let bounds = |f: fn(&ScatterPoint) -> f64| {
        points
            .iter()
            .map(f)
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (x_lo, x_hi) = bounds(|p| p.delta);
    let (y_lo, y_hi) = bounds(|p| p.next_delta);
    let (lo, hi) = (x_lo.min(y_lo), x_hi.max(y_hi));
    let (lo, hi) = if lo < hi { (lo, hi) } else { (lo - 0.01, lo + 0.01) };
    let pad = (hi - lo) * 0.08;
    let (p_lo, p_hi) = bounds(|p| p.price);

    let mut chart = ChartBuilder::on(root)
        .caption("Volume and percent change", size.font(12.))
        .margin(size.pt_px(8.))
        .x_label_area_size(size.pt_px(24.))
        .y_label_area_size(size.pt_px(40.))
        .build_cartesian_2d((lo - pad)..(hi + pad), (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .x_desc("Δi")
        .y_desc("Δi+1")
        .x_label_formatter(&|v| format!("{:.2}", v))
        .y_label_formatter(&|v| format!("{:.2}", v))
        .label_style(size.font(9.))
        .axis_desc_style(size.font(15.))
        .draw()?;

    let (w, h) = root.dim_in_pixel();
    let max_radius = w.max(h) as f64;
    chart.draw_series(points.iter().map(|p| {
        // area is in pt², circle takes a radius in pixels
        let radius = size
            .points_to_pixels(p.area.sqrt() / 2.)
            .min(max_radius)
            .max(1.);
        Circle::new(
            (p.delta, p.next_delta),
            radius.round() as i32,
            price_color(p.price, p_lo, p_hi).mix(0.5).filled(),
        )
    }))?;

    Ok(())
}

#[cfg(test)]
use crate::config::DemoConfig;

#[cfg(test)]
fn day(n: u8, close: f64, volume: f64) -> PriceRecord {
    PriceRecord {
        date: time::Date::from_calendar_date(2008, time::Month::January, n).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume,
        adj_close: close,
    }
}

#[test]
fn points_pair_consecutive_changes() {
    let prices = vec![day(1, 100., 10.), day(2, 110., 20.), day(3, 99., 5.), day(4, 99., 10.)];
    let points = scatter_points(&prices).unwrap();
    assert_eq!(points.len(), 2);
    assert!((points[0].delta - 0.1).abs() < 1e-12);
    assert!((points[0].next_delta + 0.1).abs() < 1e-12);
    assert_eq!(points[1].next_delta, 0.);
    assert_eq!(points[0].area, 225.);
    assert_eq!(points[1].area, 900.);
    assert_eq!(points[1].price, 110.);
}

#[test]
fn only_recent_window_is_used() {
    let mut ctx = DemoContext::from_config(&DemoConfig::default());
    let all = ctx.prices.load_price_series().unwrap();
    assert!(all.len() > WINDOW);
    let points = scatter_points(&all).unwrap();
    assert_eq!(points.len(), WINDOW - 2);
    // sizes are relative to the first day of the window
    assert_eq!(points[0].area, 225.);
    let figure = draw(&mut ctx).unwrap();
    assert_eq!(figure.pixels().len(), 620 * 430 * 3);
}

#[test]
fn too_few_prices_is_an_error() {
    let prices = vec![day(1, 1., 1.), day(2, 2., 1.)];
    let mut ctx = DemoContext::new(1, FigureSize::default(), Box::new(prices));
    assert!(matches!(
        draw(&mut ctx),
        Err(Error::InsufficientData { needed: 3, got: 2 })
    ));
    assert_eq!(ctx.prices.load_price_series().unwrap().len(), 2);
}

#[test]
fn price_color_spans_viridis() {
    assert_eq!(price_color(100., 100., 200.), ViridisRGB.get_color(0.));
    assert_eq!(price_color(200., 100., 200.), ViridisRGB.get_color(1.));
    assert_eq!(price_color(150., 100., 200.), RGBColor(35, 145, 140));
    // out of range prices stick to the ends
    assert_eq!(price_color(500., 100., 200.), ViridisRGB.get_color(1.));
    assert_eq!(price_color(7., 7., 7.), ViridisRGB.get_color(0.5));
}

#[test]
fn zero_base_volume_is_rejected() {
    let prices = vec![day(1, 100., 0.), day(2, 110., 20.), day(3, 99., 5.), day(4, 99., 10.)];
    let mut ctx = DemoContext::new(1, FigureSize::default(), Box::new(prices));
    assert!(matches!(
        draw(&mut ctx),
        Err(Error::InvalidPrice { field: "volume", .. })
    ));
}

#[test]
fn zero_adj_close_is_rejected() {
    let prices = vec![day(1, 100., 10.), day(2, 0., 20.), day(3, 99., 5.)];
    assert!(matches!(
        scatter_points(&prices),
        Err(Error::InvalidPrice { field: "adj_close", value, .. }) if value == 0.
    ));
}

#[test]
fn huge_volume_spike_still_renders() {
    let prices = vec![day(1, 100., 1.), day(2, 110., 1e12), day(3, 99., 5.), day(4, 99., 10.)];
    let points = scatter_points(&prices).unwrap();
    assert!(points[1].area > 1e20);
    let figure = Figure::render(FigureSize::default(), |root| {
        draw_on(root, FigureSize::default(), &points)
    })
    .unwrap();
    assert_eq!((figure.width(), figure.height()), (620, 430));
}
