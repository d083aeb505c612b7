use plotters::{coord::Shift, prelude::*};

use super::{DemoContext, TAB_BLUE, TAB_ORANGE};
use crate::{
    error::Result,
    figure::{Figure, FigureSize},
    signal::{coherence, Coherence, SignalPair, NFFT},
};

/// Time window shown in the signal panel (s)
const SHOWN_SECONDS: f64 = 2.;

/// Draws fresh signals from the context RNG, so consecutive requests differ.
pub fn draw(ctx: &mut DemoContext) -> Result<Figure> {
    let signals = SignalPair::generate(&mut ctx.rng);
    let coh = coherence(&signals.s1, &signals.s2, NFFT, signals.sample_rate())?;
    let size = ctx.size;
    Figure::render(size, |root| draw_on(root, size, &signals, &coh))
}

pub fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    size: FigureSize,
    signals: &SignalPair,
    coh: &Coherence,
) -> Result<()> {
    let (upper, lower) = root.split_vertically((root.dim_in_pixel().1 / 2) as i32);
    let margin = size.pt_px(6.);
    let x_area = size.pt_px(22.);
    let y_area = size.pt_px(36.);

    let shown = signals.t.iter().take_while(|&&t| t <= SHOWN_SECONDS).count();
    let (lo, hi) = signals.s1[..shown]
        .iter()
        .chain(&signals.s2[..shown])
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let (lo, hi) = if shown == 0 { (-1., 1.) } else { (lo, hi) };
    let pad = (hi - lo) * 0.05;

    let mut signal_chart = ChartBuilder::on(&upper)
        .margin(margin)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(0f64..SHOWN_SECONDS, (lo - pad)..(hi + pad))?;
    signal_chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("s1 and s2")
        .label_style(size.font(9.))
        .axis_desc_style(size.font(10.))
        .draw()?;
    for (s, color) in [(&signals.s1, TAB_BLUE), (&signals.s2, TAB_ORANGE)] {
        signal_chart.draw_series(LineSeries::new(
            signals.t[..shown].iter().copied().zip(s[..shown].iter().copied()),
            color.stroke_width(1),
        ))?;
    }

    let nyquist = coh.freqs.last().copied().unwrap_or(1.);
    let mut coherence_chart = ChartBuilder::on(&lower)
        .margin(margin)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(0f64..nyquist, 0f64..1f64)?;
    coherence_chart
        .configure_mesh()
        .x_desc("Frequency")
        .y_desc("Coherence")
        .label_style(size.font(9.))
        .axis_desc_style(size.font(10.))
        .draw()?;
    coherence_chart.draw_series(LineSeries::new(
        coh.freqs.iter().copied().zip(coh.cxy.iter().copied()),
        TAB_BLUE.stroke_width(1),
    ))?;

    Ok(())
}

#[cfg(test)]
use crate::{config::DemoConfig, signal::COMMON_FREQ};

#[test]
fn shared_rng_advances_between_draws() {
    let mut ctx = DemoContext::from_config(&DemoConfig::default());
    let first = SignalPair::generate(&mut ctx.rng);
    let second = SignalPair::generate(&mut ctx.rng);
    assert_ne!(first.s1, second.s1);

    let mut replay = DemoContext::from_config(&DemoConfig::default());
    assert_eq!(SignalPair::generate(&mut replay.rng), first);
}

#[test]
fn renders_both_panels() {
    let mut ctx = DemoContext::from_config(&DemoConfig::default());
    let figure = draw(&mut ctx).unwrap();
    let (w, h) = (figure.width() as usize, figure.height() as usize);
    let px = figure.pixels();
    let inked = |rows: std::ops::Range<usize>| {
        rows.flat_map(|y| (0..w).map(move |x| (y * w + x) * 3))
            .any(|i| px[i..i + 3] != [255, 255, 255])
    };
    assert!(inked(0..h / 2));
    assert!(inked(h / 2..h));
}

#[test]
fn coherence_panel_covers_nyquist() {
    let mut ctx = DemoContext::from_config(&DemoConfig::default());
    let s = SignalPair::generate(&mut ctx.rng);
    let c = coherence(&s.s1, &s.s2, NFFT, s.sample_rate()).unwrap();
    assert_eq!(c.freqs.last().copied(), Some(50.));
    assert!(c.freqs.iter().any(|&f| (f - COMMON_FREQ).abs() < 0.5));
}
