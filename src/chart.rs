use std::{fmt, str::FromStr};

use rand::{rngs::StdRng, SeedableRng};
use tracing::info_span;

use crate::{
    config::DemoConfig,
    error::{Error, Result},
    figure::{Figure, FigureSize},
    price_data::{BundledPrices, CsvPrices, PriceSource},
};

pub mod bar_label;
pub mod coherence;
pub mod scatter;

/// matplotlib "tab10" colours shared by the recipes
pub(crate) const TAB_BLUE: plotters::style::RGBColor = plotters::style::RGBColor(31, 119, 180);
pub(crate) const TAB_ORANGE: plotters::style::RGBColor = plotters::style::RGBColor(255, 127, 14);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    BarLabel,
    Coherence,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::BarLabel, ChartKind::Coherence, ChartKind::Scatter];

    /// The exact request line that selects this chart.
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::BarLabel => "Bar Label Demo",
            ChartKind::Coherence => "Plotting the coherence of two signals",
            ChartKind::Scatter => "Scatter Demo2",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::BarLabel => "bar_label",
            ChartKind::Coherence => "coherence",
            ChartKind::Scatter => "scatter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::UnknownChart(s.to_string()))
    }
}

/// Process-scoped state handed to every recipe. The RNG is seeded once and
/// advances across requests.
#[derive(Debug)]
pub struct DemoContext {
    pub rng: StdRng,
    pub size: FigureSize,
    pub prices: Box<dyn PriceSource>,
}

impl DemoContext {
    pub fn new(seed: u64, size: FigureSize, prices: Box<dyn PriceSource>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            size,
            prices,
        }
    }

    pub fn from_config(config: &DemoConfig) -> Self {
        let prices: Box<dyn PriceSource> = match &config.price_data {
            Some(path) => Box::new(CsvPrices::new(path)),
            None => Box::new(BundledPrices),
        };
        Self::new(config.seed, config.figure_size(), prices)
    }
}

pub fn draw_kind(kind: ChartKind, ctx: &mut DemoContext) -> Result<Figure> {
    let _span = info_span!("draw", chart = %kind).entered();
    match kind {
        ChartKind::BarLabel => bar_label::draw(ctx.size),
        ChartKind::Coherence => coherence::draw(ctx),
        ChartKind::Scatter => scatter::draw(ctx),
    }
}

/// Renders the chart named `name`; `Ok(None)` when no chart has that name.
pub fn draw(name: &str, ctx: &mut DemoContext) -> Result<Option<Figure>> {
    match ChartKind::from_name(name) {
        Some(kind) => draw_kind(kind, ctx).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
fn test_context() -> DemoContext {
    DemoContext::from_config(&DemoConfig::default())
}

#[test]
fn names_round_trip() {
    for kind in ChartKind::ALL {
        assert_eq!(ChartKind::from_name(kind.name()), Some(kind));
        assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
    }
}

#[test]
fn names_match_exactly() {
    assert_eq!(ChartKind::from_name("bar label demo"), None);
    assert_eq!(ChartKind::from_name("Bar Label Demo "), None);
    assert_eq!(ChartKind::from_name(""), None);
    assert!(matches!(
        "nonsense".parse::<ChartKind>(),
        Err(Error::UnknownChart(name)) if name == "nonsense"
    ));
}

#[test]
fn unknown_name_draws_nothing() {
    let mut ctx = test_context();
    assert!(draw("nonsense", &mut ctx).unwrap().is_none());
}

#[test]
fn every_kind_draws_a_figure() {
    let mut ctx = test_context();
    for kind in ChartKind::ALL {
        let figure = draw(kind.name(), &mut ctx).unwrap().unwrap();
        assert_eq!((figure.width(), figure.height()), (620, 430));
        assert!(
            figure.pixels().iter().any(|&p| p != 255),
            "{} rendered a blank canvas",
            kind
        );
    }
}

#[test]
fn configured_size_is_used() {
    let config = DemoConfig {
        width_px: 300,
        height_px: 200,
        ..DemoConfig::default()
    };
    let mut ctx = DemoContext::from_config(&config);
    let figure = draw_kind(ChartKind::BarLabel, &mut ctx).unwrap();
    assert_eq!((figure.width(), figure.height()), (300, 200));
}
