use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Date: {0}")]
    Date(#[from] time::error::Parse),
    #[error("Draw: {0}")]
    Draw(String),
    #[error("Png: {0}")]
    Png(#[from] image::ImageError),
    #[error("insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("invalid price on {date}: {field} = {value}")]
    InvalidPrice {
        date: time::Date,
        field: &'static str,
        value: f64,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unknown chart: {0}")]
    UnknownChart(String),
    #[error("Any: {0}")]
    Any(#[from] anyhow::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Error::Draw(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
