use std::{fs::File, io::Read, path::PathBuf};

use serde::Deserialize;
use time::{macros::format_description, Date};
use tracing::info;

use crate::error::Result;

/// Daily prices sample compiled into the binary.
/// Columns: date,open,high,low,close,volume,adj_close
pub const BUNDLED_PRICES_CSV: &str = include_str!("../data/goog.csv");

#[derive(Debug, Clone)]
pub struct PriceRecord {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// close adjusted for splits and dividends
    pub adj_close: f64,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    adj_close: f64,
}

impl TryFrom<PriceRow> for PriceRecord {
    type Error = crate::error::Error;
    fn try_from(row: PriceRow) -> Result<Self> {
        Ok(Self {
            date: Date::parse(&row.date, format_description!("[year]-[month]-[day]"))?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            adj_close: row.adj_close,
        })
    }
}

impl Ord for PriceRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.date.cmp(&other.date)
    }
}

impl PartialOrd for PriceRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for PriceRecord {}

/// Read-only provider of a daily price history.
pub trait PriceSource: std::fmt::Debug {
    /// Records sorted by date, oldest first.
    fn load_price_series(&self) -> Result<Vec<PriceRecord>>;
}

/// Parses price CSV with a header row and returns the records sorted by date.
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<PriceRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = vec![];
    for row in csv.deserialize::<PriceRow>() {
        records.push(PriceRecord::try_from(row?)?);
    }
    records.sort();
    Ok(records)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BundledPrices;

impl PriceSource for BundledPrices {
    fn load_price_series(&self) -> Result<Vec<PriceRecord>> {
        read_prices(BUNDLED_PRICES_CSV.as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct CsvPrices {
    pub path: PathBuf,
}

impl CsvPrices {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceSource for CsvPrices {
    fn load_price_series(&self) -> Result<Vec<PriceRecord>> {
        info!("read prices from csv: {}", self.path.display());
        read_prices(File::open(&self.path)?)
    }
}

impl PriceSource for Vec<PriceRecord> {
    fn load_price_series(&self) -> Result<Vec<PriceRecord>> {
        let mut records = self.clone();
        records.sort();
        Ok(records)
    }
}

#[test]
fn bundled_prices_sorted() {
    let prices = BundledPrices.load_price_series().unwrap();
    assert!(prices.len() >= 250);
    assert!(prices.windows(2).all(|w| w[0].date < w[1].date));
    assert!(prices.iter().all(|p| p.low <= p.high && p.volume > 0.));
}

#[test]
fn csv_rows_are_reordered_by_date() {
    let csv = "date,open,high,low,close,volume,adj_close\n\
               2008-01-03,2,3,1,2.5,100,2.5\n\
               2008-01-02,1,2,0.5,1.5,200,1.5\n";
    let prices = read_prices(csv.as_bytes()).unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].date, time::macros::date!(2008 - 01 - 02));
    assert_eq!(prices[1].volume, 100.);
}

#[test]
fn malformed_date_is_an_error() {
    let csv = "date,open,high,low,close,volume,adj_close\n\
               01/02/2008,1,2,0.5,1.5,200,1.5\n";
    assert!(matches!(
        read_prices(csv.as_bytes()),
        Err(crate::error::Error::Date(_))
    ));
}

#[test]
fn missing_csv_file_is_an_error() {
    let source = CsvPrices::new("./data/no_such_prices.csv");
    assert!(source.load_price_series().is_err());
}
