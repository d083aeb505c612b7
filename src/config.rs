use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{
    error::{Error, Result},
    figure::FigureSize,
};

pub const DEFAULT_CONFIG_PATH: &str = "./config/demo_charts.toml";
pub const DEFAULT_SEED: u64 = 19680801;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed of the process-wide RNG shared by all recipes.
    pub seed: u64,
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: u32,
    /// CSV price file for the scatter chart; the bundled sample when unset.
    pub price_data: Option<PathBuf>,
    /// Log into a file in this directory instead of stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            width_px: 620,
            height_px: 430,
            dpi: 100,
            price_data: None,
            log_dir: None,
        }
    }
}

impl DemoConfig {
    pub fn value_parse(path: impl AsRef<Path>) -> Result<Self> {
        let c = std::fs::read_to_string(path)?;
        Self::from_toml_str(&c)
    }

    pub fn from_toml_str(c: &str) -> Result<Self> {
        let val: Self = toml::from_str(c)?;
        val.validate()?;
        Ok(val)
    }

    /// Figure dimensions and DPI must be non-zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("width_px", self.width_px),
            ("height_px", self.height_px),
            ("dpi", self.dpi),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    /// Reads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            info!("read config: {}", path.display());
            Self::value_parse(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn figure_size(&self) -> FigureSize {
        FigureSize::from_pixels(self.width_px, self.height_px, self.dpi)
    }
}

#[test]
fn partial_config_keeps_defaults() {
    let c: DemoConfig = toml::from_str("seed = 7\nprice_data = \"prices.csv\"").unwrap();
    assert_eq!(c.seed, 7);
    assert_eq!(c.width_px, 620);
    assert_eq!(c.dpi, 100);
    assert_eq!(c.price_data, Some(PathBuf::from("prices.csv")));
    assert_eq!(c.log_dir, None);
}

#[test]
fn zero_sizes_are_rejected() {
    for toml in ["dpi = 0", "width_px = 0", "height_px = 0"] {
        let field = toml.split(' ').next().unwrap();
        assert!(matches!(
            DemoConfig::from_toml_str(toml),
            Err(Error::InvalidConfig(msg)) if msg.starts_with(field)
        ));
    }
    assert!(DemoConfig::from_toml_str("dpi = 72").is_ok());
    assert!(DemoConfig::default().validate().is_ok());
}

#[test]
fn missing_config_file_is_default() {
    let c = DemoConfig::load_or_default("./config/does_not_exist.toml").unwrap();
    assert_eq!(c, DemoConfig::default());
}

#[test]
fn bundled_config_parses() {
    let c = DemoConfig::value_parse(DEFAULT_CONFIG_PATH).unwrap();
    assert_eq!(c.figure_size().pixels(), (620, 430));
}
