use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use plotters::{coord::Shift, prelude::*};

use crate::error::Result;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Physical figure size. Pixel dimensions are derived from inches and DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl FigureSize {
    pub fn from_pixels(width_px: u32, height_px: u32, dpi: u32) -> Self {
        Self {
            width_in: width_px as f64 / dpi as f64,
            height_in: height_px as f64 / dpi as f64,
            dpi,
        }
    }
    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }
    /// Typographic points (1/72 in) at this figure's DPI.
    pub fn points_to_pixels(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.
    }
    /// Points rounded to whole pixels, for plotters layout sizes.
    pub fn pt_px(&self, pt: f64) -> i32 {
        self.points_to_pixels(pt).round() as i32
    }
    pub fn font(&self, pt: f64) -> FontDesc<'static> {
        ("sans-serif", self.points_to_pixels(pt)).into_font()
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::from_pixels(620, 430, 100)
    }
}

/// A rendered RGB8 raster. Dropping it releases the pixel buffer.
#[derive(Debug)]
pub struct Figure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Figure {
    /// Renders `draw` onto a white canvas of `size`.
    pub fn render<F>(size: FigureSize, draw: F) -> Result<Self>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
    {
        let (width, height) = size.pixels();
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            &self.pixels,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(png)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}

/// Encodes the figure as a `data:image/png;base64,...` URI and releases it.
pub fn encode_data_uri(figure: Figure) -> Result<String> {
    let png = figure.to_png()?;
    drop(figure);
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)))
}

#[test]
fn size_from_pixels() {
    let size = FigureSize::default();
    assert!((size.width_in - 6.2).abs() < 1e-12);
    assert!((size.height_in - 4.3).abs() < 1e-12);
    assert_eq!(size.pixels(), (620, 430));
    assert_eq!(size.points_to_pixels(72.), 100.);
}

#[test]
fn blank_figure_is_white() {
    let figure = Figure::render(FigureSize::from_pixels(40, 30, 100), |_| Ok(())).unwrap();
    assert_eq!((figure.width(), figure.height()), (40, 30));
    assert_eq!(figure.pixels().len(), 40 * 30 * 3);
    assert!(figure.pixels().iter().all(|&p| p == 255));
}

#[test]
fn data_uri_decodes_to_png() {
    let figure = Figure::render(FigureSize::default(), |root| {
        root.draw(&Rectangle::new([(10, 10), (100, 60)], RED.filled()))?;
        Ok(())
    })
    .unwrap();
    let uri = encode_data_uri(figure).unwrap();
    assert!(uri.starts_with(DATA_URI_PREFIX));
    let png = STANDARD.decode(&uri[DATA_URI_PREFIX.len()..]).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (620, 430));
    assert_eq!(img.get_pixel(50, 30).0, [255, 0, 0]);
    assert_eq!(img.get_pixel(300, 300).0, [255, 255, 255]);
}
