//! File I/O and HTTP plumbing behind the `sketch-tool` binary.
//!
//! Images are written as 32-bit top-down BMP or raw RGBA; grids are read from
//! JSON either as a bare 28×28 array or wrapped in a request body.

use std::fs::{self, File};
use std::io::{self, Write as IoWrite};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use digit_sketch::classifier::{parse_response, ClassificationRequest, Prediction};
use digit_sketch::config::SketchConfig;
use digit_sketch::image::RgbaImage;
use digit_sketch::{ClassifierError, IntensityGrid};
use log::{debug, info, warn};
use serde_json::Value;

// ============================================================================
// Image output
// ============================================================================

/// Encode an image as a 32-bit BMP (top-down, BGRA).
pub fn write_bmp<W: IoWrite>(mut w: W, img: &RgbaImage) -> io::Result<()> {
    let row_size = img.width * 4;
    let image_size = row_size * img.height;
    let file_size = 14 + 40 + image_size;

    // BMP file header (14 bytes)
    w.write_all(b"BM")?;
    w.write_all(&file_size.to_le_bytes())?;
    w.write_all(&[0u8; 4])?; // reserved
    w.write_all(&(14u32 + 40).to_le_bytes())?; // pixel data offset

    // BITMAPINFOHEADER (40 bytes)
    w.write_all(&40u32.to_le_bytes())?;
    w.write_all(&img.width.to_le_bytes())?;
    w.write_all(&(-(img.height as i32)).to_le_bytes())?; // negative height = top-down
    w.write_all(&1u16.to_le_bytes())?; // planes
    w.write_all(&32u16.to_le_bytes())?; // bits per pixel
    w.write_all(&0u32.to_le_bytes())?; // BI_RGB
    w.write_all(&image_size.to_le_bytes())?;
    w.write_all(&[0u8; 8])?; // pixels per meter
    w.write_all(&[0u8; 8])?; // palette counts

    let mut row = Vec::with_capacity(row_size as usize);
    for line in img.data.chunks_exact(row_size as usize) {
        row.clear();
        for px in line.chunks_exact(4) {
            row.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
        w.write_all(&row)?;
    }
    Ok(())
}

/// Raw RGBA with a `[width:u32][height:u32]` little-endian header.
pub fn write_raw<W: IoWrite>(mut w: W, img: &RgbaImage) -> io::Result<()> {
    w.write_all(&img.width.to_le_bytes())?;
    w.write_all(&img.height.to_le_bytes())?;
    w.write_all(&img.data)
}

/// Save an image, picking the format from the extension.
pub fn save_image(path: &Path, img: &RgbaImage) -> io::Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bmp") => write_bmp(File::create(path)?, img),
        Some("raw") | Some("rgba") => write_raw(File::create(path)?, img),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported image format: {:?}", path),
        )),
    }
}

/// Nearest-neighbour enlargement, so 26×26 feature maps are viewable.
pub fn upscale(img: &RgbaImage, factor: u32) -> RgbaImage {
    let factor = factor.max(1);
    let mut out = RgbaImage::new(img.width * factor, img.height * factor);
    let out_row = out.width as usize * 4;
    for (y, line) in out.data.chunks_exact_mut(out_row).enumerate() {
        let sy = y as u32 / factor;
        for (x, px) in line.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&img.pixel(x as u32 / factor, sy));
        }
    }
    out
}

// ============================================================================
// Grid input
// ============================================================================

/// Parse a grid from `[[...]]` or `{"pixels": [[...]]}`.
pub fn grid_from_json(text: &str) -> anyhow::Result<IntensityGrid> {
    let value: Value = serde_json::from_str(text).context("grid file is not JSON")?;
    let pixels = match value {
        Value::Object(mut obj) => obj
            .remove("pixels")
            .context("grid object has no \"pixels\" field")?,
        other => other,
    };
    Ok(serde_json::from_value(pixels)?)
}

pub fn load_grid(path: &Path) -> anyhow::Result<IntensityGrid> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    grid_from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

// ============================================================================
// Classifier client
// ============================================================================

pub struct ClassifierClient {
    client: reqwest::Client,
    url: String,
    timeout_ms: Option<u64>,
    layer_names: Vec<String>,
}

impl ClassifierClient {
    pub fn new(config: &SketchConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().context("HTTP client init failed")?;
        Ok(Self {
            client,
            url: config.predict_url(),
            timeout_ms: config.request_timeout_ms,
            layer_names: config.layer_names.clone(),
        })
    }

    fn transport(&self, err: reqwest::Error) -> ClassifierError {
        match self.timeout_ms {
            Some(ms) if err.is_timeout() => ClassifierError::Timeout(ms),
            _ => ClassifierError::Transport(err.to_string()),
        }
    }

    /// POST the grid and parse the reply. The body is parsed whatever the
    /// HTTP status, since failures carry their message in it.
    pub async fn classify(&self, grid: &IntensityGrid) -> Result<Prediction, ClassifierError> {
        info!("POST {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&ClassificationRequest::new(grid))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let status = response.status();
        if !status.is_success() {
            warn!("classifier answered HTTP {}", status);
        }
        let body = response.text().await.map_err(|e| self.transport(e))?;
        debug!("response body: {} bytes", body.len());
        parse_response(&body, &self.layer_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmp_header_and_pixels() {
        let mut img = RgbaImage::new(2, 1);
        img.data.copy_from_slice(&[10, 20, 30, 40, 1, 2, 3, 4]);
        let mut out = Vec::new();
        write_bmp(&mut out, &img).unwrap();
        assert_eq!(out.len(), 54 + 8);
        assert_eq!(&out[0..2], b"BM");
        assert_eq!(u32::from_le_bytes([out[2], out[3], out[4], out[5]]), 62);
        assert_eq!(i32::from_le_bytes([out[22], out[23], out[24], out[25]]), -1);
        assert_eq!(&out[54..], &[30, 20, 10, 40, 3, 2, 1, 4]);
    }

    #[test]
    fn test_raw_header() {
        let img = RgbaImage::new(3, 2);
        let mut out = Vec::new();
        write_raw(&mut out, &img).unwrap();
        assert_eq!(out.len(), 8 + 24);
        assert_eq!(&out[0..8], &[3, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_upscale() {
        let mut img = RgbaImage::new(2, 1);
        img.data.copy_from_slice(&[255, 255, 255, 255, 0, 0, 0, 255]);
        let big = upscale(&img, 3);
        assert_eq!((big.width, big.height), (6, 3));
        assert_eq!(big.pixel(2, 2), [255, 255, 255, 255]);
        assert_eq!(big.pixel(3, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_grid_from_json_shapes() {
        let mut rows = vec![vec![0.0; 28]; 28];
        rows[5][7] = 0.5;
        let bare = serde_json::to_string(&rows).unwrap();
        let wrapped = format!("{{\"pixels\": {}}}", bare);
        assert_eq!(grid_from_json(&bare).unwrap().get(7, 5), 0.5);
        assert_eq!(grid_from_json(&wrapped).unwrap().get(7, 5), 0.5);

        assert!(grid_from_json("[[0.0]]").is_err());
        assert!(grid_from_json("{\"grid\": []}").is_err());
    }

    #[test]
    fn test_save_image_rejects_unknown_extension() {
        let err = save_image(Path::new("out.png"), &RgbaImage::new(1, 1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
