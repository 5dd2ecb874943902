//! Band fetching and decoding.
//!
//! Fetches one band asset per HTTP GET, decodes the GeoTIFF, and brings
//! the result to the working resolution. Rasters of one scene must leave
//! this module with identical shapes; the caller requests the coarser
//! SWIR band with an explicit target shape to enforce that.

use std::io::Cursor;
use std::time::Duration;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use landshift_core::raster::resample::{decimate, downsample_mean, resize_bilinear, Resampling};
use landshift_core::raster::{GeoTransform, Raster};

use crate::error::{CloudError, Result};
use crate::scene::{Band, Scene};

// ---------------------------------------------------------------------------
// Options and targets
// ---------------------------------------------------------------------------

/// Configuration for [`BandReader`].
pub struct BandReaderOptions {
    /// Timeout for a whole-asset fetch (default 120 s; band assets are
    /// tens of megabytes).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
}

impl Default for BandReaderOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }
}

/// How to bring a decoded band to the working grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    /// Reduce by an integer factor with the given method.
    Factor { method: Resampling, factor: usize },
    /// Bilinearly resample to an exact shape (rows, cols).
    Shape { rows: usize, cols: usize },
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Fetches and decodes band rasters.
pub struct BandReader {
    client: reqwest::Client,
    options: BandReaderOptions,
}

impl BandReader {
    /// Create a new band reader.
    pub fn new(options: BandReaderOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, options })
    }

    /// Fetch, decode and resample one band of a scene.
    ///
    /// Network or decode failure is fatal for the computation; there is
    /// no partial-result fallback.
    pub async fn read_band(
        &self,
        scene: &Scene,
        band: Band,
        target: ReadTarget,
    ) -> Result<Raster<f32>> {
        let href = scene.asset_href(band)?;
        let bytes = self.fetch_bytes(href).await?;
        debug!(scene = %scene.id, %band, bytes = bytes.len(), "fetched band asset");

        let native = decode_band(&bytes)?;

        let raster = match target {
            ReadTarget::Factor { method, factor } => match method {
                Resampling::Decimate => decimate(&native, factor)?,
                Resampling::Average => downsample_mean(&native, factor)?,
            },
            ReadTarget::Shape { rows, cols } => resize_bilinear(&native, rows, cols)?,
        };

        debug!(
            scene = %scene.id,
            %band,
            native_shape = ?native.shape(),
            shape = ?raster.shape(),
            "decoded band"
        );
        Ok(raster)
    }

    /// GET the full asset body, retrying timeouts and connection errors
    /// with exponential backoff. Client errors (4xx) are not retried.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_err = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                debug!(attempt, ?delay, "retrying band fetch");
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let bytes = resp
                        .bytes()
                        .await
                        .map_err(|e| CloudError::Network(format!("reading asset body: {e}")))?;
                    return Ok(bytes.to_vec());
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_err = Some(CloudError::Network(format!(
                        "HTTP {} fetching {}",
                        status, url
                    )));
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_err = Some(CloudError::Http(e));
                }
                Err(e) => return Err(CloudError::Http(e)),
            }
        }

        Err(last_err.unwrap_or_else(|| CloudError::Network("band fetch failed".into())))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a GeoTIFF band from an in-memory buffer into an `f32` raster.
pub fn decode_band(data: &[u8]) -> Result<Raster<f32>> {
    let mut decoder = Decoder::new(Cursor::new(data))
        .map_err(|e| CloudError::Decode(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| CloudError::Decode(format!("cannot read dimensions: {e}")))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| CloudError::Decode(format!("cannot read image data: {e}")))?;

    // Sentinel-2 L2A reflectance is u16 digital numbers; accept the other
    // grayscale layouts a catalog might serve.
    let values: Vec<f32> = match result {
        DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::U32(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::I32(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
        _ => {
            return Err(CloudError::Decode(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if values.len() != rows * cols {
        return Err(CloudError::Decode(format!(
            "decoded {} samples for a {}x{} image",
            values.len(),
            rows,
            cols
        )));
    }

    let mut raster = Raster::from_vec(values, rows, cols)?;
    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

/// Read the geotransform from ModelPixelScaleTag + ModelTiepointTag, if
/// present.
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    // ModelPixelScaleTag = 33550, ModelTiepointTag = 33922
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::colortype::Gray32Float;
    use tiff::encoder::TiffEncoder;

    /// Encode a small float TIFF in memory, as a stand-in for a fetched
    /// band asset.
    fn encode_tiff(rows: usize, cols: usize, values: &[f32]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            let mut image = encoder
                .new_image::<Gray32Float>(cols as u32, rows as u32)
                .unwrap();

            let scale = vec![0.001, 0.001, 0.0];
            image
                .encoder()
                .write_tag(Tag::Unknown(33550), scale.as_slice())
                .unwrap();
            let tiepoint = vec![0.0, 0.0, 0.0, 80.20, 13.15, 0.0];
            image
                .encoder()
                .write_tag(Tag::Unknown(33922), tiepoint.as_slice())
                .unwrap();

            image.write_data(values).unwrap();
        }
        buf
    }

    #[test]
    fn decode_roundtrip() {
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let bytes = encode_tiff(3, 4, &values);

        let raster = decode_band(&bytes).unwrap();
        assert_eq!(raster.shape(), (3, 4));
        assert_eq!(raster.get(0, 0).unwrap(), 0.0);
        assert_eq!(raster.get(2, 3).unwrap(), 11.0);
    }

    #[test]
    fn decode_reads_geotransform() {
        let values = vec![1.0f32; 4];
        let bytes = encode_tiff(2, 2, &values);

        let raster = decode_band(&bytes).unwrap();
        let gt = raster.transform();
        assert!((gt.origin_x - 80.20).abs() < 1e-9);
        assert!((gt.origin_y - 13.15).abs() < 1e-9);
        assert!((gt.pixel_width - 0.001).abs() < 1e-12);
        assert!((gt.pixel_height + 0.001).abs() < 1e-12);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_band(&[0u8, 1, 2, 3]).is_err());
    }
}
