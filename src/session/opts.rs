use crate::composite::compositor::BackgroundFit;
use crate::composite::encode::DEFAULT_JPEG_QUALITY;
use crate::composite::worker::EncodeSettings;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SketchError, SketchResult};

/// Options controlling how a [`crate::DrawingSession`] composes and encodes saves.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    /// JPEG quality (1..=100) for page composites.
    pub jpeg_quality: u8,
    /// Pixels per surface point when rasterizing strokes.
    pub raster_scale: f64,
    /// How templates are mapped onto the stroke raster.
    pub background_fit: BackgroundFit,
    /// Color transparent pixels are flattened onto before JPEG encoding.
    pub jpeg_matte: Rgba8,
    /// Whether stroke gestures are accepted when the session starts.
    pub editing_enabled: bool,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            raster_scale: 1.0,
            background_fit: BackgroundFit::Stretch,
            jpeg_matte: Rgba8::WHITE,
            editing_enabled: true,
        }
    }
}

impl SessionOpts {
    /// Reject values the compositor cannot honor.
    pub fn validate(&self) -> SketchResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SketchError::validation("jpeg_quality must be in 1..=100"));
        }
        if !self.raster_scale.is_finite() || self.raster_scale <= 0.0 {
            return Err(SketchError::validation(
                "raster_scale must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub(crate) fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            quality: self.jpeg_quality,
            matte: self.jpeg_matte,
            fit: self.background_fit,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
