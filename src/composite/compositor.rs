use crate::foundation::core::RasterImage;
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// How a template image is mapped onto the stroke raster's bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Scale each axis independently so the template covers the bounds exactly.
    #[default]
    Stretch,
    /// Scale uniformly until the bounds are covered, centering and cropping the overflow.
    AspectFill,
}

/// Merge a page template with its rasterized stroke layer.
///
/// Without a template the stroke layer already carries the visible backdrop and is returned
/// unchanged. With a template the output takes the stroke raster's size: the template is
/// scaled to fill (nearest sampling) and the strokes are blended on top with source-over.
pub fn compose(
    background: Option<&RasterImage>,
    strokes: RasterImage,
    fit: BackgroundFit,
) -> RasterImage {
    let Some(background) = background else {
        return strokes;
    };
    if background.width() == 0 || background.height() == 0 {
        return strokes;
    }

    let mut out = strokes;
    let (w, h) = (out.width(), out.height());
    let sampler = Sampler::new(background, w, h, fit);
    let dst = out.data_mut();
    for y in 0..h {
        for x in 0..w {
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            let stroke = [dst[idx], dst[idx + 1], dst[idx + 2], dst[idx + 3]];
            let under = sampler.sample(background, x, y);
            dst[idx..idx + 4].copy_from_slice(&over(under, stroke, 1.0));
        }
    }
    out
}

/// Premultiplied source-over: `src` drawn on top of `dst` at `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Nearest-neighbor mapping from output pixels to template pixels.
struct Sampler {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Sampler {
    fn new(src: &RasterImage, w: u32, h: u32, fit: BackgroundFit) -> Self {
        let (bw, bh) = (f64::from(src.width()), f64::from(src.height()));
        let (w, h) = (f64::from(w), f64::from(h));
        match fit {
            BackgroundFit::Stretch => Self {
                scale_x: w / bw,
                scale_y: h / bh,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            BackgroundFit::AspectFill => {
                let s = (w / bw).max(h / bh);
                Self {
                    scale_x: s,
                    scale_y: s,
                    offset_x: (w - bw * s) / 2.0,
                    offset_y: (h - bh * s) / 2.0,
                }
            }
        }
    }

    fn sample(&self, src: &RasterImage, x: u32, y: u32) -> PremulRgba8 {
        let sx = ((f64::from(x) + 0.5 - self.offset_x) / self.scale_x).floor();
        let sy = ((f64::from(y) + 0.5 - self.offset_y) / self.scale_y).floor();
        let sx = sx.clamp(0.0, f64::from(src.width() - 1)) as u32;
        let sy = sy.clamp(0.0, f64::from(src.height() - 1)) as u32;
        src.pixel(sx, sy).unwrap_or([0, 0, 0, 0])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
