use crate::foundation::error::{FramecapError, FramecapResult};

/// Separable Gaussian blur over premultiplied RGBA8, using Q16 fixed-point weights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GaussianBlur {
    kernel_q16: Vec<u32>,
}

impl GaussianBlur {
    /// Build the kernel for a canvas-style `shadowBlur` value.
    ///
    /// A blur of `b` pixels corresponds to a Gaussian with standard deviation `b / 2`, and the
    /// kernel extends to three standard deviations.
    pub(crate) fn from_shadow_blur(blur_px: f32) -> FramecapResult<Self> {
        if !blur_px.is_finite() || blur_px < 0.0 {
            return Err(FramecapError::validation(
                "shadow blur must be finite and >= 0",
            ));
        }
        let sigma = blur_px / 2.0;
        let radius = (sigma * 3.0).ceil() as u32;
        Ok(Self {
            kernel_q16: gaussian_kernel_q16(radius, sigma)?,
        })
    }

    pub(crate) fn radius(&self) -> u32 {
        (self.kernel_q16.len() / 2) as u32
    }

    /// Blur `buf` in place. `scratch` is resized as needed.
    pub(crate) fn apply(&self, buf: &mut [u8], scratch: &mut Vec<u8>, width: u32, height: u32) {
        if self.radius() == 0 || width == 0 || height == 0 {
            return;
        }
        scratch.resize(buf.len(), 0);
        horizontal_blur_q16(buf, scratch, width, height, &self.kernel_q16);
        vertical_blur_q16(scratch, buf, width, height, &self.kernel_q16);
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FramecapResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FramecapError::validation(
            "blur sigma must be finite and > 0",
        ));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FramecapError::render_context("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i32 - radius;
                // Transparent outside the surface, so shadows fade out at the edges.
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i32 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
