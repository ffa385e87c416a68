use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{FramecapError, FramecapResult};

/// Environment variable overriding [`CaptureOpts::jpeg_quality`].
pub const ENV_JPEG_QUALITY: &str = "FRAMECAP_JPEG_QUALITY";
/// Environment variable naming a TTF/OTF file used for comment text.
pub const ENV_COMMENT_FONT: &str = "FRAMECAP_COMMENT_FONT";

/// Product identity written into the `Software` field as `"<product> version <version>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftwareInfo {
    /// Product name.
    pub product: String,
    /// Product version.
    pub version: String,
}

impl Default for SoftwareInfo {
    fn default() -> Self {
        Self {
            product: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl std::fmt::Display for SoftwareInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} version {}", self.product, self.version)
    }
}

/// Options shared by every production of a job.
#[derive(Clone, Debug)]
pub struct CaptureOpts {
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// Identity written into the metadata block.
    pub software: SoftwareInfo,
    /// TTF/OTF bytes for comment text. Required only when visible comments are rendered.
    pub comment_font: Option<Arc<Vec<u8>>>,
    /// Run the two productions on the rayon pool instead of sequentially.
    pub parallel: bool,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            software: SoftwareInfo::default(),
            comment_font: None,
            parallel: true,
        }
    }
}

impl CaptureOpts {
    /// Defaults, with [`ENV_JPEG_QUALITY`] and [`ENV_COMMENT_FONT`] applied when set.
    pub fn from_env() -> FramecapResult<Self> {
        let mut opts = Self::default();
        if let Ok(v) = std::env::var(ENV_JPEG_QUALITY) {
            let q = v.trim().parse::<u8>().map_err(|_| {
                FramecapError::validation(format!("{ENV_JPEG_QUALITY} must be 1..=100, got {v:?}"))
            })?;
            opts.jpeg_quality = q;
        }
        if let Ok(path) = std::env::var(ENV_COMMENT_FONT) {
            opts = opts.with_comment_font_file(Path::new(&path))?;
        }
        opts.validate()?;
        Ok(opts)
    }

    /// Return options with a different JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Return options with a different software identity.
    pub fn with_software(mut self, product: impl Into<String>, version: impl Into<String>) -> Self {
        self.software = SoftwareInfo {
            product: product.into(),
            version: version.into(),
        };
        self
    }

    /// Return options using `font` for comment text.
    pub fn with_comment_font(mut self, font: Arc<Vec<u8>>) -> Self {
        self.comment_font = Some(font);
        self
    }

    /// Return options using the font file at `path` for comment text.
    pub fn with_comment_font_file(self, path: &Path) -> FramecapResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            FramecapError::validation(format!(
                "failed to read comment font '{}': {e}",
                path.display()
            ))
        })?;
        Ok(self.with_comment_font(Arc::new(bytes)))
    }

    /// Return options with parallel production toggled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check option ranges.
    pub fn validate(&self) -> FramecapResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FramecapError::validation(format!(
                "jpeg_quality must be 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.software.product.trim().is_empty() {
            return Err(FramecapError::validation(
                "software product name must not be empty",
            ));
        }
        if let Some(font) = &self.comment_font
            && font.is_empty()
        {
            return Err(FramecapError::validation("comment font bytes are empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
