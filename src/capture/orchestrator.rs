use crate::capture::job::{CaptureJob, CaptureMode, CompositeResult};
use crate::config::CaptureOpts;
use crate::foundation::error::{FramecapError, FramecapResult};
use crate::render::compositor::{
    Layers, Production, composite_full, direct_transfer, rasterize_comments,
};

/// How the normal output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NormalPath {
    /// Move the frame straight into the output surface. Only chosen when nothing else needs the
    /// frame and no layer would be drawn.
    Direct,
    /// Draw the frame and the applicable layers onto a fresh surface.
    Composite,
}

/// Which outputs a job produces and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProductionPlan {
    normal: Option<NormalPath>,
    captioned: bool,
}

impl ProductionPlan {
    /// Apply the mode/layer decision table.
    ///
    /// The captioned output exists only with a subtitle layer in `CompositingCaption` or `Both`.
    /// The normal output exists for `VideoOnly` and `Both`, and as the fallback of
    /// `CompositingCaption` when the subtitle layer is missing.
    pub fn decide(
        mode: CaptureMode,
        has_subtitle: bool,
        has_overlay: bool,
        has_comments: bool,
    ) -> Self {
        let captioned = has_subtitle
            && matches!(mode, CaptureMode::CompositingCaption | CaptureMode::Both);
        let wants_normal = match mode {
            CaptureMode::VideoOnly | CaptureMode::Both => true,
            CaptureMode::CompositingCaption => !has_subtitle,
        };
        let normal = wants_normal.then(|| {
            if !captioned && !has_overlay && !has_comments {
                NormalPath::Direct
            } else {
                NormalPath::Composite
            }
        });
        Self { normal, captioned }
    }

    /// The normal output path, if the normal output is produced.
    pub fn normal(&self) -> Option<NormalPath> {
        self.normal
    }

    /// Whether the captioned output is produced.
    pub fn captioned(&self) -> bool {
        self.captioned
    }

    /// Presence pattern as `(normal, captioned)`.
    pub fn produced(&self) -> (bool, bool) {
        (self.normal.is_some(), self.captioned)
    }
}

/// Produce every output the job's mode and layers call for.
///
/// Both productions run on the rayon pool when `opts.parallel` is set. A failed production fails
/// the whole call; the normal output's error wins when both fail.
#[tracing::instrument(skip_all, fields(mode = ?job.mode))]
pub fn composite(job: CaptureJob, opts: &CaptureOpts) -> FramecapResult<CompositeResult> {
    opts.validate()?;
    job.validate()?;

    let plan = ProductionPlan::decide(
        job.mode,
        job.subtitle_layer.is_some(),
        job.overlay_layer.is_some(),
        job.comment_layer.is_some(),
    );
    tracing::debug!(?plan, "production plan");

    let CaptureJob {
        frame,
        subtitle_layer,
        overlay_layer,
        comment_layer,
        metadata,
        ..
    } = job;
    let layers = Layers {
        overlay: overlay_layer.as_ref(),
        subtitle: subtitle_layer.as_ref(),
        comments: comment_layer.as_ref(),
        comment_raster: None,
    };

    if plan.normal == Some(NormalPath::Direct) {
        if plan.captioned {
            return Err(FramecapError::precondition(
                "direct transfer cannot run alongside another production",
            ));
        }
        let normal = direct_transfer(frame, layers, &metadata, opts)
            .inspect_err(|e| tracing::warn!(error = %e, "normal production failed"))?;
        return Ok(CompositeResult {
            normal: Some(normal),
            captioned: None,
        });
    }

    // Comments look the same in both outputs, so they are rasterized once and shared.
    let comment_raster = match &comment_layer {
        Some(spec) => rasterize_comments(spec, frame.canvas(), opts)
            .inspect_err(|e| tracing::warn!(error = %e, "comment rasterization failed"))?,
        None => None,
    };
    let layers = Layers {
        comment_raster: comment_raster.as_ref(),
        ..layers
    };

    // Each production derives its own flagged copy of the metadata from this shared record.
    let run = |production: Production, wanted: bool| -> FramecapResult<Option<Vec<u8>>> {
        if !wanted {
            return Ok(None);
        }
        composite_full(&frame, layers, production, &metadata, opts)
            .map(Some)
            .inspect_err(|e| {
                tracing::warn!(production = production.as_str(), error = %e, "production failed")
            })
    };

    let (normal, captioned) = if opts.parallel {
        rayon::join(
            || run(Production::Normal, plan.normal.is_some()),
            || run(Production::Captioned, plan.captioned),
        )
    } else {
        (
            run(Production::Normal, plan.normal.is_some()),
            run(Production::Captioned, plan.captioned),
        )
    };

    Ok(CompositeResult {
        normal: normal?,
        captioned: captioned?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/capture/orchestrator.rs"]
mod tests;
