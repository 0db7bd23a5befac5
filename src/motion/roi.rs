//! Sparse-grid ROI change detector with partial output updates.
//!
//! Anchors sit on a grid spaced `block_width x block_height` apart, starting
//! at `(block_width, block_height)`. Only the anchor pixel is compared: when
//! the XOR of its current and previous luma exceeds the threshold, the
//! `2*block_width x 2*block_height` block centered on the anchor is copied
//! from input to output. Everything else keeps whatever the output already
//! held, so a display sink only needs the copied blocks.

use crate::image::{Frame, FrameView};
use crate::motion::{MotionContext, Region};
use crate::trace::{trace_event, trace_span};
use crate::util::{CamFilterError, CamFilterResult};

/// Grid spacing and trigger level for the ROI detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiConfig {
    /// Horizontal anchor spacing; copied blocks are twice as wide.
    pub block_width: usize,
    /// Vertical anchor spacing; copied blocks are twice as tall.
    pub block_height: usize,
    /// A block triggers when `current_luma ^ previous_luma` exceeds this.
    pub threshold: u8,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            block_width: 20,
            block_height: 20,
            threshold: 0,
        }
    }
}

/// What an ROI pass wrote to the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoiOutcome {
    /// First frame: output is a full copy of the input.
    Primed,
    /// `regions` blocks were copied; see [`MotionContext::updated_regions`].
    Updated { regions: usize },
}

/// Runs one ROI pass and replaces the previous frame with `input`.
pub fn process_roi_diff(
    input: FrameView<'_>,
    output: &mut Frame,
    ctx: &mut MotionContext,
    cfg: &RoiConfig,
) -> CamFilterResult<RoiOutcome> {
    if cfg.block_width == 0 || cfg.block_height == 0 {
        return Err(CamFilterError::InvalidInput("ROI block size must be non-zero"));
    }
    let geometry = input.geometry();
    ctx.geometry().ensure_same(geometry)?;
    output.geometry().ensure_same(geometry)?;

    ctx.regions.clear();
    if !ctx.roi_primed {
        output.copy_from(input)?;
        ctx.remember(input)?;
        ctx.roi_primed = true;
        return Ok(RoiOutcome::Primed);
    }

    let _span = trace_span!("roi_diff").entered();
    let (bw, bh) = (cfg.block_width, cfg.block_height);
    let previous = ctx.previous.view();
    for ay in (bh..geometry.height).step_by(bh) {
        for ax in (bw..geometry.width).step_by(bw) {
            let change = input.luma_at(ax, ay) ^ previous.luma_at(ax, ay);
            if change <= cfg.threshold {
                continue;
            }
            let (ax, ay) = (ax as isize, ay as isize);
            let (bw, bh) = (bw as isize, bh as isize);
            if let Some(block) = Region::clipped(ax - bw, ay - bh, ax + bw, ay + bh, geometry) {
                block.copy(input, output);
                ctx.regions.push(block);
            }
        }
    }

    let regions = ctx.regions.len();
    trace_event!("roi_updated", regions = regions);
    ctx.remember(input)?;
    Ok(RoiOutcome::Updated { regions })
}

#[cfg(test)]
mod tests {
    use super::{process_roi_diff, RoiConfig, RoiOutcome};
    use crate::image::{Frame, Geometry};
    use crate::motion::{MotionContext, Region};
    use crate::pixel::Rgb565;
    use crate::util::CamFilterError;

    fn cfg() -> RoiConfig {
        RoiConfig {
            block_width: 4,
            block_height: 3,
            threshold: 0,
        }
    }

    #[test]
    fn unchanged_frame_touches_nothing() {
        let geometry = Geometry::new(16, 12).unwrap();
        let input = Frame::filled(geometry, Rgb565::from_luma(90)).unwrap();
        let mut ctx = MotionContext::new(geometry).unwrap();
        let mut output = Frame::new(geometry).unwrap();

        let first = process_roi_diff(input.view(), &mut output, &mut ctx, &cfg()).unwrap();
        assert_eq!(first, RoiOutcome::Primed);
        output.fill(Rgb565::BLUE);
        let second = process_roi_diff(input.view(), &mut output, &mut ctx, &cfg()).unwrap();
        assert_eq!(second, RoiOutcome::Updated { regions: 0 });
        assert!(output.as_slice().iter().all(|&px| px == Rgb565::BLUE));
    }

    #[test]
    fn edge_anchor_block_is_clipped() {
        let geometry = Geometry::new(10, 7).unwrap();
        let base = Frame::new(geometry).unwrap();
        let mut ctx = MotionContext::new(geometry).unwrap();
        let mut output = Frame::new(geometry).unwrap();
        process_roi_diff(base.view(), &mut output, &mut ctx, &cfg()).unwrap();

        // Anchors: x in {4, 8}, y in {3, 6}.
        let mut moved = base.clone();
        moved.set(8, 6, Rgb565::WHITE).unwrap();
        process_roi_diff(moved.view(), &mut output, &mut ctx, &cfg()).unwrap();
        assert_eq!(
            ctx.updated_regions(),
            &[Region {
                x: 4,
                y: 3,
                width: 6,
                height: 4,
            }]
        );
    }

    #[test]
    fn threshold_filters_small_changes() {
        let geometry = Geometry::new(9, 9).unwrap();
        let base = Frame::filled(geometry, Rgb565::BLACK).unwrap();
        let mut ctx = MotionContext::new(geometry).unwrap();
        let mut output = Frame::new(geometry).unwrap();
        let strict = RoiConfig {
            threshold: 200,
            ..cfg()
        };
        process_roi_diff(base.view(), &mut output, &mut ctx, &strict).unwrap();

        let mut moved = base.clone();
        moved.set(4, 3, Rgb565::from_luma(60)).unwrap();
        let outcome = process_roi_diff(moved.view(), &mut output, &mut ctx, &strict).unwrap();
        assert_eq!(outcome, RoiOutcome::Updated { regions: 0 });
        assert_eq!(ctx.previous(), &moved);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let geometry = Geometry::new(4, 4).unwrap();
        let input = Frame::new(geometry).unwrap();
        let mut ctx = MotionContext::new(geometry).unwrap();
        let mut output = Frame::new(geometry).unwrap();
        let bad = RoiConfig {
            block_width: 0,
            ..cfg()
        };
        let err = process_roi_diff(input.view(), &mut output, &mut ctx, &bad).unwrap_err();
        assert_eq!(err, CamFilterError::InvalidInput("ROI block size must be non-zero"));
    }
}
