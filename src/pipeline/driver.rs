use crate::device::{Clock, FrameSink, FrameSource};
use crate::filter::{SpatialFilter, StreamingRowFilter};
use crate::image::Frame;
use crate::motion::{MotionContext, RoiOutcome};
use crate::pipeline::{FilterMode, FilterStage, ModeSelector, PipelineConfig, StageOutcome};
use crate::pixel::Rgb565;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{CamFilterError, CamFilterResult};
use std::time::Duration;

/// Summary of one processed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based count of frames processed before this one.
    pub index: u64,
    /// Mode latched at the start of the frame.
    pub mode: FilterMode,
    pub outcome: StageOutcome,
}

/// Frame-synchronous driver from a [`FrameSource`] to a [`FrameSink`].
pub struct Pipeline<S, D, C> {
    source: S,
    sink: D,
    clock: C,
    config: PipelineConfig,
    selector: ModeSelector,
    mode: FilterMode,
    rows: StreamingRowFilter,
    input: Frame,
    output: Frame,
    ctx: MotionContext,
    frames: u64,
    halted: bool,
}

impl<S: FrameSource, D: FrameSink, C: Clock> Pipeline<S, D, C> {
    /// Allocates every buffer for `config.geometry`, which the source must
    /// deliver.
    pub fn new(source: S, sink: D, clock: C, config: PipelineConfig) -> CamFilterResult<Self> {
        let geometry = config.geometry;
        geometry.ensure_same(source.geometry())?;
        let selector = ModeSelector::default();
        let mode = selector.current();
        Ok(Self {
            source,
            sink,
            clock,
            config,
            selector,
            mode,
            rows: StreamingRowFilter::new(geometry, SpatialFilter::Passthrough, config.border_fill),
            input: Frame::new(geometry)?,
            output: Frame::new(geometry)?,
            ctx: MotionContext::new(geometry)?,
            frames: 0,
            halted: false,
        })
    }

    /// Uses an existing selector handle, e.g. one owned by a button task.
    pub fn with_selector(mut self, selector: ModeSelector) -> Self {
        self.selector = selector;
        self
    }

    /// A handle for changing the mode between frames.
    pub fn selector(&self) -> ModeSelector {
        self.selector.clone()
    }

    /// Mode used by the most recent frame.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Configuration the pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Most recently produced output frame.
    pub fn output(&self) -> &Frame {
        &self.output
    }

    /// Detector state shared by the ROI and alarm modes.
    pub fn context(&self) -> &MotionContext {
        &self.ctx
    }

    /// Returns the frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the frame sink.
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Number of frames completed so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// True after a capture timeout; no further frames are processed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Clears detector history so the next ROI or alarm frame primes again.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.rows.reset();
    }

    /// Processes up to `max_frames` frames, stopping at the first error.
    pub fn run(&mut self, max_frames: usize) -> CamFilterResult<u64> {
        for _ in 0..max_frames {
            self.run_frame()?;
        }
        Ok(self.frames)
    }

    /// Captures, filters and displays one frame.
    pub fn run_frame(&mut self) -> CamFilterResult<FrameReport> {
        if self.halted {
            return Err(CamFilterError::Halted);
        }
        self.latch_mode();
        let mode = self.mode;
        let _span = trace_span!("frame", index = self.frames, mode = ?mode).entered();

        let outcome = match mode.spatial_filter() {
            Some(_) if self.config.row_streaming => {
                self.stream_frame()?;
                StageOutcome::Filtered
            }
            _ => self.buffered_frame()?,
        };

        let report = FrameReport {
            index: self.frames,
            mode,
            outcome,
        };
        self.frames += 1;
        Ok(report)
    }

    fn latch_mode(&mut self) {
        let mode = self.selector.current();
        if mode != self.mode {
            trace_event!("mode_switch", from = self.mode.raw(), to = mode.raw());
            self.mode = mode;
        }
        if let Some(filter) = mode.spatial_filter() {
            if self.rows.filter() != filter {
                self.rows.set_filter(filter);
            }
        }
    }

    /// Row-streaming path: each row is filtered as soon as it arrives.
    fn stream_frame(&mut self) -> CamFilterResult<()> {
        let timeout = self.config.row_timeout;
        for row in 0..self.config.geometry.height {
            let dest = self.rows.slot_mut(row)?;
            if !capture_row(&mut self.source, dest, timeout)? {
                return Err(self.fail_stop(row));
            }
            self.rows.ingest(row, &mut self.output)?;
        }
        self.rows.finish(&mut self.output)?;
        self.sink.display_full_frame(self.output.view())
    }

    /// Buffered path: the whole frame is captured, then processed at once.
    fn buffered_frame(&mut self) -> CamFilterResult<StageOutcome> {
        let timeout = self.config.row_timeout;
        for row in 0..self.config.geometry.height {
            let dest = self.input.row_mut(row)?;
            if !capture_row(&mut self.source, dest, timeout)? {
                return Err(self.fail_stop(row));
            }
        }

        let stage = FilterStage::for_mode(self.mode, &self.config);
        let now_ms = self.clock.now_ms();
        let outcome = stage.process(self.input.view(), &mut self.output, &mut self.ctx, now_ms)?;

        if let StageOutcome::Roi(RoiOutcome::Updated { .. }) = outcome {
            let geometry = self.output.geometry();
            let pixels = self.output.as_slice();
            for region in self.ctx.updated_regions() {
                for y in region.y..region.y + region.height {
                    let start = geometry.index(region.x, y);
                    self.sink
                        .display_region(&pixels[start..start + region.width], start)?;
                }
            }
        } else {
            self.sink.display_full_frame(self.output.view())?;
        }
        Ok(outcome)
    }

    /// Floods the display with the error color and stops the pipeline.
    fn fail_stop(&mut self, row: usize) -> CamFilterError {
        let timeout_ms = u64::try_from(self.config.row_timeout.as_millis()).unwrap_or(u64::MAX);
        trace_warn!("capture_timeout", row = row, timeout_ms = timeout_ms);
        self.output.fill(self.config.error_color);
        if let Err(err) = self.sink.display_full_frame(self.output.view()) {
            trace_warn!("error_frame_not_shown", reason = err.to_string().as_str());
        }
        self.halted = true;
        CamFilterError::CaptureTimeout { row, timeout_ms }
    }
}

/// Starts one row transfer and waits for its completion signal.
fn capture_row<S: FrameSource>(
    source: &mut S,
    dest: &mut [Rgb565],
    timeout: Duration,
) -> CamFilterResult<bool> {
    source.completion().clear();
    source.start_row_capture(dest)?;
    Ok(source.completion().wait(timeout))
}
