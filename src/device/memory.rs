//! In-memory camera and display used by tests and the CLI.

use crate::device::{CompletionSignal, FrameSink, FrameSource};
use crate::image::{Frame, FrameView, Geometry};
use crate::pixel::Rgb565;
use crate::util::{CamFilterError, CamFilterResult};

/// Replays a fixed list of frames row by row, looping at the end.
#[derive(Debug)]
pub struct MemorySource {
    frames: Vec<Frame>,
    frame_idx: usize,
    row: usize,
    rows_delivered: usize,
    stall_after: Option<usize>,
    signal: CompletionSignal,
}

impl MemorySource {
    /// All frames must share one geometry.
    pub fn new(frames: Vec<Frame>) -> CamFilterResult<Self> {
        let first = frames
            .first()
            .ok_or(CamFilterError::InvalidInput("memory source needs at least one frame"))?;
        let geometry = first.geometry();
        for frame in &frames {
            geometry.ensure_same(frame.geometry())?;
        }
        Ok(Self {
            frames,
            frame_idx: 0,
            row: 0,
            rows_delivered: 0,
            stall_after: None,
            signal: CompletionSignal::new(),
        })
    }

    /// Stops signalling completion after `rows` transfers, like a sensor
    /// that lost its clock.
    pub fn stall_after(mut self, rows: usize) -> Self {
        self.stall_after = Some(rows);
        self
    }

    /// Number of rows transferred so far.
    pub fn rows_delivered(&self) -> usize {
        self.rows_delivered
    }
}

impl FrameSource for MemorySource {
    fn geometry(&self) -> Geometry {
        self.frames[0].geometry()
    }

    fn start_row_capture(&mut self, dest: &mut [Rgb565]) -> CamFilterResult<()> {
        if self.stall_after.is_some_and(|limit| self.rows_delivered >= limit) {
            return Ok(());
        }
        let frame = &self.frames[self.frame_idx];
        let src = frame.row(self.row).ok_or(CamFilterError::RowOutOfBounds {
            row: self.row,
            height: frame.height(),
        })?;
        if dest.len() != src.len() {
            return Err(CamFilterError::GeometryMismatch {
                expected_width: src.len(),
                expected_height: frame.height(),
                width: dest.len(),
                height: frame.height(),
            });
        }
        dest.copy_from_slice(src);

        self.row += 1;
        if self.row == frame.height() {
            self.row = 0;
            self.frame_idx = (self.frame_idx + 1) % self.frames.len();
        }
        self.rows_delivered += 1;
        self.signal.raise();
        Ok(())
    }

    fn completion(&self) -> &CompletionSignal {
        &self.signal
    }
}

/// Mirror of a panel's pixel memory.
#[derive(Clone, Debug)]
pub struct ScreenSink {
    screen: Frame,
    full_frames: usize,
    region_writes: usize,
    region_pixels: usize,
}

impl ScreenSink {
    /// A black screen of `geometry`.
    pub fn new(geometry: Geometry) -> CamFilterResult<Self> {
        Ok(Self {
            screen: Frame::new(geometry)?,
            full_frames: 0,
            region_writes: 0,
            region_pixels: 0,
        })
    }

    /// Current panel contents.
    pub fn screen(&self) -> &Frame {
        &self.screen
    }

    /// Number of full-frame blits received.
    pub fn full_frames(&self) -> usize {
        self.full_frames
    }

    /// Number of partial blits received.
    pub fn region_writes(&self) -> usize {
        self.region_writes
    }

    /// Pixels sent through partial updates.
    pub fn region_pixels(&self) -> usize {
        self.region_pixels
    }
}

impl FrameSink for ScreenSink {
    fn display_full_frame(&mut self, frame: FrameView<'_>) -> CamFilterResult<()> {
        self.screen.copy_from(frame)?;
        self.full_frames += 1;
        Ok(())
    }

    fn display_region(&mut self, pixels: &[Rgb565], start_offset: usize) -> CamFilterResult<()> {
        let len = self.screen.geometry().len();
        let end = start_offset
            .checked_add(pixels.len())
            .filter(|&end| end <= len)
            .ok_or(CamFilterError::BufferTooSmall {
                needed: start_offset.saturating_add(pixels.len()),
                got: len,
            })?;
        self.screen.as_mut_slice()[start_offset..end].copy_from_slice(pixels);
        self.region_writes += 1;
        self.region_pixels += pixels.len();
        Ok(())
    }
}
