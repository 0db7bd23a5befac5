//! Frame-to-frame change detection against a persistent previous frame.
//!
//! Both detectors read and overwrite the same previous-frame store held in
//! [`MotionContext`], while each tracks its own first-frame flag: the first
//! frame a detector sees is passed through unchanged and only primes the
//! store.

use crate::image::{Frame, FrameView, Geometry};
use crate::pixel::Rgb565;
use crate::util::CamFilterResult;

pub mod alarm;
pub mod roi;

pub use alarm::{process_center_alarm, AlarmConfig, AlarmOutcome, AlarmState};
pub use roi::{process_roi_diff, RoiConfig, RoiOutcome};

/// Axis-aligned pixel rectangle, already clipped to its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    /// Clips the half-open signed span `[x0, x1) x [y0, y1)` to `geometry`.
    pub fn clipped(x0: isize, y0: isize, x1: isize, y1: isize, geometry: Geometry) -> Option<Self> {
        let clamp = |v: isize, max: usize| v.clamp(0, max as isize) as usize;
        let (left, right) = (clamp(x0, geometry.width), clamp(x1, geometry.width));
        let (top, bottom) = (clamp(y0, geometry.height), clamp(y1, geometry.height));
        if left >= right || top >= bottom {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }

    /// Returns true if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Copies this rectangle from `src` into `dst` (same geometry).
    pub(crate) fn copy(&self, src: FrameView<'_>, dst: &mut Frame) {
        let geometry = src.geometry();
        for y in self.y..self.y + self.height {
            let start = geometry.index(self.x, y);
            let end = start + self.width;
            dst.as_mut_slice()[start..end].copy_from_slice(&src.as_slice()[start..end]);
        }
    }

    /// Paints this rectangle with `color`.
    pub(crate) fn fill(&self, dst: &mut Frame, color: Rgb565) {
        let geometry = dst.geometry();
        for y in self.y..self.y + self.height {
            let start = geometry.index(self.x, y);
            dst.as_mut_slice()[start..start + self.width].fill(color);
        }
    }
}

/// Long-lived detector state, owned by the pipeline driver.
#[derive(Clone, Debug)]
pub struct MotionContext {
    previous: Frame,
    roi_primed: bool,
    alarm_primed: bool,
    alarm: AlarmState,
    regions: Vec<Region>,
}

impl MotionContext {
    /// Allocates the previous-frame store for `geometry`.
    pub fn new(geometry: Geometry) -> CamFilterResult<Self> {
        Ok(Self {
            previous: Frame::new(geometry)?,
            roi_primed: false,
            alarm_primed: false,
            alarm: AlarmState::Inactive,
            regions: Vec::new(),
        })
    }

    /// Returns the geometry of the previous-frame store.
    pub fn geometry(&self) -> Geometry {
        self.previous.geometry()
    }

    /// The frame seen on the previous processing cycle.
    pub fn previous(&self) -> &Frame {
        &self.previous
    }

    /// Returns the current alarm state.
    pub fn alarm_state(&self) -> AlarmState {
        self.alarm
    }

    /// Blocks copied by the most recent ROI pass.
    pub fn updated_regions(&self) -> &[Region] {
        &self.regions
    }

    /// Returns both detectors to their start-of-program state.
    pub fn reset(&mut self) {
        self.reset_roi();
        self.reset_alarm();
    }

    /// Makes the next ROI frame prime the detector again.
    pub fn reset_roi(&mut self) {
        self.roi_primed = false;
        self.regions.clear();
    }

    /// Makes the next alarm frame prime the detector again and clears the alarm.
    pub fn reset_alarm(&mut self) {
        self.alarm_primed = false;
        self.alarm = AlarmState::Inactive;
    }

    fn remember(&mut self, input: FrameView<'_>) -> CamFilterResult<()> {
        self.previous.copy_from(input)
    }
}
