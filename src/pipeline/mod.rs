//! Mode selection, configuration, and the frame-synchronous driver.
//!
//! The [`Pipeline`] owns every buffer it needs, allocated once at
//! construction. Each call to [`Pipeline::run_frame`] latches the mode from
//! the shared [`ModeSelector`], pulls one frame from the source and pushes
//! the result to the sink.

use crate::filter::SpatialFilter;
use crate::image::Geometry;
use crate::motion::{AlarmConfig, RoiConfig};
use crate::pixel::Rgb565;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod driver;
mod stage;

pub use driver::{FrameReport, Pipeline};
pub use stage::{FilterStage, StageOutcome};

/// Default bound on the wait for one row transfer.
pub const DEFAULT_ROW_TIMEOUT: Duration = Duration::from_millis(100);

/// Processing applied to each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterMode {
    #[default]
    None = 0,
    EdgeDetect = 1,
    Blur = 2,
    Grayscale = 3,
    RoiDiff = 4,
    CenterAlarm = 5,
}

impl FilterMode {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::EdgeDetect,
        Self::Blur,
        Self::Grayscale,
        Self::RoiDiff,
        Self::CenterAlarm,
    ];

    /// Decodes a raw mode value; unknown values fall back to `None`.
    pub fn from_raw(raw: u8) -> Self {
        Self::ALL.get(usize::from(raw)).copied().unwrap_or(Self::None)
    }

    /// Raw value as stored by a [`ModeSelector`].
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// The mode a button press moves to.
    pub fn next(self) -> Self {
        Self::from_raw((self.raw() + 1) % Self::ALL.len() as u8)
    }

    /// The per-pixel filter for row-streamable modes.
    pub fn spatial_filter(self) -> Option<SpatialFilter> {
        match self {
            Self::None => Some(SpatialFilter::Passthrough),
            Self::EdgeDetect => Some(SpatialFilter::EDGE_DETECT),
            Self::Blur => Some(SpatialFilter::BLUR),
            Self::Grayscale => Some(SpatialFilter::Grayscale),
            Self::RoiDiff | Self::CenterAlarm => None,
        }
    }
}

/// Shared, externally settable mode value (a button, a UI, a test).
///
/// The driver reads it once per frame, so a change never lands mid-frame.
#[derive(Clone, Debug, Default)]
pub struct ModeSelector {
    raw: Arc<AtomicU8>,
}

impl ModeSelector {
    /// Creates a selector starting at `mode`.
    pub fn new(mode: FilterMode) -> Self {
        Self {
            raw: Arc::new(AtomicU8::new(mode.raw())),
        }
    }

    /// Requests `mode` from the next frame on.
    pub fn set(&self, mode: FilterMode) {
        self.raw.store(mode.raw(), Ordering::SeqCst);
    }

    /// Stores an unvalidated value, as a register write would.
    pub fn set_raw(&self, raw: u8) {
        self.raw.store(raw, Ordering::SeqCst);
    }

    /// Mode the next frame will use.
    pub fn current(&self) -> FilterMode {
        FilterMode::from_raw(self.raw.load(Ordering::SeqCst))
    }

    /// Advances to the next mode and returns it.
    pub fn cycle(&self) -> FilterMode {
        let next = self.current().next();
        self.set(next);
        next
    }
}

/// Driver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Size of captured and displayed frames.
    pub geometry: Geometry,
    /// Longest wait for one row transfer before failing stop.
    pub row_timeout: Duration,
    /// Filter spatial modes row by row instead of buffering a full frame.
    pub row_streaming: bool,
    /// Color of rows and columns a convolution cannot produce.
    pub border_fill: Rgb565,
    /// Color flooded over the display after a capture timeout.
    pub error_color: Rgb565,
    pub roi: RoiConfig,
    pub alarm: AlarmConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::CAPTURE,
            row_timeout: DEFAULT_ROW_TIMEOUT,
            row_streaming: true,
            border_fill: Rgb565::WHITE,
            error_color: Rgb565::RED,
            roi: RoiConfig::default(),
            alarm: AlarmConfig::default(),
        }
    }
}
