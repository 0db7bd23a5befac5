//! camfilter is a frame-synchronous video filter pipeline for small RGB565
//! camera sensors driving a display.
//!
//! Spatial filters (3x3 edge detect, blur, grayscale) run either row by row
//! through a three-row ring buffer or over a buffered frame, with optional
//! row parallelism via the `rayon` feature. Two change detectors compare
//! each frame against the previous one: a sparse-grid ROI detector that
//! emits partial display updates, and a center-region alarm.

pub mod device;
pub mod filter;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod motion;
pub mod pipeline;
pub mod pixel;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::device::{
    Clock, CompletionSignal, FrameSink, FrameSource, ManualClock, MemorySource, MonotonicClock,
    ScreenSink, WriterSink,
};
pub use crate::filter::{filter_frame, SpatialFilter, StreamingRowFilter};
pub use crate::image::{Frame, FrameView, Geometry};
pub use crate::kernel::{Kernel, BLUR, EDGE_DETECT};
pub use crate::motion::{AlarmConfig, AlarmState, MotionContext, Region, RoiConfig};
pub use crate::pipeline::{
    FilterMode, FilterStage, FrameReport, ModeSelector, Pipeline, PipelineConfig, StageOutcome,
};
pub use crate::pixel::Rgb565;
pub use crate::util::{CamFilterError, CamFilterResult};
