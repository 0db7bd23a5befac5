//! Building blocks for custom pipelines.
//!
//! Most users drive everything through [`Pipeline`](crate::Pipeline); these
//! are the individual steps it is made of.

pub use crate::filter::frame::BORDER_ROWS;
#[cfg(feature = "rayon")]
pub use crate::filter::rayon::filter_frame_par;
pub use crate::filter::stream::PRIMING_ROWS;
pub use crate::filter::{RowWindow, WINDOW_ROWS};
pub use crate::kernel::{convolve, Window3};
pub use crate::motion::alarm::{center_change, center_region};
pub use crate::motion::{process_center_alarm, process_roi_diff, AlarmOutcome, RoiOutcome};
pub use crate::pixel::{from_luma, to_luma};
