//! Full-frame filtering when a complete frame resides in memory.
//!
//! The first two and last two rows, and the first and last column of every
//! row, are painted with the border color; every other pixel is convolved
//! directly against its stored neighbors.

use crate::filter::{convolve_row, grayscale_row, SpatialFilter};
use crate::image::{Frame, FrameView};
use crate::kernel::Kernel;
use crate::pixel::Rgb565;
use crate::trace::trace_span;
use crate::util::CamFilterResult;

/// Rows at the top and bottom of a frame that are never convolved.
pub const BORDER_ROWS: usize = 2;

/// Applies `filter` to `input`, writing every pixel of `output`.
pub fn filter_frame(
    input: FrameView<'_>,
    output: &mut Frame,
    filter: SpatialFilter,
    border: Rgb565,
) -> CamFilterResult<()> {
    output.geometry().ensure_same(input.geometry())?;
    let _span =
        trace_span!("filter_frame", width = input.width(), height = input.height()).entered();

    match filter {
        SpatialFilter::Passthrough => output.copy_from(input),
        SpatialFilter::Grayscale => {
            grayscale_row(input.as_slice(), output.as_mut_slice());
            Ok(())
        }
        SpatialFilter::Convolve(kernel) => {
            let width = input.width();
            for (y, out) in output.as_mut_slice().chunks_mut(width).enumerate() {
                convolve_frame_row(input, &kernel, border, y, out);
            }
            Ok(())
        }
    }
}

/// Three rows centered on `y`, if `y` lies inside the convolved band.
pub(crate) fn rows_around(input: FrameView<'_>, y: usize) -> Option<[&[Rgb565]; 3]> {
    if y < BORDER_ROWS || y + BORDER_ROWS >= input.height() {
        return None;
    }
    Some([input.row(y - 1)?, input.row(y)?, input.row(y + 1)?])
}

/// Produces output row `y` of a full-frame convolution.
pub(crate) fn convolve_frame_row(
    input: FrameView<'_>,
    kernel: &Kernel,
    border: Rgb565,
    y: usize,
    out: &mut [Rgb565],
) {
    match rows_around(input, y) {
        Some(rows) => convolve_row(rows, kernel, border, out),
        None => out.fill(border),
    }
}
