//! Row-parallel full-frame filtering (feature-gated).
//!
//! Output rows are independent, so each worker convolves a disjoint set of
//! rows against the shared read-only input. Results are bit-identical to
//! [`filter_frame`](crate::filter::filter_frame).

use crate::filter::frame::convolve_frame_row;
use crate::filter::SpatialFilter;
use crate::image::{Frame, FrameView};
use crate::pixel::Rgb565;
use crate::trace::trace_span;
use crate::util::CamFilterResult;
use rayon::prelude::*;

/// Parallel counterpart of [`filter_frame`](crate::filter::filter_frame).
pub fn filter_frame_par(
    input: FrameView<'_>,
    output: &mut Frame,
    filter: SpatialFilter,
    border: Rgb565,
) -> CamFilterResult<()> {
    output.geometry().ensure_same(input.geometry())?;
    let _span = trace_span!("filter_frame_par", height = input.height()).entered();

    let width = input.width();
    match filter {
        SpatialFilter::Passthrough => output.copy_from(input),
        SpatialFilter::Grayscale => {
            output
                .as_mut_slice()
                .par_iter_mut()
                .zip(input.as_slice().par_iter())
                .for_each(|(dst, px)| *dst = Rgb565::from_luma(px.to_luma()));
            Ok(())
        }
        SpatialFilter::Convolve(kernel) => {
            output
                .as_mut_slice()
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, out)| convolve_frame_row(input, &kernel, border, y, out));
            Ok(())
        }
    }
}
