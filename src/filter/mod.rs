//! Spatial filters: the row-streaming variant and the full-frame variants.
//!
//! Both variants share one convolution step ([`window_at`]) so their interior
//! pixels are bit-identical; they differ only in latency and border policy.

use crate::kernel::{Kernel, Window3, BLUR, EDGE_DETECT};
use crate::pixel::Rgb565;

pub mod frame;
pub mod stream;

#[cfg(feature = "rayon")]
pub mod rayon;

pub use frame::filter_frame;
pub use stream::{RowWindow, StreamingRowFilter, WINDOW_ROWS};

/// Per-pixel transform applied by a spatial filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpatialFilter {
    /// Pixels are copied unchanged.
    Passthrough,
    /// Each interior pixel is replaced by its 3x3 luma convolution.
    Convolve(Kernel),
    /// Each pixel is replaced by the gray pixel of its own luma.
    Grayscale,
}

impl SpatialFilter {
    pub const EDGE_DETECT: Self = Self::Convolve(EDGE_DETECT);
    pub const BLUR: Self = Self::Convolve(BLUR);
}

/// Builds the luma neighborhood of column `x` from three consecutive rows.
///
/// `x` must be an interior column of rows at least three pixels wide.
#[inline]
pub(crate) fn window_at(rows: [&[Rgb565]; 3], x: usize) -> Window3 {
    let mut window = [[0u8; 3]; 3];
    for (dst, row) in window.iter_mut().zip(rows.iter()) {
        for (j, value) in dst.iter_mut().enumerate() {
            *value = row[x + j - 1].to_luma();
        }
    }
    window
}

/// Convolves the interior of one output row and paints its two border
/// columns with `border`.
pub(crate) fn convolve_row(
    rows: [&[Rgb565]; 3],
    kernel: &Kernel,
    border: Rgb565,
    out: &mut [Rgb565],
) {
    let width = out.len();
    if width == 0 {
        return;
    }
    out[0] = border;
    out[width - 1] = border;
    for x in 1..width.saturating_sub(1) {
        out[x] = Rgb565::from_luma(kernel.apply(&window_at(rows, x)));
    }
}

/// Replaces every pixel of `out` with the gray version of `src`.
pub(crate) fn grayscale_row(src: &[Rgb565], out: &mut [Rgb565]) {
    for (dst, px) in out.iter_mut().zip(src) {
        *dst = Rgb565::from_luma(px.to_luma());
    }
}
