//! Row-streaming filter for targets without a full input frame buffer.
//!
//! Incoming rows land in a three-row ring ([`RowWindow`]). In convolution
//! mode the filter primes for two rows (their output rows are painted with
//! the border color), then each newly arrived row `r` completes the
//! neighborhood of row `r - 1`, which is the row written. Outputs therefore
//! lag inputs by exactly one row once primed. The bottom row is never
//! produced by a convolution; [`StreamingRowFilter::finish`] paints it.

use crate::filter::{convolve_row, grayscale_row, SpatialFilter};
use crate::image::{Frame, Geometry};
use crate::pixel::Rgb565;
use crate::util::{CamFilterError, CamFilterResult};

/// Number of rows held by the ring.
pub const WINDOW_ROWS: usize = 3;

/// Rows consumed before the first convolved output row.
pub const PRIMING_ROWS: usize = 2;

/// Fixed-size ring of the most recently received rows, slot `row % 3`.
#[derive(Clone, Debug)]
pub struct RowWindow {
    slots: [Vec<Rgb565>; WINDOW_ROWS],
    newest: Option<usize>,
}

impl RowWindow {
    /// Allocates three rows of `width` pixels.
    pub fn new(width: usize) -> Self {
        Self {
            slots: std::array::from_fn(|_| vec![Rgb565::BLACK; width]),
            newest: None,
        }
    }

    /// Returns the row width in pixels.
    pub fn width(&self) -> usize {
        self.slots[0].len()
    }

    /// Index of the most recently committed row.
    pub fn newest(&self) -> Option<usize> {
        self.newest
    }

    /// Destination buffer for input row `row`.
    ///
    /// Writing here overwrites the row that left the window.
    pub fn slot_mut(&mut self, row: usize) -> &mut [Rgb565] {
        &mut self.slots[row % WINDOW_ROWS]
    }

    /// Marks `row` as the newest valid row.
    pub fn commit(&mut self, row: usize) {
        self.newest = Some(row);
    }

    /// Forgets every row; slot contents are left in place.
    pub fn reset(&mut self) {
        self.newest = None;
    }

    /// Returns `row` if it is one of the last three committed rows.
    pub fn row(&self, row: usize) -> Option<&[Rgb565]> {
        let newest = self.newest?;
        if row > newest || newest - row >= WINDOW_ROWS {
            return None;
        }
        Some(&self.slots[row % WINDOW_ROWS])
    }

    /// Rows `center - 1`, `center`, `center + 1`, if all are buffered.
    pub fn rows_around(&self, center: usize) -> Option<[&[Rgb565]; 3]> {
        let top = center.checked_sub(1)?;
        Some([self.row(top)?, self.row(center)?, self.row(center + 1)?])
    }
}

/// Streaming filter producing exactly one output row per input row.
#[derive(Clone, Debug)]
pub struct StreamingRowFilter {
    window: RowWindow,
    geometry: Geometry,
    filter: SpatialFilter,
    border: Rgb565,
}

impl StreamingRowFilter {
    /// Creates a filter for frames of `geometry`, painting unconvolved pixels with `border`.
    pub fn new(geometry: Geometry, filter: SpatialFilter, border: Rgb565) -> Self {
        Self {
            window: RowWindow::new(geometry.width),
            geometry,
            filter,
            border,
        }
    }

    /// Returns the active filter.
    pub fn filter(&self) -> SpatialFilter {
        self.filter
    }

    /// Switches the filter; takes effect from the next frame's row 0.
    pub fn set_filter(&mut self, filter: SpatialFilter) {
        self.filter = filter;
        self.window.reset();
    }

    /// Returns the row ring.
    pub fn window(&self) -> &RowWindow {
        &self.window
    }

    /// Forgets buffered rows; the next frame starts priming again.
    pub fn reset(&mut self) {
        self.window.reset();
    }

    /// Buffer the frame source writes input row `row` into.
    pub fn slot_mut(&mut self, row: usize) -> CamFilterResult<&mut [Rgb565]> {
        self.check_row(row)?;
        Ok(self.window.slot_mut(row))
    }

    /// Copies `pixels` into the window and ingests them as row `row`.
    pub fn push_row(
        &mut self,
        row: usize,
        pixels: &[Rgb565],
        output: &mut Frame,
    ) -> CamFilterResult<usize> {
        let width = self.geometry.width;
        if pixels.len() < width {
            return Err(CamFilterError::BufferTooSmall {
                needed: width,
                got: pixels.len(),
            });
        }
        self.slot_mut(row)?.copy_from_slice(&pixels[..width]);
        self.ingest(row, output)
    }

    /// Consumes row `row`, already written through [`Self::slot_mut`], and
    /// returns the index of the output row it produced.
    ///
    /// Rows must arrive in order starting from 0.
    pub fn ingest(&mut self, row: usize, output: &mut Frame) -> CamFilterResult<usize> {
        self.check_row(row)?;
        self.geometry.ensure_same(output.geometry())?;
        if row == 0 {
            self.window.reset();
        } else if self.window.newest() != Some(row - 1) {
            return Err(CamFilterError::InvalidInput("rows must arrive in order"));
        }
        self.window.commit(row);

        match self.filter {
            SpatialFilter::Passthrough => {
                let src = self
                    .window
                    .row(row)
                    .ok_or(CamFilterError::InvalidInput("row not buffered"))?;
                output.row_mut(row)?.copy_from_slice(src);
                Ok(row)
            }
            SpatialFilter::Grayscale => {
                let src = self
                    .window
                    .row(row)
                    .ok_or(CamFilterError::InvalidInput("row not buffered"))?;
                grayscale_row(src, output.row_mut(row)?);
                Ok(row)
            }
            SpatialFilter::Convolve(kernel) => {
                if row < PRIMING_ROWS {
                    output.row_mut(row)?.fill(self.border);
                    return Ok(row);
                }
                let y = row - 1;
                let rows = self
                    .window
                    .rows_around(y)
                    .ok_or(CamFilterError::InvalidInput("row window not primed"))?;
                convolve_row(rows, &kernel, self.border, output.row_mut(y)?);
                Ok(y)
            }
        }
    }

    /// Completes a frame: paints the bottom row a convolution never reaches.
    pub fn finish(&mut self, output: &mut Frame) -> CamFilterResult<()> {
        self.geometry.ensure_same(output.geometry())?;
        if let SpatialFilter::Convolve(_) = self.filter {
            let last = self.geometry.height - 1;
            if last >= PRIMING_ROWS {
                output.row_mut(last)?.fill(self.border);
            }
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> CamFilterResult<()> {
        if row >= self.geometry.height {
            return Err(CamFilterError::RowOutOfBounds {
                row,
                height: self.geometry.height,
            });
        }
        Ok(())
    }
}
