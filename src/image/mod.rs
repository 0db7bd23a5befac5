//! Frame geometry, borrowed frame views, and owned frame buffers.
//!
//! Frames are contiguous row-major RGB565 buffers (`stride == width`). Every
//! constructor validates the backing length against the geometry, so filter
//! code never indexes past the end of a buffer that is too short.

use crate::pixel::Rgb565;
use crate::util::{CamFilterError, CamFilterResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Width and height of a frame in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    /// Sensor capture size (240 columns x 160 rows).
    pub const CAPTURE: Self = Self {
        width: 240,
        height: 160,
    };
    /// Panel size (320 columns x 240 rows).
    pub const DISPLAY: Self = Self {
        width: 320,
        height: 240,
    };

    /// Creates a geometry, rejecting zero or overflowing sizes.
    pub fn new(width: usize, height: usize) -> CamFilterResult<Self> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(CamFilterError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels in a frame of this size.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if the geometry holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear offset of `(x, y)`; callers keep coordinates in bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub(crate) fn ensure_same(&self, other: Geometry) -> CamFilterResult<()> {
        if *self != other {
            return Err(CamFilterError::GeometryMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        Ok(())
    }
}

/// Borrowed read-only view of a frame.
#[derive(Copy, Clone, Debug)]
pub struct FrameView<'a> {
    data: &'a [Rgb565],
    geometry: Geometry,
}

impl<'a> FrameView<'a> {
    /// Creates a view over the first `width * height` pixels of `data`.
    pub fn from_slice(data: &'a [Rgb565], width: usize, height: usize) -> CamFilterResult<Self> {
        let geometry = Geometry::new(width, height)?;
        let needed = geometry.len();
        if data.len() < needed {
            return Err(CamFilterError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data: &data[..needed],
            geometry,
        })
    }

    /// Returns the view geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the view width in pixels.
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    /// Returns the view height in pixels.
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Returns exactly `width * height` pixels.
    pub fn as_slice(&self) -> &'a [Rgb565] {
        self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb565> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        self.data.get(self.geometry.index(x, y)).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&'a [Rgb565]> {
        if y >= self.geometry.height {
            return None;
        }
        let start = y * self.geometry.width;
        self.data.get(start..start + self.geometry.width)
    }

    #[inline]
    pub(crate) fn luma_at(&self, x: usize, y: usize) -> u8 {
        self.data[self.geometry.index(x, y)].to_luma()
    }
}

/// Owned frame buffer, allocated once and reused for the device's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<Rgb565>,
    geometry: Geometry,
}

impl Frame {
    /// Allocates a black frame.
    pub fn new(geometry: Geometry) -> CamFilterResult<Self> {
        Self::filled(geometry, Rgb565::BLACK)
    }

    /// Allocates a frame with every pixel set to `color`.
    pub fn filled(geometry: Geometry, color: Rgb565) -> CamFilterResult<Self> {
        let geometry = Geometry::new(geometry.width, geometry.height)?;
        Ok(Self {
            data: vec![color; geometry.len()],
            geometry,
        })
    }

    /// Wraps a buffer whose length matches `width * height` exactly.
    pub fn from_vec(data: Vec<Rgb565>, width: usize, height: usize) -> CamFilterResult<Self> {
        let geometry = Geometry::new(width, height)?;
        let needed = geometry.len();
        if data.len() < needed {
            return Err(CamFilterError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(CamFilterError::InvalidDimensions { width, height });
        }
        Ok(Self { data, geometry })
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(geometry: Geometry, mut f: F) -> CamFilterResult<Self>
    where
        F: FnMut(usize, usize) -> Rgb565,
    {
        let geometry = Geometry::new(geometry.width, geometry.height)?;
        let mut data = Vec::with_capacity(geometry.len());
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                data.push(f(x, y));
            }
        }
        Ok(Self { data, geometry })
    }

    /// Returns the frame geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the frame width in pixels.
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    /// Returns the frame height in pixels.
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Returns a borrowed view of the frame.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            data: &self.data,
            geometry: self.geometry,
        }
    }

    /// Returns all pixels in row-major order.
    pub fn as_slice(&self) -> &[Rgb565] {
        &self.data
    }

    /// Returns all pixels mutably in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [Rgb565] {
        &mut self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb565> {
        self.view().get(x, y)
    }

    /// Writes the pixel at `(x, y)`, rejecting out-of-range coordinates.
    pub fn set(&mut self, x: usize, y: usize, color: Rgb565) -> CamFilterResult<()> {
        let Geometry { width, height } = self.geometry;
        if x >= width || y >= height {
            return Err(CamFilterError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        self.data[self.geometry.index(x, y)] = color;
        Ok(())
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[Rgb565]> {
        self.view().row(y)
    }

    /// Returns row `y` mutably.
    pub fn row_mut(&mut self, y: usize) -> CamFilterResult<&mut [Rgb565]> {
        if y >= self.geometry.height {
            return Err(CamFilterError::RowOutOfBounds {
                row: y,
                height: self.geometry.height,
            });
        }
        let start = y * self.geometry.width;
        Ok(&mut self.data[start..start + self.geometry.width])
    }

    /// Paints every pixel with `color`.
    pub fn fill(&mut self, color: Rgb565) {
        self.data.fill(color);
    }

    /// Copies `src` into this frame; both must share a geometry.
    pub fn copy_from(&mut self, src: FrameView<'_>) -> CamFilterResult<()> {
        self.geometry.ensure_same(src.geometry())?;
        self.data.copy_from_slice(src.as_slice());
        Ok(())
    }
}
