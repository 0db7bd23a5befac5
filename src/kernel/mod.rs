//! Fixed 3x3 integer kernels and the convolution step shared by every
//! spatial filter.

/// 3x3 luma neighborhood, indexed `[row][column]` with the center at `[1][1]`.
pub type Window3 = [[u8; 3]; 3];

/// Immutable 3x3 integer kernel with a normalization divisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Kernel {
    weights: [[i32; 3]; 3],
    divisor: i32,
}

/// Laplacian edge detector; weights sum to zero.
pub const EDGE_DETECT: Kernel = Kernel::new([[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]], 1);

/// Gaussian blur; weights sum to the divisor so flat regions are preserved.
pub const BLUR: Kernel = Kernel::new([[1, 2, 1], [2, 4, 2], [1, 2, 1]], 16);

impl Kernel {
    /// A divisor of zero disables normalization.
    pub const fn new(weights: [[i32; 3]; 3], divisor: i32) -> Self {
        Self { weights, divisor }
    }

    /// Returns the 3x3 weights, indexed `[row][column]`.
    pub const fn weights(&self) -> &[[i32; 3]; 3] {
        &self.weights
    }

    /// Returns the normalization divisor.
    pub const fn divisor(&self) -> i32 {
        self.divisor
    }

    /// Convolves one neighborhood with this kernel.
    #[inline]
    pub fn apply(&self, window: &Window3) -> u8 {
        convolve(window, &self.weights, self.divisor)
    }
}

/// Dot product of `window` and `weights`, divided by `divisor` (truncating,
/// skipped when zero) and clamped to `[0, 255]`.
#[inline]
pub fn convolve(window: &Window3, weights: &[[i32; 3]; 3], divisor: i32) -> u8 {
    let mut sum = 0i32;
    for (w_row, k_row) in window.iter().zip(weights.iter()) {
        for (&w, &k) in w_row.iter().zip(k_row.iter()) {
            sum += i32::from(w) * k;
        }
    }
    if divisor != 0 {
        sum /= divisor;
    }
    sum.clamp(0, 255) as u8
}
