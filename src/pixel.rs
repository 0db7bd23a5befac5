//! Packed RGB565 pixels and their luma conversion.
//!
//! A pixel stores red in bits 15..11, green in bits 10..5 and blue in bits
//! 4..0. Luma scales each channel to `0..=255` and applies the BT.601 integer
//! weights `(299, 587, 114) / 1000`, truncating toward zero at every step.
//! The reverse mapping rescales an 8-bit luma into each channel's own bit
//! depth, so a luma -> pixel -> luma round trip is lossy (never brighter,
//! at most 7 levels darker).

/// Largest value of the 5-bit red and blue channels.
pub const MAX_5BIT: u8 = 0x1F;
/// Largest value of the 6-bit green channel.
pub const MAX_6BIT: u8 = 0x3F;

/// One packed 16-bit color pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);
    pub const YELLOW: Self = Self(0xFFE0);

    /// Packs channel values, masking each to its bit depth.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        let r = (r & MAX_5BIT) as u16;
        let g = (g & MAX_6BIT) as u16;
        let b = (b & MAX_5BIT) as u16;
        Self((r << 11) | (g << 5) | b)
    }

    /// Returns the raw packed value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// 5-bit red channel in `[0, 31]`.
    pub const fn red(self) -> u8 {
        ((self.0 >> 11) & MAX_5BIT as u16) as u8
    }

    /// 6-bit green channel in `[0, 63]`.
    pub const fn green(self) -> u8 {
        ((self.0 >> 5) & MAX_6BIT as u16) as u8
    }

    /// 5-bit blue channel in `[0, 31]`.
    pub const fn blue(self) -> u8 {
        (self.0 & MAX_5BIT as u16) as u8
    }

    /// Weighted brightness of the packed channels.
    pub fn to_luma(self) -> u8 {
        let r = u32::from(self.red()) * 255 / u32::from(MAX_5BIT);
        let g = u32::from(self.green()) * 255 / u32::from(MAX_6BIT);
        let b = u32::from(self.blue()) * 255 / u32::from(MAX_5BIT);
        let luma = (r * 299 + g * 587 + b * 114) / 1000;
        luma.min(255) as u8
    }

    /// Gray pixel whose channels are `luma` rescaled to 5/6/5 bits.
    pub fn from_luma(luma: u8) -> Self {
        let l = u32::from(luma);
        let r5 = (l * u32::from(MAX_5BIT)) / 255;
        let g6 = (l * u32::from(MAX_6BIT)) / 255;
        let b5 = (l * u32::from(MAX_5BIT)) / 255;
        Self::new(r5 as u8, g6 as u8, b5 as u8)
    }

    /// Quantizes 8-bit RGB by dropping the low bits of each channel.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r >> 3, g >> 2, b >> 3)
    }

    /// Expands to 8-bit RGB, replicating high bits into the low bits.
    pub const fn to_rgb8(self) -> [u8; 3] {
        let r = self.red();
        let g = self.green();
        let b = self.blue();
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    }

    /// Panel byte order: most-significant byte first.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for Rgb565 {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Rgb565> for u16 {
    fn from(value: Rgb565) -> Self {
        value.0
    }
}

/// Luma of a raw packed pixel.
pub fn to_luma(pixel: u16) -> u8 {
    Rgb565(pixel).to_luma()
}

/// Raw packed gray pixel for a luma value.
pub fn from_luma(luma: u8) -> u16 {
    Rgb565::from_luma(luma).raw()
}

#[cfg(test)]
mod tests {
    use super::{from_luma, to_luma, Rgb565};

    #[test]
    fn channels_round_trip_through_packing() {
        let px = Rgb565::new(17, 42, 9);
        assert_eq!(px.red(), 17);
        assert_eq!(px.green(), 42);
        assert_eq!(px.blue(), 9);
        assert_eq!(Rgb565::new(0xFF, 0xFF, 0xFF), Rgb565::WHITE);
    }

    #[test]
    fn luma_truncates_toward_zero() {
        assert_eq!(Rgb565::WHITE.to_luma(), 255);
        assert_eq!(Rgb565::BLACK.to_luma(), 0);
        // 255 * 299 = 76245 -> 76
        assert_eq!(Rgb565::RED.to_luma(), 76);
        assert_eq!(to_luma(0x07E0), 149);
        // (15, 31, 15) -> (123, 125, 123) -> 124
        assert_eq!(Rgb565::new(15, 31, 15).to_luma(), 124);
    }

    #[test]
    fn from_luma_scales_each_channel() {
        assert_eq!(from_luma(255), 0xFFFF);
        assert_eq!(from_luma(0), 0x0000);
        let px = Rgb565::from_luma(128);
        assert_eq!(px.red(), 15);
        assert_eq!(px.green(), 31);
        assert_eq!(px.blue(), 15);
    }

    #[test]
    fn luma_round_trip_error_is_bounded() {
        for l in 0..=255u8 {
            let back = Rgb565::from_luma(l).to_luma();
            assert!(back <= l, "l={l} back={back}");
            assert!(l - back <= 7, "l={l} back={back}");
        }
    }

    #[test]
    fn rgb8_expansion_keeps_extremes() {
        assert_eq!(Rgb565::WHITE.to_rgb8(), [255, 255, 255]);
        assert_eq!(Rgb565::BLACK.to_rgb8(), [0, 0, 0]);
        assert_eq!(Rgb565::from_rgb8(255, 0, 0), Rgb565::RED);
        assert_eq!(Rgb565::RED.to_be_bytes(), [0xF8, 0x00]);
    }
}
