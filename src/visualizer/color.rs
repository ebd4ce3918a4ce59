// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgb;

use crate::preprocessing::ChannelOrder;

/// Color type for visualization, always stored as red, green, blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Self = Self(255, 0, 0);
    /// Blue color.
    pub const BLUE: Self = Self(0, 0, 255);
    /// Cyan color.
    pub const CYAN: Self = Self(0, 255, 255);
    /// White color.
    pub const WHITE: Self = Self(255, 255, 255);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Pixel value for a frame stored in the given channel order.
    #[must_use]
    pub const fn to_pixel(self, order: ChannelOrder) -> Rgb<u8> {
        match order {
            ChannelOrder::Rgb => Rgb([self.0, self.1, self.2]),
            ChannelOrder::Bgr => Rgb([self.2, self.1, self.0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_channel_order() {
        assert_eq!(Color::BLUE.to_pixel(ChannelOrder::Rgb), Rgb([0, 0, 255]));
        assert_eq!(Color::BLUE.to_pixel(ChannelOrder::Bgr), Rgb([255, 0, 0]));
        assert_eq!(Color::WHITE.to_pixel(ChannelOrder::Bgr), Rgb([255, 255, 255]));
        assert_eq!(Color::new(1, 2, 3).to_pixel(ChannelOrder::Bgr), Rgb([3, 2, 1]));
    }
}
