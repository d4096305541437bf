//! Packed pixel colours
//!
//! Each pixel is one byte holding a 3-bit colour code, one bit per channel.
//! The colour generator shifts the low three bits straight onto three
//! consecutive GPIOs, so the bit order here has to match the wiring. The
//! default is BGR (red on the highest bit); the `rgb-order` feature flips it.

/// Number of significant bits in a packed pixel
pub const COLOR_BITS: u8 = 3;

/// Mask of the significant bits in a packed pixel
pub const COLOR_MASK: u8 = (1 << COLOR_BITS) - 1;

#[cfg(not(feature = "rgb-order"))]
mod codes {
    pub const RED: u8 = 0b100;
    pub const GREEN: u8 = 0b010;
    pub const BLUE: u8 = 0b001;
}

#[cfg(feature = "rgb-order")]
mod codes {
    pub const RED: u8 = 0b001;
    pub const GREEN: u8 = 0b010;
    pub const BLUE: u8 = 0b100;
}

pub const BLACK: u8 = 0;
pub const RED: u8 = codes::RED;
pub const GREEN: u8 = codes::GREEN;
pub const YELLOW: u8 = codes::RED | codes::GREEN;
pub const BLUE: u8 = codes::BLUE;
pub const MAGENTA: u8 = codes::RED | codes::BLUE;
pub const CYAN: u8 = codes::GREEN | codes::BLUE;
pub const WHITE: u8 = codes::RED | codes::GREEN | codes::BLUE;

/// The eight displayable colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// All colours, in the order of a classic colour-bar pattern
    pub const ALL: [Color; 8] = [
        Color::White,
        Color::Yellow,
        Color::Cyan,
        Color::Green,
        Color::Magenta,
        Color::Red,
        Color::Blue,
        Color::Black,
    ];

    /// Pack into the one-byte-per-pixel framebuffer encoding
    pub const fn pack(self) -> u8 {
        match self {
            Color::Black => BLACK,
            Color::Red => RED,
            Color::Green => GREEN,
            Color::Yellow => YELLOW,
            Color::Blue => BLUE,
            Color::Magenta => MAGENTA,
            Color::Cyan => CYAN,
            Color::White => WHITE,
        }
    }

    /// Decode a framebuffer byte, ignoring the unused upper bits
    pub const fn unpack(byte: u8) -> Self {
        let code = byte & COLOR_MASK;
        let r = code & RED != 0;
        let g = code & GREEN != 0;
        let b = code & BLUE != 0;
        match (r, g, b) {
            (false, false, false) => Color::Black,
            (true, false, false) => Color::Red,
            (false, true, false) => Color::Green,
            (true, true, false) => Color::Yellow,
            (false, false, true) => Color::Blue,
            (true, false, true) => Color::Magenta,
            (false, true, true) => Color::Cyan,
            (true, true, true) => Color::White,
        }
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> u8 {
        color.pack()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(feature = "rgb-order"))]
    fn test_bgr_codes() {
        assert_eq!(Color::Red.pack(), 0b100);
        assert_eq!(Color::Green.pack(), 0b010);
        assert_eq!(Color::Yellow.pack(), 0b110);
        assert_eq!(Color::Blue.pack(), 0b001);
        assert_eq!(Color::Magenta.pack(), 0b101);
        assert_eq!(Color::Cyan.pack(), 0b011);
        assert_eq!(Color::White.pack(), 0b111);
    }

    #[test]
    #[cfg(feature = "rgb-order")]
    fn test_rgb_codes() {
        assert_eq!(Color::Red.pack(), 1);
        assert_eq!(Color::Green.pack(), 2);
        assert_eq!(Color::Yellow.pack(), 3);
        assert_eq!(Color::Blue.pack(), 4);
        assert_eq!(Color::Magenta.pack(), 5);
        assert_eq!(Color::Cyan.pack(), 6);
        assert_eq!(Color::White.pack(), 7);
    }

    #[test]
    fn test_black_is_zero() {
        // Framebuffer starts zeroed, which must read as black
        assert_eq!(Color::Black.pack(), 0);
        assert_eq!(Color::default(), Color::Black);
    }

    #[test]
    fn test_codes_are_distinct_and_fit() {
        for (i, a) in Color::ALL.iter().enumerate() {
            assert_eq!(a.pack() & !COLOR_MASK, 0);
            for b in &Color::ALL[i + 1..] {
                assert_ne!(a.pack(), b.pack());
            }
        }
    }

    #[test]
    fn test_unpack_ignores_upper_bits() {
        for color in Color::ALL {
            assert_eq!(Color::unpack(color.pack()), color);
            assert_eq!(Color::unpack(color.pack() | 0b1111_1000), color);
        }
    }
}
