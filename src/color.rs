// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const RED: Color = Color::new(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0xff, 0x00);
    pub const BLUE: Color = Color::new(0x00, 0x00, 0xff);
    pub const YELLOW: Color = Color::new(0xff, 0xff, 0x00);
    pub const GRAY: Color = Color::new(0xa0, 0xa0, 0xa4);
    pub const TRANSPARENT: Color = Color::rgba(0x00, 0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Channel-wise integer average of `colors`, fully opaque. `None` when empty.
    pub fn average(colors: &[Color]) -> Option<Color> {
        if colors.is_empty() {
            return None;
        }
        let n = colors.len() as u32;
        let (r, g, b) = colors.iter().fold((0u32, 0u32, 0u32), |(r, g, b), c| {
            (r + u32::from(c.r), g + u32::from(c.g), b + u32::from(c.b))
        });
        Some(Color::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
    }

    /// Average of two colors, used for the shared border of dual-value bars.
    pub fn blend(self, other: Color) -> Color {
        let mid = |x: u8, y: u8| ((u16::from(x) + u16::from(y)) / 2) as u8;
        Color::rgba(
            mid(self.r, other.r),
            mid(self.g, other.g),
            mid(self.b, other.b),
            mid(self.a, other.a),
        )
    }

    /// Linear interpolation between two colors, `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_empty_is_none() {
        assert_eq!(Color::average(&[]), None);
    }

    #[test]
    fn average_uses_integer_division_per_channel() {
        let avg = Color::average(&[Color::new(255, 0, 10), Color::new(0, 255, 11)]).unwrap();
        assert_eq!(avg, Color::new(127, 127, 10));
    }

    #[test]
    fn blend_matches_two_color_average() {
        let a = Color::RED;
        let b = Color::BLUE;
        assert_eq!(a.blend(b).as_tuple(), Color::average(&[a, b]).unwrap().as_tuple());
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(Color::RED.lerp(Color::BLACK, 0.0), Color::RED);
        assert_eq!(Color::RED.lerp(Color::BLACK, 1.0), Color::BLACK);
    }
}
