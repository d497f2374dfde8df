//! Accent palette and hex → translucent color helpers.
//!
//! Every effect in the storm pulls from the same three accents: a cool blue,
//! a warm yellow and a pink. Canvas 2D wants CSS color strings, so colors are
//! kept as plain RGB triples and formatted into `rgba(..)` on demand.

use rand::Rng;

/// Plain 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional). Anything else yields `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#RRGGBB`, uppercase like the stylesheet palette.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS `rgba(r,g,b,a)` with alpha clamped to [0, 1].
    pub fn rgba(&self, alpha: f64) -> String {
        let a = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
        format!("rgba({},{},{},{})", self.r, self.g, self.b, a)
    }
}

/// Convenience wrapper over [`Color::from_hex`] + [`Color::rgba`].
pub fn hex_to_rgba(hex: &str, alpha: f64) -> Option<String> {
    Color::from_hex(hex).map(|c| c.rgba(alpha))
}

pub const BLUE: Color = Color::rgb(0x4A, 0x90, 0xD9);
pub const YELLOW: Color = Color::rgb(0xF5, 0xC5, 0x42);
pub const PINK: Color = Color::rgb(0xE8, 0x6B, 0x8A);
pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

pub const PALETTE: [Color; 3] = [BLUE, YELLOW, PINK];

/// Uniformly pick one palette accent.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Color {
    PALETTE[rng.gen_range(0..PALETTE.len())]
}

/// Named accent, as marked on decorative elements with a CSS class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Accent {
    #[default]
    Blue,
    Yellow,
    Pink,
}

impl Accent {
    pub fn color(self) -> Color {
        match self {
            Accent::Blue => BLUE,
            Accent::Yellow => YELLOW,
            Accent::Pink => PINK,
        }
    }

    /// Resolve the accent from an element's class list. `pink` wins over
    /// `yellow` when both are present; no marker means blue.
    pub fn from_markers<'a, I>(classes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut accent = Accent::Blue;
        for class in classes {
            match class {
                "pink" => return Accent::Pink,
                "yellow" => accent = Accent::Yellow,
                _ => {}
            }
        }
        accent
    }

    /// Same as [`Accent::from_markers`] for a raw `class` attribute value.
    pub fn from_class_attr(class_attr: &str) -> Self {
        Self::from_markers(class_attr.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_palette_hex() {
        assert_eq!(Color::from_hex("#4A90D9"), Some(BLUE));
        assert_eq!(Color::from_hex("f5c542"), Some(YELLOW));
        assert_eq!(Color::from_hex("#E86B8A").map(|c| c.hex()), Some("#E86B8A".into()));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::from_hex("#ééé"), None);
    }

    #[test]
    fn rgba_formats_and_clamps() {
        assert_eq!(BLUE.rgba(0.5), "rgba(74,144,217,0.5)");
        assert_eq!(BLUE.rgba(3.0), "rgba(74,144,217,1)");
        assert_eq!(BLUE.rgba(f64::NAN), "rgba(74,144,217,0)");
        assert_eq!(hex_to_rgba("#F5C542", 0.25).as_deref(), Some("rgba(245,197,66,0.25)"));
    }

    #[test]
    fn accent_markers() {
        assert_eq!(Accent::from_class_attr("card-icon yellow"), Accent::Yellow);
        assert_eq!(Accent::from_class_attr("card-icon pink"), Accent::Pink);
        assert_eq!(Accent::from_class_attr("yellow pink"), Accent::Pink);
        assert_eq!(Accent::from_class_attr("card-icon"), Accent::Blue);
        assert_eq!(Accent::from_class_attr(""), Accent::Blue);
    }

    #[test]
    fn pick_stays_in_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            assert!(PALETTE.contains(&pick(&mut rng)));
        }
    }
}
