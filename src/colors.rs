use palette::{Mix, Srgb, Srgba};

/// An sRGB colour with an explicit alpha channel.
///
/// Opacity is composed with [`ThemeColor::scaled_alpha`] instead of being
/// appended to a colour string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeColor {
    pub rgb: Srgb<u8>,
    pub alpha: u8,
}

impl ThemeColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue),
            alpha: u8::MAX,
        }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue),
            alpha,
        }
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Alpha becomes `floor(opacity * max)`, e.g. `scaled_alpha(0.7, 200.0)`.
    pub fn scaled_alpha(self, opacity: f32, max: f32) -> Self {
        let alpha = (opacity.clamp(0.0, 1.0) * max).floor().clamp(0.0, 255.0) as u8;
        self.with_alpha(alpha)
    }

    pub fn to_float(self) -> Srgba<f32> {
        let rgb: Srgb<f32> = self.rgb.into_format();
        Srgba::new(rgb.red, rgb.green, rgb.blue, self.alpha as f32 / 255.0)
    }

    pub fn mix(self, other: ThemeColor, factor: f32) -> Srgba<f32> {
        self.to_float().mix(other.to_float(), factor.clamp(0.0, 1.0))
    }

    pub fn to_terminal(self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.rgb.red, self.rgb.green, self.rgb.blue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeStyle {
    Neon,
    Minimal,
    Retro,
}

impl std::fmt::Display for ThemeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ThemeStyle::Neon => "neon",
            ThemeStyle::Minimal => "minimal",
            ThemeStyle::Retro => "retro",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeColors {
    pub primary: ThemeColor,
    pub secondary: ThemeColor,
    pub accent: ThemeColor,
    /// Fill used to clear the visualization surface each frame.
    pub background: ThemeColor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub colors: ThemeColors,
    pub style: ThemeStyle,
}

pub const NEON_DREAMS: Theme = Theme {
    name: "Neon Dreams",
    colors: ThemeColors {
        primary: ThemeColor::rgb(0xff, 0x00, 0xff),
        secondary: ThemeColor::rgb(0x00, 0xff, 0xff),
        accent: ThemeColor::rgb(0xff, 0xff, 0x00),
        background: ThemeColor::rgba(30, 27, 75, 242),
    },
    style: ThemeStyle::Neon,
};

pub const MINIMAL_WAVE: Theme = Theme {
    name: "Minimal Wave",
    colors: ThemeColors {
        primary: ThemeColor::rgb(0x4f, 0x46, 0xe5),
        secondary: ThemeColor::rgb(0x06, 0xb6, 0xd4),
        accent: ThemeColor::rgb(0x10, 0xb9, 0x81),
        background: ThemeColor::rgba(17, 24, 39, 242),
    },
    style: ThemeStyle::Minimal,
};

pub const RETRO_SYNTHWAVE: Theme = Theme {
    name: "Retro Synthwave",
    colors: ThemeColors {
        primary: ThemeColor::rgb(0xff, 0x00, 0x6e),
        secondary: ThemeColor::rgb(0x83, 0x38, 0xec),
        accent: ThemeColor::rgb(0x3a, 0x86, 0xff),
        background: ThemeColor::rgba(59, 7, 100, 242),
    },
    style: ThemeStyle::Retro,
};

pub const THEMES: [Theme; 3] = [NEON_DREAMS, MINIMAL_WAVE, RETRO_SYNTHWAVE];

impl Theme {
    /// Looks a theme up by display name or by style, case-insensitively.
    pub fn find(name: &str) -> Option<Theme> {
        let wanted = name.trim().to_lowercase();
        THEMES.iter().copied().find(|theme| {
            theme.name.to_lowercase() == wanted || theme.style.to_string() == wanted
        })
    }

    /// The catalog entry following this one, wrapping around.
    pub fn next(&self) -> Theme {
        let index = THEMES
            .iter()
            .position(|theme| theme.name == self.name)
            .unwrap_or(0);
        THEMES[(index + 1) % THEMES.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        NEON_DREAMS
    }
}
