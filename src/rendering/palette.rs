//! Frame styles for the user-details region and their colour palettes

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Rgba = (u8, u8, u8, u8);

pub const SP_RED: Rgba = (0xE3, 0x05, 0x12, 0xFF);
pub const SP_RED_DARK: Rgba = (0xB9, 0x1C, 0x1C, 0xFF);
pub const SP_GREEN: Rgba = (0x00, 0x99, 0x33, 0xFF);
pub const WHITE: Rgba = (0xFF, 0xFF, 0xFF, 0xFF);
const SLATE_900: Rgba = (0x0F, 0x17, 0x2A, 0xFF);
const SLATE_800: Rgba = (0x1E, 0x29, 0x3B, 0xFF);
const SLATE_600: Rgba = (0x47, 0x55, 0x69, 0xFF);
const SLATE_500: Rgba = (0x64, 0x74, 0x8B, 0xFF);
const SLATE_200: Rgba = (0xE2, 0xE8, 0xF0, 0xFF);
const SLATE_50: Rgba = (0xF8, 0xFA, 0xFC, 0xFF);
const AMBER_400: Rgba = (0xFB, 0xBF, 0x24, 0xFF);
const AMBER_600: Rgba = (0xD9, 0x77, 0x06, 0xFF);

/// Colours used to paint one frame style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub details_top: Rgba,
    pub details_bottom: Rgba,
    pub photo_ring: Rgba,
    pub photo_background: Rgba,
    pub silhouette: Rgba,
    pub role_text: Rgba,
    pub name_text: Rgba,
    pub description_text: Rgba,
    pub campaign_strip: Rgba,
    pub headline_text: Rgba,
    pub tagline_text: Rgba,
    pub placeholder_top: Rgba,
    pub placeholder_bottom: Rgba,
    pub stripe_primary: Rgba,
    pub stripe_secondary: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        FrameStyle::default().palette()
    }
}

/// Look of the user-details region beneath the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStyle {
    #[default]
    Classic,
    ProfessionalCard,
    ModernMinimal,
    RedPower,
    GoldenElite,
    VibrantWave,
}

impl FrameStyle {
    pub const ALL: [FrameStyle; 6] = [
        FrameStyle::Classic,
        FrameStyle::ProfessionalCard,
        FrameStyle::ModernMinimal,
        FrameStyle::RedPower,
        FrameStyle::GoldenElite,
        FrameStyle::VibrantWave,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FrameStyle::Classic => "classic",
            FrameStyle::ProfessionalCard => "professional-card",
            FrameStyle::ModernMinimal => "modern-minimal",
            FrameStyle::RedPower => "red-power",
            FrameStyle::GoldenElite => "golden-elite",
            FrameStyle::VibrantWave => "vibrant-wave",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FrameStyle::Classic => "Classic Frame",
            FrameStyle::ProfessionalCard => "Professional Card",
            FrameStyle::ModernMinimal => "Modern Minimal",
            FrameStyle::RedPower => "Red Power",
            FrameStyle::GoldenElite => "Golden Elite",
            FrameStyle::VibrantWave => "Vibrant Wave",
        }
    }

    pub fn palette(&self) -> Palette {
        let base = Palette {
            details_top: WHITE,
            details_bottom: SLATE_50,
            photo_ring: SP_RED,
            photo_background: SLATE_200,
            silhouette: SLATE_500,
            role_text: SP_RED,
            name_text: SLATE_900,
            description_text: SLATE_600,
            campaign_strip: (0x00, 0x00, 0x00, 0x99),
            headline_text: WHITE,
            tagline_text: (0xFE, 0xE2, 0xE2, 0xFF),
            placeholder_top: SP_RED,
            placeholder_bottom: SP_RED_DARK,
            stripe_primary: SP_RED,
            stripe_secondary: SP_GREEN,
        };
        match self {
            FrameStyle::Classic => base,
            FrameStyle::ProfessionalCard => Palette {
                details_top: SLATE_800,
                details_bottom: SLATE_900,
                photo_ring: WHITE,
                role_text: AMBER_400,
                name_text: WHITE,
                description_text: SLATE_200,
                ..base
            },
            FrameStyle::ModernMinimal => Palette {
                details_bottom: WHITE,
                photo_ring: SLATE_200,
                role_text: SLATE_500,
                campaign_strip: (0xFF, 0xFF, 0xFF, 0xB3),
                headline_text: SLATE_900,
                tagline_text: SLATE_600,
                ..base
            },
            FrameStyle::RedPower => Palette {
                details_top: SP_RED,
                details_bottom: SP_RED_DARK,
                photo_ring: WHITE,
                role_text: (0xFE, 0xE2, 0xE2, 0xFF),
                name_text: WHITE,
                description_text: (0xFE, 0xCA, 0xCA, 0xFF),
                stripe_primary: WHITE,
                ..base
            },
            FrameStyle::GoldenElite => Palette {
                details_top: AMBER_400,
                details_bottom: AMBER_600,
                role_text: SP_RED_DARK,
                name_text: SLATE_800,
                description_text: SLATE_900,
                ..base
            },
            FrameStyle::VibrantWave => Palette {
                details_top: SP_GREEN,
                details_bottom: SP_RED,
                photo_ring: WHITE,
                role_text: (0xDC, 0xFC, 0xE7, 0xFF),
                name_text: WHITE,
                description_text: SLATE_50,
                stripe_primary: WHITE,
                stripe_secondary: AMBER_400,
                ..base
            },
        }
    }
}

impl fmt::Display for FrameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FrameStyle {
    type Err = Error;

    /// Accepts the kebab-case ids as well as the legacy bottom-bar ids
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let style = match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => FrameStyle::Classic,
            "professional-card" | "bold_strip" => FrameStyle::ProfessionalCard,
            "modern-minimal" | "minimal_white" => FrameStyle::ModernMinimal,
            "red-power" | "red_accent" => FrameStyle::RedPower,
            "golden-elite" | "yellow_theme" => FrameStyle::GoldenElite,
            "vibrant-wave" | "gradient_wave" => FrameStyle::VibrantWave,
            _ => return Err(Error::UnknownFrame(s.to_string())),
        };
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_legacy_ids() {
        for style in FrameStyle::ALL {
            assert_eq!(style.id().parse::<FrameStyle>().unwrap(), style);
        }
        assert_eq!("bold_strip".parse::<FrameStyle>().unwrap(), FrameStyle::ProfessionalCard);
        assert_eq!("gradient_wave".parse::<FrameStyle>().unwrap(), FrameStyle::VibrantWave);
        assert!(matches!("neon".parse::<FrameStyle>(), Err(Error::UnknownFrame(_))));
    }

    #[test]
    fn styles_have_distinct_palettes() {
        for (i, a) in FrameStyle::ALL.iter().enumerate() {
            for b in &FrameStyle::ALL[i + 1..] {
                assert_ne!(a.palette(), b.palette(), "{} vs {}", a, b);
            }
        }
        assert_eq!(Palette::default().stripe_secondary, SP_GREEN);
    }
}
