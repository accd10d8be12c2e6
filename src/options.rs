// src/options.rs
// Enumerated option values accepted by the processing service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownOption {
    kind: &'static str,
    value: String,
    expected: String,
}

impl UnknownOption {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a unit-only enum
/// whose wire names are fixed strings.
macro_rules! wire_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => {
                        let expected: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        Err(UnknownOption::new($kind, other, &expected))
                    }
                }
            }
        }
    };
}

/// Output resolution of generated shorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

wire_enum!(Resolution, "resolution", {
    P1080 => "1080p",
    P720 => "720p",
    P480 => "480p",
    P360 => "360p",
});

impl Resolution {
    /// Label shown next to the option; the top quality gets a friendly name.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::P1080 => "Full HD",
            other => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorGrading {
    #[default]
    None,
    CinematicWarm,
    CoolModern,
    Vibrant,
    MatteFilm,
    BwContrast,
}

wire_enum!(ColorGrading, "color grading", {
    None => "none",
    CinematicWarm => "cinematic_warm",
    CoolModern => "cool_modern",
    Vibrant => "vibrant",
    MatteFilm => "matte_film",
    BwContrast => "bw_contrast",
});

impl ColorGrading {
    pub fn label(&self) -> &'static str {
        match self {
            ColorGrading::None => "None (Original)",
            ColorGrading::CinematicWarm => "Cinematic Warm",
            ColorGrading::CoolModern => "Cool & Modern",
            ColorGrading::Vibrant => "Vibrant Pop",
            ColorGrading::MatteFilm => "Matte Film",
            ColorGrading::BwContrast => "B&W High Contrast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteLanguage {
    #[default]
    En,
    Id,
}

wire_enum!(QuoteLanguage, "quote language", {
    En => "en",
    Id => "id",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteCategory {
    #[default]
    Life,
    Islamic,
    Finance,
    Others,
}

wire_enum!(QuoteCategory, "quote category", {
    Life => "life",
    Islamic => "islamic",
    Finance => "finance",
    Others => "others",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteFormat {
    #[default]
    Image,
    Video,
}

wire_enum!(QuoteFormat, "quote format", {
    Image => "image",
    Video => "video",
});

/// Rendering options carried with a processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessOptions {
    pub resolution: Resolution,
    pub color_grading: ColorGrading,
}
