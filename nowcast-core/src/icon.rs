//! Condition code → icon mapping.
//!
//! Codes are WeatherAPI.com condition identifiers. Unknown codes fall back to a
//! plain cloud so every integer has something to draw.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    #[serde(rename = "sun.max")]
    SunMax,
    #[serde(rename = "cloud.sun")]
    CloudSun,
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "smoke")]
    Smoke,
    #[serde(rename = "cloud.fog")]
    CloudFog,
    #[serde(rename = "cloud.rain")]
    CloudRain,
    #[serde(rename = "cloud.snow")]
    CloudSnow,
    #[serde(rename = "cloud.sleet")]
    CloudSleet,
    #[serde(rename = "cloud.bolt")]
    CloudBolt,
    #[serde(rename = "cloud.sun.rain")]
    CloudSunRain,
}

impl Icon {
    /// Symbol identifier, in the `cloud.sun` naming scheme.
    pub fn symbol(&self) -> &'static str {
        match self {
            Icon::SunMax => "sun.max",
            Icon::CloudSun => "cloud.sun",
            Icon::Cloud => "cloud",
            Icon::Smoke => "smoke",
            Icon::CloudFog => "cloud.fog",
            Icon::CloudRain => "cloud.rain",
            Icon::CloudSnow => "cloud.snow",
            Icon::CloudSleet => "cloud.sleet",
            Icon::CloudBolt => "cloud.bolt",
            Icon::CloudSunRain => "cloud.sun.rain",
        }
    }

    /// Glyph for terminal output.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::SunMax => "☀",
            Icon::CloudSun => "⛅",
            Icon::Cloud => "☁",
            Icon::Smoke => "≋",
            Icon::CloudFog => "🌫",
            Icon::CloudRain => "🌧",
            Icon::CloudSnow => "🌨",
            Icon::CloudSleet => "🌨",
            Icon::CloudBolt => "🌩",
            Icon::CloudSunRain => "🌦",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Orange,
    Cyan,
    Teal,
}

impl Color {
    pub fn name(&self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Cyan => "cyan",
            Color::Teal => "teal",
        }
    }

    /// 256-color ANSI index closest to the palette color.
    pub fn ansi256(&self) -> u8 {
        match self {
            Color::Yellow => 220,
            Color::Orange => 208,
            Color::Cyan => 45,
            Color::Teal => 37,
        }
    }
}

/// An icon with its two-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionIcon {
    pub icon: Icon,
    pub primary: Color,
    pub secondary: Color,
}

impl ConditionIcon {
    const fn new(icon: Icon, primary: Color, secondary: Color) -> Self {
        Self { icon, primary, secondary }
    }

    pub fn for_code(code: i32) -> Self {
        use Color::*;

        match code {
            1000 => Self::new(Icon::SunMax, Yellow, Orange),
            1003 => Self::new(Icon::CloudSun, Cyan, Yellow),
            1006 => Self::new(Icon::Cloud, Cyan, Cyan),
            1009 => Self::new(Icon::Smoke, Cyan, Cyan),
            1030 => Self::new(Icon::CloudFog, Cyan, Cyan),
            1063 => Self::new(Icon::CloudRain, Cyan, Cyan),
            1066 => Self::new(Icon::CloudSnow, Cyan, Teal),
            1069 => Self::new(Icon::CloudSleet, Teal, Cyan),
            1087 => Self::new(Icon::CloudBolt, Yellow, Cyan),
            _ => Self::fallback(),
        }
    }

    pub const fn fallback() -> Self {
        Self::new(Icon::Cloud, Color::Cyan, Color::Cyan)
    }

    /// Shown before anything has been fetched.
    pub const fn placeholder() -> Self {
        Self::new(Icon::CloudSunRain, Color::Cyan, Color::Orange)
    }
}
