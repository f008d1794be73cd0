use serde::{Deserialize, Serialize};

/// Artwork shown for a provider condition text.
///
/// The provider reports conditions as free text; only the texts below have
/// dedicated artwork, everything else renders as [`ConditionArt::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionArt {
    PartlyCloudy,
    ModerateRain,
    PatchyRain,
    Sunny,
    Clear,
    Overcast,
    Cloudy,
    LightRain,
    HeavyRain,
    FreezingRain,
    RainShower,
    Thunderstorm,
    Mist,
    #[default]
    Other,
}

impl ConditionArt {
    pub fn from_condition_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "partly cloudy" => Self::PartlyCloudy,
            "moderate rain" | "moderate rain at times" => Self::ModerateRain,
            "patchy rain possible" | "patchy rain nearby" => Self::PatchyRain,
            "sunny" => Self::Sunny,
            "clear" => Self::Clear,
            "overcast" => Self::Overcast,
            "cloudy" => Self::Cloudy,
            "light rain" => Self::LightRain,
            "heavy rain" | "heavy rain at times" => Self::HeavyRain,
            "moderate or heavy freezing rain" => Self::FreezingRain,
            "moderate or heavy rain shower" => Self::RainShower,
            "moderate or heavy rain with thunder" => Self::Thunderstorm,
            "mist" => Self::Mist,
            _ => Self::Other,
        }
    }

    /// Asset file stem for this artwork.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::PartlyCloudy => "partlycloudy",
            Self::ModerateRain => "moderaterain",
            Self::PatchyRain => "moderaterain",
            Self::Sunny => "sun",
            Self::Clear => "sun",
            Self::Overcast => "cloud",
            Self::Cloudy => "cloud",
            Self::LightRain => "moderaterain",
            Self::HeavyRain => "heavyrain",
            Self::FreezingRain => "heavyrain",
            Self::RainShower => "heavyrain",
            Self::Thunderstorm => "heavyrain",
            Self::Mist => "mist",
            Self::Other => "moderaterain",
        }
    }
}
