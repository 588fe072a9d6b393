use crate::system::error::BrewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flavour preference. Only reshapes the first two pours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taste {
    Sweet,
    #[default]
    Balanced,
    Bright,
}

/// Body preference. Decides how many pours the remaining 60% is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Light,
    #[default]
    Medium,
    Strong,
}

impl Taste {
    pub const ALL: [Taste; 3] = [Taste::Sweet, Taste::Balanced, Taste::Bright];

    pub fn as_str(&self) -> &'static str {
        match self {
            Taste::Sweet => "sweet",
            Taste::Balanced => "balanced",
            Taste::Bright => "bright",
        }
    }
}

impl Strength {
    pub const ALL: [Strength; 3] = [Strength::Light, Strength::Medium, Strength::Strong];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Light => "light",
            Strength::Medium => "medium",
            Strength::Strong => "strong",
        }
    }

    /// Number of pours in the strength phase.
    pub fn pour_count(&self) -> usize {
        match self {
            Strength::Light => 2,
            Strength::Medium => 3,
            Strength::Strong => 4,
        }
    }
}

impl fmt::Display for Taste {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Taste {
    type Err = BrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sweet" => Ok(Taste::Sweet),
            "balanced" => Ok(Taste::Balanced),
            "bright" => Ok(Taste::Bright),
            other => Err(BrewError::InvalidArgument(format!("invalid taste: {other}"))),
        }
    }
}

impl FromStr for Strength {
    type Err = BrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Strength::Light),
            "medium" => Ok(Strength::Medium),
            "strong" => Ok(Strength::Strong),
            other => Err(BrewError::InvalidArgument(format!("invalid strength: {other}"))),
        }
    }
}

/// A computed brewing schedule. Amounts are unrounded grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub bean_weight_g: f64,
    pub total_water_g: f64,
    pub pours: Vec<f64>,
    pub timings: Vec<u32>,
    pub taste: Taste,
    pub strength: Strength,
}

impl Recipe {
    pub fn pour_count(&self) -> usize {
        self.pours.len()
    }

    /// Pairs each pour amount with its scheduled offset.
    pub fn pour_steps(&self) -> Vec<PourStep> {
        self.pours
            .iter()
            .zip(self.timings.iter())
            .map(|(&amount_g, &timing_secs)| PourStep { amount_g, timing_secs })
            .collect()
    }

    /// Spacing between scheduled pours, falling back to the default for single-pour schedules.
    pub fn interval_secs(&self) -> u32 {
        match self.timings.get(1) {
            Some(&second) => second,
            None => DEFAULT_POUR_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PourStep {
    pub amount_g: f64,
    pub timing_secs: u32,
}

pub const WATER_TO_BEAN_RATIO: f64 = 15.0;
pub const TASTE_PHASE_FRACTION: f64 = 0.4;
pub const STRENGTH_PHASE_FRACTION: f64 = 0.6;
pub const TASTE_PHASE_POURS: usize = 2;
pub const TASTE_SKEW: f64 = 0.2; // sweet/bright shift 20% of a base pour between the first two
pub const DEFAULT_POUR_INTERVAL_SECS: u32 = 45;
pub const MAX_POUR_INTERVAL_SECS: u32 = 3600;
pub const MIN_BEAN_WEIGHT_G: f64 = 5.0;
pub const MAX_BEAN_WEIGHT_G: f64 = 50.0;
pub const UI_MIN_BEAN_WEIGHT_G: f64 = 10.0;
pub const UI_MAX_BEAN_WEIGHT_G: f64 = 30.0;
pub const DEFAULT_BEAN_WEIGHT_G: f64 = 20.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preferences() {
        assert_eq!("sweet".parse::<Taste>().unwrap(), Taste::Sweet);
        assert_eq!(" Bright ".parse::<Taste>().unwrap(), Taste::Bright);
        assert_eq!("STRONG".parse::<Strength>().unwrap(), Strength::Strong);
    }

    #[test]
    fn test_unknown_preference_is_invalid_argument() {
        assert!(matches!(
            "bitter".parse::<Taste>(),
            Err(BrewError::InvalidArgument(_))
        ));
        assert!(matches!(
            "extra".parse::<Strength>(),
            Err(BrewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_strength_pour_counts() {
        assert_eq!(Strength::Light.pour_count(), 2);
        assert_eq!(Strength::Medium.pour_count(), 3);
        assert_eq!(Strength::Strong.pour_count(), 4);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&(Taste::Bright, Strength::Light)).unwrap();
        assert_eq!(json, r#"["bright","light"]"#);
    }

    #[test]
    fn test_pour_steps_pair_amounts_with_timings() {
        let recipe = Recipe {
            bean_weight_g: 10.0,
            total_water_g: 150.0,
            pours: vec![30.0, 30.0, 45.0, 45.0],
            timings: vec![0, 30, 60, 90],
            taste: Taste::Balanced,
            strength: Strength::Light,
        };
        let steps = recipe.pour_steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2], PourStep { amount_g: 45.0, timing_secs: 60 });
        assert_eq!(recipe.interval_secs(), 30);
    }
}
