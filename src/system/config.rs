//! Brewing configuration
//!
//! Holds the user's bean weight and preferences between recipe previews.
//! Loaded from and saved to JSON; missing fields take the defaults.

use crate::recipe::calculate_recipe_with_interval;
use crate::system::error::BrewError;
use crate::types::{
    Recipe, Strength, Taste, DEFAULT_BEAN_WEIGHT_G, DEFAULT_POUR_INTERVAL_SECS, MAX_BEAN_WEIGHT_G,
    MAX_POUR_INTERVAL_SECS, MIN_BEAN_WEIGHT_G, UI_MAX_BEAN_WEIGHT_G, UI_MIN_BEAN_WEIGHT_G,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewConfig {
    pub bean_weight_g: f64,
    pub taste: Taste,
    pub strength: Strength,
    pub pour_interval_secs: u32,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            bean_weight_g: DEFAULT_BEAN_WEIGHT_G,
            taste: Taste::Balanced,
            strength: Strength::Medium,
            pour_interval_secs: DEFAULT_POUR_INTERVAL_SECS,
        }
    }
}

impl BrewConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BrewError> {
        let config: BrewConfig = serde_json::from_str(json)?;
        config.validate()?;
        info!(
            "Loaded brew config: {:.1}g, {} / {}, {}s interval",
            config.bean_weight_g, config.taste, config.strength, config.pour_interval_secs
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, BrewError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), BrewError> {
        validate_bean_weight(self.bean_weight_g)?;
        if !(1..=MAX_POUR_INTERVAL_SECS).contains(&self.pour_interval_secs) {
            return Err(BrewError::InvalidArgument(format!(
                "pour interval must be between 1 and {MAX_POUR_INTERVAL_SECS} s, got {}",
                self.pour_interval_secs
            )));
        }
        Ok(())
    }

    /// Rejects weights outside 5-50 g and keeps the previous value.
    pub fn set_bean_weight(&mut self, bean_weight_g: f64) -> Result<(), BrewError> {
        if let Err(e) = validate_bean_weight(bean_weight_g) {
            warn!("Ignoring bean weight {}: {}", bean_weight_g, e);
            return Err(e);
        }
        self.bean_weight_g = bean_weight_g;
        Ok(())
    }

    /// Whether the weight sits inside the 10-30 g range a dose selector offers.
    pub fn has_typical_bean_weight(&self) -> bool {
        (UI_MIN_BEAN_WEIGHT_G..=UI_MAX_BEAN_WEIGHT_G).contains(&self.bean_weight_g)
    }

    pub fn recipe(&self) -> Result<Recipe, BrewError> {
        self.validate()?;
        Ok(calculate_recipe_with_interval(
            self.bean_weight_g,
            self.taste,
            self.strength,
            self.pour_interval_secs,
        ))
    }
}

pub fn validate_bean_weight(bean_weight_g: f64) -> Result<(), BrewError> {
    let in_range = (MIN_BEAN_WEIGHT_G..=MAX_BEAN_WEIGHT_G).contains(&bean_weight_g);
    if !bean_weight_g.is_finite() || !in_range {
        return Err(BrewError::InvalidArgument(format!(
            "bean weight must be between {} and {} g, got {}",
            MIN_BEAN_WEIGHT_G, MAX_BEAN_WEIGHT_G, bean_weight_g
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_state() {
        let config = BrewConfig::default();
        assert_eq!(config.bean_weight_g, 20.0);
        assert_eq!(config.taste, Taste::Balanced);
        assert_eq!(config.strength, Strength::Medium);
        assert_eq!(config.pour_interval_secs, 45);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            BrewConfig::from_json_str(r#"{ "bean_weight_g": 18, "taste": "sweet" }"#).unwrap();
        assert_eq!(config.bean_weight_g, 18.0);
        assert_eq!(config.taste, Taste::Sweet);
        assert_eq!(config.strength, Strength::Medium);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            BrewConfig::from_json_str(r#"{ "taste": "sour" }"#),
            Err(BrewError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        assert!(matches!(
            BrewConfig::from_json_str(r#"{ "bean_weight_g": 80 }"#),
            Err(BrewError::InvalidArgument(_))
        ));

        let mut config = BrewConfig::default();
        assert!(config.set_bean_weight(4.9).is_err());
        assert!(config.set_bean_weight(f64::NAN).is_err());
        assert_eq!(config.bean_weight_g, 20.0);

        assert!(config.has_typical_bean_weight());
        config.set_bean_weight(50.0).unwrap();
        assert_eq!(config.bean_weight_g, 50.0);
        assert!(!config.has_typical_bean_weight());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = BrewConfig {
            pour_interval_secs: 0,
            ..BrewConfig::default()
        };
        assert!(matches!(config.recipe(), Err(BrewError::InvalidArgument(_))));
    }

    #[test]
    fn test_oversized_interval_rejected_before_calculation() {
        let config = BrewConfig {
            pour_interval_secs: u32::MAX / 2,
            ..BrewConfig::default()
        };
        assert!(matches!(config.validate(), Err(BrewError::InvalidArgument(_))));
        assert!(matches!(config.recipe(), Err(BrewError::InvalidArgument(_))));

        let longest = BrewConfig {
            pour_interval_secs: MAX_POUR_INTERVAL_SECS,
            strength: Strength::Strong,
            ..BrewConfig::default()
        };
        assert_eq!(longest.recipe().unwrap().timings[5], 5 * MAX_POUR_INTERVAL_SECS);
    }

    #[test]
    fn test_json_round_trip_keeps_recipe() {
        let config = BrewConfig {
            bean_weight_g: 15.0,
            taste: Taste::Bright,
            strength: Strength::Strong,
            pour_interval_secs: 40,
        };
        let restored = BrewConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);

        let recipe = restored.recipe().unwrap();
        assert_eq!(recipe.pours.len(), 6);
        assert_eq!(recipe.timings[5], 200);
    }
}
