//! 4:6 recipe calculator
//!
//! Total water is split 40/60. The first 40% is two pours shaped by taste,
//! the remaining 60% is divided into equal pours whose count comes from
//! strength. No rounding happens here; only the display layer rounds.

use crate::types::{
    Recipe, Strength, Taste, DEFAULT_POUR_INTERVAL_SECS, STRENGTH_PHASE_FRACTION,
    TASTE_PHASE_FRACTION, TASTE_PHASE_POURS, TASTE_SKEW, WATER_TO_BEAN_RATIO,
};
use log::debug;

pub fn total_water(bean_weight_g: f64) -> f64 {
    bean_weight_g * WATER_TO_BEAN_RATIO
}

/// First two pours. Always sums to 40% of the total water.
pub fn taste_phase_pours(bean_weight_g: f64, taste: Taste) -> [f64; TASTE_PHASE_POURS] {
    let phase_water = total_water(bean_weight_g) * TASTE_PHASE_FRACTION;
    let base = phase_water / TASTE_PHASE_POURS as f64;

    match taste {
        Taste::Balanced => [base, base],
        Taste::Sweet => [base * (1.0 + TASTE_SKEW), base * (1.0 - TASTE_SKEW)],
        Taste::Bright => [base * (1.0 - TASTE_SKEW), base * (1.0 + TASTE_SKEW)],
    }
}

/// Remaining 60%, split into `strength.pour_count()` equal shares.
pub fn strength_phase_pours(bean_weight_g: f64, strength: Strength) -> Vec<f64> {
    let phase_water = total_water(bean_weight_g) * STRENGTH_PHASE_FRACTION;
    let count = strength.pour_count();
    vec![phase_water / count as f64; count]
}

/// Offsets saturate at `u32::MAX`; `BrewConfig::validate` keeps real schedules well below it.
pub fn pour_timings(pour_count: usize, interval_secs: u32) -> Vec<u32> {
    (0..pour_count as u32)
        .map(|i| i.saturating_mul(interval_secs))
        .collect()
}

/// Recipe with the default 45 second spacing.
pub fn calculate_recipe(bean_weight_g: f64, taste: Taste, strength: Strength) -> Recipe {
    calculate_recipe_with_interval(bean_weight_g, taste, strength, DEFAULT_POUR_INTERVAL_SECS)
}

pub fn calculate_recipe_with_interval(
    bean_weight_g: f64,
    taste: Taste,
    strength: Strength,
    interval_secs: u32,
) -> Recipe {
    let mut pours = Vec::with_capacity(TASTE_PHASE_POURS + strength.pour_count());
    pours.extend_from_slice(&taste_phase_pours(bean_weight_g, taste));
    pours.extend(strength_phase_pours(bean_weight_g, strength));

    let timings = pour_timings(pours.len(), interval_secs);

    debug!(
        "Recipe: {:.1}g beans, {} / {} -> {} pours every {}s",
        bean_weight_g,
        taste,
        strength,
        pours.len(),
        interval_secs
    );

    Recipe {
        bean_weight_g,
        total_water_g: total_water(bean_weight_g),
        pours,
        timings,
        taste,
        strength,
    }
}
