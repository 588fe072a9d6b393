//! Text helpers for whatever renders a session: countdown clock, rounded
//! grams, pour instructions. Rounding only ever happens here.

use crate::types::Recipe;
use std::fmt::Write;

/// `m:ss`, e.g. 125 -> `2:05`
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn format_grams(amount_g: f64) -> String {
    format!("{:.0}g", amount_g)
}

/// 0-based index in, 1-based label out
pub fn pour_action(index: usize) -> String {
    format!("Pour {}", index + 1)
}

pub fn recipe_summary(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} beans -> {} water ({} / {}, {} pours)",
        format_grams(recipe.bean_weight_g),
        format_grams(recipe.total_water_g),
        recipe.taste,
        recipe.strength,
        recipe.pour_count()
    );

    let mut cumulative = 0.0;
    for (i, step) in recipe.pour_steps().iter().enumerate() {
        cumulative += step.amount_g;
        let _ = writeln!(
            out,
            "  {:>5}  {:<7} {:>5}  (total {})",
            format_countdown(step.timing_secs),
            pour_action(i),
            format_grams(step.amount_g),
            format_grams(cumulative)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::calculate_recipe;
    use crate::types::{Strength, Taste};

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(45), "0:45");
        assert_eq!(format_countdown(125), "2:05");
    }

    #[test]
    fn test_format_grams_rounds() {
        assert_eq!(format_grams(72.0), "72g");
        assert_eq!(format_grams(33.6), "34g");
    }

    #[test]
    fn test_pour_action_is_one_based() {
        assert_eq!(pour_action(0), "Pour 1");
        assert_eq!(pour_action(5), "Pour 6");
    }

    #[test]
    fn test_recipe_summary_lists_every_pour() {
        let recipe = calculate_recipe(20.0, Taste::Sweet, Strength::Strong);
        let summary = recipe_summary(&recipe);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].contains("20g beans -> 300g water"));
        assert!(lines[1].contains("Pour 1") && lines[1].contains("72g"));
        assert!(lines[6].contains("3:45") && lines[6].contains("total 300g"));
    }
}
