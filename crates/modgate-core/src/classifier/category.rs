//! Fixed moderation categories and their thresholds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Categories checked against thresholds by the moderation-endpoint policy.
///
/// The order of [`Category::all`] is the order flagged categories are
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Hate speech or discrimination.
    #[serde(rename = "hate")]
    Hate,
    /// Hateful content that also threatens violence.
    #[serde(rename = "hate/threatening")]
    HateThreatening,
    /// Sexually explicit content.
    #[serde(rename = "sexual")]
    Sexual,
    /// Content promoting or describing violence.
    #[serde(rename = "violence")]
    Violence,
    /// Content related to self-harm or suicide.
    #[serde(rename = "self-harm")]
    SelfHarm,
}

impl Category {
    /// Returns all categories in reporting order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Hate,
            Category::HateThreatening,
            Category::Sexual,
            Category::Violence,
            Category::SelfHarm,
        ]
    }

    /// Returns the name the moderation endpoint uses for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hate => "hate",
            Category::HateThreatening => "hate/threatening",
            Category::Sexual => "sexual",
            Category::Violence => "violence",
            Category::SelfHarm => "self-harm",
        }
    }

    /// Returns the name of the action input holding this category's threshold.
    pub fn threshold_input(&self) -> &'static str {
        match self {
            Category::Hate => "threshold-hate",
            Category::HateThreatening => "threshold-hate-threatening",
            Category::Sexual => "threshold-sexual",
            Category::Violence => "threshold-violence",
            Category::SelfHarm => "threshold-self-harm",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category score thresholds.
///
/// A `NaN` threshold never compares greater, so it disables its category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub hate: f64,
    pub hate_threatening: f64,
    pub sexual: f64,
    pub violence: f64,
    pub self_harm: f64,
}

impl Thresholds {
    /// Creates thresholds with the same value for every category.
    pub fn uniform(value: f64) -> Self {
        Self {
            hate: value,
            hate_threatening: value,
            sexual: value,
            violence: value,
            self_harm: value,
        }
    }

    /// Returns the threshold for a category.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Hate => self.hate,
            Category::HateThreatening => self.hate_threatening,
            Category::Sexual => self.sexual,
            Category::Violence => self.violence,
            Category::SelfHarm => self.self_harm,
        }
    }

    /// Sets the threshold for a category.
    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Hate => self.hate = value,
            Category::HateThreatening => self.hate_threatening = value,
            Category::Sexual => self.sexual = value,
            Category::Violence => self.violence = value,
            Category::SelfHarm => self.self_harm = value,
        }
    }
}

/// First result entry returned by the moderation endpoint.
///
/// Maps are keyed by the endpoint's category names, which may include
/// categories outside [`Category`]; those are kept but never flagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryJudgment {
    /// The model's own overall verdict. Informational only.
    #[serde(default)]
    pub flagged: bool,
    /// Per-category boolean flags.
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Per-category scores in `[0, 1]`.
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

impl CategoryJudgment {
    /// Returns the boolean flag for a category, `false` if absent.
    pub fn is_flagged(&self, category: Category) -> bool {
        self.categories
            .get(category.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Returns the score for a category, if present.
    pub fn score(&self, category: Category) -> Option<f64> {
        self.category_scores.get(category.as_str()).copied()
    }

    /// Returns true if the category is flagged and scores strictly above `threshold`.
    pub fn exceeds(&self, category: Category, threshold: f64) -> bool {
        self.is_flagged(category)
            && self
                .score(category)
                .map(|score| score > threshold)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_all_is_in_reporting_order() {
        let names: Vec<_> = Category::all().iter().map(Category::as_str).collect();
        assert_eq!(
            names,
            vec!["hate", "hate/threatening", "sexual", "violence", "self-harm"]
        );
    }

    #[test]
    fn category_serde_uses_endpoint_names() {
        let json = serde_json::to_string(&Category::HateThreatening).unwrap();
        assert_eq!(json, "\"hate/threatening\"");

        let parsed: Category = serde_json::from_str("\"self-harm\"").unwrap();
        assert_eq!(parsed, Category::SelfHarm);
    }

    #[test]
    fn thresholds_get_and_set() {
        let mut thresholds = Thresholds::uniform(0.5);
        thresholds.set(Category::Violence, 0.8);

        assert_eq!(thresholds.get(Category::Violence), 0.8);
        assert_eq!(thresholds.get(Category::Hate), 0.5);
    }

    #[test]
    fn judgment_deserializes_endpoint_result() {
        let judgment: CategoryJudgment = serde_json::from_value(serde_json::json!({
            "flagged": true,
            "categories": {"hate": true, "harassment": false},
            "category_scores": {"hate": 0.91, "harassment": 0.02}
        }))
        .unwrap();

        assert!(judgment.flagged);
        assert!(judgment.is_flagged(Category::Hate));
        assert!(!judgment.is_flagged(Category::Violence));
        assert_eq!(judgment.score(Category::Hate), Some(0.91));
        assert_eq!(judgment.score(Category::Sexual), None);
        assert_eq!(judgment.categories.len(), 2);
    }

    #[test]
    fn exceeds_requires_flag_and_strictly_greater_score() {
        let mut judgment = CategoryJudgment::default();
        judgment.categories.insert("hate".into(), true);
        judgment.category_scores.insert("hate".into(), 0.5);

        assert!(!judgment.exceeds(Category::Hate, 0.5));
        assert!(judgment.exceeds(Category::Hate, 0.49));
        assert!(!judgment.exceeds(Category::Hate, f64::NAN));
    }
}
