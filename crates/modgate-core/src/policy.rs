//! Decision policies turning a judgment into an [`Outcome`].

use serde::Serialize;

use crate::classifier::{Category, CategoryJudgment, GenerativeJudgment, Thresholds};

/// Final flagged/category decision for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    /// Whether the content violates policy.
    pub flagged: bool,
    /// Violated categories, in policy order.
    pub categories: Vec<String>,
    /// The model's explanation, when the classifier gives one.
    pub reasoning: Option<String>,
}

impl Outcome {
    /// Creates an outcome with no violations.
    pub fn appropriate() -> Self {
        Self::default()
    }

    /// Returns the categories joined with `,`, as exposed to the workflow.
    pub fn categories_output(&self) -> String {
        self.categories.join(",")
    }

    /// Returns `"true"` or `"false"`.
    pub fn flagged_output(&self) -> &'static str {
        if self.flagged {
            "true"
        } else {
            "false"
        }
    }

    /// Human-readable failure message for a flagged outcome.
    pub fn violation_message(&self) -> String {
        match &self.reasoning {
            Some(reasoning) => format!(
                "Content was flagged as inappropriate. Categories: {}. Reasoning: {}",
                self.categories_output(),
                reasoning
            ),
            None => format!(
                "Content was flagged as inappropriate for the following categories: {}",
                self.categories.join(", ")
            ),
        }
    }
}

/// Trait mapping a classifier's judgment to an outcome.
pub trait DecisionPolicy: Send + Sync {
    /// The judgment type this policy understands.
    type Judgment;

    /// Decides whether the judged content is flagged.
    fn decide(&self, judgment: &Self::Judgment) -> Outcome;
}

/// Trusts the chat model's own verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagPolicy;

impl DecisionPolicy for FlagPolicy {
    type Judgment = GenerativeJudgment;

    fn decide(&self, judgment: &GenerativeJudgment) -> Outcome {
        Outcome {
            flagged: judgment.is_inappropriate,
            // Categories only count alongside a positive verdict.
            categories: if judgment.is_inappropriate {
                judgment.flagged_categories.clone()
            } else {
                Vec::new()
            },
            reasoning: Some(
                judgment
                    .reasoning
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        }
    }
}

/// Flags a category only when the endpoint flagged it and its score is
/// strictly above the configured threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    thresholds: Thresholds,
}

impl ThresholdPolicy {
    /// Creates a policy with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }
}

impl DecisionPolicy for ThresholdPolicy {
    type Judgment = CategoryJudgment;

    fn decide(&self, judgment: &CategoryJudgment) -> Outcome {
        let categories: Vec<String> = Category::all()
            .iter()
            .filter(|&&category| judgment.exceeds(category, self.thresholds.get(category)))
            .map(|category| category.as_str().to_string())
            .collect();

        Outcome {
            flagged: !categories.is_empty(),
            categories,
            reasoning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint_judgment(entries: &[(&str, bool, f64)]) -> CategoryJudgment {
        let mut judgment = CategoryJudgment::default();
        for (name, flag, score) in entries {
            judgment.categories.insert(name.to_string(), *flag);
            judgment.category_scores.insert(name.to_string(), *score);
        }
        judgment
    }

    #[test]
    fn flag_policy_passes_categories_verbatim() {
        let judgment = GenerativeJudgment {
            is_inappropriate: true,
            flagged_categories: vec!["violence".into(), "Hate".into(), "violence".into()],
            reasoning: Some("threatens a maintainer".into()),
            confidence_score: Some(0.9),
        };

        let outcome = FlagPolicy.decide(&judgment);
        assert!(outcome.flagged);
        assert_eq!(outcome.categories, vec!["violence", "Hate", "violence"]);
        assert_eq!(outcome.reasoning.as_deref(), Some("threatens a maintainer"));
    }

    #[test]
    fn flag_policy_follows_boolean_even_with_categories() {
        let judgment = GenerativeJudgment {
            is_inappropriate: false,
            flagged_categories: vec!["spam".into()],
            reasoning: None,
            confidence_score: None,
        };

        let outcome = FlagPolicy.decide(&judgment);
        assert!(!outcome.flagged);
        assert!(outcome.categories.is_empty());
        assert_eq!(outcome.flagged_output(), "false");
        assert_eq!(outcome.categories_output(), "");
        assert_eq!(outcome.reasoning.as_deref(), Some("N/A"));
    }

    #[test]
    fn threshold_policy_flags_in_fixed_order() {
        let judgment = endpoint_judgment(&[("violence", true, 0.8), ("hate", true, 0.9)]);
        let outcome = ThresholdPolicy::new(Thresholds::uniform(0.5)).decide(&judgment);

        assert!(outcome.flagged);
        assert_eq!(outcome.categories, vec!["hate", "violence"]);
        assert_eq!(
            outcome.violation_message(),
            "Content was flagged as inappropriate for the following categories: hate, violence"
        );
    }

    #[test]
    fn threshold_boundary_is_not_flagged() {
        let judgment = endpoint_judgment(&[("sexual", true, 0.5)]);
        let outcome = ThresholdPolicy::new(Thresholds::uniform(0.5)).decide(&judgment);

        assert!(!outcome.flagged);
        assert!(outcome.categories.is_empty());
    }

    #[test]
    fn threshold_policy_requires_boolean_flag() {
        let judgment = endpoint_judgment(&[("hate", false, 0.99), ("self-harm", true, 0.2)]);
        let outcome = ThresholdPolicy::new(Thresholds::uniform(0.5)).decide(&judgment);

        assert!(!outcome.flagged);
    }

    #[test]
    fn threshold_policy_uses_per_category_values() {
        let judgment = endpoint_judgment(&[
            ("hate/threatening", true, 0.3),
            ("self-harm", true, 0.3),
        ]);
        let mut thresholds = Thresholds::uniform(0.5);
        thresholds.set(Category::SelfHarm, 0.1);

        let outcome = ThresholdPolicy::new(thresholds).decide(&judgment);
        assert_eq!(outcome.categories, vec!["self-harm"]);
    }

    #[test]
    fn nan_threshold_disables_category() {
        let judgment = endpoint_judgment(&[("hate", true, 1.0), ("violence", true, 1.0)]);
        let mut thresholds = Thresholds::uniform(0.5);
        thresholds.set(Category::Hate, f64::NAN);

        let outcome = ThresholdPolicy::new(thresholds).decide(&judgment);
        assert_eq!(outcome.categories, vec!["violence"]);
    }

    #[test]
    fn unknown_endpoint_categories_are_ignored() {
        let judgment = endpoint_judgment(&[("harassment", true, 0.99)]);
        let outcome = ThresholdPolicy::new(Thresholds::uniform(0.0)).decide(&judgment);

        assert!(!outcome.flagged);
    }

    #[test]
    fn violation_message_includes_reasoning() {
        let outcome = Outcome {
            flagged: true,
            categories: vec!["hate".into(), "violence".into()],
            reasoning: Some("slurs and threats".into()),
        };

        assert_eq!(
            outcome.violation_message(),
            "Content was flagged as inappropriate. Categories: hate,violence. Reasoning: slurs and threats"
        );
    }

    #[test]
    fn appropriate_outcome_outputs() {
        let outcome = Outcome::appropriate();
        assert_eq!(outcome.flagged_output(), "false");
        assert_eq!(outcome.categories_output(), "");
    }
}
